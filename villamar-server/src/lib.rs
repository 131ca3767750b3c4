pub mod mailer;
pub mod routes;

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde_json::Value;
use tower_http::services::ServeDir;

use villamar_core::config::{default_navigation, Config};
use villamar_core::content::{blocks_to_html, Block, ImageRef};
use villamar_core::format::{format_area, format_date, format_month_year, format_price};
use villamar_core::{ContentSource, ImageUrlBuilder, LegalPage, PageScanner, TemplateRenderer};

use crate::mailer::Notifier;

/// Configuration for the site server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to serve on
    pub port: u16,
    /// Directory holding the tera templates
    pub theme_dir: PathBuf,
    /// Directory served under /static
    pub static_dir: PathBuf,
    /// Directory holding the markdown legal pages
    pub content_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            theme_dir: PathBuf::from("./theme"),
            static_dir: PathBuf::from("./static"),
            content_dir: PathBuf::from("./content/legal"),
        }
    }
}

/// Everything a request handler needs; shared immutably across requests.
pub struct AppState {
    pub config: Config,
    pub renderer: TemplateRenderer,
    pub source: Arc<dyn ContentSource>,
    pub notifier: Arc<dyn Notifier>,
    pub images: ImageUrlBuilder,
    pub legal_pages: Vec<LegalPage>,
}

pub type SharedState = Arc<AppState>;

/// The site server: template renderer, routes and static assets.
pub struct Server {
    config: ServerConfig,
    state: SharedState,
}

impl Server {
    pub fn new(
        config: ServerConfig,
        site: Config,
        images: ImageUrlBuilder,
        source: Arc<dyn ContentSource>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let legal_pages = PageScanner::new(&config.content_dir).scan()?;
        let renderer = build_renderer(&config.theme_dir, &site, &images, &legal_pages)?;
        let state = Arc::new(AppState {
            config: site,
            renderer,
            source,
            notifier,
            images,
            legal_pages,
        });

        Ok(Self { config, state })
    }

    pub fn state(&self) -> SharedState {
        self.state.clone()
    }

    /// Run the server until shutdown.
    pub async fn run(self) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port).parse()?;
        let app = router(self.state.clone(), &self.config.static_dir);

        tracing::info!(%addr, "serving site");
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

/// Assemble the full route table over the shared state.
pub fn router(state: SharedState, static_dir: &Path) -> Router {
    Router::new()
        .route("/", get(routes::pages::home))
        .route("/properties", get(routes::pages::properties))
        .route("/properties/{slug}", get(routes::pages::property_detail))
        .route("/projects", get(routes::pages::projects))
        .route("/projects/{slug}", get(routes::pages::project_detail))
        .route("/developers", get(routes::pages::developers))
        .route("/neighborhoods", get(routes::pages::neighborhoods))
        .route(
            "/neighborhoods/{slug}",
            get(routes::pages::neighborhood_detail),
        )
        .route("/blog", get(routes::pages::blog))
        .route("/blog/{slug}", get(routes::pages::blog_post))
        .route("/faq", get(routes::pages::faq))
        .route("/about", get(routes::pages::about))
        .route("/contact", get(routes::pages::contact))
        .route("/robots.txt", get(routes::pages::robots))
        .route("/api/contact", post(routes::api::contact))
        .route("/api/newsletter", post(routes::api::newsletter))
        .route("/sitemap.xml", get(routes::sitemaps::index))
        .route("/sitemaps/properties.xml", get(routes::sitemaps::properties))
        .route("/sitemaps/projects.xml", get(routes::sitemaps::projects))
        .route("/sitemaps/blog.xml", get(routes::sitemaps::blog))
        .route(
            "/sitemaps/neighborhoods.xml",
            get(routes::sitemaps::neighborhoods),
        )
        .route("/sitemaps/pages.xml", get(routes::sitemaps::pages))
        .nest_service("/static", ServeDir::new(static_dir))
        .fallback(routes::pages::fallback)
        .with_state(state)
}

/// Load the theme and wire in the site globals and formatting helpers.
fn build_renderer(
    theme_dir: &Path,
    site: &Config,
    images: &ImageUrlBuilder,
    legal_pages: &[LegalPage],
) -> Result<TemplateRenderer> {
    let glob = format!("{}/**/*.html", theme_dir.display());
    let mut renderer = TemplateRenderer::new(&glob)?;

    renderer.set_global("site", &site.site);
    renderer.set_global("contact", &site.contact);
    renderer.set_global("social", &site.social);
    renderer.set_global("navigation", &default_navigation());
    let legal_nav: Vec<Value> = legal_pages
        .iter()
        .map(|page| {
            serde_json::json!({
                "text": page.title,
                "link": format!("/{}", page.slug),
            })
        })
        .collect();
    renderer.set_global("legal_pages", &legal_nav);

    let builder = images.clone();
    renderer.register_function(
        "image_url",
        move |args: &HashMap<String, Value>| -> tera::Result<Value> {
            let image = args
                .get("image")
                .and_then(|v| serde_json::from_value::<ImageRef>(v.clone()).ok());
            let width = args.get("width").and_then(Value::as_u64).map(|w| w as u32);
            let height = args.get("height").and_then(Value::as_u64).map(|h| h as u32);
            Ok(Value::String(builder.url(image.as_ref(), width, height)))
        },
    );

    let currency = site.site.currency.clone();
    renderer.register_filter(
        "price",
        move |value: &Value, _: &HashMap<String, Value>| -> tera::Result<Value> {
            Ok(Value::String(format_price(
                value.as_i64().unwrap_or(0),
                &currency,
            )))
        },
    );
    renderer.register_filter(
        "area",
        |value: &Value, _: &HashMap<String, Value>| -> tera::Result<Value> {
            Ok(Value::String(format_area(
                value.as_u64().unwrap_or(0) as u32
            )))
        },
    );
    renderer.register_filter(
        "longdate",
        |value: &Value, _: &HashMap<String, Value>| -> tera::Result<Value> {
            let formatted = value
                .as_str()
                .and_then(|raw| raw.parse::<chrono::DateTime<chrono::Utc>>().ok())
                .map(|dt| format_date(&dt));
            Ok(Value::String(formatted.unwrap_or_default()))
        },
    );
    renderer.register_filter(
        "monthyear",
        |value: &Value, _: &HashMap<String, Value>| -> tera::Result<Value> {
            let formatted = value
                .as_str()
                .and_then(|raw| raw.parse::<chrono::NaiveDate>().ok())
                .map(|date| format_month_year(&date));
            Ok(Value::String(formatted.unwrap_or_default()))
        },
    );
    renderer.register_filter(
        "blocks",
        |value: &Value, _: &HashMap<String, Value>| -> tera::Result<Value> {
            let blocks: Vec<Block> = serde_json::from_value(value.clone()).unwrap_or_default();
            Ok(Value::String(blocks_to_html(&blocks)))
        },
    );

    Ok(renderer)
}

// Served when the theme itself cannot render; keeps a broken template from
// taking the error page down with it.
const FALLBACK_PAGE: &str = "<!doctype html><html><head><title>Villamar Estates</title></head>\
<body><h1>Something went wrong</h1><p>Please try again later.</p></body></html>";

/// Render a theme template into an HTML response with the given status.
pub(crate) fn render_page(
    state: &AppState,
    status: StatusCode,
    template: &str,
    context: &tera::Context,
) -> Response {
    match state.renderer.render(template, context) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(err) => {
            tracing::error!(error = %err, template, "template render failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(FALLBACK_PAGE.to_string()),
            )
                .into_response()
        }
    }
}
