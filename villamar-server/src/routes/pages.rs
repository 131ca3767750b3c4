use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tera::Context;

use villamar_core::cms::CmsError;
use villamar_core::content::{blocks_to_plain_text, FromParam};
use villamar_core::filter::{ProjectFilter, PropertyFilter};
use villamar_core::markdown::render_markdown_file;
use villamar_core::seo;
use villamar_core::seo::PageMeta;

use crate::{render_page, AppState, SharedState};

fn base_context(meta: PageMeta, json_ld: Vec<Value>) -> Context {
    let mut context = Context::new();
    context.insert("meta", &meta);
    context.insert("json_ld", &json_ld);
    context
}

// The caller never sees the underlying error, only the generic page.
fn error_page(state: &AppState) -> Response {
    let meta = PageMeta::new(
        &state.config.site,
        "Something went wrong",
        "We could not load this page. Please try again shortly.",
        "/",
    );
    let context = base_context(meta, vec![]);
    render_page(
        state,
        StatusCode::INTERNAL_SERVER_ERROR,
        "error.html",
        &context,
    )
}

fn cms_failure(state: &AppState, err: CmsError) -> Response {
    tracing::error!(error = %err, "cms query failed");
    error_page(state)
}

fn not_found(state: &AppState) -> Response {
    let meta = PageMeta::new(
        &state.config.site,
        "Page not found",
        "The page you are looking for does not exist.",
        "/",
    );
    let context = base_context(meta, vec![]);
    render_page(state, StatusCode::NOT_FOUND, "404.html", &context)
}

fn parse_facet<T: FromParam>(raw: &Option<String>) -> Option<T> {
    raw.as_deref().and_then(T::from_param)
}

fn parse_number<T: std::str::FromStr>(raw: &Option<String>) -> Option<T> {
    raw.as_deref().and_then(|s| s.trim().parse().ok())
}

fn parse_list(raw: &Option<String>) -> Vec<String> {
    raw.as_deref()
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty() && *item != "all")
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

/// Facet selections as they arrive on the query string. Everything is kept as
/// an optional string so a malformed value degrades to "no constraint"
/// instead of a rejected request.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ListingQuery {
    pub market: Option<String>,
    pub category: Option<String>,
    pub lifestyle: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub min_area: Option<String>,
    pub max_area: Option<String>,
    pub bedrooms: Option<String>,
    pub amenities: Option<String>,
    pub status: Option<String>,
    pub location: Option<String>,
    pub q: Option<String>,
}

impl ListingQuery {
    pub fn property_filter(&self) -> PropertyFilter {
        PropertyFilter {
            market_type: parse_facet(&self.market),
            category: parse_facet(&self.category),
            lifestyle: parse_facet(&self.lifestyle),
            min_price: parse_number(&self.min_price),
            max_price: parse_number(&self.max_price),
            min_area: parse_number(&self.min_area),
            max_area: parse_number(&self.max_area),
            min_bedrooms: parse_number(&self.bedrooms),
            amenities: parse_list(&self.amenities),
            status: parse_facet(&self.status),
            locations: parse_list(&self.location),
            query: self.q.clone(),
        }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ProjectQuery {
    pub status: Option<String>,
    pub developer: Option<String>,
    pub location: Option<String>,
    pub q: Option<String>,
}

impl ProjectQuery {
    pub fn project_filter(&self) -> ProjectFilter {
        ProjectFilter {
            status: parse_facet(&self.status),
            developer: self
                .developer
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty() && *d != "all")
                .map(String::from),
            locations: parse_list(&self.location),
            query: self.q.clone(),
        }
    }
}

pub async fn home(State(state): State<SharedState>) -> Response {
    let bundle = match state.source.home_bundle().await {
        Ok(bundle) => bundle,
        Err(err) => return cms_failure(&state, err),
    };
    let site = &state.config.site;
    let description = site
        .tagline
        .clone()
        .unwrap_or_else(|| "Luxury real estate brokerage".to_string());
    let meta = PageMeta::new(site, "Luxury Real Estate in Dubai", &description, "/");
    let json_ld = vec![seo::organization(&state.config), seo::website(site)];
    let mut context = base_context(meta, json_ld);
    context.insert("bundle", &bundle);
    render_page(&state, StatusCode::OK, "home.html", &context)
}

pub async fn properties(
    State(state): State<SharedState>,
    Query(query): Query<ListingQuery>,
) -> Response {
    let all = match state.source.properties().await {
        Ok(all) => all,
        Err(err) => return cms_failure(&state, err),
    };
    let filter = query.property_filter();
    let visible = filter.apply(&all);

    let site = &state.config.site;
    let meta = PageMeta::new(
        site,
        "Properties for Sale and Rent",
        "Browse our curated portfolio of luxury apartments, villas and penthouses.",
        "/properties",
    );
    let json_ld = vec![seo::breadcrumbs(
        site,
        &[("Home", "/"), ("Properties", "/properties")],
    )];
    let mut context = base_context(meta, json_ld);
    context.insert("properties", &visible);
    context.insert("total", &all.len());
    context.insert("selected", &query);
    render_page(&state, StatusCode::OK, "properties.html", &context)
}

pub async fn property_detail(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
) -> Response {
    let bundle = match state.source.property_by_slug(&slug).await {
        Ok(Some(bundle)) => bundle,
        Ok(None) => return not_found(&state),
        Err(err) => return cms_failure(&state, err),
    };
    let site = &state.config.site;
    let property = &bundle.property;
    let image = state
        .images
        .url(property.main_image.as_ref(), Some(1200), Some(630));
    let description = property
        .excerpt
        .clone()
        .unwrap_or_else(|| blocks_to_plain_text(&property.description));
    let path = format!("/properties/{}", property.slug.current);
    let meta = PageMeta::new(site, &property.title, &description, &path).with_image(&image);
    let json_ld = vec![
        seo::property_listing(site, property, &image),
        seo::breadcrumbs(
            site,
            &[
                ("Home", "/"),
                ("Properties", "/properties"),
                (property.title.as_str(), path.as_str()),
            ],
        ),
    ];
    let mut context = base_context(meta, json_ld);
    context.insert("property", property);
    context.insert("related", &bundle.related);
    render_page(&state, StatusCode::OK, "property.html", &context)
}

pub async fn projects(
    State(state): State<SharedState>,
    Query(query): Query<ProjectQuery>,
) -> Response {
    let all = match state.source.projects().await {
        Ok(all) => all,
        Err(err) => return cms_failure(&state, err),
    };
    let filter = query.project_filter();
    let visible = filter.apply(&all);

    let site = &state.config.site;
    let meta = PageMeta::new(
        site,
        "Off-Plan Projects",
        "New developments and off-plan investment opportunities across Dubai.",
        "/projects",
    );
    let json_ld = vec![seo::breadcrumbs(
        site,
        &[("Home", "/"), ("Projects", "/projects")],
    )];
    let mut context = base_context(meta, json_ld);
    context.insert("projects", &visible);
    context.insert("total", &all.len());
    context.insert("selected", &query);
    render_page(&state, StatusCode::OK, "projects.html", &context)
}

pub async fn project_detail(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
) -> Response {
    let bundle = match state.source.project_by_slug(&slug).await {
        Ok(Some(bundle)) => bundle,
        Ok(None) => return not_found(&state),
        Err(err) => return cms_failure(&state, err),
    };
    let site = &state.config.site;
    let project = &bundle.project;
    let image = state
        .images
        .url(project.main_image.as_ref(), Some(1200), Some(630));
    let description = project
        .excerpt
        .clone()
        .unwrap_or_else(|| blocks_to_plain_text(&project.description));
    let path = format!("/projects/{}", project.slug.current);
    let meta = PageMeta::new(site, &project.name, &description, &path).with_image(&image);
    let json_ld = vec![seo::breadcrumbs(
        site,
        &[
            ("Home", "/"),
            ("Projects", "/projects"),
            (project.name.as_str(), path.as_str()),
        ],
    )];
    let mut context = base_context(meta, json_ld);
    context.insert("project", project);
    context.insert("properties", &bundle.properties);
    render_page(&state, StatusCode::OK, "project.html", &context)
}

pub async fn developers(State(state): State<SharedState>) -> Response {
    let developers = match state.source.developers().await {
        Ok(developers) => developers,
        Err(err) => return cms_failure(&state, err),
    };
    let site = &state.config.site;
    let meta = PageMeta::new(
        site,
        "Developers",
        "The master developers behind Dubai's landmark communities.",
        "/developers",
    );
    let json_ld = vec![seo::breadcrumbs(
        site,
        &[("Home", "/"), ("Developers", "/developers")],
    )];
    let mut context = base_context(meta, json_ld);
    context.insert("developers", &developers);
    render_page(&state, StatusCode::OK, "developers.html", &context)
}

pub async fn neighborhoods(State(state): State<SharedState>) -> Response {
    let neighborhoods = match state.source.neighborhoods().await {
        Ok(neighborhoods) => neighborhoods,
        Err(err) => return cms_failure(&state, err),
    };
    let site = &state.config.site;
    let meta = PageMeta::new(
        site,
        "Neighborhoods",
        "Area guides for Dubai's most sought-after communities.",
        "/neighborhoods",
    );
    let json_ld = vec![seo::breadcrumbs(
        site,
        &[("Home", "/"), ("Neighborhoods", "/neighborhoods")],
    )];
    let mut context = base_context(meta, json_ld);
    context.insert("neighborhoods", &neighborhoods);
    render_page(&state, StatusCode::OK, "neighborhoods.html", &context)
}

pub async fn neighborhood_detail(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
) -> Response {
    let bundle = match state.source.neighborhood_by_slug(&slug).await {
        Ok(Some(bundle)) => bundle,
        Ok(None) => return not_found(&state),
        Err(err) => return cms_failure(&state, err),
    };
    let site = &state.config.site;
    let neighborhood = &bundle.neighborhood;
    let image = state
        .images
        .url(neighborhood.image.as_ref(), Some(1200), Some(630));
    let description = blocks_to_plain_text(&neighborhood.description);
    let path = format!("/neighborhoods/{}", neighborhood.slug.current);
    let meta = PageMeta::new(site, &neighborhood.name, &description, &path).with_image(&image);
    let json_ld = vec![seo::breadcrumbs(
        site,
        &[
            ("Home", "/"),
            ("Neighborhoods", "/neighborhoods"),
            (neighborhood.name.as_str(), path.as_str()),
        ],
    )];
    let mut context = base_context(meta, json_ld);
    context.insert("neighborhood", neighborhood);
    context.insert("properties", &bundle.properties);
    context.insert("projects", &bundle.projects);
    render_page(&state, StatusCode::OK, "neighborhood.html", &context)
}

pub async fn blog(State(state): State<SharedState>) -> Response {
    let posts = match state.source.blog_posts().await {
        Ok(posts) => posts,
        Err(err) => return cms_failure(&state, err),
    };
    let site = &state.config.site;
    let meta = PageMeta::new(
        site,
        "Insights & Market News",
        "Market reports, buying guides and community news from our team.",
        "/blog",
    );
    let json_ld = vec![seo::breadcrumbs(site, &[("Home", "/"), ("Blog", "/blog")])];
    let mut context = base_context(meta, json_ld);
    context.insert("posts", &posts);
    render_page(&state, StatusCode::OK, "blog.html", &context)
}

pub async fn blog_post(State(state): State<SharedState>, Path(slug): Path<String>) -> Response {
    let post = match state.source.blog_post_by_slug(&slug).await {
        Ok(Some(post)) => post,
        Ok(None) => return not_found(&state),
        Err(err) => return cms_failure(&state, err),
    };
    let site = &state.config.site;
    let image = state.images.url(post.main_image.as_ref(), Some(1200), Some(630));
    let description = post.excerpt.clone().unwrap_or_default();
    let path = format!("/blog/{}", post.slug.current);
    let meta = PageMeta::new(site, &post.title, &description, &path).with_image(&image);
    let json_ld = vec![
        seo::article(site, &post, &image),
        seo::breadcrumbs(
            site,
            &[
                ("Home", "/"),
                ("Blog", "/blog"),
                (post.title.as_str(), path.as_str()),
            ],
        ),
    ];
    let mut context = base_context(meta, json_ld);
    context.insert("post", &post);
    render_page(&state, StatusCode::OK, "blog_post.html", &context)
}

pub async fn faq(State(state): State<SharedState>) -> Response {
    let faqs = match state.source.faqs().await {
        Ok(faqs) => faqs,
        Err(err) => return cms_failure(&state, err),
    };
    let site = &state.config.site;
    let meta = PageMeta::new(
        site,
        "Frequently Asked Questions",
        "Answers on buying, selling, renting and off-plan investing in Dubai.",
        "/faq",
    );
    let json_ld = vec![
        seo::faq_page(&faqs),
        seo::breadcrumbs(site, &[("Home", "/"), ("FAQ", "/faq")]),
    ];
    let mut context = base_context(meta, json_ld);
    context.insert("faqs", &faqs);
    render_page(&state, StatusCode::OK, "faq.html", &context)
}

pub async fn about(State(state): State<SharedState>) -> Response {
    let team = match state.source.team_members().await {
        Ok(team) => team,
        Err(err) => return cms_failure(&state, err),
    };
    let site = &state.config.site;
    let meta = PageMeta::new(
        site,
        "About Us",
        "Meet the team behind Villamar Estates.",
        "/about",
    );
    let json_ld = vec![seo::breadcrumbs(site, &[("Home", "/"), ("About", "/about")])];
    let mut context = base_context(meta, json_ld);
    context.insert("team", &team);
    render_page(&state, StatusCode::OK, "about.html", &context)
}

pub async fn contact(State(state): State<SharedState>) -> Response {
    let site = &state.config.site;
    let meta = PageMeta::new(
        site,
        "Contact Us",
        "Speak to a consultant about buying, selling or renting in Dubai.",
        "/contact",
    );
    let json_ld = vec![seo::breadcrumbs(
        site,
        &[("Home", "/"), ("Contact", "/contact")],
    )];
    let context = base_context(meta, json_ld);
    render_page(&state, StatusCode::OK, "contact.html", &context)
}

pub async fn robots(State(state): State<SharedState>) -> Response {
    let sitemap = state.config.site.absolute_url("/sitemap.xml");
    let body = format!("User-agent: *\nAllow: /\n\nSitemap: {}\n", sitemap);
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response()
}

/// Serves the markdown legal pages at their slug, everything else is a 404.
pub async fn fallback(State(state): State<SharedState>, uri: Uri) -> Response {
    let slug = uri.path().trim_matches('/');
    let Some(page) = state.legal_pages.iter().find(|page| page.slug == slug) else {
        return not_found(&state);
    };
    let body = match render_markdown_file(&page.path) {
        Ok(body) => body,
        Err(err) => {
            tracing::error!(error = %err, slug, "failed to read legal page");
            return error_page(&state);
        }
    };
    let site = &state.config.site;
    let path = format!("/{}", page.slug);
    let meta = PageMeta::new(site, &page.title, &page.title, &path);
    let mut context = base_context(meta, vec![]);
    context.insert("title", &page.title);
    context.insert("body", &body);
    render_page(&state, StatusCode::OK, "legal.html", &context)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_query_parses_leniently() {
        let query = ListingQuery {
            market: Some("rent".to_string()),
            category: Some("all".to_string()),
            min_price: Some("1000000".to_string()),
            max_price: Some("not-a-number".to_string()),
            amenities: Some("Pool, ,Gym,all".to_string()),
            bedrooms: Some("3".to_string()),
            ..Default::default()
        };
        let filter = query.property_filter();
        assert_eq!(
            filter.market_type,
            Some(villamar_core::content::MarketType::Rent)
        );
        assert_eq!(filter.category, None);
        assert_eq!(filter.min_price, Some(1_000_000));
        assert_eq!(filter.max_price, None);
        assert_eq!(filter.min_bedrooms, Some(3));
        assert_eq!(filter.amenities, vec!["Pool".to_string(), "Gym".to_string()]);
    }

    #[test]
    fn test_project_query_ignores_all_sentinel_developer() {
        let query = ProjectQuery {
            developer: Some("all".to_string()),
            status: Some("under-construction".to_string()),
            ..Default::default()
        };
        let filter = query.project_filter();
        assert!(filter.developer.is_none());
        assert_eq!(
            filter.status,
            Some(villamar_core::content::CompletionStatus::UnderConstruction)
        );
    }
}
