use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use villamar_core::cms::DocKind;
use villamar_core::sitemap::{empty_urlset, render_index, render_urlset, ChangeFreq, SitemapEntry};

use crate::{AppState, SharedState};

const CACHEABLE: &str = "public, max-age=3600, s-maxage=3600";
const NO_CACHE: &str = "no-cache";

fn xml_response(xml: String, cache_control: &'static str) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/xml"),
            (header::CACHE_CONTROL, cache_control),
        ],
        xml,
    )
        .into_response()
}

/// `GET /sitemap.xml` — index over the per-type sitemaps.
pub async fn index(State(state): State<SharedState>) -> Response {
    let site = &state.config.site;
    let locs: Vec<String> = ["properties", "projects", "blog", "neighborhoods", "pages"]
        .iter()
        .map(|name| site.absolute_url(&format!("/sitemaps/{}.xml", name)))
        .collect();
    xml_response(render_index(&locs), CACHEABLE)
}

/// Crawlers must never see an error status or malformed XML: a failed CMS
/// query serves a valid empty document with caching disabled.
async fn doc_sitemap(
    state: &AppState,
    kind: DocKind,
    prefix: &str,
    changefreq: ChangeFreq,
    priority: f32,
) -> Response {
    match state.source.slugs(kind).await {
        Ok(entries) => {
            let site = &state.config.site;
            let urls: Vec<SitemapEntry> = entries
                .iter()
                .map(|entry| SitemapEntry {
                    loc: site.absolute_url(&format!("{}/{}", prefix, entry.slug.current)),
                    lastmod: entry.updated_at.map(|dt| dt.date_naive()),
                    changefreq,
                    priority,
                })
                .collect();
            xml_response(render_urlset(&urls), CACHEABLE)
        }
        Err(err) => {
            tracing::error!(error = %err, kind = ?kind, "sitemap query failed, serving empty document");
            xml_response(empty_urlset(), NO_CACHE)
        }
    }
}

pub async fn properties(State(state): State<SharedState>) -> Response {
    doc_sitemap(
        &state,
        DocKind::Property,
        "/properties",
        ChangeFreq::Daily,
        0.9,
    )
    .await
}

pub async fn projects(State(state): State<SharedState>) -> Response {
    doc_sitemap(
        &state,
        DocKind::Project,
        "/projects",
        ChangeFreq::Weekly,
        0.8,
    )
    .await
}

pub async fn blog(State(state): State<SharedState>) -> Response {
    doc_sitemap(&state, DocKind::BlogPost, "/blog", ChangeFreq::Weekly, 0.7).await
}

pub async fn neighborhoods(State(state): State<SharedState>) -> Response {
    doc_sitemap(
        &state,
        DocKind::Neighborhood,
        "/neighborhoods",
        ChangeFreq::Monthly,
        0.6,
    )
    .await
}

/// Static sections and legal pages; no CMS read involved.
pub async fn pages(State(state): State<SharedState>) -> Response {
    let site = &state.config.site;
    let mut urls = vec![SitemapEntry {
        loc: site.absolute_url("/"),
        lastmod: None,
        changefreq: ChangeFreq::Daily,
        priority: 1.0,
    }];
    for path in [
        "/properties",
        "/projects",
        "/developers",
        "/neighborhoods",
        "/blog",
        "/faq",
        "/about",
        "/contact",
    ] {
        urls.push(SitemapEntry {
            loc: site.absolute_url(path),
            lastmod: None,
            changefreq: ChangeFreq::Weekly,
            priority: 0.8,
        });
    }
    for page in &state.legal_pages {
        urls.push(SitemapEntry {
            loc: site.absolute_url(&format!("/{}", page.slug)),
            lastmod: None,
            changefreq: ChangeFreq::Monthly,
            priority: 0.5,
        });
    }
    xml_response(render_urlset(&urls), CACHEABLE)
}
