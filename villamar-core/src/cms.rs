use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::content::{
    BlogPost, Developer, Faq, HomeBundle, Neighborhood, NeighborhoodBundle, Project,
    ProjectBundle, Property, PropertyBundle, SlugEntry, TeamMember,
};

#[derive(Debug)]
pub enum CmsError {
    InvalidConfig(String),
    Http(reqwest::Error),
    Status(reqwest::StatusCode),
    Decode(serde_json::Error),
}

impl fmt::Display for CmsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CmsError::InvalidConfig(msg) => write!(f, "Invalid CMS configuration: {}", msg),
            CmsError::Http(e) => write!(f, "CMS request failed: {}", e),
            CmsError::Status(code) => write!(f, "CMS returned status {}", code),
            CmsError::Decode(e) => write!(f, "CMS response decode error: {}", e),
        }
    }
}

impl std::error::Error for CmsError {}

impl From<reqwest::Error> for CmsError {
    fn from(err: reqwest::Error) -> Self {
        CmsError::Http(err)
    }
}

impl From<serde_json::Error> for CmsError {
    fn from(err: serde_json::Error) -> Self {
        CmsError::Decode(err)
    }
}

/// Connection settings for the hosted content lake.
#[derive(Debug, Clone)]
pub struct CmsConfig {
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
    pub use_cdn: bool,
    pub token: Option<String>,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            dataset: "production".to_string(),
            api_version: "2024-01-01".to_string(),
            use_cdn: true,
            token: None,
        }
    }
}

/// Content types with their own slugged detail pages (and sitemaps).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocKind {
    Property,
    Project,
    BlogPost,
    Neighborhood,
}

impl DocKind {
    pub fn cms_type(&self) -> &'static str {
        match self {
            DocKind::Property => "property",
            DocKind::Project => "project",
            DocKind::BlogPost => "blogPost",
            DocKind::Neighborhood => "neighborhood",
        }
    }
}

/// Read-only view over the CMS. Handlers depend on this trait so tests can
/// substitute a canned source; [`CmsClient`] is the production implementation.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn home_bundle(&self) -> Result<HomeBundle, CmsError>;
    async fn properties(&self) -> Result<Vec<Property>, CmsError>;
    async fn property_by_slug(&self, slug: &str) -> Result<Option<PropertyBundle>, CmsError>;
    async fn projects(&self) -> Result<Vec<Project>, CmsError>;
    async fn project_by_slug(&self, slug: &str) -> Result<Option<ProjectBundle>, CmsError>;
    async fn developers(&self) -> Result<Vec<Developer>, CmsError>;
    async fn neighborhoods(&self) -> Result<Vec<Neighborhood>, CmsError>;
    async fn neighborhood_by_slug(&self, slug: &str)
        -> Result<Option<NeighborhoodBundle>, CmsError>;
    async fn blog_posts(&self) -> Result<Vec<BlogPost>, CmsError>;
    async fn blog_post_by_slug(&self, slug: &str) -> Result<Option<BlogPost>, CmsError>;
    async fn faqs(&self) -> Result<Vec<Faq>, CmsError>;
    async fn team_members(&self) -> Result<Vec<TeamMember>, CmsError>;
    async fn slugs(&self, kind: DocKind) -> Result<Vec<SlugEntry>, CmsError>;
}

// Shared GROQ projections. Dereferenced links stay shallow so list queries
// remain a single round trip.
const PROPERTY_CARD: &str = r#"{
  _id, _createdAt, _updatedAt, title, slug, location, price, bedrooms, bathrooms,
  area, category, marketType, status, excerpt, mainImage, amenities, lifestyle, featured,
  "project": project->{"name": title, slug},
  "developer": developer->{name, slug},
  "neighborhood": neighborhood->{name, slug}
}"#;

const PROPERTY_DETAIL: &str = r#"{
  _id, _createdAt, _updatedAt, title, slug, location, price, bedrooms, bathrooms,
  area, category, marketType, status, excerpt, mainImage, gallery, description,
  amenities, lifestyle, featured,
  "project": project->{"name": title, slug},
  "developer": developer->{name, slug},
  "neighborhood": neighborhood->{name, slug}
}"#;

const PROJECT_CARD: &str = r#"{
  _id, _updatedAt, "name": title, slug, location, mainImage, completionDate,
  completionStatus, excerpt, features, coordinates,
  "developer": developer->{name, slug},
  "propertyCount": count(*[_type == "property" && references(^._id)])
}"#;

const PROJECT_DETAIL: &str = r#"{
  _id, _updatedAt, "name": title, slug, location, mainImage, gallery, completionDate,
  completionStatus, excerpt, description, features, coordinates,
  "developer": developer->{name, slug},
  "propertyCount": count(*[_type == "property" && references(^._id)])
}"#;

const DEVELOPER_CARD: &str = r#"{
  _id, name, slug, logo, website, blurb, featured,
  "projectCount": count(*[_type == "project" && references(^._id)])
}"#;

const NEIGHBORHOOD_CARD: &str = r#"{
  _id, _updatedAt, name, slug, description, image, lifestyle, priceRange,
  "propertyCount": count(*[_type == "property" && references(^._id)]),
  "projectCount": count(*[_type == "project" && references(^._id)])
}"#;

const BLOG_CARD: &str =
    r#"{ _id, _updatedAt, title, slug, excerpt, mainImage, category, publishedAt, featured }"#;

const BLOG_DETAIL: &str = r#"{
  _id, _updatedAt, title, slug, excerpt, mainImage, category, publishedAt, featured, body
}"#;

#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    result: T,
}

/// Per-type document counts, used by the connectivity check.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentCounts {
    pub properties: u64,
    pub projects: u64,
    pub developers: u64,
    pub neighborhoods: u64,
    pub posts: u64,
}

/// HTTP client for the content lake's GROQ query endpoint.
pub struct CmsClient {
    http: reqwest::Client,
    query_url: String,
    token: Option<String>,
}

impl CmsClient {
    pub fn new(config: &CmsConfig) -> Result<Self, CmsError> {
        if config.project_id.is_empty() {
            return Err(CmsError::InvalidConfig(
                "cms.project_id is not set".to_string(),
            ));
        }
        if config.dataset.is_empty() {
            return Err(CmsError::InvalidConfig("cms.dataset is not set".to_string()));
        }

        let host = if config.use_cdn {
            "apicdn.sanity.io"
        } else {
            "api.sanity.io"
        };
        let query_url = format!(
            "https://{}.{}/v{}/data/query/{}",
            config.project_id, host, config.api_version, config.dataset
        );
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("villamar-site/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            query_url,
            token: config.token.clone(),
        })
    }

    async fn query<T: DeserializeOwned>(&self, groq: &str) -> Result<T, CmsError> {
        debug!(query = groq, "cms query");
        let mut request = self.http.get(&self.query_url).query(&[("query", groq)]);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(CmsError::Status(response.status()));
        }
        let body = response.text().await?;
        let envelope: QueryResponse<T> = serde_json::from_str(&body)?;
        Ok(envelope.result)
    }

    /// One combined round trip to verify connectivity and credentials.
    pub async fn ping(&self) -> Result<ContentCounts, CmsError> {
        let groq = r#"{
          "properties": count(*[_type == "property"]),
          "projects": count(*[_type == "project"]),
          "developers": count(*[_type == "developer"]),
          "neighborhoods": count(*[_type == "neighborhood"]),
          "posts": count(*[_type == "blogPost"])
        }"#;
        self.query(groq).await
    }
}

#[async_trait]
impl ContentSource for CmsClient {
    async fn home_bundle(&self) -> Result<HomeBundle, CmsError> {
        let groq = format!(
            r#"{{
              "featuredProperties": *[_type == "property" && featured == true && defined(slug.current)] | order(_createdAt desc)[0...6]{card},
              "featuredProjects": *[_type == "project" && defined(slug.current)] | order(_createdAt desc)[0...3]{project},
              "featuredDevelopers": *[_type == "developer" && featured == true]{developer}[0...8],
              "neighborhoods": *[_type == "neighborhood" && defined(slug.current)] | order(name asc)[0...6]{neighborhood},
              "latestPosts": *[_type == "blogPost" && defined(slug.current)] | order(publishedAt desc)[0...3]{blog}
            }}"#,
            card = PROPERTY_CARD,
            project = PROJECT_CARD,
            developer = DEVELOPER_CARD,
            neighborhood = NEIGHBORHOOD_CARD,
            blog = BLOG_CARD,
        );
        self.query(&groq).await
    }

    async fn properties(&self) -> Result<Vec<Property>, CmsError> {
        let groq = format!(
            r#"*[_type == "property" && defined(slug.current)] | order(_createdAt desc){}"#,
            PROPERTY_CARD
        );
        self.query(&groq).await
    }

    async fn property_by_slug(&self, slug: &str) -> Result<Option<PropertyBundle>, CmsError> {
        let groq = format!(
            r#"*[_type == "property" && slug.current == {slug}][0]{{
              "property": @{detail},
              "related": *[_type == "property" && slug.current != {slug} && location == ^.location && defined(slug.current)][0...3]{card}
            }}"#,
            slug = groq_string(slug),
            detail = PROPERTY_DETAIL,
            card = PROPERTY_CARD,
        );
        self.query(&groq).await
    }

    async fn projects(&self) -> Result<Vec<Project>, CmsError> {
        let groq = format!(
            r#"*[_type == "project" && defined(slug.current)] | order(_createdAt desc){}"#,
            PROJECT_CARD
        );
        self.query(&groq).await
    }

    async fn project_by_slug(&self, slug: &str) -> Result<Option<ProjectBundle>, CmsError> {
        let groq = format!(
            r#"*[_type == "project" && slug.current == {slug}][0]{{
              "project": @{detail},
              "properties": *[_type == "property" && references(^._id) && defined(slug.current)]{card}
            }}"#,
            slug = groq_string(slug),
            detail = PROJECT_DETAIL,
            card = PROPERTY_CARD,
        );
        self.query(&groq).await
    }

    async fn developers(&self) -> Result<Vec<Developer>, CmsError> {
        let groq = format!(
            r#"*[_type == "developer"] | order(name asc){}"#,
            DEVELOPER_CARD
        );
        self.query(&groq).await
    }

    async fn neighborhoods(&self) -> Result<Vec<Neighborhood>, CmsError> {
        let groq = format!(
            r#"*[_type == "neighborhood" && defined(slug.current)] | order(name asc){}"#,
            NEIGHBORHOOD_CARD
        );
        self.query(&groq).await
    }

    async fn neighborhood_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<NeighborhoodBundle>, CmsError> {
        let groq = format!(
            r#"*[_type == "neighborhood" && slug.current == {slug}][0]{{
              "neighborhood": @{detail},
              "properties": *[_type == "property" && references(^._id) && defined(slug.current)][0...12]{card},
              "projects": *[_type == "project" && references(^._id) && defined(slug.current)][0...6]{project}
            }}"#,
            slug = groq_string(slug),
            detail = NEIGHBORHOOD_CARD,
            card = PROPERTY_CARD,
            project = PROJECT_CARD,
        );
        self.query(&groq).await
    }

    async fn blog_posts(&self) -> Result<Vec<BlogPost>, CmsError> {
        let groq = format!(
            r#"*[_type == "blogPost" && defined(slug.current)] | order(publishedAt desc){}"#,
            BLOG_CARD
        );
        self.query(&groq).await
    }

    async fn blog_post_by_slug(&self, slug: &str) -> Result<Option<BlogPost>, CmsError> {
        let groq = format!(
            r#"*[_type == "blogPost" && slug.current == {}][0]{}"#,
            groq_string(slug),
            BLOG_DETAIL
        );
        self.query(&groq).await
    }

    async fn faqs(&self) -> Result<Vec<Faq>, CmsError> {
        self.query(r#"*[_type == "faq"] | order(order asc){ question, answer }"#)
            .await
    }

    async fn team_members(&self) -> Result<Vec<TeamMember>, CmsError> {
        self.query(
            r#"*[_type == "teamMember"] | order(order asc){ name, role, photo, languages, phone, email }"#,
        )
        .await
    }

    async fn slugs(&self, kind: DocKind) -> Result<Vec<SlugEntry>, CmsError> {
        let groq = format!(
            r#"*[_type == "{}" && defined(slug.current)]{{ slug, _updatedAt }}"#,
            kind.cms_type()
        );
        self.query(&groq).await
    }
}

/// Quote a value as a GROQ string literal.
fn groq_string(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_requires_project_id() {
        let config = CmsConfig::default();
        assert!(matches!(
            CmsClient::new(&config),
            Err(CmsError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_query_url_shape() {
        let config = CmsConfig {
            project_id: "vlm01".to_string(),
            use_cdn: false,
            ..Default::default()
        };
        let client = CmsClient::new(&config).unwrap();
        assert_eq!(
            client.query_url,
            "https://vlm01.api.sanity.io/v2024-01-01/data/query/production"
        );

        let cdn = CmsClient::new(&CmsConfig {
            project_id: "vlm01".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert!(cdn.query_url.contains("apicdn.sanity.io"));
    }

    #[test]
    fn test_groq_string_escapes_quotes() {
        assert_eq!(groq_string("palm-villa"), r#""palm-villa""#);
        assert_eq!(groq_string(r#"a"b"#), r#""a\"b""#);
        assert_eq!(groq_string(r"a\b"), r#""a\\b""#);
    }

    #[test]
    fn test_doc_kind_maps_to_cms_types() {
        assert_eq!(DocKind::Property.cms_type(), "property");
        assert_eq!(DocKind::BlogPost.cms_type(), "blogPost");
    }

    #[test]
    fn test_envelope_decodes_result() {
        let body = r#"{"result": [{"slug": {"current": "palm-villa"}, "_updatedAt": "2026-03-04T10:00:00Z"}], "ms": 12}"#;
        let envelope: QueryResponse<Vec<SlugEntry>> = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.result.len(), 1);
        assert_eq!(envelope.result[0].slug.current, "palm-villa");
        assert!(envelope.result[0].updated_at.is_some());
    }

    #[test]
    fn test_home_bundle_decodes_partial_result() {
        let body = r#"{"result": {"featuredProperties": [], "latestPosts": []}}"#;
        let envelope: QueryResponse<HomeBundle> = serde_json::from_str(body).unwrap();
        assert!(envelope.result.featured_projects.is_empty());
    }
}
