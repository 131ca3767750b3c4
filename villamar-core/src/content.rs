use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Parse a CMS string value into a typed facet value.
///
/// Returns `None` for the "all" sentinel and for anything unrecognized, so a
/// malformed value degrades to "no constraint" instead of an error.
pub trait FromParam: Sized {
    fn from_param(value: &str) -> Option<Self>;
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromParam,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(T::from_param))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarketType {
    Buy,
    Rent,
    OffPlan,
}

impl MarketType {
    pub fn label(&self) -> &'static str {
        match self {
            MarketType::Buy => "Buy",
            MarketType::Rent => "Rent",
            MarketType::OffPlan => "Off-Plan",
        }
    }
}

impl FromParam for MarketType {
    fn from_param(value: &str) -> Option<Self> {
        match value {
            "buy" => Some(MarketType::Buy),
            "rent" => Some(MarketType::Rent),
            "off-plan" | "offplan" => Some(MarketType::OffPlan),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PropertyCategory {
    Apartment,
    Villa,
    Penthouse,
    Townhouse,
    Duplex,
    Plot,
}

impl PropertyCategory {
    pub fn label(&self) -> &'static str {
        match self {
            PropertyCategory::Apartment => "Apartment",
            PropertyCategory::Villa => "Villa",
            PropertyCategory::Penthouse => "Penthouse",
            PropertyCategory::Townhouse => "Townhouse",
            PropertyCategory::Duplex => "Duplex",
            PropertyCategory::Plot => "Plot",
        }
    }
}

impl FromParam for PropertyCategory {
    fn from_param(value: &str) -> Option<Self> {
        match value {
            "apartment" => Some(PropertyCategory::Apartment),
            "villa" => Some(PropertyCategory::Villa),
            "penthouse" => Some(PropertyCategory::Penthouse),
            "townhouse" => Some(PropertyCategory::Townhouse),
            "duplex" => Some(PropertyCategory::Duplex),
            "plot" => Some(PropertyCategory::Plot),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Lifestyle {
    Beachfront,
    Waterfront,
    Golf,
    Urban,
    Family,
    Island,
}

impl Lifestyle {
    pub fn label(&self) -> &'static str {
        match self {
            Lifestyle::Beachfront => "Beachfront",
            Lifestyle::Waterfront => "Waterfront",
            Lifestyle::Golf => "Golf",
            Lifestyle::Urban => "Urban",
            Lifestyle::Family => "Family",
            Lifestyle::Island => "Island",
        }
    }
}

impl FromParam for Lifestyle {
    fn from_param(value: &str) -> Option<Self> {
        match value {
            "beachfront" => Some(Lifestyle::Beachfront),
            "waterfront" => Some(Lifestyle::Waterfront),
            "golf" => Some(Lifestyle::Golf),
            "urban" => Some(Lifestyle::Urban),
            "family" => Some(Lifestyle::Family),
            "island" => Some(Lifestyle::Island),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompletionStatus {
    Ready,
    UnderConstruction,
}

impl CompletionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            CompletionStatus::Ready => "Ready",
            CompletionStatus::UnderConstruction => "Under Construction",
        }
    }
}

impl FromParam for CompletionStatus {
    fn from_param(value: &str) -> Option<Self> {
        match value {
            "ready" | "completed" => Some(CompletionStatus::Ready),
            "under-construction" | "off-plan" => Some(CompletionStatus::UnderConstruction),
            _ => None,
        }
    }
}

/// CMS slug wrapper, `{"current": "palm-villa-12"}` on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Slug {
    pub current: String,
}

impl Slug {
    pub fn new(value: &str) -> Self {
        Self {
            current: value.to_string(),
        }
    }
}

/// Opaque CMS image reference. The asset may be absent while an upload is in
/// flight, which is why every consumer goes through the URL builder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageRef {
    #[serde(default)]
    pub asset: Option<AssetRef>,
    #[serde(default)]
    pub alt: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetRef {
    #[serde(rename = "_ref")]
    pub asset_ref: String,
}

/// One block of CMS rich text. Only text blocks are rendered; any other
/// `_type` (inline images, embeds) is skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    #[serde(rename = "_type")]
    pub kind: String,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub children: Vec<Span>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Span {
    #[serde(default)]
    pub text: String,
}

/// Flatten rich text to plain text, for structured data and search.
pub fn blocks_to_plain_text(blocks: &[Block]) -> String {
    let mut out = String::new();
    for block in blocks {
        if block.kind != "block" {
            continue;
        }
        let text: String = block.children.iter().map(|s| s.text.as_str()).collect();
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(text);
    }
    out
}

/// Render rich text blocks as minimal HTML (paragraphs and headings only).
pub fn blocks_to_html(blocks: &[Block]) -> String {
    let mut out = String::new();
    for block in blocks {
        if block.kind != "block" {
            continue;
        }
        let text: String = block.children.iter().map(|s| s.text.as_str()).collect();
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        let tag = match block.style.as_deref() {
            Some("h2") => "h2",
            Some("h3") => "h3",
            Some("h4") => "h4",
            Some("blockquote") => "blockquote",
            _ => "p",
        };
        out.push_str(&format!(
            "<{tag}>{}</{tag}>\n",
            html_escape::encode_text(text)
        ));
    }
    out
}

/// Lightweight dereferenced link to another document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocLink {
    pub name: String,
    #[serde(default)]
    pub slug: Slug,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// A property listing as authored in the CMS. Read-only here; the CMS is the
/// single writer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub slug: Slug,
    pub location: String,
    pub price: i64,
    pub bedrooms: u32,
    pub bathrooms: u32,
    /// Built-up area in square feet.
    pub area: u32,
    #[serde(default, deserialize_with = "lenient")]
    pub category: Option<PropertyCategory>,
    #[serde(default, deserialize_with = "lenient")]
    pub market_type: Option<MarketType>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub main_image: Option<ImageRef>,
    #[serde(default)]
    pub gallery: Vec<ImageRef>,
    #[serde(default)]
    pub description: Vec<Block>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub lifestyle: Option<Lifestyle>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub project: Option<DocLink>,
    #[serde(default)]
    pub developer: Option<DocLink>,
    #[serde(default)]
    pub neighborhood: Option<DocLink>,
    #[serde(rename = "_createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "_updatedAt", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub slug: Slug,
    pub location: String,
    #[serde(default)]
    pub developer: Option<DocLink>,
    #[serde(default)]
    pub main_image: Option<ImageRef>,
    #[serde(default)]
    pub gallery: Vec<ImageRef>,
    #[serde(default)]
    pub completion_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient")]
    pub completion_status: Option<CompletionStatus>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub description: Vec<Block>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub coordinates: Option<GeoPoint>,
    #[serde(default)]
    pub property_count: u32,
    #[serde(rename = "_updatedAt", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Developer {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub slug: Slug,
    #[serde(default)]
    pub logo: Option<ImageRef>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub blurb: Option<String>,
    #[serde(default)]
    pub project_count: u32,
    #[serde(default)]
    pub featured: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Neighborhood {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub slug: Slug,
    #[serde(default)]
    pub description: Vec<Block>,
    #[serde(default)]
    pub image: Option<ImageRef>,
    #[serde(default, deserialize_with = "lenient")]
    pub lifestyle: Option<Lifestyle>,
    #[serde(default)]
    pub price_range: Option<String>,
    #[serde(default)]
    pub property_count: u32,
    #[serde(default)]
    pub project_count: u32,
    #[serde(rename = "_updatedAt", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub slug: Slug,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub main_image: Option<ImageRef>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub body: Vec<Block>,
    #[serde(rename = "_updatedAt", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Faq {
    pub question: String,
    #[serde(default)]
    pub answer: Vec<Block>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub photo: Option<ImageRef>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Slug plus last-modified timestamp, the only fields sitemaps need.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlugEntry {
    pub slug: Slug,
    #[serde(rename = "_updatedAt", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Everything the home page shows, fetched in a single combined query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeBundle {
    #[serde(default)]
    pub featured_properties: Vec<Property>,
    #[serde(default)]
    pub featured_projects: Vec<Project>,
    #[serde(default)]
    pub featured_developers: Vec<Developer>,
    #[serde(default)]
    pub neighborhoods: Vec<Neighborhood>,
    #[serde(default)]
    pub latest_posts: Vec<BlogPost>,
}

/// A property detail page: the listing plus related listings, one query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyBundle {
    pub property: Property,
    #[serde(default)]
    pub related: Vec<Property>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectBundle {
    pub project: Project,
    #[serde(default)]
    pub properties: Vec<Property>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeighborhoodBundle {
    pub neighborhood: Neighborhood,
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default)]
    pub projects: Vec<Project>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_type_param_parsing() {
        assert_eq!(MarketType::from_param("rent"), Some(MarketType::Rent));
        assert_eq!(MarketType::from_param("off-plan"), Some(MarketType::OffPlan));
        assert_eq!(MarketType::from_param("all"), None);
        assert_eq!(MarketType::from_param("garbage"), None);
    }

    #[test]
    fn test_property_deserializes_with_unknown_enum_values() {
        let json = r#"{
            "_id": "prop-1",
            "title": "Marina Loft",
            "slug": {"current": "marina-loft"},
            "location": "Dubai Marina",
            "price": 2500000,
            "bedrooms": 2,
            "bathrooms": 2,
            "area": 1400,
            "category": "castle",
            "marketType": "buy"
        }"#;
        let property: Property = serde_json::from_str(json).unwrap();
        assert_eq!(property.category, None);
        assert_eq!(property.market_type, Some(MarketType::Buy));
        assert!(property.amenities.is_empty());
        assert!(property.main_image.is_none());
    }

    #[test]
    fn test_blocks_to_plain_text_skips_non_text_blocks() {
        let blocks = vec![
            Block {
                kind: "block".into(),
                style: Some("normal".into()),
                children: vec![
                    Span {
                        text: "Fees apply ".into(),
                    },
                    Span {
                        text: "to off-plan resales.".into(),
                    },
                ],
            },
            Block {
                kind: "image".into(),
                style: None,
                children: vec![],
            },
            Block {
                kind: "block".into(),
                style: Some("normal".into()),
                children: vec![Span {
                    text: "Ask your agent.".into(),
                }],
            },
        ];
        assert_eq!(
            blocks_to_plain_text(&blocks),
            "Fees apply to off-plan resales. Ask your agent."
        );
    }

    #[test]
    fn test_blocks_to_html_escapes_and_styles() {
        let blocks = vec![
            Block {
                kind: "block".into(),
                style: Some("h2".into()),
                children: vec![Span {
                    text: "Payment plan".into(),
                }],
            },
            Block {
                kind: "block".into(),
                style: Some("normal".into()),
                children: vec![Span {
                    text: "60/40 <post-handover>".into(),
                }],
            },
        ];
        let html = blocks_to_html(&blocks);
        assert!(html.contains("<h2>Payment plan</h2>"));
        assert!(html.contains("<p>60/40 &lt;post-handover&gt;</p>"));
    }
}
