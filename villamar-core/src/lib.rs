pub mod cms;
pub mod config;
pub mod content;
pub mod filter;
pub mod format;
pub mod image;
pub mod markdown;
pub mod scanner;
pub mod seo;
pub mod sitemap;
pub mod template;

// Re-export main types
pub use cms::{CmsClient, CmsConfig, CmsError, ContentSource, DocKind};
pub use content::{
    BlogPost, Developer, Faq, HomeBundle, Neighborhood, Project, Property, TeamMember,
};
pub use filter::{ProjectFilter, PropertyFilter};
pub use image::{ImageUrlBuilder, PLACEHOLDER_IMAGE};
pub use scanner::{LegalPage, PageScanner};
pub use seo::PageMeta;
pub use template::{TemplateError, TemplateRenderer};
