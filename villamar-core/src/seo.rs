use serde::Serialize;
use serde_json::{json, Value};

use crate::config::{Config, SiteConfig};
use crate::content::{blocks_to_plain_text, BlogPost, Faq, Property};

/// Per-page head metadata consumed by the base template.
#[derive(Debug, Clone, Serialize)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    pub canonical: String,
    pub og_image: Option<String>,
}

impl PageMeta {
    pub fn new(site: &SiteConfig, title: &str, description: &str, path: &str) -> Self {
        Self {
            title: format!("{} | {}", title, site.name),
            description: description.to_string(),
            canonical: site.absolute_url(path),
            og_image: site.default_og_image.clone(),
        }
    }

    pub fn with_image(mut self, image_url: &str) -> Self {
        self.og_image = Some(image_url.to_string());
        self
    }
}

/// schema.org RealEstateAgent document for the home page.
pub fn organization(config: &Config) -> Value {
    let mut same_as: Vec<&String> = Vec::new();
    for link in [
        &config.social.instagram,
        &config.social.linkedin,
        &config.social.facebook,
        &config.social.youtube,
    ]
    .into_iter()
    .flatten()
    {
        same_as.push(link);
    }

    let mut doc = json!({
        "@context": "https://schema.org",
        "@type": "RealEstateAgent",
        "name": config.site.name,
        "url": config.site.base_url,
    });
    if let Some(phone) = &config.contact.phone {
        doc["telephone"] = json!(phone);
    }
    if let Some(email) = &config.contact.email {
        doc["email"] = json!(email);
    }
    if let Some(address) = &config.contact.address {
        doc["address"] = json!(address);
    }
    if !same_as.is_empty() {
        doc["sameAs"] = json!(same_as);
    }
    doc
}

pub fn website(site: &SiteConfig) -> Value {
    json!({
        "@context": "https://schema.org",
        "@type": "WebSite",
        "name": site.name,
        "url": site.base_url,
    })
}

/// schema.org listing document for a property detail page.
pub fn property_listing(site: &SiteConfig, property: &Property, image_url: &str) -> Value {
    let url = site.absolute_url(&format!("/properties/{}", property.slug.current));
    let description = property
        .excerpt
        .clone()
        .unwrap_or_else(|| blocks_to_plain_text(&property.description));
    json!({
        "@context": "https://schema.org",
        "@type": "RealEstateListing",
        "name": property.title,
        "url": url,
        "image": image_url,
        "description": description,
        "offers": {
            "@type": "Offer",
            "price": property.price,
            "priceCurrency": site.currency,
            "availability": "https://schema.org/InStock",
        },
    })
}

/// schema.org Article document for a blog post.
pub fn article(site: &SiteConfig, post: &BlogPost, image_url: &str) -> Value {
    let url = site.absolute_url(&format!("/blog/{}", post.slug.current));
    let mut doc = json!({
        "@context": "https://schema.org",
        "@type": "Article",
        "headline": post.title,
        "url": url,
        "image": image_url,
        "publisher": {
            "@type": "Organization",
            "name": site.name,
        },
    });
    if let Some(excerpt) = &post.excerpt {
        doc["description"] = json!(excerpt);
    }
    if let Some(published) = &post.published_at {
        doc["datePublished"] = json!(published.to_rfc3339());
    }
    if let Some(updated) = &post.updated_at {
        doc["dateModified"] = json!(updated.to_rfc3339());
    }
    doc
}

/// schema.org FAQPage document; rich-text answers are flattened to plain text.
pub fn faq_page(faqs: &[Faq]) -> Value {
    let entities: Vec<Value> = faqs
        .iter()
        .map(|faq| {
            json!({
                "@type": "Question",
                "name": faq.question,
                "acceptedAnswer": {
                    "@type": "Answer",
                    "text": blocks_to_plain_text(&faq.answer),
                },
            })
        })
        .collect();
    json!({
        "@context": "https://schema.org",
        "@type": "FAQPage",
        "mainEntity": entities,
    })
}

/// schema.org BreadcrumbList from `(name, path)` pairs, in order.
pub fn breadcrumbs(site: &SiteConfig, trail: &[(&str, &str)]) -> Value {
    let items: Vec<Value> = trail
        .iter()
        .enumerate()
        .map(|(i, (name, path))| {
            json!({
                "@type": "ListItem",
                "position": i + 1,
                "name": name,
                "item": site.absolute_url(path),
            })
        })
        .collect();
    json!({
        "@context": "https://schema.org",
        "@type": "BreadcrumbList",
        "itemListElement": items,
    })
}
