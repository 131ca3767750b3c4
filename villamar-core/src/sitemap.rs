use chrono::NaiveDate;

const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
const URLSET_OPEN: &str = r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeFreq {
    Always,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl ChangeFreq {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeFreq::Always => "always",
            ChangeFreq::Hourly => "hourly",
            ChangeFreq::Daily => "daily",
            ChangeFreq::Weekly => "weekly",
            ChangeFreq::Monthly => "monthly",
            ChangeFreq::Yearly => "yearly",
            ChangeFreq::Never => "never",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SitemapEntry {
    pub loc: String,
    pub lastmod: Option<NaiveDate>,
    pub changefreq: ChangeFreq,
    pub priority: f32,
}

/// Render a `<urlset>` sitemap document. An empty entry list still yields a
/// well-formed document, which is what CMS-failure responses serve.
pub fn render_urlset(entries: &[SitemapEntry]) -> String {
    let mut xml = String::with_capacity(256 + entries.len() * 160);
    xml.push_str(XML_HEADER);
    xml.push('\n');
    xml.push_str(URLSET_OPEN);
    xml.push('\n');
    for entry in entries {
        xml.push_str("  <url>\n");
        xml.push_str(&format!(
            "    <loc>{}</loc>\n",
            html_escape::encode_text(&entry.loc)
        ));
        if let Some(lastmod) = entry.lastmod {
            xml.push_str(&format!(
                "    <lastmod>{}</lastmod>\n",
                lastmod.format("%Y-%m-%d")
            ));
        }
        xml.push_str(&format!(
            "    <changefreq>{}</changefreq>\n",
            entry.changefreq.as_str()
        ));
        xml.push_str(&format!("    <priority>{:.1}</priority>\n", entry.priority));
        xml.push_str("  </url>\n");
    }
    xml.push_str("</urlset>\n");
    xml
}

/// The zero-URL document served when the CMS cannot be queried.
pub fn empty_urlset() -> String {
    render_urlset(&[])
}

/// Render a `<sitemapindex>` document pointing at the per-type sitemaps.
pub fn render_index(locs: &[String]) -> String {
    let mut xml = String::with_capacity(256 + locs.len() * 96);
    xml.push_str(XML_HEADER);
    xml.push('\n');
    xml.push_str(r#"<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#);
    xml.push('\n');
    for loc in locs {
        xml.push_str("  <sitemap>\n");
        xml.push_str(&format!(
            "    <loc>{}</loc>\n",
            html_escape::encode_text(loc)
        ));
        xml.push_str("  </sitemap>\n");
    }
    xml.push_str("</sitemapindex>\n");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_urlset_is_well_formed() {
        let xml = empty_urlset();
        assert!(xml.starts_with(XML_HEADER));
        assert!(xml.contains("<urlset"));
        assert!(xml.trim_end().ends_with("</urlset>"));
        assert!(!xml.contains("<url>"));
    }

    #[test]
    fn test_urlset_renders_entries_with_metadata() {
        let entries = vec![
            SitemapEntry {
                loc: "https://www.villamar.ae/properties/palm-villa".to_string(),
                lastmod: NaiveDate::from_ymd_opt(2026, 3, 4),
                changefreq: ChangeFreq::Daily,
                priority: 0.9,
            },
            SitemapEntry {
                loc: "https://www.villamar.ae/blog/market-report".to_string(),
                lastmod: None,
                changefreq: ChangeFreq::Weekly,
                priority: 0.7,
            },
        ];
        let xml = render_urlset(&entries);
        assert_eq!(xml.matches("<url>").count(), 2);
        assert!(xml.contains("<loc>https://www.villamar.ae/properties/palm-villa</loc>"));
        assert!(xml.contains("<lastmod>2026-03-04</lastmod>"));
        assert!(xml.contains("<changefreq>daily</changefreq>"));
        assert!(xml.contains("<priority>0.9</priority>"));
        // The entry without a lastmod must not emit an empty tag.
        assert_eq!(xml.matches("<lastmod>").count(), 1);
    }

    #[test]
    fn test_urls_are_entity_escaped() {
        let entries = vec![SitemapEntry {
            loc: "https://www.villamar.ae/properties?market=rent&category=villa".to_string(),
            lastmod: None,
            changefreq: ChangeFreq::Daily,
            priority: 0.5,
        }];
        let xml = render_urlset(&entries);
        assert!(xml.contains("market=rent&amp;category=villa"));
        assert!(!xml.contains("rent&category"));
    }

    #[test]
    fn test_sitemap_index() {
        let xml = render_index(&[
            "https://www.villamar.ae/sitemaps/properties.xml".to_string(),
            "https://www.villamar.ae/sitemaps/blog.xml".to_string(),
        ]);
        assert!(xml.contains("<sitemapindex"));
        assert_eq!(xml.matches("<sitemap>").count(), 2);
        assert!(xml.trim_end().ends_with("</sitemapindex>"));
    }
}
