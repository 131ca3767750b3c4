use std::{fmt, path::Path};

use serde::{Deserialize, Serialize};

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parsing(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parsing(e) => write!(f, "TOML parse error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        ConfigError::Io(value)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        ConfigError::Parsing(value)
    }
}

/// Site identity and contact details, read once at startup from
/// `villamar.toml`. Secrets (SMTP credentials, CMS token) never live here.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub contact: ContactConfig,
    #[serde(default)]
    pub social: SocialConfig,
}

impl Config {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&data)?;

        Ok(config)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct SiteConfig {
    pub name: String,
    pub tagline: Option<String>,
    /// Absolute origin used for canonical URLs and sitemaps, no trailing slash.
    pub base_url: String,
    pub currency: String,
    pub default_og_image: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "Villamar Estates".to_string(),
            tagline: Some(
                "Luxury property sales, rentals and off-plan investments in Dubai".to_string(),
            ),
            base_url: "https://www.villamar.ae".to_string(),
            currency: "AED".to_string(),
            default_og_image: None,
        }
    }
}

impl SiteConfig {
    /// Join a site-relative path onto the configured origin.
    pub fn absolute_url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ContactConfig {
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default)]
pub struct SocialConfig {
    pub instagram: Option<String>,
    pub linkedin: Option<String>,
    pub facebook: Option<String>,
    pub youtube: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavItem {
    pub text: String,
    pub link: String,
}

/// The fixed section navigation rendered in the header and footer.
pub fn default_navigation() -> Vec<NavItem> {
    let sections = [
        ("Home", "/"),
        ("Buy", "/properties?market=buy"),
        ("Rent", "/properties?market=rent"),
        ("Off-Plan", "/projects"),
        ("Developers", "/developers"),
        ("Neighborhoods", "/neighborhoods"),
        ("Blog", "/blog"),
        ("About", "/about"),
        ("Contact", "/contact"),
    ];
    sections
        .into_iter()
        .map(|(text, link)| NavItem {
            text: text.to_string(),
            link: link.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.site.name, "Villamar Estates");
        assert_eq!(config.site.currency, "AED");
        assert!(config.contact.phone.is_none());
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [site]
            name = "Villamar"
            base_url = "https://staging.villamar.ae/"

            [contact]
            email = "hello@villamar.ae"
            "#,
        )
        .unwrap();
        assert_eq!(config.site.name, "Villamar");
        // Currency falls back to the default when the table omits it.
        assert_eq!(config.site.currency, "AED");
        assert_eq!(config.contact.email.as_deref(), Some("hello@villamar.ae"));
    }

    #[test]
    fn test_absolute_url_normalizes_slashes() {
        let site = SiteConfig {
            base_url: "https://www.villamar.ae/".to_string(),
            ..Default::default()
        };
        assert_eq!(
            site.absolute_url("/properties"),
            "https://www.villamar.ae/properties"
        );
        assert_eq!(
            site.absolute_url("sitemap.xml"),
            "https://www.villamar.ae/sitemap.xml"
        );
    }
}
