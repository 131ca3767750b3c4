use anyhow::Result;
use clap::ArgMatches;
use config::{Config as ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use villamar_core::CmsConfig;
use villamar_server::mailer::SmtpConfig;
use villamar_server::ServerConfig;

/// Complete runtime configuration, merged from defaults, the config file,
/// `VILLAMAR_*` environment variables and CLI arguments.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VillamarConfig {
    pub server: ServerSettings,
    pub smtp: SmtpSettings,
    pub cms: CmsSettings,
    /// Site identity (from villamar-core), flattened into the same file.
    #[serde(flatten)]
    pub site: villamar_core::config::Config,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub theme: String,
    pub static_dir: String,
    pub content: String,
    pub config: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            theme: "./theme".to_string(),
            static_dir: "./static".to_string(),
            content: "./content/legal".to_string(),
            config: "./villamar.toml".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
    pub to: String,
}

impl Default for SmtpSettings {
    fn default() -> Self {
        let defaults = SmtpConfig::default();
        Self {
            host: defaults.host,
            port: defaults.port,
            username: defaults.username,
            password: defaults.password,
            from: defaults.from,
            to: defaults.to,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CmsSettings {
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
    pub use_cdn: bool,
    /// Empty means the public (unauthenticated) query endpoint.
    pub token: String,
}

impl Default for CmsSettings {
    fn default() -> Self {
        let defaults = CmsConfig::default();
        Self {
            project_id: defaults.project_id,
            dataset: defaults.dataset,
            api_version: defaults.api_version,
            use_cdn: defaults.use_cdn,
            token: String::new(),
        }
    }
}

impl Default for VillamarConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            smtp: SmtpSettings::default(),
            cms: CmsSettings::default(),
            site: villamar_core::config::Config::default(),
        }
    }
}

impl VillamarConfig {
    /// Load configuration with cascading precedence:
    /// 1. CLI arguments (highest priority)
    /// 2. Environment variables (VILLAMAR_*)
    /// 3. Configuration file
    /// 4. Defaults (lowest priority)
    pub fn load(args: &ArgMatches) -> Result<Self> {
        let config_file = args
            .get_one::<String>("config")
            .cloned()
            .unwrap_or_else(|| "./villamar.toml".to_string());

        let mut builder = ConfigBuilder::builder();

        // 1. Start with defaults
        let defaults = Self::default();
        builder = builder.add_source(config::Config::try_from(&defaults)?);

        // 2. Add configuration file if it exists
        if Path::new(&config_file).exists() {
            builder = builder.add_source(File::with_name(&config_file.replace(".toml", "")));
        }

        // 3. Add environment variables with VILLAMAR_ prefix
        builder = builder.add_source(
            Environment::with_prefix("VILLAMAR")
                .prefix_separator("_")
                .separator("__"), // Use double underscore for nested keys
        );

        // 4. Override with CLI arguments (highest priority)
        let mut cli_overrides = std::collections::HashMap::new();
        if let Some(host) = args.try_get_one::<String>("host").unwrap_or(None) {
            cli_overrides.insert("server.host".to_string(), host.clone());
        }
        if let Some(port) = args.try_get_one::<String>("port").unwrap_or(None) {
            if let Ok(port_num) = port.parse::<u16>() {
                cli_overrides.insert("server.port".to_string(), port_num.to_string());
            }
        }
        if let Some(theme) = args.try_get_one::<String>("theme").unwrap_or(None) {
            cli_overrides.insert("server.theme".to_string(), theme.clone());
        }
        if let Some(static_dir) = args.try_get_one::<String>("static-dir").unwrap_or(None) {
            cli_overrides.insert("server.static_dir".to_string(), static_dir.clone());
        }
        if let Some(content) = args.try_get_one::<String>("content").unwrap_or(None) {
            cli_overrides.insert("server.content".to_string(), content.clone());
        }

        if !cli_overrides.is_empty() {
            builder = builder.add_source(config::Config::try_from(&cli_overrides)?);
        }

        // Build and deserialize
        let merged = builder.build()?;
        let villamar_config: VillamarConfig = merged.try_deserialize()?;

        Ok(villamar_config)
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.server.host.clone(),
            port: self.server.port,
            theme_dir: PathBuf::from(&self.server.theme),
            static_dir: PathBuf::from(&self.server.static_dir),
            content_dir: PathBuf::from(&self.server.content),
        }
    }

    pub fn smtp_config(&self) -> SmtpConfig {
        SmtpConfig {
            host: self.smtp.host.clone(),
            port: self.smtp.port,
            username: self.smtp.username.clone(),
            password: self.smtp.password.clone(),
            from: self.smtp.from.clone(),
            to: self.smtp.to.clone(),
        }
    }

    pub fn cms_config(&self) -> CmsConfig {
        CmsConfig {
            project_id: self.cms.project_id.clone(),
            dataset: self.cms.dataset.clone(),
            api_version: self.cms.api_version.clone(),
            use_cdn: self.cms.use_cdn,
            token: if self.cms.token.is_empty() {
                None
            } else {
                Some(self.cms.token.clone())
            },
        }
    }
}
