use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use tracing::warn;

use villamar_core::CmsClient;

use crate::config::VillamarConfig;

pub fn make_subcommand() -> Command {
    Command::new("check")
        .about("Validate configuration and CMS connectivity")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file")
                .default_value("./villamar.toml"),
        )
}

pub async fn execute(args: &ArgMatches) -> Result<()> {
    let config = VillamarConfig::load(args)?;

    println!(
        "Site: {} ({})",
        config.site.site.name, config.site.site.base_url
    );
    println!(
        "Server: {}:{} (theme {}, content {})",
        config.server.host, config.server.port, config.server.theme, config.server.content
    );
    println!("SMTP relay: {}:{}", config.smtp.host, config.smtp.port);
    if config.smtp.password.is_empty() {
        warn!("SMTP password is empty; form submissions will fail to send");
    }

    let cms = CmsClient::new(&config.cms_config())?;
    let counts = cms.ping().await?;
    println!(
        "CMS ok: {} properties, {} projects, {} developers, {} neighborhoods, {} posts",
        counts.properties, counts.projects, counts.developers, counts.neighborhoods, counts.posts
    );

    Ok(())
}
