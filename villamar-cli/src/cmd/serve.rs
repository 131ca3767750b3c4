use std::sync::Arc;

use anyhow::Result;
use clap::{Arg, ArgMatches, Command};

use villamar_core::{CmsClient, ImageUrlBuilder};
use villamar_server::mailer::SmtpNotifier;
use villamar_server::Server;

use crate::config::VillamarConfig;

pub fn make_subcommand() -> Command {
    Command::new("serve")
        .about("Run the site server")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file")
                .default_value("./villamar.toml"),
        )
        .arg(
            Arg::new("host")
                .long("host")
                .value_name("HOST")
                .help("Host to bind to"),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Port to serve on"),
        )
        .arg(
            Arg::new("theme")
                .short('t')
                .long("theme")
                .value_name("DIR")
                .help("Theme directory holding the tera templates"),
        )
        .arg(
            Arg::new("static-dir")
                .long("static-dir")
                .value_name("DIR")
                .help("Directory served under /static"),
        )
        .arg(
            Arg::new("content")
                .long("content")
                .value_name("DIR")
                .help("Directory holding the markdown legal pages"),
        )
}

pub async fn execute(args: &ArgMatches) -> Result<()> {
    let config = VillamarConfig::load(args)?;

    let cms = CmsClient::new(&config.cms_config())?;
    let notifier = SmtpNotifier::new(&config.smtp_config())?;
    let images = ImageUrlBuilder::new(&config.cms.project_id, &config.cms.dataset);

    let server = Server::new(
        config.server_config(),
        config.site.clone(),
        images,
        Arc::new(cms),
        Arc::new(notifier),
    )?;
    server.run().await
}
