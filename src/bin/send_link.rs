// src/bin/send_link.rs

use std::path::PathBuf;

use clap::Parser;

use bulkwatch::cli::LogLevel;
use bulkwatch::logging;
use bulkwatch::tunnel_link::{publish_links, LinkPaths};

/// Publish the current quick-tunnel links.
#[derive(Debug, Parser)]
#[command(
    name = "send-link",
    version,
    about = "Read tunnel URLs from cloudflared logs, write backend_url.json and e-mail the links.",
    long_about = None
)]
struct SendLinkArgs {
    /// Frontend tunnel log (default: <project-dir>/cf_frontend.log).
    frontend_log: Option<PathBuf>,

    /// Backend tunnel log (default: <project-dir>/cf_backend.log).
    backend_log: Option<PathBuf>,

    /// Directory holding email_config.env, recipients.txt and backend_url.json.
    #[arg(long, value_name = "DIR", default_value = ".")]
    project_dir: PathBuf,

    /// Don't send e-mail even if it is configured.
    #[arg(long)]
    no_email: bool,

    #[arg(long, value_enum, value_name = "LEVEL")]
    log_level: Option<LogLevel>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_main().await {
        eprintln!("send-link error: {err:?}");
        std::process::exit(1);
    }
}

async fn run_main() -> anyhow::Result<()> {
    let args = SendLinkArgs::parse();
    logging::init_logging(args.log_level)?;

    let mut paths = LinkPaths::in_project(&args.project_dir);
    if let Some(fe) = args.frontend_log {
        paths.frontend_log = fe;
    }
    if let Some(be) = args.backend_log {
        paths.backend_log = be;
    }

    let report = publish_links(&paths, !args.no_email).await?;
    println!("frontend: {}", report.frontend_url);
    if let Some(be) = &report.backend_url {
        println!("backend:  {be}");
    }
    Ok(())
}
