mod cache;
mod commands;
mod config;
mod errors;
mod resume;
mod routes;
mod state;
mod store;
mod terminal;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cache::DocumentResolver;
use crate::commands::{has_command, resolve_commands};
use crate::config::Config;
use crate::resume::{normalize_document, SectionId};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{publish, GitHubFetcher, PublishPlan, PublishSource, ReqwestTransport, RuntimeSource};

#[derive(Parser)]
#[command(name = "termfolio", version, about = "Resume data pipeline for the terminal portfolio")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch the resume into the publish directory, falling back to the local copy
    Fetch,
    /// Fetch and normalize the resume without writing anything, then report
    Check,
    /// Serve the resolved resume, command table and published files over HTTP
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let transport = Arc::new(ReqwestTransport::new().context("failed to build HTTP client")?);
    let fetcher = GitHubFetcher::from_config(&config, transport);

    match cli.command {
        Command::Fetch => fetch(&config, &fetcher).await,
        Command::Check => check(&config, &fetcher).await,
        Command::Serve => serve(config, fetcher).await,
    }
}

async fn fetch(config: &Config, fetcher: &GitHubFetcher) -> Result<()> {
    info!(
        "fetching resume from {}@{} ({})",
        config.repo, config.branch, config.file_path
    );

    match publish(fetcher, &PublishPlan::from_config(config)).await {
        Ok(report) => {
            let source = match report.source {
                PublishSource::Remote(tier) => tier.to_string(),
                PublishSource::LocalFallback => "local fallback".to_string(),
            };
            info!(
                "resume published to {} ({} bytes, {source})",
                report.document_path.display(),
                report.document_bytes
            );
            if let Some(artifact) = report.artifact_path {
                info!("artifact published to {}", artifact.display());
            }
            Ok(())
        }
        Err(e) => {
            error!("{e}");
            bail!("resume fetch failed");
        }
    }
}

async fn check(config: &Config, fetcher: &GitHubFetcher) -> Result<()> {
    let source = fetcher.source();
    println!("repository:  {}", source.repo);
    println!("branch:      {}", source.branch);
    println!("file:        {}", config.file_path);
    println!("token:       {}", if fetcher.has_token() { "configured" } else { "not configured" });

    let file = fetcher
        .fetch(&config.file_path)
        .await
        .context("could not fetch the resume")?;
    println!("fetched via: {} ({} bytes)", file.tier, file.bytes.len());

    let text = std::str::from_utf8(&file.bytes).context("resume is not valid UTF-8")?;
    let document = normalize_document(text).context("resume did not parse")?;

    println!();
    println!("name:        {}", document.name);
    println!("email:       {}", document.email);
    println!();
    println!("sections:");
    for section in SectionId::ALL {
        println!("  {:<28}{}", section.as_str(), document.section_len(section));
    }

    if !document.sections.experience.is_empty() {
        println!();
        println!("experience:");
        for row in &document.sections.experience {
            println!("  {} - {}", row.position, row.summary_line());
        }
    }

    let commands = resolve_commands(Some(&document));
    println!();
    println!("commands:");
    for command in &commands {
        println!("  {:<14}{}", command.cmd, command.desc);
    }
    if !has_command(&commands, "about") {
        println!();
        println!("note: name or email is missing; identity commands are hidden");
    }

    Ok(())
}

async fn serve(config: Config, fetcher: GitHubFetcher) -> Result<()> {
    info!("Starting termfolio v{}", env!("CARGO_PKG_VERSION"));

    let source = RuntimeSource::from_config(&config, fetcher);
    if config.dev_mode {
        info!("development mode: falling back to the raw endpoint when unpublished");
    }

    let state = AppState {
        config: config.clone(),
        resolver: Arc::new(DocumentResolver::new(Arc::new(source))),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
