mod client;
mod enrich;
mod error;
mod export;
mod fetcher;
mod models;
mod oauth;
mod progress;
mod settings;
#[cfg(test)]
mod testing;
mod transport;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::client::FamilySearchClient;
use crate::progress::BarSink;
use crate::settings::Settings;
use crate::transport::HttpTransport;

#[derive(Parser)]
#[command(
    name = "ancestry_export",
    about = "Export a FamilySearch ancestry tree to a spreadsheet"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct TokenArgs {
    /// OAuth2 access token
    #[arg(long, env = "FS_ACCESS_TOKEN", hide_env_values = true)]
    token: Option<String>,
    /// Authorization code to exchange for a token
    #[arg(long, conflicts_with = "token")]
    code: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the OAuth2 authorization URL
    Authorize,
    /// Exchange an authorization code for an access token
    Token {
        #[arg(long)]
        code: String,
    },
    /// Print the signed-in user's person id
    Whoami {
        #[command(flatten)]
        auth: TokenArgs,
    },
    /// Fetch the ancestry tree and write the spreadsheet
    Export {
        #[command(flatten)]
        auth: TokenArgs,
        /// Generations to fetch (default from config: 8)
        #[arg(short, long)]
        generations: Option<u32>,
        /// Persons enriched at once, 0 for no limit
        #[arg(short, long)]
        concurrency: Option<usize>,
        /// Output file
        #[arg(short, long, default_value = export::DEFAULT_FILE_NAME)]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = Settings::load()?;

    let result = match cli.command {
        Commands::Authorize => {
            println!("{}", oauth::authorize_url(&settings)?);
            Ok(())
        }
        Commands::Token { code } => {
            println!("{}", oauth::exchange_code(&settings, &code).await?);
            Ok(())
        }
        Commands::Whoami { auth } => {
            let token = access_token(&settings, auth).await?;
            let transport = HttpTransport::new(
                &settings.api_base,
                &token,
                Duration::from_secs(settings.request_timeout_secs),
            )?;
            let id = FamilySearchClient::new(transport)
                .resolve_current_person_id()
                .await?;
            println!("{}", id);
            Ok(())
        }
        Commands::Export {
            auth,
            generations,
            concurrency,
            output,
        } => {
            if let Some(g) = generations {
                settings.max_generations = g;
            }
            if let Some(c) = concurrency {
                settings.concurrency = c;
            }
            settings.validate()?;

            let token = access_token(&settings, auth).await?;
            let bar = Arc::new(BarSink::new()?);
            println!(
                "Fetching up to {} generations ({} at a time)...",
                settings.max_generations,
                if settings.concurrency == 0 {
                    "all".to_string()
                } else {
                    settings.concurrency.to_string()
                }
            );

            let fetched =
                fetcher::fetch_tree_data_with_token(&settings, &token, Some(bar.clone())).await;
            bar.finish();
            let data = fetched?;

            export::write_workbook(&data.records, &output)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!(
                "Exported {} rows for {} people to {}",
                data.records.len(),
                data.total_people,
                output.display()
            );
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

/// Token from `--token`/`FS_ACCESS_TOKEN`, or exchanged from `--code`.
async fn access_token(settings: &Settings, auth: TokenArgs) -> Result<String> {
    match (auth.token, auth.code) {
        (Some(token), _) => Ok(token),
        (None, Some(code)) => oauth::exchange_code(settings, &code)
            .await
            .context("Failed to exchange authorization code"),
        (None, None) => anyhow::bail!(
            "No access token: pass --token, set FS_ACCESS_TOKEN, or pass --code"
        ),
    }
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
