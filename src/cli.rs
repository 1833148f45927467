//! Command-line interface
//!
//! Local harness for exercising the connector outside the host:
//!
//! - `run` - process one lifecycle event from a JSON file or stdin
//! - `check` - test the connection by listing organization members
//! - `boards` - list the organization's boards

use crate::auth::Credentials;
use crate::config::{Config, API_BASE_ENV, DEFAULT_API_BASE};
use crate::error::{Error, Result};
use crate::http::{ApiClient, ApiClientConfig};
use crate::repo::{JsonlRepository, Repository};
use crate::worker::{ExtractionEvent, ExtractionWorker};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

/// Trello connector CLI
#[derive(Parser, Debug)]
#[command(name = "trello-connector")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// API base URL; falls back to $TRELLO_API_BASE, then production
    #[arg(long, global = true)]
    pub api_base: Option<String>,

    /// Directory for extracted records and attachment binaries
    #[arg(short, long, global = true, default_value = "output")]
    pub output: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Process one extraction lifecycle event
    Run {
        /// Event file (JSON); "-" reads stdin
        #[arg(short, long, default_value = "-")]
        event: String,
    },

    /// Test the connection by listing organization members
    Check {
        /// Connection string: key=<apiKey>&token=<token>
        #[arg(long)]
        connection: String,

        /// Organization id
        #[arg(long)]
        org_id: String,
    },

    /// List the organization's boards
    Boards {
        /// Connection string: key=<apiKey>&token=<token>
        #[arg(long)]
        connection: String,

        /// Organization id
        #[arg(long)]
        org_id: String,
    },
}

/// Executes a parsed CLI invocation
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Run { event } => self.run_event(event).await,
            Commands::Check { connection, org_id } => self.check(connection, org_id).await,
            Commands::Boards { connection, org_id } => self.boards(connection, org_id).await,
        }
    }

    fn config(&self) -> Config {
        let api_base = self
            .cli
            .api_base
            .clone()
            .or_else(|| std::env::var(API_BASE_ENV).ok())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        Config::new(api_base)
    }

    /// Process one lifecycle event and print the outbound event plus the
    /// updated state as JSON lines
    async fn run_event(&self, source: &str) -> Result<()> {
        let raw = if source == "-" {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        } else {
            std::fs::read_to_string(source)?
        };
        let mut event: ExtractionEvent = serde_json::from_str(&raw)?;

        let repo = JsonlRepository::new(&self.cli.output)?;
        let worker = ExtractionWorker::new(self.config(), Arc::new(repo) as Arc<dyn Repository>);

        let outcome = worker.handle_event(&mut event).await;

        println!("{}", serde_json::to_string(&outcome)?);
        println!("{}", serde_json::to_string(&event.state)?);

        if outcome.is_error() {
            return Err(Error::Other("extraction phase reported an error".into()));
        }
        Ok(())
    }

    async fn check(&self, connection: &str, org_id: &str) -> Result<()> {
        let api = self.api(connection)?;
        let response = api.members(org_id).await;
        match response.data {
            Some(members) => {
                println!("OK: {} members visible in {org_id}", members.len());
                Ok(())
            }
            None => Err(Error::Other(format!(
                "check failed ({}): {}",
                response.status_code, response.message
            ))),
        }
    }

    async fn boards(&self, connection: &str, org_id: &str) -> Result<()> {
        let api = self.api(connection)?;
        let response = api.boards(org_id).await;
        let Some(boards) = response.data else {
            return Err(Error::Other(format!(
                "board listing failed ({}): {}",
                response.status_code, response.message
            )));
        };
        for board in boards {
            println!(
                "{}\t{}{}",
                board.id.unwrap_or_default(),
                board.name.unwrap_or_default(),
                if board.closed.unwrap_or(false) {
                    " (closed)"
                } else {
                    ""
                }
            );
        }
        Ok(())
    }

    fn api(&self, connection: &str) -> Result<crate::api::TrelloApi> {
        let credentials = Credentials::parse(connection)?;
        let config = ApiClientConfig::new(self.config().api_base);
        Ok(crate::api::TrelloApi::new(ApiClient::new(
            config,
            credentials,
        )))
    }
}
