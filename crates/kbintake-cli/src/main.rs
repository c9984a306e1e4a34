//! kbintake: validate documents, upload them to the knowledge base bucket and
//! talk to the managed agent.
//!
//! Configuration is read from the environment (and `.env`). Results are
//! printed to stdout as JSON; logs go to stderr.

use anyhow::Context;
use clap::{Parser, Subcommand};
use kbintake_cli::{
    agent_catalog, chat_service, connection_check, init_tracing, intake_service,
    knowledge_service, load_config, report_error, verdict_row,
};
use kbintake_core::format::format_file_size;
use kbintake_core::models::ChatSession;
use kbintake_core::{AppError, ContentSanitizer, ErrorMetadata, UploadValidator};
use kbintake_services::knowledge::{DEFAULT_INGESTION_POLL_INTERVAL, DEFAULT_INGESTION_TIMEOUT};
use kbintake_services::DEFAULT_CHECK_TIMEOUT;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};

#[derive(Parser)]
#[command(name = "kbintake", about = "Knowledge base document intake and chat")]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check files against the upload policy without uploading
    Validate {
        /// Files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Mask emails, SSNs and phone numbers (reads stdin when no text is given)
    Mask {
        text: Option<String>,
    },
    /// Validate and upload files
    Upload {
        /// Files to upload, in order
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Start a knowledge base ingestion job after the upload
        #[arg(long)]
        sync: bool,
        /// With --sync, wait for the ingestion job to finish
        #[arg(long, requires = "sync")]
        wait: bool,
    },
    /// List uploaded objects
    List {
        /// Key prefix (defaults to the upload folder)
        #[arg(long)]
        prefix: Option<String>,
    },
    /// Delete an uploaded object by key
    Delete {
        key: String,
    },
    /// Ask the agent a question, or start an interactive chat when none is given
    Ask {
        question: Option<String>,
        /// Reuse an existing agent session id
        #[arg(long)]
        session: Option<String>,
    },
    /// Retrieve passages from the knowledge base
    Query {
        text: String,
        /// Number of passages (1-100)
        #[arg(long)]
        max_results: Option<i32>,
    },
    /// Start a knowledge base ingestion job
    Sync {
        /// Wait for the job to finish
        #[arg(long)]
        wait: bool,
        /// Give up waiting after this many seconds
        #[arg(long, default_value_t = DEFAULT_INGESTION_TIMEOUT.as_secs())]
        timeout_secs: u64,
    },
    /// Find the agent and alias ids to chat with
    Agents {
        #[command(subcommand)]
        command: AgentsCommand,
    },
    /// Check storage, the agent directory and the knowledge base
    Check {
        /// Per-check timeout in seconds
        #[arg(long, default_value_t = DEFAULT_CHECK_TIMEOUT.as_secs())]
        timeout_secs: u64,
    },
}

#[derive(Subcommand)]
enum AgentsCommand {
    /// List the agents available to the account
    List,
    /// Show an agent's configuration and its aliases, newest first
    Show { agent_id: String },
}

/// Exit code of `check` when a checked collaborator is unreachable.
const EX_UNAVAILABLE: u8 = 69;

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match run(cli.command).await {
        Ok(code) => code,
        Err(err) => report_error(&err),
    }
}

async fn run(command: Commands) -> anyhow::Result<ExitCode> {
    let config = load_config()?;
    tracing::debug!(
        environment = %config.environment,
        storage_backend = %config.storage.backend,
        mask_outgoing_pii = config.mask_outgoing_pii,
        "Configuration loaded"
    );

    match command {
        Commands::Validate { files } => {
            let validator = UploadValidator::new(config.upload_policy.clone());
            let mut rows = Vec::with_capacity(files.len());
            for path in &files {
                rows.push(verdict_row(&validator, path).await);
            }
            print_json(&rows)?;
        }
        Commands::Mask { text } => {
            let text = match text {
                Some(text) => text,
                None => {
                    let mut buf = String::new();
                    tokio::io::stdin()
                        .read_to_string(&mut buf)
                        .await
                        .context("Failed to read stdin")?;
                    buf
                }
            };
            let sanitized = ContentSanitizer::new().sanitize(&text);
            let redactions: Vec<_> = sanitized
                .redactions()
                .iter()
                .map(|(category, count)| {
                    serde_json::json!({ "category": category.to_string(), "count": count })
                })
                .collect();
            print_json(&serde_json::json!({
                "text": sanitized.as_str(),
                "redactions": redactions,
            }))?;
        }
        Commands::Upload { files, sync, wait } => {
            let intake = intake_service(&config).await?;

            if sync {
                let knowledge = knowledge_service(&config).await?;
                let synced = intake.upload_paths_and_sync(&files, &knowledge).await?;
                let job = match (synced.ingestion, wait) {
                    (Some(job), true) => Some(
                        knowledge
                            .wait_for_ingestion(
                                &job.job_id,
                                DEFAULT_INGESTION_POLL_INTERVAL,
                                DEFAULT_INGESTION_TIMEOUT,
                            )
                            .await?,
                    ),
                    (job, _) => job,
                };
                print_json(&serde_json::json!({
                    "succeeded": synced.report.succeeded(),
                    "failed": synced.report.failed(),
                    "outcomes": synced.report.outcomes,
                    "ingestion": job,
                }))?;
            } else {
                let report = intake.upload_paths(&files).await;
                print_json(&serde_json::json!({
                    "succeeded": report.succeeded(),
                    "failed": report.failed(),
                    "outcomes": report.outcomes,
                }))?;
            }
        }
        Commands::List { prefix } => {
            let intake = intake_service(&config).await?;
            let prefix = prefix.unwrap_or_else(|| intake.folder().to_string());
            let objects = intake.storage().list(&prefix).await.map_err(AppError::from)?;
            let rows: Vec<_> = objects
                .iter()
                .map(|o| {
                    serde_json::json!({
                        "key": o.key,
                        "size": format_file_size(o.size_bytes),
                        "last_modified": o.last_modified,
                        "url": intake.storage().url_for(&o.key),
                    })
                })
                .collect();
            print_json(&rows)?;
        }
        Commands::Delete { key } => {
            let intake = intake_service(&config).await?;
            intake.storage().delete(&key).await.map_err(AppError::from)?;
            print_json(&serde_json::json!({
                "success": true,
                "message": format!("{} deleted", key),
            }))?;
        }
        Commands::Ask { question, session } => {
            let chat = chat_service(&config).await?;
            let mut session = session.map(ChatSession::with_id).unwrap_or_default();

            match question {
                Some(question) => {
                    let turn = chat.ask(&mut session, &question).await?;
                    print_json(&serde_json::json!({
                        "session_id": session.session_id,
                        "answer": turn.reply.text,
                        "citations": turn.reply.citations,
                    }))?;
                }
                None => {
                    eprintln!(
                        "Session {}. Commands: /summary, /reset, /quit",
                        session.session_id
                    );
                    let mut lines = BufReader::new(tokio::io::stdin()).lines();
                    while let Some(line) = lines.next_line().await? {
                        match line.trim() {
                            "/quit" | "/exit" => break,
                            "/summary" => println!("{}", chat.summary(&session)),
                            "/reset" => {
                                session.reset();
                                eprintln!("Session {}", session.session_id);
                            }
                            _ => match chat.ask(&mut session, &line).await {
                                Ok(turn) => println!("{}\n", turn.reply.text),
                                Err(e) if e.is_recoverable() => {
                                    tracing::debug!(error = %e, "Question not answered");
                                    eprintln!("error: {}", e.client_message());
                                }
                                Err(e) => return Err(e.into()),
                            },
                        }
                    }
                }
            }
        }
        Commands::Query { text, max_results } => {
            let knowledge = knowledge_service(&config).await?;
            let passages = knowledge.query(&text, max_results).await?;
            print_json(&passages)?;
        }
        Commands::Sync { wait, timeout_secs } => {
            let knowledge = knowledge_service(&config).await?;
            let mut job = knowledge.sync().await?;
            if wait {
                job = knowledge
                    .wait_for_ingestion(
                        &job.job_id,
                        DEFAULT_INGESTION_POLL_INTERVAL,
                        Duration::from_secs(timeout_secs),
                    )
                    .await?;
            }
            print_json(&job)?;
        }
        Commands::Agents { command } => {
            let catalog = agent_catalog(&config).await?;
            match command {
                AgentsCommand::List => print_json(&catalog.list().await?)?,
                AgentsCommand::Show { agent_id } => {
                    let profile = catalog.profile(&agent_id).await?;
                    print_json(&serde_json::json!({
                        "agent": profile.details,
                        "latest_alias": profile.latest_alias().map(|a| &a.alias_id),
                        "aliases": profile.aliases,
                    }))?;
                }
            }
        }
        Commands::Check { timeout_secs } => {
            let report = connection_check(&config)
                .await
                .run(Duration::from_secs(timeout_secs))
                .await;
            print_json(&report)?;
            if !report.is_healthy() {
                return Ok(ExitCode::from(EX_UNAVAILABLE));
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
