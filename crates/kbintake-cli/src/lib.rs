use kbintake_core::format::format_file_size;
use kbintake_core::{AppError, Config, ErrorMetadata, LogLevel, UploadValidator};
use kbintake_services::intake::inspect_path;
use kbintake_services::{
    AgentCatalog, ChatService, ConnectionCheck, IntakeService, KnowledgeService,
};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing for the CLI. Logs go to stderr so stdout stays parseable.
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn config_error(err: anyhow::Error) -> AppError {
    AppError::Config(format!("{:#}", err))
}

/// Load `.env` and the process environment without backend validation.
///
/// Commands that never touch storage (validate, mask) work without any
/// bucket configured; the others call [`Config::validate`] themselves.
pub fn load_config() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();
    let vars: HashMap<String, String> = std::env::vars().collect();
    Ok(Config::from_vars(&vars).map_err(config_error)?)
}

/// One row of `kbintake validate` output.
#[derive(Debug, Serialize)]
pub struct VerdictRow {
    pub filename: String,
    pub size: String,
    pub accepted: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub reason: String,
}

/// Check a file against the upload policy from its metadata alone.
pub async fn verdict_row(validator: &UploadValidator, path: &Path) -> VerdictRow {
    match inspect_path(path).await {
        Ok(candidate) => {
            let verdict = validator.verdict(&candidate);
            VerdictRow {
                filename: candidate.filename,
                size: format_file_size(candidate.declared_size),
                accepted: verdict.accepted,
                reason: verdict.reason,
            }
        }
        Err(e) => VerdictRow {
            filename: path.display().to_string(),
            size: "-".to_string(),
            accepted: false,
            reason: e.client_message(),
        },
    }
}

/// What the user sees when a command fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub message: String,
    pub hint: Option<&'static str>,
    pub code: &'static str,
    pub exit_code: u8,
    pub log_level: LogLevel,
}

/// Describe a failed command from the first `AppError` in its chain. Anything
/// else is an unexpected failure reported with its full context.
pub fn error_report(err: &anyhow::Error) -> ErrorReport {
    match err.chain().find_map(|cause| cause.downcast_ref::<AppError>()) {
        Some(app) => ErrorReport {
            message: app.client_message(),
            hint: app.suggested_action(),
            code: app.error_code(),
            exit_code: app.exit_code(),
            log_level: app.log_level(),
        },
        None => ErrorReport {
            message: format!("{:#}", err),
            hint: None,
            code: "INTERNAL_ERROR",
            exit_code: 1,
            log_level: LogLevel::Error,
        },
    }
}

/// Log a failed command at its level, print the message and hint to stderr
/// and turn it into the process exit code.
pub fn report_error(err: &anyhow::Error) -> ExitCode {
    let report = error_report(err);
    let detail = format!("{:#}", err);

    match report.log_level {
        LogLevel::Debug => tracing::debug!(code = report.code, error = %detail, "Command failed"),
        LogLevel::Warn => tracing::warn!(code = report.code, error = %detail, "Command failed"),
        LogLevel::Error => tracing::error!(code = report.code, error = %detail, "Command failed"),
    }

    eprintln!("error: {}", report.message);
    if let Some(hint) = report.hint {
        eprintln!("hint: {}", hint);
    }

    ExitCode::from(report.exit_code)
}

pub async fn intake_service(config: &Config) -> anyhow::Result<IntakeService> {
    config.validate().map_err(config_error)?;
    let storage = kbintake_services::create_storage(&config.storage)
        .await
        .map_err(AppError::from)?;
    Ok(IntakeService::new(
        UploadValidator::new(config.upload_policy.clone()),
        storage,
        config.storage.upload_folder.clone(),
    ))
}

#[cfg(feature = "bedrock")]
async fn bedrock_client(config: &Config) -> std::sync::Arc<kbintake_services::BedrockClient> {
    let client = kbintake_services::BedrockClient::from_env(config.agent.region.as_deref()).await;
    std::sync::Arc::new(client)
}

#[cfg(feature = "bedrock")]
pub async fn chat_service(config: &Config) -> anyhow::Result<ChatService> {
    use kbintake_core::models::AgentTarget;

    let (agent_id, agent_alias_id) = config.agent.require_agent().map_err(config_error)?;
    let target = AgentTarget {
        agent_id: agent_id.to_string(),
        agent_alias_id: agent_alias_id.to_string(),
    };

    Ok(
        ChatService::new(bedrock_client(config).await, target, config.text_input_policy)
            .with_outgoing_pii_masking(config.mask_outgoing_pii),
    )
}

#[cfg(not(feature = "bedrock"))]
pub async fn chat_service(config: &Config) -> anyhow::Result<ChatService> {
    config.agent.require_agent().map_err(config_error)?;
    Err(without_bedrock("agent chat"))
}

#[cfg(feature = "bedrock")]
pub async fn knowledge_service(config: &Config) -> anyhow::Result<KnowledgeService> {
    let knowledge_base_id = config.agent.require_knowledge_base().map_err(config_error)?;
    let client = bedrock_client(config).await;

    Ok(KnowledgeService::new(
        client.clone(),
        client,
        knowledge_base_id,
        config.agent.data_source_id.clone(),
    ))
}

#[cfg(not(feature = "bedrock"))]
pub async fn knowledge_service(config: &Config) -> anyhow::Result<KnowledgeService> {
    config.agent.require_knowledge_base().map_err(config_error)?;
    Err(without_bedrock("knowledge base commands"))
}

#[cfg(feature = "bedrock")]
pub async fn agent_catalog(config: &Config) -> anyhow::Result<AgentCatalog> {
    Ok(AgentCatalog::new(bedrock_client(config).await))
}

#[cfg(not(feature = "bedrock"))]
pub async fn agent_catalog(_config: &Config) -> anyhow::Result<AgentCatalog> {
    Err(without_bedrock("agent discovery"))
}

#[cfg(not(feature = "bedrock"))]
fn without_bedrock(what: &str) -> anyhow::Error {
    AppError::Config(format!(
        "kbintake was built without the `bedrock` feature; {} is unavailable",
        what
    ))
    .into()
}

/// Everything `kbintake check` should check with the current configuration.
///
/// Storage is skipped when its settings are incomplete; agent and knowledge
/// base checks need the `bedrock` feature.
pub async fn connection_check(config: &Config) -> ConnectionCheck {
    let mut check = ConnectionCheck::new().with_region(config.agent.region.clone());

    match intake_service(config).await {
        Ok(intake) => check = check.with_storage(intake.storage().clone()),
        Err(e) => tracing::warn!(error = %format!("{:#}", e), "Storage not checked"),
    }

    #[cfg(feature = "bedrock")]
    {
        let client = bedrock_client(config).await;
        check = check.with_agents(client.clone());
        if let Some(knowledge_base_id) = config.agent.knowledge_base_id.as_deref() {
            check = check.with_knowledge(KnowledgeService::new(
                client.clone(),
                client,
                knowledge_base_id,
                config.agent.data_source_id.clone(),
            ));
        }
    }

    check
}
