//! Configuration module
//!
//! Settings are read once from the environment (after loading `.env`) into
//! plain values. Components receive the policy values they need explicitly;
//! nothing reads the environment after start-up.

use std::collections::HashMap;
use std::str::FromStr;

use crate::constants::{
    DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_MAX_FILE_SIZE_BYTES, DEFAULT_MAX_INPUT_CHARS,
    DEFAULT_UPLOAD_FOLDER,
};
use crate::storage_types::StorageBackend;
use crate::validation::{TextInputPolicy, UploadPolicy};

/// Object storage settings
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO etc.)
    pub aws_region: Option<String>,
    /// Prefix under which uploads are stored, without slashes at either end.
    pub upload_folder: String,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
}

/// Managed agent and knowledge base identifiers
#[derive(Clone, Debug, Default)]
pub struct AgentConfig {
    pub region: Option<String>,
    pub agent_id: Option<String>,
    pub agent_alias_id: Option<String>,
    pub knowledge_base_id: Option<String>,
    pub data_source_id: Option<String>,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub environment: String,
    pub upload_policy: UploadPolicy,
    pub text_input_policy: TextInputPolicy,
    /// Mask PII in prompts before they leave the process.
    pub mask_outgoing_pii: bool,
    pub storage: StorageConfig,
    pub agent: AgentConfig,
}

impl Config {
    /// Build configuration from an explicit set of variables (no validation).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, anyhow::Error> {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());

        let environment = var("ENVIRONMENT")
            .or_else(|| var("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let max_size_bytes = parse_or(
            var("MAX_FILE_SIZE_BYTES"),
            "MAX_FILE_SIZE_BYTES",
            DEFAULT_MAX_FILE_SIZE_BYTES,
        )?;

        let upload_policy = match var("ALLOWED_EXTENSIONS") {
            Some(list) => UploadPolicy::new(max_size_bytes, list.split(',')),
            None => UploadPolicy::new(max_size_bytes, DEFAULT_ALLOWED_EXTENSIONS),
        };

        let text_input_policy = TextInputPolicy {
            max_chars: parse_or(
                var("MAX_INPUT_CHARS"),
                "MAX_INPUT_CHARS",
                DEFAULT_MAX_INPUT_CHARS,
            )?,
        };

        let mask_outgoing_pii =
            parse_bool_or(var("MASK_OUTGOING_PII"), "MASK_OUTGOING_PII", true)?;

        let backend = match var("STORAGE_BACKEND") {
            Some(s) => StorageBackend::from_str(&s)?,
            None => StorageBackend::S3,
        };

        let upload_folder = var("S3_FOLDER")
            .map(|s| s.trim_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_UPLOAD_FOLDER.to_string());

        let aws_region = var("AWS_REGION");

        let storage = StorageConfig {
            backend,
            s3_bucket: var("S3_BUCKET"),
            s3_region: var("S3_REGION"),
            s3_endpoint: var("S3_ENDPOINT"),
            aws_region: aws_region.clone(),
            upload_folder,
            local_storage_path: var("LOCAL_STORAGE_PATH"),
            local_storage_base_url: var("LOCAL_STORAGE_BASE_URL"),
        };

        let agent = AgentConfig {
            region: var("BEDROCK_REGION").or(aws_region),
            agent_id: var("BEDROCK_AGENT_ID"),
            agent_alias_id: var("BEDROCK_AGENT_ALIAS_ID"),
            knowledge_base_id: var("KNOWLEDGE_BASE_ID"),
            data_source_id: var("KNOWLEDGE_BASE_DATA_SOURCE_ID"),
        };

        Ok(Config {
            environment,
            upload_policy,
            text_input_policy,
            mask_outgoing_pii,
            storage,
            agent,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.upload_policy.max_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_BYTES must be greater than zero"));
        }

        if self.upload_policy.allowed_extensions.is_empty() {
            return Err(anyhow::anyhow!("ALLOWED_EXTENSIONS must list at least one extension"));
        }

        if self.text_input_policy.max_chars == 0 {
            return Err(anyhow::anyhow!("MAX_INPUT_CHARS must be greater than zero"));
        }

        match self.storage.backend {
            StorageBackend::S3 => {
                if self.storage.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.storage.s3_region.is_none() && self.storage.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.storage.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.storage.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        Ok(())
    }
}

impl AgentConfig {
    /// Agent id and alias, or an error naming the missing variable.
    pub fn require_agent(&self) -> Result<(&str, &str), anyhow::Error> {
        let agent_id = self
            .agent_id
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("BEDROCK_AGENT_ID must be set to chat with the agent"))?;
        let alias_id = self.agent_alias_id.as_deref().ok_or_else(|| {
            anyhow::anyhow!("BEDROCK_AGENT_ALIAS_ID must be set to chat with the agent")
        })?;
        Ok((agent_id, alias_id))
    }

    pub fn require_knowledge_base(&self) -> Result<&str, anyhow::Error> {
        self.knowledge_base_id.as_deref().ok_or_else(|| {
            anyhow::anyhow!("KNOWLEDGE_BASE_ID must be set for knowledge base operations")
        })
    }
}

fn parse_or<T: FromStr>(
    value: Option<String>,
    key: &str,
    default: T,
) -> Result<T, anyhow::Error> {
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a valid value, got {:?}", key, raw)),
        None => Ok(default),
    }
}

fn parse_bool_or(value: Option<String>, key: &str, default: bool) -> Result<bool, anyhow::Error> {
    let Some(raw) = value else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(anyhow::anyhow!(
            "{} must be one of true/false, 1/0, yes/no, on/off, got {:?}",
            key,
            raw
        )),
    }
}
