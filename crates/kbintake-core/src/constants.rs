//! Default policy values

/// 50 MiB.
pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 50 * 1024 * 1024;

pub const DEFAULT_ALLOWED_EXTENSIONS: [&str; 6] = ["pdf", "txt", "docx", "csv", "json", "md"];

pub const DEFAULT_MAX_INPUT_CHARS: usize = 5000;

/// Folder prefix for uploaded documents inside the bucket.
pub const DEFAULT_UPLOAD_FOLDER: &str = "uploads";

pub const DEFAULT_RETRIEVAL_RESULTS: i32 = 5;
pub const MAX_RETRIEVAL_RESULTS: i32 = 100;

/// Messages replayed to the agent as conversation context.
pub const CONVERSATION_HISTORY_WINDOW: usize = 10;
