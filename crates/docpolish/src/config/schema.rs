use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub executor: ExecutorConfig,
    #[serde(default)]
    pub ingestion: IngestionConfig,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            llm: LlmConfig::default(),
            executor: ExecutorConfig::default(),
            ingestion: IngestionConfig::default(),
        }
    }
}

/// Connection and sampling settings for the LLM service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of the Ollama-compatible service.
    #[serde(default = "default_service_url")]
    pub service_url: String,
    /// Model used for generation and pulled by auto-load.
    #[serde(default = "default_model_name")]
    pub model_name: String,
    /// Upper bound on generated tokens (`num_predict`).
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    /// Generation timeout in seconds. Every job reaches a terminal state
    /// within this bound once its backend call starts.
    #[serde(default = "default_generate_timeout")]
    pub timeout_secs: u64,
    /// Timeout for listing models.
    #[serde(default = "default_list_timeout")]
    pub list_timeout_secs: u64,
    /// Timeout for pulling a model.
    #[serde(default = "default_pull_timeout")]
    pub pull_timeout_secs: u64,
}

fn default_service_url() -> String {
    "http://documentation-improver-llm-service:11434".to_string()
}

fn default_model_name() -> String {
    "codellama:7b".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_temperature() -> f32 {
    0.1
}

fn default_top_p() -> f32 {
    0.9
}

fn default_generate_timeout() -> u64 {
    300
}

fn default_list_timeout() -> u64 {
    10
}

fn default_pull_timeout() -> u64 {
    300
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            service_url: default_service_url(),
            model_name: default_model_name(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            timeout_secs: default_generate_timeout(),
            list_timeout_secs: default_list_timeout(),
            pull_timeout_secs: default_pull_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Cap on jobs running their backend call at once. Unset means unbounded.
    #[serde(default)]
    pub max_concurrent_jobs: Option<usize>,
    /// Capacity of the job event channel.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
    /// Prompts longer than this fail before reaching the backend.
    #[serde(default = "default_max_prompt_chars")]
    pub max_prompt_chars: usize,
}

fn default_event_capacity() -> usize {
    100
}

fn default_max_prompt_chars() -> usize {
    200_000
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: None,
            event_capacity: default_event_capacity(),
            max_prompt_chars: default_max_prompt_chars(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// Lowercase extensions accepted for upload.
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    #[serde(default = "default_fetch_timeout")]
    pub url_fetch_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_allowed_extensions() -> Vec<String> {
    ["txt", "md", "rst", "docx", "pdf"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_max_upload_bytes() -> usize {
    16 * 1024 * 1024
}

fn default_fetch_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/91.0.4472.124 Safari/537.36"
        .to_string()
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: default_allowed_extensions(),
            max_upload_bytes: default_max_upload_bytes(),
            url_fetch_timeout_secs: default_fetch_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl IngestionConfig {
    /// Case-insensitive check against the allow-list.
    pub fn is_allowed(&self, extension: &str) -> bool {
        let extension = extension.to_lowercase();
        self.allowed_extensions.iter().any(|e| *e == extension)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Text,
    Markdown,
    Rst,
    Docx,
    Pdf,
}

impl DocumentFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "txt" | "text" => Some(DocumentFormat::Text),
            "md" | "markdown" => Some(DocumentFormat::Markdown),
            "rst" => Some(DocumentFormat::Rst),
            "docx" => Some(DocumentFormat::Docx),
            "pdf" => Some(DocumentFormat::Pdf),
            _ => None,
        }
    }

    /// Plain-text formats are decoded as UTF-8 without further parsing.
    pub fn is_plain_text(self) -> bool {
        matches!(
            self,
            DocumentFormat::Text | DocumentFormat::Markdown | DocumentFormat::Rst
        )
    }
}
