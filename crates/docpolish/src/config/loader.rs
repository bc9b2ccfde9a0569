use std::path::{Path, PathBuf};

use crate::config::schema::{Config, DocumentFormat};
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../../../schema/config-v1.json");

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "DOCPOLISH_CONFIG";

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: Config = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

/// Platform config location, e.g. `~/.config/docpolish/config.json`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("docpolish").join("config.json"))
}

/// Resolves the configuration the service runs with.
///
/// Precedence: the explicit path, then `DOCPOLISH_CONFIG`, then the platform
/// default location if it exists, then built-in defaults. Environment
/// overrides are applied last.
pub fn load_effective_config(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    let path = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
        .or_else(|| default_config_path().filter(|p| p.exists()));

    let mut config = match path {
        Some(path) => {
            log::info!("Loading configuration from {}", path.display());
            load_config(&path)?
        }
        None => {
            log::info!("No configuration file found, using defaults");
            Config::default()
        }
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    validate_config(&config)?;

    Ok(config)
}

/// Overlays the deployment environment variables onto `config`.
///
/// `lookup` returns the value of a variable, if set. Blank values are
/// ignored.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(url) = get("LLM_SERVICE_URL") {
        config.llm.service_url = url.trim().trim_end_matches('/').to_string();
    }
    if let Some(model) = get("MODEL_NAME") {
        config.llm.model_name = model.trim().to_string();
    }
    if let Some(value) = get("MAX_TOKENS") {
        config.llm.max_tokens = parse_env("MAX_TOKENS", &value)?;
    }
    if let Some(value) = get("LLM_TIMEOUT_SECS") {
        config.llm.timeout_secs = parse_env("LLM_TIMEOUT_SECS", &value)?;
    }
    if let Some(value) = get("MAX_CONCURRENT_JOBS") {
        let n: usize = parse_env("MAX_CONCURRENT_JOBS", &value)?;
        config.executor.max_concurrent_jobs = if n == 0 { None } else { Some(n) };
    }

    Ok(())
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        name: name.to_string(),
        value: value.to_string(),
    })
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    if !config.llm.service_url.starts_with("http://")
        && !config.llm.service_url.starts_with("https://")
    {
        return Err(ConfigError::Validation {
            message: format!(
                "LLM service URL must start with http:// or https://, got '{}'",
                config.llm.service_url
            ),
        });
    }

    if config.llm.model_name.is_empty() {
        return Err(ConfigError::Validation {
            message: "Model name must not be empty".to_string(),
        });
    }

    if config.llm.max_tokens == 0 || config.llm.timeout_secs == 0 {
        return Err(ConfigError::Validation {
            message: "max_tokens and timeout_secs must be positive".to_string(),
        });
    }

    for ext in &config.ingestion.allowed_extensions {
        if DocumentFormat::from_extension(ext).is_none() {
            return Err(ConfigError::Validation {
                message: format!("No extractor available for extension '{}'", ext),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use serial_test::serial;
    use tempfile::NamedTempFile;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_load_minimal_config() {
        let config = load_config_from_str(r#"{ "version": "1.0" }"#).unwrap();
        assert_eq!(config.llm.model_name, "codellama:7b");
        assert_eq!(config.ingestion.allowed_extensions.len(), 5);
    }

    #[test]
    fn test_load_full_config() {
        let config_json = r#"
        {
            "version": "1.0",
            "llm": {
                "service_url": "http://localhost:11434",
                "model_name": "llama3:8b",
                "max_tokens": 2048,
                "temperature": 0.2,
                "top_p": 0.95,
                "timeout_secs": 60
            },
            "executor": {
                "max_concurrent_jobs": 4,
                "event_capacity": 256
            },
            "ingestion": {
                "allowed_extensions": ["md", "txt"],
                "max_upload_bytes": 1048576
            }
        }
        "#;

        let config = load_config_from_str(config_json).unwrap();
        assert_eq!(config.llm.service_url, "http://localhost:11434");
        assert_eq!(config.llm.model_name, "llama3:8b");
        assert_eq!(config.llm.max_tokens, 2048);
        assert_eq!(config.llm.timeout_secs, 60);
        assert_eq!(config.llm.pull_timeout_secs, 300);
        assert_eq!(config.executor.max_concurrent_jobs, Some(4));
        assert_eq!(config.executor.event_capacity, 256);
        assert_eq!(config.ingestion.allowed_extensions, vec!["md", "txt"]);
        assert_eq!(config.ingestion.max_upload_bytes, 1048576);
    }

    #[test]
    fn test_invalid_version() {
        let result = load_config_from_str(r#"{ "version": "2.0" }"#);
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_unknown_field_rejected_by_schema() {
        let result = load_config_from_str(r#"{ "version": "1.0", "workers": 4 }"#);
        assert!(matches!(result, Err(ConfigError::SchemaValidation { .. })));
    }

    #[test]
    fn test_zero_timeout_rejected_by_schema() {
        let result = load_config_from_str(r#"{ "version": "1.0", "llm": { "timeout_secs": 0 } }"#);
        assert!(matches!(result, Err(ConfigError::SchemaValidation { .. })));
    }

    #[test]
    fn test_unsupported_extension_rejected() {
        let result = load_config_from_str(
            r#"{ "version": "1.0", "ingestion": { "allowed_extensions": ["exe"] } }"#,
        );
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_malformed_json() {
        let result = load_config_from_str("{ version: ");
        assert!(matches!(result, Err(ConfigError::ParseJson(_))));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        writeln!(file, r#"{{ "version": "1.0", "llm": {{ "model_name": "mistral" }} }}"#).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.llm.model_name, "mistral");
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("/nonexistent/docpolish.json");
        assert!(matches!(result, Err(ConfigError::ReadFile { .. })));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("LLM_SERVICE_URL", "http://ollama:11434/"),
                ("MODEL_NAME", "llama3"),
                ("MAX_TOKENS", "1024"),
                ("LLM_TIMEOUT_SECS", "5"),
                ("MAX_CONCURRENT_JOBS", "2"),
            ]),
        )
        .unwrap();

        assert_eq!(config.llm.service_url, "http://ollama:11434");
        assert_eq!(config.llm.model_name, "llama3");
        assert_eq!(config.llm.max_tokens, 1024);
        assert_eq!(config.llm.timeout_secs, 5);
        assert_eq!(config.executor.max_concurrent_jobs, Some(2));
    }

    #[test]
    fn test_env_zero_concurrency_means_unbounded() {
        let mut config = Config::default();
        config.executor.max_concurrent_jobs = Some(3);
        apply_env_overrides(&mut config, env(&[("MAX_CONCURRENT_JOBS", "0")])).unwrap();
        assert_eq!(config.executor.max_concurrent_jobs, None);
    }

    #[test]
    fn test_env_blank_values_ignored() {
        let mut config = Config::default();
        apply_env_overrides(&mut config, env(&[("MODEL_NAME", "  ")])).unwrap();
        assert_eq!(config.llm.model_name, "codellama:7b");
    }

    #[test]
    fn test_env_invalid_number() {
        let mut config = Config::default();
        let result = apply_env_overrides(&mut config, env(&[("MAX_TOKENS", "lots")]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidEnv { ref name, .. }) if name == "MAX_TOKENS"
        ));
    }

    #[test]
    #[serial]
    fn test_effective_config_reads_process_env() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        writeln!(file, r#"{{ "version": "1.0", "llm": {{ "max_tokens": 100 }} }}"#).unwrap();

        std::env::set_var("MODEL_NAME", "phi3");
        let config = load_effective_config(Some(file.path()));
        std::env::remove_var("MODEL_NAME");

        let config = config.unwrap();
        assert_eq!(config.llm.model_name, "phi3");
        assert_eq!(config.llm.max_tokens, 100);
    }

    #[test]
    #[serial]
    fn test_effective_config_rejects_bad_env_url() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        writeln!(file, r#"{{ "version": "1.0" }}"#).unwrap();

        std::env::set_var("LLM_SERVICE_URL", "ollama:11434");
        let config = load_effective_config(Some(file.path()));
        std::env::remove_var("LLM_SERVICE_URL");

        assert!(matches!(config, Err(ConfigError::Validation { .. })));
    }
}
