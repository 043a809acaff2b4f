use salesdesk_core::config::{AppConfig, LoadOptions};

/// Renders the effective configuration, one `key = value` line per field.
/// Secrets are redacted; the env var that can override each field is listed
/// so operators do not have to memorize the mapping.
pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let api_key = if config.llm.api_key.is_some() { "<redacted>" } else { "<unset>" };

    let lines = vec![
        "effective config (source precedence: overrides > env > file > default):".to_string(),
        render("database.url", &config.database.url, "SALESDESK_DATABASE_URL"),
        render(
            "database.max_connections",
            &config.database.max_connections.to_string(),
            "SALESDESK_DATABASE_MAX_CONNECTIONS",
        ),
        render(
            "database.timeout_secs",
            &config.database.timeout_secs.to_string(),
            "SALESDESK_DATABASE_TIMEOUT_SECS",
        ),
        render("llm.base_url", &config.llm.base_url, "SALESDESK_LLM_BASE_URL"),
        render("llm.model", &config.llm.model, "SALESDESK_LLM_MODEL"),
        render("llm.api_key", api_key, "SALESDESK_LLM_API_KEY"),
        render(
            "llm.response_shape",
            &format!("{:?}", config.llm.response_shape).to_lowercase(),
            "SALESDESK_LLM_RESPONSE_SHAPE",
        ),
        render(
            "llm.timeout_secs",
            &config.llm.timeout_secs.to_string(),
            "SALESDESK_LLM_TIMEOUT_SECS",
        ),
        render("storage.root", &config.storage.root.display().to_string(), "SALESDESK_STORAGE_ROOT"),
        render(
            "server.bind_address",
            &config.server.bind_address,
            "SALESDESK_SERVER_BIND_ADDRESS",
        ),
        render("server.port", &config.server.port.to_string(), "SALESDESK_SERVER_PORT"),
        render("logging.level", &config.logging.level, "SALESDESK_LOGGING_LEVEL"),
        render(
            "logging.format",
            &format!("{:?}", config.logging.format).to_lowercase(),
            "SALESDESK_LOGGING_FORMAT",
        ),
    ];

    lines.join("\n")
}

fn render(key: &str, value: &str, env_var: &str) -> String {
    format!("  {key} = {value}  (env: {env_var})")
}
