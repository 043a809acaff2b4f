//! Offline dialog simulation.
//!
//! Routes one dialog event through the real pipeline with a canned
//! completion client, so slot validation, extraction, and response shaping
//! can be exercised without a model endpoint or database.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use salesdesk_agent::actions::ActionInvoker;
use salesdesk_agent::llm::{GenerationConfig, LlmClient, LlmError};
use salesdesk_agent::router::IntentRouter;
use salesdesk_agent::store::{LocalObjectStore, NoopKnowledgeIndex};
use salesdesk_core::config::{AppConfig, LoadOptions};
use salesdesk_core::dialog::types::DialogEvent;

use crate::commands::CommandResult;

const DEFAULT_COMPLETION: &str = "(simulated completion)";

struct CannedLlm {
    text: String,
}

#[async_trait]
impl LlmClient for CannedLlm {
    async fn complete(
        &self,
        _prompt: &str,
        _config: &GenerationConfig,
    ) -> Result<String, LlmError> {
        Ok(self.text.clone())
    }
}

pub fn run(event_path: Option<&Path>, completion: Option<&str>) -> CommandResult {
    let raw_event = match read_event(event_path) {
        Ok(raw) => raw,
        Err(message) => return CommandResult::failure("simulate", "event_read", message, 2),
    };

    let event: DialogEvent = match serde_json::from_str(&raw_event) {
        Ok(event) => event,
        Err(error) => {
            return CommandResult::failure(
                "simulate",
                "event_parse",
                format!("dialog event did not parse: {error}"),
                2,
            );
        }
    };

    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "simulate",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "simulate",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let invoker = ActionInvoker::new(
        Arc::new(CannedLlm {
            text: completion.unwrap_or(DEFAULT_COMPLETION).to_string(),
        }),
        Arc::new(LocalObjectStore::new(config.storage.root.clone())),
        Arc::new(NoopKnowledgeIndex),
        config.llm.timeout_secs,
    );
    let router = IntentRouter::new(invoker);

    let response = runtime.block_on(router.route(&event));

    match serde_json::to_string_pretty(&response) {
        Ok(output) => CommandResult { exit_code: 0, output },
        Err(error) => CommandResult::failure(
            "simulate",
            "serialization",
            format!("response did not serialize: {error}"),
            3,
        ),
    }
}

fn read_event(event_path: Option<&Path>) -> Result<String, String> {
    match event_path {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|error| format!("could not read `{}`: {error}", path.display())),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|error| format!("could not read stdin: {error}"))?;
            Ok(buffer)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::run;

    fn write_event(name: &str, body: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("salesdesk-sim-{}-{name}", std::process::id()));
        let mut file = std::fs::File::create(&path).expect("create event file");
        file.write_all(body.as_bytes()).expect("write event file");
        path
    }

    #[test]
    fn simulated_report_turn_produces_a_fulfilled_close() {
        let path = write_event(
            "report.json",
            r#"{
                "sessionState": {
                    "intent": {
                        "name": "GenerateReportIntent",
                        "slots": {
                            "CustomReportType": { "value": { "interpretedValue": "quarterly" } }
                        }
                    }
                }
            }"#,
        );

        let result = run(Some(&path), Some("Q3 results strong"));
        assert_eq!(result.exit_code, 0);
        assert!(result.output.contains("Fulfilled"));
        assert!(result.output.contains("Here is the generated report: Q3 results strong"));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn malformed_event_is_a_parse_failure() {
        let path = write_event("bad.json", "{ not json");

        let result = run(Some(&path), None);
        assert_eq!(result.exit_code, 2);
        assert!(result.output.contains("event_parse"));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_slot_turn_produces_an_elicitation() {
        let path = write_event(
            "elicit.json",
            r#"{
                "sessionState": {
                    "intent": { "name": "AnalyzeSalesIntent", "slots": {} }
                }
            }"#,
        );

        let result = run(Some(&path), None);
        assert_eq!(result.exit_code, 0);
        assert!(result.output.contains("ElicitSlot"));
        assert!(result.output.contains("FileName"));

        std::fs::remove_file(&path).ok();
    }
}
