//! Action Invoker: prompt construction and the bounded external call.
//!
//! One invocation makes at most one completion call (plus an object-store
//! read for the sales-analysis action and an index query for generic tasks).
//! There are no retries; any failure becomes a typed [`ExternalFailure`] for
//! the router to convert into a user-safe response.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use salesdesk_core::intents::TaskCategory;

use crate::llm::{GenerationConfig, LlmClient, LlmError};
use crate::store::{KnowledgeIndex, ObjectStore, ObjectStoreError, Passage};

/// A fully-resolved action, ready to be turned into a prompt. Values come
/// from the slot extractor; nothing here is optional.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionRequest {
    AnalyzeSales {
        file_name: String,
    },
    MarketingPlan {
        product_or_service: String,
        marketing_channel: String,
        target_customers: String,
        budget: String,
    },
    GenerateReport {
        report_type: String,
    },
    ProcessTask {
        category: TaskCategory,
        description: String,
    },
}

impl ActionRequest {
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::AnalyzeSales { .. } => "analyze_sales",
            Self::MarketingPlan { .. } => "marketing_plan",
            Self::GenerateReport { .. } => "generate_report",
            Self::ProcessTask { .. } => "process_task",
        }
    }

    /// Sampling bounds per action kind. Plans get more headroom and a higher
    /// temperature than analyses and reports.
    pub fn generation_config(&self) -> GenerationConfig {
        match self {
            Self::AnalyzeSales { .. } | Self::GenerateReport { .. } => {
                GenerationConfig { temperature: 0.5, max_tokens: 512 }
            }
            Self::MarketingPlan { .. } => GenerationConfig { temperature: 0.7, max_tokens: 700 },
            Self::ProcessTask { .. } => GenerationConfig { temperature: 0.7, max_tokens: 512 },
        }
    }
}

#[derive(Debug, Error)]
pub enum ExternalFailure {
    #[error("referenced storage object `{0}` does not exist")]
    ObjectNotFound(String),
    #[error("object store failure: {0}")]
    Store(#[source] ObjectStoreError),
    #[error(transparent)]
    Completion(#[from] LlmError),
    #[error("knowledge index failure: {0}")]
    Index(String),
    #[error("external call exceeded the {0}s deadline")]
    DeadlineExceeded(u64),
}

/// Invoker with injected collaborators. Construction is the only place the
/// concrete clients appear; everything downstream sees trait objects.
pub struct ActionInvoker {
    llm: Arc<dyn LlmClient>,
    store: Arc<dyn ObjectStore>,
    index: Arc<dyn KnowledgeIndex>,
    deadline_secs: u64,
}

impl ActionInvoker {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        store: Arc<dyn ObjectStore>,
        index: Arc<dyn KnowledgeIndex>,
        deadline_secs: u64,
    ) -> Self {
        Self { llm, store, index, deadline_secs }
    }

    /// Builds the prompt for `request`, performs the collaborator calls, and
    /// returns the raw completion text. Synchronous from the caller's view;
    /// the deadline covers every external call made here.
    pub async fn invoke(&self, request: &ActionRequest) -> Result<String, ExternalFailure> {
        let deadline = Duration::from_secs(self.deadline_secs);
        tokio::time::timeout(deadline, self.invoke_inner(request))
            .await
            .map_err(|_| ExternalFailure::DeadlineExceeded(self.deadline_secs))?
    }

    async fn invoke_inner(&self, request: &ActionRequest) -> Result<String, ExternalFailure> {
        let prompt = match request {
            ActionRequest::AnalyzeSales { file_name } => {
                let sales_data = self.store.get(file_name).await.map_err(|error| match error {
                    ObjectStoreError::NotFound(key) => ExternalFailure::ObjectNotFound(key),
                    other => ExternalFailure::Store(other),
                })?;
                analysis_prompt(&sales_data)
            }
            ActionRequest::MarketingPlan {
                product_or_service,
                marketing_channel,
                target_customers,
                budget,
            } => marketing_plan_prompt(product_or_service, marketing_channel, target_customers, budget),
            ActionRequest::GenerateReport { report_type } => report_prompt(report_type),
            ActionRequest::ProcessTask { category, description } => {
                let passages = self
                    .index
                    .query(description)
                    .await
                    .map_err(|error| ExternalFailure::Index(error.to_string()))?;
                task_prompt(*category, description, &passages)
            }
        };

        let text = self.llm.complete(&prompt, &request.generation_config()).await?;
        Ok(text)
    }
}

fn analysis_prompt(sales_data: &str) -> String {
    format!(
        "Analyze the following sales data and provide insights:\n\
         {sales_data}\n\n\
         Please provide key insights and any recommendations based on the data."
    )
}

fn marketing_plan_prompt(
    product_or_service: &str,
    marketing_channel: &str,
    target_customers: &str,
    budget: &str,
) -> String {
    format!(
        "In markdown format, create a detailed marketing plan for: {product_or_service}\n\n\
         Budget: {budget}\n\
         Preferred Marketing Channels: {marketing_channel}\n\
         Target Customers: {target_customers}\n\n\
         Please provide:\n\
         1. Executive Summary\n\
         2. Target Market Analysis\n\
         3. Marketing Strategy\n\
         4. Budget Breakdown\n\
         5. Timeline\n\
         6. Success Metrics"
    )
}

fn report_prompt(report_type: &str) -> String {
    // Narrative framing is fixed; only the report type varies per request.
    let summary = format!("{report_type} report for the whole year in the North region");
    let details = format!(
        "The {report_type} saw significant changes over the whole year. \
         Notable trends include increased sales in the East region and a decrease in the South. \
         Region-specific breakdowns show a 15% increase in the North, \
         while the South region faced a 5% decline."
    );
    let next_steps = "1. Review regional strategies for improvement.\n\
                      2. Expand successful marketing campaigns in the North.\n\
                      3. Conduct further analysis on the South region decline.";

    format!(
        "Generate a {report_type} report with the following fields based on the data provided:\n\n\
         Summary: {summary}\n\n\
         Details: {details}\n\n\
         Next Steps: {next_steps}"
    )
}

fn task_prompt(category: TaskCategory, description: &str, passages: &[Passage]) -> String {
    let objective = match category {
        TaskCategory::SalesAnalysis => "Analyze the sales aspects of the request below",
        TaskCategory::MarketingPlan => "Draft a marketing plan for the request below",
        TaskCategory::Report => "Produce a report for the request below",
    };

    if passages.is_empty() {
        return format!("{objective}:\n\n{description}");
    }

    let context = passages
        .iter()
        .map(|passage| format!("[{}] {}", passage.source, passage.excerpt))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{objective}, using the retrieved context where relevant.\n\n\
         Context:\n{context}\n\n\
         Request:\n{description}"
    )
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::llm::{GenerationConfig, LlmClient, LlmError};
    use crate::store::{ObjectStore, ObjectStoreError};

    /// Completion fake: records every prompt and replays a fixed outcome.
    pub struct FakeLlm {
        pub prompts: Mutex<Vec<String>>,
        pub outcome: Result<String, LlmError>,
        pub delay: Option<std::time::Duration>,
    }

    impl FakeLlm {
        pub fn returning(text: &str) -> Self {
            Self { prompts: Mutex::new(Vec::new()), outcome: Ok(text.to_string()), delay: None }
        }

        pub fn failing(error: LlmError) -> Self {
            Self { prompts: Mutex::new(Vec::new()), outcome: Err(error), delay: None }
        }

        pub fn last_prompt(&self) -> Option<String> {
            self.prompts.lock().expect("prompt log").last().cloned()
        }
    }

    #[async_trait]
    impl LlmClient for FakeLlm {
        async fn complete(
            &self,
            prompt: &str,
            _config: &GenerationConfig,
        ) -> Result<String, LlmError> {
            self.prompts.lock().expect("prompt log").push(prompt.to_string());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.outcome.clone()
        }
    }

    /// Object-store fake over a fixed key set.
    pub struct FakeStore {
        pub objects: Vec<(String, String)>,
    }

    impl FakeStore {
        pub fn with_object(key: &str, content: &str) -> Self {
            Self { objects: vec![(key.to_string(), content.to_string())] }
        }

        pub fn empty() -> Self {
            Self { objects: Vec::new() }
        }
    }

    #[async_trait]
    impl ObjectStore for FakeStore {
        async fn get(&self, key: &str) -> Result<String, ObjectStoreError> {
            self.objects
                .iter()
                .find(|(stored_key, _)| stored_key == key)
                .map(|(_, content)| content.clone())
                .ok_or_else(|| ObjectStoreError::NotFound(key.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use salesdesk_core::intents::TaskCategory;

    use crate::llm::LlmError;
    use crate::store::{NoopKnowledgeIndex, Passage};

    use super::test_support::{FakeLlm, FakeStore};
    use super::{
        marketing_plan_prompt, report_prompt, task_prompt, ActionInvoker, ActionRequest,
        ExternalFailure,
    };

    fn invoker(llm: FakeLlm, store: FakeStore) -> (Arc<FakeLlm>, ActionInvoker) {
        let llm = Arc::new(llm);
        let invoker = ActionInvoker::new(
            llm.clone(),
            Arc::new(store),
            Arc::new(NoopKnowledgeIndex),
            5,
        );
        (llm, invoker)
    }

    #[tokio::test]
    async fn report_action_embeds_the_report_type_in_the_prompt() {
        let (llm, invoker) = invoker(FakeLlm::returning("Q3 results strong"), FakeStore::empty());

        let text = invoker
            .invoke(&ActionRequest::GenerateReport { report_type: "quarterly".to_string() })
            .await
            .expect("invocation should succeed");

        assert_eq!(text, "Q3 results strong");
        let prompt = llm.last_prompt().expect("one prompt sent");
        assert!(prompt.contains("quarterly"));
        assert!(prompt.contains("Next Steps:"));
    }

    #[tokio::test]
    async fn sales_analysis_reads_the_object_and_embeds_its_content() {
        let (llm, invoker) = invoker(
            FakeLlm::returning("insights"),
            FakeStore::with_object("q3-sales.json", r#"{"revenue": 120}"#),
        );

        invoker
            .invoke(&ActionRequest::AnalyzeSales { file_name: "q3-sales.json".to_string() })
            .await
            .expect("invocation should succeed");

        let prompt = llm.last_prompt().expect("one prompt sent");
        assert!(prompt.contains(r#"{"revenue": 120}"#));
    }

    #[tokio::test]
    async fn missing_object_is_reported_before_any_completion_call() {
        let (llm, invoker) = invoker(FakeLlm::returning("unused"), FakeStore::empty());

        let result = invoker
            .invoke(&ActionRequest::AnalyzeSales { file_name: "nope.json".to_string() })
            .await;

        assert!(matches!(result, Err(ExternalFailure::ObjectNotFound(ref key)) if key == "nope.json"));
        assert!(llm.last_prompt().is_none());
    }

    #[tokio::test]
    async fn completion_failure_propagates_as_external_failure() {
        let (_llm, invoker) = invoker(
            FakeLlm::failing(LlmError::Endpoint { status: 503, detail: "overloaded".to_string() }),
            FakeStore::empty(),
        );

        let result = invoker
            .invoke(&ActionRequest::GenerateReport { report_type: "annual".to_string() })
            .await;

        assert!(matches!(result, Err(ExternalFailure::Completion(_))));
    }

    #[tokio::test]
    async fn stuck_collaborator_hits_the_deadline() {
        let mut llm = FakeLlm::returning("too late");
        llm.delay = Some(std::time::Duration::from_millis(250));
        let invoker = ActionInvoker::new(
            Arc::new(llm),
            Arc::new(FakeStore::empty()),
            Arc::new(NoopKnowledgeIndex),
            0,
        );

        let result = invoker
            .invoke(&ActionRequest::GenerateReport { report_type: "annual".to_string() })
            .await;

        assert!(matches!(result, Err(ExternalFailure::DeadlineExceeded(0))));
    }

    #[test]
    fn marketing_prompt_carries_all_four_inputs_and_six_sections() {
        let prompt = marketing_plan_prompt("crm software", "email", "smb owners", "5000 dollars");

        for needle in ["crm software", "email", "smb owners", "5000 dollars"] {
            assert!(prompt.contains(needle), "missing `{needle}`");
        }
        for section in [
            "1. Executive Summary",
            "2. Target Market Analysis",
            "3. Marketing Strategy",
            "4. Budget Breakdown",
            "5. Timeline",
            "6. Success Metrics",
        ] {
            assert!(prompt.contains(section), "missing `{section}`");
        }
    }

    #[test]
    fn report_prompt_uses_fixed_narrative_fields() {
        let prompt = report_prompt("inventory");
        assert!(prompt.contains("Summary: inventory report"));
        assert!(prompt.contains("Details: The inventory saw significant changes"));
    }

    #[test]
    fn task_prompt_without_context_is_plain_passthrough() {
        let prompt = task_prompt(TaskCategory::Report, "summarize q3 wins", &[]);
        assert!(prompt.contains("summarize q3 wins"));
        assert!(!prompt.contains("Context:"));
    }

    #[test]
    fn task_prompt_with_context_lists_sources() {
        let passages = vec![Passage {
            source: "playbook.md".to_string(),
            excerpt: "Focus on renewals in Q3.".to_string(),
        }];
        let prompt = task_prompt(TaskCategory::SalesAnalysis, "summarize q3 wins", &passages);
        assert!(prompt.contains("[playbook.md] Focus on renewals in Q3."));
        assert!(prompt.contains("Request:\nsummarize q3 wins"));
    }
}
