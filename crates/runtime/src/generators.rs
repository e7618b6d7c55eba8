//! LLM-backed implementations of the two generator ports. These are
//! concrete adapters: the use cases in `kindred-usecases` never name them
//! directly, only the `QuestionGeneratorPort` / `SummaryGeneratorPort`
//! traits they implement.

use std::sync::Arc;

use kindred_domain::{DomainError, QaRecord, QuestionLevel};
use kindred_llm::{ChatMessage, ChatParams, LlmClient, ResponseFormat};
use kindred_prompts::PromptCatalog;
use kindred_usecases::{render_context_list, GeneratedQuestion, QuestionGeneratorPort, SummaryGeneratorPort};
use serde_json::Value;
use tracing::warn;

const PERSONAL_CONTEXT_LIMIT: usize = 5;
const FAMILY_CONTEXT_LIMIT: usize = 10;
const GENERATION_MAX_TOKENS: u32 = 800;
const SUMMARY_MAX_TOKENS: u32 = 600;

pub struct LlmQuestionGenerator {
    llm: Arc<dyn LlmClient>,
    prompts: Arc<PromptCatalog>,
    model: String,
}

impl LlmQuestionGenerator {
    pub fn new(llm: Arc<dyn LlmClient>, prompts: Arc<PromptCatalog>, model: impl Into<String>) -> Self {
        Self { llm, prompts, model: model.into() }
    }

    async fn call_for_question(&self, template_name: &str, vars: std::collections::HashMap<&str, String>) -> Result<GeneratedQuestion, DomainError> {
        let template = self
            .prompts
            .get(template_name)
            .map_err(|e| DomainError::ContractViolation(format!("prompt template unavailable: {e}")))?;
        let (system, user) = template.render(&vars);

        let params = ChatParams {
            model: self.model.clone(),
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            max_completion_tokens: GENERATION_MAX_TOKENS,
            temperature: if kindred_llm::is_reasoning_model(&self.model) { None } else { Some(0.8) },
            response_format: Some(ResponseFormat::JsonObject),
        };

        let raw = self
            .llm
            .chat(params)
            .await
            .map_err(|e| DomainError::UpstreamUnavailable(e.to_string()))?;

        let parsed: Value = serde_json::from_str(&raw).map_err(|e| {
            warn!(error = %e, "generator response was not valid JSON");
            DomainError::ContractViolation("generator response was not valid JSON".into())
        })?;

        let question = parsed
            .get("question")
            .and_then(Value::as_str)
            .filter(|q| !q.trim().is_empty())
            .ok_or_else(|| DomainError::ContractViolation("missing required key: question".into()))?
            .to_string();

        let level = parsed
            .get("level")
            .ok_or_else(|| DomainError::ContractViolation("missing required key: level".into()))
            .map(QuestionLevel::from_json)?;

        Ok(GeneratedQuestion { question, level })
    }
}

#[async_trait::async_trait]
impl QuestionGeneratorPort for LlmQuestionGenerator {
    async fn derive(&self, base_qa: &QaRecord, rag_context: &[QaRecord]) -> Result<GeneratedQuestion, DomainError> {
        let mut vars = std::collections::HashMap::new();
        vars.insert("base_question", base_qa.question.clone());
        vars.insert("base_answer", base_qa.answer.clone());
        vars.insert("role_label", base_qa.role_label.clone());
        vars.insert("context", render_context_list(rag_context, PERSONAL_CONTEXT_LIMIT));

        self.call_for_question("personal_derive", vars).await
    }

    async fn generate_for_target(
        &self,
        target_member_id: &str,
        target_role_label: &str,
        context: &[QaRecord],
    ) -> Result<GeneratedQuestion, DomainError> {
        let mut vars = std::collections::HashMap::new();
        vars.insert("target_member_id", target_member_id.to_string());
        vars.insert("target_role_label", target_role_label.to_string());
        vars.insert("context", render_context_list(context, FAMILY_CONTEXT_LIMIT));

        self.call_for_question("family_recent", vars).await
    }
}

pub struct LlmSummaryGenerator {
    llm: Arc<dyn LlmClient>,
    prompts: Arc<PromptCatalog>,
    model: String,
}

impl LlmSummaryGenerator {
    pub fn new(llm: Arc<dyn LlmClient>, prompts: Arc<PromptCatalog>, model: impl Into<String>) -> Self {
        Self { llm, prompts, model: model.into() }
    }
}

#[async_trait::async_trait]
impl SummaryGeneratorPort for LlmSummaryGenerator {
    async fn summarize(&self, qa_texts: &[String], period_label: &str, answer_count: usize) -> Result<String, DomainError> {
        let template = self
            .prompts
            .get("family_summary")
            .map_err(|e| DomainError::ContractViolation(format!("prompt template unavailable: {e}")))?;

        let mut vars = std::collections::HashMap::new();
        vars.insert("period_label", period_label.to_string());
        vars.insert("answer_count", answer_count.to_string());
        vars.insert("qa_list", qa_texts.join("\n\n"));
        let (system, user) = template.render(&vars);

        let params = ChatParams {
            model: self.model.clone(),
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            max_completion_tokens: SUMMARY_MAX_TOKENS,
            temperature: if kindred_llm::is_reasoning_model(&self.model) { None } else { Some(0.7) },
            response_format: None,
        };

        self.llm.chat(params).await.map_err(|e| DomainError::UpstreamUnavailable(e.to_string()))
    }
}
