use std::sync::Arc;

use chrono::Utc;
use kindred_domain::{DomainError, Period, PeriodWindow};
use kindred_vectorstore::VectorStore;
use tracing::info;

use crate::generator::SummaryGeneratorPort;

pub struct FamilySummaryInput {
    pub family_id: String,
    pub period: Period,
}

pub struct FamilySummaryResponse {
    pub context: String,
}

/// Range scan, render, headline. Rendering reuses the exact function used
/// for embedding so time tokens stay consistent with retrieval semantics.
pub struct FamilySummaryUseCase {
    vector_store: Arc<dyn VectorStore>,
    summary_generator: Arc<dyn SummaryGeneratorPort>,
}

impl FamilySummaryUseCase {
    pub fn new(vector_store: Arc<dyn VectorStore>, summary_generator: Arc<dyn SummaryGeneratorPort>) -> Self {
        Self { vector_store, summary_generator }
    }

    pub async fn execute(&self, input: FamilySummaryInput) -> Result<FamilySummaryResponse, DomainError> {
        let window = PeriodWindow::new(input.family_id.clone(), input.period, Utc::now());

        let docs = self
            .vector_store
            .get_qa_by_family_in_range(&input.family_id, window.start, window.end)
            .await
            .map_err(|e| DomainError::UpstreamUnavailable(e.to_string()))?;

        let qa_texts: Vec<String> = docs.iter().map(|qa| qa.render_embedding_text()).collect();
        let answer_count = docs.len();

        let headline = self
            .summary_generator
            .summarize(&qa_texts, input.period.label(), answer_count)
            .await?;

        info!(family_id = %input.family_id, answer_count, "family summary generated");

        Ok(FamilySummaryResponse { context: headline })
    }
}
