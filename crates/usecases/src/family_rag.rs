use std::sync::Arc;

use chrono::{DateTime, Utc};
use kindred_domain::{DomainError, QaRecord};
use kindred_vectorstore::VectorStore;
use tracing::info;

use crate::generator::QuestionGeneratorPort;
use crate::novelty::{NoveltyController, NoveltyPolicy};
use crate::response::{QuestionGenerationResponse, QuestionMetadata};

pub const FAMILY_PRIORITY: u8 = 3;

pub struct FamilyRagInput {
    pub family_id: String,
    pub member_id: String,
    pub role_label: String,
    pub base_question: String,
    pub base_answer: String,
    pub answered_at: DateTime<Utc>,
}

/// Identical to [`crate::personal_rag::PersonalRagUseCase`] except
/// retrieval is family-scoped; the novelty probe still targets the
/// answering member.
pub struct FamilyRagUseCase {
    vector_store: Arc<dyn VectorStore>,
    generator: Arc<dyn QuestionGeneratorPort>,
    policy: NoveltyPolicy,
    top_k: usize,
}

impl FamilyRagUseCase {
    pub fn new(
        vector_store: Arc<dyn VectorStore>,
        generator: Arc<dyn QuestionGeneratorPort>,
        policy: NoveltyPolicy,
        top_k: usize,
    ) -> Self {
        Self { vector_store, generator, policy, top_k }
    }

    pub async fn execute(&self, input: FamilyRagInput) -> Result<QuestionGenerationResponse, DomainError> {
        let base_qa = QaRecord::new(
            input.family_id.clone(),
            input.member_id.clone(),
            input.role_label,
            input.base_question,
            input.base_answer,
            input.answered_at,
        )?;

        let rag = self
            .vector_store
            .search_by_family(&base_qa.family_id, &base_qa, self.top_k)
            .await
            .map_err(|e| DomainError::UpstreamUnavailable(e.to_string()))?;

        let controller = NoveltyController::new(self.policy);
        let member_id = base_qa.member_id.clone();
        let vector_store = &self.vector_store;
        let generator = &self.generator;

        let (generated, novelty) = controller
            .run(
                || {
                    let base_qa = &base_qa;
                    let rag = &rag;
                    async move { generator.derive(base_qa, rag).await }
                },
                |question_text| {
                    let member_id = member_id.clone();
                    async move {
                        vector_store
                            .search_similar_questions(&question_text, &member_id)
                            .await
                            .map_err(|e| DomainError::UpstreamUnavailable(e.to_string()))
                    }
                },
            )
            .await?;

        let stored = self
            .vector_store
            .store(&base_qa)
            .await
            .map_err(|e| DomainError::PersistenceFailure(e.to_string()))?;
        if !stored {
            return Err(DomainError::PersistenceFailure("vector store rejected the write".into()));
        }

        info!(
            family_id = %base_qa.family_id,
            member_id = %base_qa.member_id,
            regeneration_count = novelty.regeneration_count(),
            "family question generated"
        );

        Ok(QuestionGenerationResponse {
            member_id: base_qa.member_id.clone(),
            content: generated.question,
            level: generated.level,
            priority: FAMILY_PRIORITY,
            metadata: QuestionMetadata {
                rag_count: rag.len(),
                member_id: base_qa.member_id,
                family_id: base_qa.family_id,
                regeneration_count: novelty.regeneration_count(),
                similarity_warning: novelty.similarity_warning,
                context_count: None,
            },
        })
    }
}
