use std::sync::Arc;

use kindred_domain::DomainError;
use kindred_vectorstore::VectorStore;
use tracing::info;

use crate::generator::QuestionGeneratorPort;
use crate::novelty::{NoveltyController, NoveltyPolicy};
use crate::response::{QuestionGenerationResponse, QuestionMetadata};

const FAMILY_RECENT_LIMIT_PER_MEMBER: usize = 3;
pub const FAMILY_RECENT_PRIORITY: u8 = 4;

pub struct FamilyRecentInput {
    pub family_id: String,
    pub target_member_id: String,
    pub target_role_label: String,
}

/// No base Q/A, uses each member's recent window as context, and never
/// stores — the result is a prompt, not a recorded exchange.
pub struct FamilyRecentUseCase {
    vector_store: Arc<dyn VectorStore>,
    generator: Arc<dyn QuestionGeneratorPort>,
    policy: NoveltyPolicy,
}

impl FamilyRecentUseCase {
    pub fn new(vector_store: Arc<dyn VectorStore>, generator: Arc<dyn QuestionGeneratorPort>, policy: NoveltyPolicy) -> Self {
        Self { vector_store, generator, policy }
    }

    pub async fn execute(&self, input: FamilyRecentInput) -> Result<QuestionGenerationResponse, DomainError> {
        let context = self
            .vector_store
            .get_recent_questions_by_family(&input.family_id, FAMILY_RECENT_LIMIT_PER_MEMBER)
            .await
            .map_err(|e| DomainError::UpstreamUnavailable(e.to_string()))?;

        let controller = NoveltyController::new(self.policy);
        let vector_store = &self.vector_store;
        let generator = &self.generator;
        let target_member_id = input.target_member_id.clone();
        let target_role_label = input.target_role_label.clone();

        let (generated, novelty) = controller
            .run(
                || {
                    let context = &context;
                    let target_member_id = target_member_id.clone();
                    let target_role_label = target_role_label.clone();
                    async move {
                        generator
                            .generate_for_target(&target_member_id, &target_role_label, context)
                            .await
                    }
                },
                |question_text| {
                    let target_member_id = input.target_member_id.clone();
                    async move {
                        vector_store
                            .search_similar_questions(&question_text, &target_member_id)
                            .await
                            .map_err(|e| DomainError::UpstreamUnavailable(e.to_string()))
                    }
                },
            )
            .await?;

        info!(
            family_id = %input.family_id,
            target_member_id = %input.target_member_id,
            context_count = context.len(),
            "family-recent question generated"
        );

        Ok(QuestionGenerationResponse {
            member_id: input.target_member_id.clone(),
            content: generated.question,
            level: generated.level,
            priority: FAMILY_RECENT_PRIORITY,
            metadata: QuestionMetadata {
                rag_count: 0,
                member_id: input.target_member_id,
                family_id: input.family_id,
                regeneration_count: novelty.regeneration_count(),
                similarity_warning: novelty.similarity_warning,
                context_count: Some(context.len()),
            },
        })
    }
}
