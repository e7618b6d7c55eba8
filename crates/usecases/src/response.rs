use kindred_domain::QuestionLevel;

/// Shared response shape for the three question-generation use cases.
/// `priority` distinguishes the originating flow for downstream clients;
/// it carries no meaning inside the core itself.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionGenerationResponse {
    pub member_id: String,
    pub content: String,
    pub level: QuestionLevel,
    pub priority: u8,
    pub metadata: QuestionMetadata,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuestionMetadata {
    pub rag_count: usize,
    pub member_id: String,
    pub family_id: String,
    pub regeneration_count: u32,
    pub similarity_warning: bool,
    /// Set only by Family Recent, which has no retrieval `rag_count` to
    /// report.
    pub context_count: Option<usize>,
}
