//! Constructs every capability singleton once at startup, binds ports to
//! adapters, and runs the startup health check.
//! Nothing downstream of [`AppState::bootstrap`] ever names a concrete
//! adapter type directly.

mod generators;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use kindred_analysis::AnswerAnalyzer;
use kindred_config::AppConfig;
use kindred_embedding::{EmbeddingClient, OpenAiEmbeddingClient};
use kindred_llm::{LlmClient, OpenAiLlmClient};
use kindred_prompts::PromptCatalog;
use kindred_usecases::{
    FamilyRagUseCase, FamilyRecentUseCase, FamilySummaryUseCase, MemberLifecycleUseCase, NoveltyPolicy,
    PersonalRagUseCase,
};
use kindred_vectorstore::{InMemoryVectorStore, VectorStore};
use tracing::info;

pub use generators::{LlmQuestionGenerator, LlmSummaryGenerator};

/// OpenAI's text-embedding-3-small dimension. Not part of the configuration
/// surface; the embedding model and vector collection dimension must simply
/// agree, so this is fixed alongside the default model.
const EMBEDDING_DIMENSION: u64 = 1536;

const REQUIRED_PROMPT_TEMPLATES: &[&str] = &["personal_derive", "family_recent", "family_summary"];

pub struct AppState {
    pub config: AppConfig,
    pub vector_store: Arc<dyn VectorStore>,
    pub personal_rag: PersonalRagUseCase,
    pub family_rag: FamilyRagUseCase,
    pub family_recent: FamilyRecentUseCase,
    pub family_summary: FamilySummaryUseCase,
    pub member_lifecycle: MemberLifecycleUseCase,
    pub answer_analyzer: AnswerAnalyzer,
}

impl AppState {
    /// Startup health check: (a) persistence directory writable, (b) vector
    /// store handle constructed, (c) both generators constructed (which
    /// loads their templates), (d) summary generator constructed. Any
    /// failure here is fatal, so problems surface at startup instead of on
    /// the first request.
    pub async fn bootstrap(config: AppConfig, prompt_dir: impl AsRef<Path>) -> Result<Self> {
        config.validate().context("configuration failed validation")?;

        ensure_writable(Path::new(&config.vector_store.chroma_persist_directory))
            .context("vector store persistence directory is not writable")?;

        let embedding: Arc<dyn EmbeddingClient> = Arc::new(
            OpenAiEmbeddingClient::new(config.llm.openai_api_key.clone(), config.embedding.embedding_model.clone()),
        );

        let vector_store: Arc<dyn VectorStore> = build_vector_store(&config, embedding.clone()).await?;

        let llm: Arc<dyn LlmClient> = Arc::new(OpenAiLlmClient::new(config.llm.openai_api_key.clone()));
        let prompts = Arc::new(
            PromptCatalog::load_from_dir(prompt_dir, REQUIRED_PROMPT_TEMPLATES)
                .context("failed to load prompt catalog")?,
        );

        let question_generator: Arc<dyn kindred_usecases::QuestionGeneratorPort> =
            Arc::new(LlmQuestionGenerator::new(llm.clone(), prompts.clone(), config.llm.default_model.clone()));
        let summary_generator: Arc<dyn kindred_usecases::SummaryGeneratorPort> =
            Arc::new(LlmSummaryGenerator::new(llm.clone(), prompts, config.llm.default_model.clone()));

        let policy = NoveltyPolicy {
            threshold: config.novelty.similarity_threshold,
            max_attempts: config.novelty.max_regeneration,
        };

        let personal_rag = PersonalRagUseCase::new(
            vector_store.clone(),
            question_generator.clone(),
            policy,
            config.vector_store.rag_top_k,
        );
        let family_rag = FamilyRagUseCase::new(
            vector_store.clone(),
            question_generator.clone(),
            policy,
            config.vector_store.family_top_k,
        );
        let family_recent = FamilyRecentUseCase::new(vector_store.clone(), question_generator, policy);
        let family_summary = FamilySummaryUseCase::new(vector_store.clone(), summary_generator);
        let member_lifecycle = MemberLifecycleUseCase::new(vector_store.clone());
        let answer_analyzer = AnswerAnalyzer::new(llm, config.llm.default_model.clone());

        info!("all capability singletons constructed, startup health check passed");

        Ok(Self {
            config,
            vector_store,
            personal_rag,
            family_rag,
            family_recent,
            family_summary,
            member_lifecycle,
            answer_analyzer,
        })
    }
}

/// Picks the vector store backend. `QDRANT_URL` selects the qdrant-backed
/// adapter (see DESIGN.md for why it stands in for the Chroma-named config
/// fields); its absence falls back to the in-process store, which is useful
/// for local development and tests but not for a real deployment.
async fn build_vector_store(config: &AppConfig, embedding: Arc<dyn EmbeddingClient>) -> Result<Arc<dyn VectorStore>> {
    match std::env::var("QDRANT_URL") {
        Ok(url) => {
            info!(%url, collection = %config.vector_store.chroma_collection_name, "connecting to qdrant");
            let store = kindred_vectorstore::QdrantVectorStore::connect(
                &url,
                config.vector_store.chroma_collection_name.clone(),
                EMBEDDING_DIMENSION,
                embedding,
            )
            .await
            .context("failed to connect to qdrant")?;
            Ok(Arc::new(store))
        }
        Err(_) => {
            info!("QDRANT_URL not set, using in-memory vector store");
            Ok(Arc::new(InMemoryVectorStore::new(embedding)))
        }
    }
}

fn ensure_writable(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let probe = dir.join(".kindred-write-probe");
    std::fs::write(&probe, b"ok").with_context(|| format!("{} is not writable", dir.display()))?;
    std::fs::remove_file(&probe).ok();
    Ok(())
}
