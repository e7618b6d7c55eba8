mod family_rag;
mod family_recent;
mod family_summary;
mod generator;
mod member_lifecycle;
mod novelty;
mod personal_rag;
mod response;

pub use family_rag::{FamilyRagInput, FamilyRagUseCase, FAMILY_PRIORITY};
pub use family_recent::{FamilyRecentInput, FamilyRecentUseCase, FAMILY_RECENT_PRIORITY};
pub use family_summary::{FamilySummaryInput, FamilySummaryResponse, FamilySummaryUseCase};
pub use generator::{render_context_list, GeneratedQuestion, QuestionGeneratorPort, SummaryGeneratorPort};
pub use member_lifecycle::MemberLifecycleUseCase;
pub use novelty::{NoveltyController, NoveltyPolicy};
pub use personal_rag::{PersonalRagInput, PersonalRagUseCase, PERSONAL_PRIORITY};
pub use response::{QuestionGenerationResponse, QuestionMetadata};
