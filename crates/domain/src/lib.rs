mod error;
mod novelty;
mod period;
mod qa_record;
mod question_level;

pub use error::{DomainError, DomainResult};
pub use novelty::NoveltyState;
pub use period::{Period, PeriodWindow};
pub use qa_record::{QaMetadata, QaRecord};
pub use question_level::QuestionLevel;
