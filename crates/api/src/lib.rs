mod dto;
mod error;

pub use dto::{
    DeleteMemberRequest, DeleteMemberResponseBody, GenerateFamilyRecentRequest, GenerateQuestionRequest,
    GenerateQuestionResponseBody, QuestionMetadataBody, SummaryQuery, SummaryResponseBody,
};
pub use error::ApiError;
