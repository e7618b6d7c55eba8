use chrono::{DateTime, Utc};
use kindred_domain::{Period, QuestionLevel};
use kindred_usecases::{
    FamilyRagInput, FamilyRecentInput, FamilySummaryInput, PersonalRagInput, QuestionGenerationResponse,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuestionRequest {
    pub family_id: String,
    pub member_id: String,
    pub role_label: String,
    pub base_question: String,
    pub base_answer: String,
    pub answered_at: DateTime<Utc>,
}

impl From<GenerateQuestionRequest> for PersonalRagInput {
    fn from(body: GenerateQuestionRequest) -> Self {
        PersonalRagInput {
            family_id: body.family_id,
            member_id: body.member_id,
            role_label: body.role_label,
            base_question: body.base_question,
            base_answer: body.base_answer,
            answered_at: body.answered_at,
        }
    }
}

impl From<GenerateQuestionRequest> for FamilyRagInput {
    fn from(body: GenerateQuestionRequest) -> Self {
        FamilyRagInput {
            family_id: body.family_id,
            member_id: body.member_id,
            role_label: body.role_label,
            base_question: body.base_question,
            base_answer: body.base_answer,
            answered_at: body.answered_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateFamilyRecentRequest {
    pub family_id: String,
    pub target_member_id: String,
    pub target_role_label: String,
    #[serde(default)]
    pub member_ids: Vec<String>,
}

impl From<GenerateFamilyRecentRequest> for FamilyRecentInput {
    fn from(body: GenerateFamilyRecentRequest) -> Self {
        FamilyRecentInput {
            family_id: body.family_id,
            target_member_id: body.target_member_id,
            target_role_label: body.target_role_label,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuestionResponseBody {
    pub member_id: String,
    pub content: String,
    pub level: i64,
    pub priority: u8,
    pub metadata: QuestionMetadataBody,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionMetadataBody {
    pub rag_count: usize,
    pub member_id: String,
    pub family_id: String,
    pub regeneration_count: u32,
    pub similarity_warning: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_count: Option<usize>,
}

impl From<QuestionGenerationResponse> for GenerateQuestionResponseBody {
    fn from(response: QuestionGenerationResponse) -> Self {
        Self {
            member_id: response.member_id,
            content: response.content,
            level: level_to_int(response.level),
            priority: response.priority,
            metadata: QuestionMetadataBody {
                rag_count: response.metadata.rag_count,
                member_id: response.metadata.member_id,
                family_id: response.metadata.family_id,
                regeneration_count: response.metadata.regeneration_count,
                similarity_warning: response.metadata.similarity_warning,
                context_count: response.metadata.context_count,
            },
        }
    }
}

fn level_to_int(level: QuestionLevel) -> i64 {
    level.get()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryQuery {
    pub family_id: String,
    pub period: String,
}

impl SummaryQuery {
    pub fn into_input(self) -> Result<FamilySummaryInput, ApiError> {
        let period = Period::parse(&self.period)
            .ok_or_else(|| ApiError::malformed(format!("unknown period: {}", self.period)))?;
        Ok(FamilySummaryInput { family_id: self.family_id, period })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryResponseBody {
    pub context: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMemberRequest {
    pub member_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMemberResponseBody {
    pub deleted_count: usize,
}
