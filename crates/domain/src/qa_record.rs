use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A single question/answer exchange attributed to one member at one time.
///
/// Immutable once constructed: nothing downstream of a `QaRecord` ever sees
/// `&mut QaRecord`. Superseding a past answer means appending a newer
/// record, never rewriting this one in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaRecord {
    pub family_id: String,
    pub member_id: String,
    pub role_label: String,
    pub question: String,
    pub answer: String,
    pub answered_at: DateTime<Utc>,
}

impl QaRecord {
    pub fn new(
        family_id: impl Into<String>,
        member_id: impl Into<String>,
        role_label: impl Into<String>,
        question: impl Into<String>,
        answer: impl Into<String>,
        answered_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let family_id = family_id.into();
        let member_id = member_id.into();
        let role_label = role_label.into();
        let question = question.into();
        if family_id.trim().is_empty() {
            return Err(DomainError::InvalidInput("family_id must not be empty".into()));
        }
        if member_id.trim().is_empty() {
            return Err(DomainError::InvalidInput("member_id must not be empty".into()));
        }
        if role_label.trim().is_empty() {
            return Err(DomainError::InvalidInput("role_label must not be empty".into()));
        }
        if question.trim().is_empty() {
            return Err(DomainError::InvalidInput("question must not be empty".into()));
        }
        Ok(Self {
            family_id,
            member_id,
            role_label,
            question,
            answer: answer.into(),
            answered_at,
        })
    }

    pub fn date_parts(&self) -> (i32, u32, u32) {
        (
            self.answered_at.year(),
            self.answered_at.month(),
            self.answered_at.day(),
        )
    }

    /// Canonical string form used both for embedding and for in-prompt
    /// display. Deterministic: same record → byte-identical text.
    pub fn render_embedding_text(&self) -> String {
        let (year, month, day) = self.date_parts();
        format!(
            "{year}년 {month}월 {day}일에 {role}이(가) 받은 질문: {question}\n답변: {answer}",
            role = self.role_label,
            question = self.question,
            answer = self.answer,
        )
    }
}

/// Metadata persisted alongside the vector for each record. The question
/// and answer text are deliberately *not* duplicated here — the rendered
/// text is the canonical body, stored by the vector store itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaMetadata {
    pub family_id: String,
    pub member_id: String,
    pub role_label: String,
    pub answered_at: DateTime<Utc>,
}

impl From<&QaRecord> for QaMetadata {
    fn from(record: &QaRecord) -> Self {
        Self {
            family_id: record.family_id.clone(),
            member_id: record.member_id.clone(),
            role_label: record.role_label.clone(),
            answered_at: record.answered_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> QaRecord {
        QaRecord::new(
            "F1",
            "M1",
            "첫째 딸",
            "오늘 뭐 했어?",
            "친구들과 놀았어요",
            Utc.with_ymd_and_hms(2026, 1, 20, 14, 30, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn rejects_empty_owner_fields() {
        let now = Utc::now();
        assert!(QaRecord::new("", "M1", "딸", "Q", "A", now).is_err());
        assert!(QaRecord::new("F1", "", "딸", "Q", "A", now).is_err());
        assert!(QaRecord::new("F1", "M1", "딸", "", "A", now).is_err());
    }

    #[test]
    fn rejects_empty_or_blank_role_label() {
        let now = Utc::now();
        assert!(QaRecord::new("F1", "M1", "", "Q", "A", now).is_err());
        assert!(QaRecord::new("F1", "M1", "   ", "Q", "A", now).is_err());
    }

    #[test]
    fn allows_empty_answer() {
        let now = Utc::now();
        assert!(QaRecord::new("F1", "M1", "딸", "Q", "", now).is_ok());
    }

    #[test]
    fn rendering_is_deterministic() {
        let record = sample();
        assert_eq!(record.render_embedding_text(), record.render_embedding_text());
        assert_eq!(
            record.render_embedding_text(),
            "2026년 1월 20일에 첫째 딸이(가) 받은 질문: 오늘 뭐 했어?\n답변: 친구들과 놀았어요"
        );
    }

    #[test]
    fn metadata_omits_question_and_answer() {
        let record = sample();
        let metadata = QaMetadata::from(&record);
        assert_eq!(metadata.family_id, record.family_id);
        assert_eq!(metadata.member_id, record.member_id);
        assert_eq!(metadata.answered_at, record.answered_at);
    }
}
