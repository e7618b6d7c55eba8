use async_trait::async_trait;
use kindred_domain::{DomainError, QaRecord, QuestionLevel};

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedQuestion {
    pub question: String,
    pub level: QuestionLevel,
}

/// Two modes: derive from a concrete base Q/A, or generate addressed to a
/// target member with no base.
#[async_trait]
pub trait QuestionGeneratorPort: Send + Sync {
    async fn derive(
        &self,
        base_qa: &QaRecord,
        rag_context: &[QaRecord],
    ) -> Result<GeneratedQuestion, DomainError>;

    async fn generate_for_target(
        &self,
        target_member_id: &str,
        target_role_label: &str,
        context: &[QaRecord],
    ) -> Result<GeneratedQuestion, DomainError>;
}

#[async_trait]
pub trait SummaryGeneratorPort: Send + Sync {
    async fn summarize(
        &self,
        qa_texts: &[String],
        period_label: &str,
        answer_count: usize,
    ) -> Result<String, DomainError>;
}

/// Renders `rag_context` as the numbered list the generator prompts expect,
/// truncated to `limit` entries.
pub fn render_context_list(context: &[QaRecord], limit: usize) -> String {
    context
        .iter()
        .take(limit)
        .enumerate()
        .map(|(i, qa)| {
            let (year, month, day) = qa.date_parts();
            format!(
                "{}. [{year}-{month:02}-{day:02}] {} ({}): {} / {}",
                i + 1,
                qa.role_label,
                qa.member_id,
                qa.question,
                qa.answer
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn render_context_list_truncates_and_numbers() {
        let context: Vec<QaRecord> = (1..=7)
            .map(|i| {
                QaRecord::new(
                    "F1",
                    "M1",
                    "딸",
                    format!("q{i}"),
                    format!("a{i}"),
                    Utc.with_ymd_and_hms(2026, 1, i, 0, 0, 0).unwrap(),
                )
                .unwrap()
            })
            .collect();

        let rendered = render_context_list(&context, 5);
        assert_eq!(rendered.lines().count(), 5);
        assert!(rendered.starts_with("1. "));
    }
}
