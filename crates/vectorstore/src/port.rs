use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kindred_domain::QaRecord;

/// A capability abstraction; concrete adapters own their own embedding and
/// persistence strategy.
///
/// Failure semantics: search operations may degrade to an empty list on
/// transport failure (the caller still logs), but `store` and
/// `delete_by_member` must surface errors rather than swallow them.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Appends `qa` as a new vector. No dedup; every call is a new record.
    async fn store(&self, qa: &QaRecord) -> Result<bool>;

    /// Up to `k` records owned by `member_id`, ranked by descending cosine
    /// similarity to the rendered text of `query_qa`.
    async fn search_by_member(
        &self,
        member_id: &str,
        query_qa: &QaRecord,
        k: usize,
    ) -> Result<Vec<QaRecord>>;

    /// Same as [`VectorStore::search_by_member`] but scoped to a family.
    async fn search_by_family(
        &self,
        family_id: &str,
        query_qa: &QaRecord,
        k: usize,
    ) -> Result<Vec<QaRecord>>;

    /// The novelty probe: embeds the raw `question_text`, finds the closest
    /// vector among `member_id`'s own records, and returns
    /// `1 - distance` clamped to `[0, 1]`. Returns `0.0` for a member with
    /// no stored vectors.
    async fn search_similar_questions(&self, question_text: &str, member_id: &str) -> Result<f64>;

    /// `member_id`'s `limit` most recent records, newest first.
    async fn get_recent_questions_by_member(
        &self,
        member_id: &str,
        limit: usize,
    ) -> Result<Vec<QaRecord>>;

    /// Per family member, `limit_per_member` most recent records. Ordering
    /// across the per-member groups in the returned list is unspecified.
    async fn get_recent_questions_by_family(
        &self,
        family_id: &str,
        limit_per_member: usize,
    ) -> Result<Vec<QaRecord>>;

    /// Closed-closed filter on `answered_at`, returned in ascending time
    /// order.
    async fn get_qa_by_family_in_range(
        &self,
        family_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<QaRecord>>;

    /// Deletes every record owned by `member_id`. Returns the count
    /// deleted; `0` means the member never had any stored record.
    async fn delete_by_member(&self, member_id: &str) -> Result<usize>;
}

pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| *x as f64 * *y as f64).sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_vectors_are_maximally_similar() {
        let v = vec![0.1, 0.2, 0.3];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn mismatched_lengths_are_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0]), 0.0);
    }
}
