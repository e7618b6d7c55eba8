use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kindred_domain::QaRecord;
use kindred_embedding::EmbeddingClient;
use tokio::sync::Mutex;
use tracing::debug;

use crate::port::{cosine_similarity, VectorStore};

struct StoredRecord {
    id: String,
    qa: QaRecord,
    vector: Vec<f32>,
}

/// In-process test double for [`VectorStore`]. Mirrors the id scheme and
/// scan-then-sort strategy the qdrant-backed adapter uses, without a network
/// round trip, so use-case tests stay fast and deterministic.
pub struct InMemoryVectorStore {
    embedding: Arc<dyn EmbeddingClient>,
    records: Mutex<Vec<StoredRecord>>,
    id_clock: AtomicU64,
}

impl InMemoryVectorStore {
    pub fn new(embedding: Arc<dyn EmbeddingClient>) -> Self {
        Self {
            embedding,
            records: Mutex::new(Vec::new()),
            id_clock: AtomicU64::new(0),
        }
    }

    /// `{family_id}_{member_id}_{monotonic-ms-timestamp}`; monotonic only
    /// within this process, which is all the contract requires.
    fn next_id(&self, family_id: &str, member_id: &str) -> String {
        let now_ms = Utc::now().timestamp_millis().max(0) as u64;
        let previous = self.id_clock.fetch_max(now_ms, Ordering::SeqCst);
        let stamp = if now_ms > previous {
            now_ms
        } else {
            self.id_clock.fetch_add(1, Ordering::SeqCst) + 1
        };
        format!("{family_id}_{member_id}_{stamp}")
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn store(&self, qa: &QaRecord) -> Result<bool> {
        let vector = self.embedding.embed(&qa.render_embedding_text()).await?;
        let id = self.next_id(&qa.family_id, &qa.member_id);
        debug!(%id, member_id = %qa.member_id, "storing qa record");
        self.records.lock().await.push(StoredRecord { id, qa: qa.clone(), vector });
        Ok(true)
    }

    async fn search_by_member(
        &self,
        member_id: &str,
        query_qa: &QaRecord,
        k: usize,
    ) -> Result<Vec<QaRecord>> {
        let query_vector = self.embedding.embed(&query_qa.render_embedding_text()).await?;
        let records = self.records.lock().await;
        Ok(top_k_by_similarity(
            records.iter().filter(|r| r.qa.member_id == member_id),
            &query_vector,
            k,
        ))
    }

    async fn search_by_family(
        &self,
        family_id: &str,
        query_qa: &QaRecord,
        k: usize,
    ) -> Result<Vec<QaRecord>> {
        let query_vector = self.embedding.embed(&query_qa.render_embedding_text()).await?;
        let records = self.records.lock().await;
        Ok(top_k_by_similarity(
            records.iter().filter(|r| r.qa.family_id == family_id),
            &query_vector,
            k,
        ))
    }

    async fn search_similar_questions(&self, question_text: &str, member_id: &str) -> Result<f64> {
        let records = self.records.lock().await;
        let owned: Vec<&StoredRecord> = records.iter().filter(|r| r.qa.member_id == member_id).collect();
        if owned.is_empty() {
            return Ok(0.0);
        }
        let probe_vector = self.embedding.embed(question_text).await?;
        let best = owned
            .iter()
            .map(|r| cosine_similarity(&probe_vector, &r.vector))
            .fold(f64::MIN, f64::max);
        Ok(best.clamp(0.0, 1.0))
    }

    async fn get_recent_questions_by_member(
        &self,
        member_id: &str,
        limit: usize,
    ) -> Result<Vec<QaRecord>> {
        let records = self.records.lock().await;
        let mut owned: Vec<QaRecord> = records
            .iter()
            .filter(|r| r.qa.member_id == member_id)
            .map(|r| r.qa.clone())
            .collect();
        owned.sort_by(|a, b| b.answered_at.cmp(&a.answered_at));
        owned.truncate(limit);
        Ok(owned)
    }

    async fn get_recent_questions_by_family(
        &self,
        family_id: &str,
        limit_per_member: usize,
    ) -> Result<Vec<QaRecord>> {
        let records = self.records.lock().await;
        let mut by_member: std::collections::HashMap<String, Vec<QaRecord>> = std::collections::HashMap::new();
        for record in records.iter().filter(|r| r.qa.family_id == family_id) {
            by_member.entry(record.qa.member_id.clone()).or_default().push(record.qa.clone());
        }

        let mut result = Vec::new();
        for group in by_member.values_mut() {
            group.sort_by(|a, b| b.answered_at.cmp(&a.answered_at));
            group.truncate(limit_per_member);
            result.extend(group.drain(..));
        }
        Ok(result)
    }

    async fn get_qa_by_family_in_range(
        &self,
        family_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<QaRecord>> {
        let records = self.records.lock().await;
        let mut matching: Vec<QaRecord> = records
            .iter()
            .filter(|r| r.qa.family_id == family_id && r.qa.answered_at >= start && r.qa.answered_at <= end)
            .map(|r| r.qa.clone())
            .collect();
        matching.sort_by(|a, b| a.answered_at.cmp(&b.answered_at));
        Ok(matching)
    }

    async fn delete_by_member(&self, member_id: &str) -> Result<usize> {
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|r| r.qa.member_id != member_id);
        Ok(before - records.len())
    }
}

fn top_k_by_similarity<'a>(
    candidates: impl Iterator<Item = &'a StoredRecord>,
    query_vector: &[f32],
    k: usize,
) -> Vec<QaRecord> {
    let mut scored: Vec<(f64, &StoredRecord)> = candidates
        .map(|r| (cosine_similarity(query_vector, &r.vector), r))
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.1.id.cmp(&b.1.id)));
    scored.into_iter().take(k).map(|(_, r)| r.qa.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;

    struct StubEmbedding;

    #[async_trait]
    impl EmbeddingClient for StubEmbedding {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            // crude bag-of-chars embedding, enough to separate distinct texts
            let mut vector = vec![0.0f32; 8];
            for (i, byte) in text.bytes().enumerate() {
                vector[i % 8] += byte as f32;
            }
            Ok(vector)
        }

        fn model(&self) -> &str {
            "stub"
        }
    }

    fn qa(family: &str, member: &str, question: &str, when: DateTime<Utc>) -> QaRecord {
        QaRecord::new(family, member, "엄마", question, "답변", when).unwrap()
    }

    #[tokio::test]
    async fn store_then_search_by_member_finds_it() {
        let store = InMemoryVectorStore::new(Arc::new(StubEmbedding));
        let when = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let record = qa("fam1", "mem1", "오늘 기분이 어때요?", when);
        store.store(&record).await.unwrap();

        let results = store.search_by_member("mem1", &record, 5).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].question, record.question);
    }

    #[tokio::test]
    async fn search_similar_questions_is_zero_for_unknown_member() {
        let store = InMemoryVectorStore::new(Arc::new(StubEmbedding));
        let similarity = store.search_similar_questions("아무 질문", "ghost").await.unwrap();
        assert_eq!(similarity, 0.0);
    }

    #[tokio::test]
    async fn delete_by_member_reports_zero_for_unknown_owner() {
        let store = InMemoryVectorStore::new(Arc::new(StubEmbedding));
        assert_eq!(store.delete_by_member("ghost").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn recent_by_member_is_sorted_descending_and_truncated() {
        let store = InMemoryVectorStore::new(Arc::new(StubEmbedding));
        for day in 1..=5 {
            let when = Utc.with_ymd_and_hms(2026, 1, day, 0, 0, 0).unwrap();
            store.store(&qa("fam1", "mem1", &format!("q{day}"), when)).await.unwrap();
        }

        let recent = store.get_recent_questions_by_member("mem1", 2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].question, "q5");
        assert_eq!(recent[1].question, "q4");
    }

    #[tokio::test]
    async fn range_query_is_closed_and_ascending() {
        let store = InMemoryVectorStore::new(Arc::new(StubEmbedding));
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mid = Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 1, 3, 0, 0, 0).unwrap();
        store.store(&qa("fam1", "mem1", "first", start)).await.unwrap();
        store.store(&qa("fam1", "mem1", "second", mid)).await.unwrap();
        store.store(&qa("fam1", "mem1", "third", end)).await.unwrap();

        let in_range = store.get_qa_by_family_in_range("fam1", start, mid).await.unwrap();
        assert_eq!(in_range.len(), 2);
        assert_eq!(in_range[0].question, "first");
        assert_eq!(in_range[1].question, "second");
    }
}
