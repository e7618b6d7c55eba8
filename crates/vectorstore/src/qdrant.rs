//! Qdrant-backed [`VectorStore`]. Stands in for the Chroma-style backend the
//! configuration surface is named after (see DESIGN.md). Search and probe
//! failures degrade to empty/zero results rather than propagating, matching
//! this port's contract for read-path failures.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kindred_domain::QaRecord;
use kindred_embedding::EmbeddingClient;
use qdrant_client::qdrant::{
    Condition, CreateCollectionBuilder, Distance, Filter, PointStruct, ScrollPointsBuilder,
    SearchPointsBuilder, UpsertPointsBuilder, VectorParamsBuilder,
};
use qdrant_client::Qdrant;
use tracing::{debug, warn};

pub struct QdrantVectorStore {
    client: Qdrant,
    collection: String,
    embedding: Arc<dyn EmbeddingClient>,
    id_clock: AtomicU64,
}

impl QdrantVectorStore {
    pub async fn connect(
        url: &str,
        collection: impl Into<String>,
        dimension: u64,
        embedding: Arc<dyn EmbeddingClient>,
    ) -> Result<Self> {
        let client = Qdrant::from_url(url).build().context("failed to build qdrant client")?;
        let collection = collection.into();

        if !client
            .collection_exists(collection.clone())
            .await
            .context("failed to check collection existence")?
        {
            client
                .create_collection(
                    CreateCollectionBuilder::new(collection.clone())
                        .vectors_config(VectorParamsBuilder::new(dimension, Distance::Cosine)),
                )
                .await
                .context("failed to create collection")?;
        }

        Ok(Self { client, collection, embedding, id_clock: AtomicU64::new(0) })
    }

    fn next_id(&self, family_id: &str, member_id: &str) -> String {
        let now_ms = Utc::now().timestamp_millis().max(0) as u64;
        let previous = self.id_clock.fetch_max(now_ms, Ordering::SeqCst);
        let stamp = if now_ms > previous { now_ms } else { self.id_clock.fetch_add(1, Ordering::SeqCst) + 1 };
        format!("{family_id}_{member_id}_{stamp}")
    }
}

fn qa_to_payload(qa: &QaRecord) -> serde_json::Value {
    serde_json::json!({
        "family_id": qa.family_id,
        "member_id": qa.member_id,
        "role_label": qa.role_label,
        "question": qa.question,
        "answer": qa.answer,
        "answered_at": qa.answered_at.to_rfc3339(),
    })
}

fn payload_to_qa(payload: &std::collections::HashMap<String, qdrant_client::qdrant::Value>) -> Option<QaRecord> {
    let get_str = |key: &str| payload.get(key).and_then(|v| v.as_str()).map(|s| s.to_string());
    let family_id = get_str("family_id")?;
    let member_id = get_str("member_id")?;
    let role_label = get_str("role_label")?;
    let question = get_str("question")?;
    let answer = get_str("answer").unwrap_or_default();
    let answered_at_raw = get_str("answered_at")?;
    let answered_at = DateTime::parse_from_rfc3339(&answered_at_raw).ok()?.with_timezone(&Utc);
    QaRecord::new(family_id, member_id, role_label, question, answer, answered_at).ok()
}

#[async_trait]
impl crate::port::VectorStore for QdrantVectorStore {
    async fn store(&self, qa: &QaRecord) -> Result<bool> {
        let vector = self.embedding.embed(&qa.render_embedding_text()).await?;
        let id = self.next_id(&qa.family_id, &qa.member_id);
        let payload = qa_to_payload(qa);
        let point = PointStruct::new(id, vector, qdrant_client::Payload::try_from(payload)?);

        self.client
            .upsert_points(UpsertPointsBuilder::new(self.collection.clone(), vec![point]))
            .await
            .context("qdrant upsert failed")?;
        Ok(true)
    }

    async fn search_by_member(&self, member_id: &str, query_qa: &QaRecord, k: usize) -> Result<Vec<QaRecord>> {
        self.search_filtered(Filter::must([Condition::matches("member_id", member_id.to_string())]), query_qa, k)
            .await
    }

    async fn search_by_family(&self, family_id: &str, query_qa: &QaRecord, k: usize) -> Result<Vec<QaRecord>> {
        self.search_filtered(Filter::must([Condition::matches("family_id", family_id.to_string())]), query_qa, k)
            .await
    }

    async fn search_similar_questions(&self, question_text: &str, member_id: &str) -> Result<f64> {
        let vector = match self.embedding.embed(question_text).await {
            Ok(v) => v,
            Err(err) => {
                warn!(error = %err, "embedding failed during novelty probe");
                return Ok(0.0);
            }
        };

        let filter = Filter::must([Condition::matches("member_id", member_id.to_string())]);
        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(self.collection.clone(), vector, 1)
                    .filter(filter)
                    .with_payload(true),
            )
            .await;

        match response {
            Ok(r) => Ok(r.result.first().map(|p| p.score as f64).unwrap_or(0.0).clamp(0.0, 1.0)),
            Err(err) => {
                warn!(error = %err, "qdrant search failed during novelty probe");
                Ok(0.0)
            }
        }
    }

    async fn get_recent_questions_by_member(&self, member_id: &str, limit: usize) -> Result<Vec<QaRecord>> {
        let mut records = self.scan_filtered(Filter::must([Condition::matches("member_id", member_id.to_string())])).await?;
        records.sort_by(|a, b| b.answered_at.cmp(&a.answered_at));
        records.truncate(limit);
        Ok(records)
    }

    async fn get_recent_questions_by_family(&self, family_id: &str, limit_per_member: usize) -> Result<Vec<QaRecord>> {
        let records = self.scan_filtered(Filter::must([Condition::matches("family_id", family_id.to_string())])).await?;
        let mut by_member: std::collections::HashMap<String, Vec<QaRecord>> = std::collections::HashMap::new();
        for record in records {
            by_member.entry(record.member_id.clone()).or_default().push(record);
        }
        let mut result = Vec::new();
        for group in by_member.values_mut() {
            group.sort_by(|a, b| b.answered_at.cmp(&a.answered_at));
            group.truncate(limit_per_member);
            result.extend(group.drain(..));
        }
        Ok(result)
    }

    async fn get_qa_by_family_in_range(&self, family_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<QaRecord>> {
        let mut records = self
            .scan_filtered(Filter::must([Condition::matches("family_id", family_id.to_string())]))
            .await?;
        records.retain(|r| r.answered_at >= start && r.answered_at <= end);
        records.sort_by(|a, b| a.answered_at.cmp(&b.answered_at));
        Ok(records)
    }

    async fn delete_by_member(&self, member_id: &str) -> Result<usize> {
        let existing = self.scan_filtered(Filter::must([Condition::matches("member_id", member_id.to_string())])).await?;
        if existing.is_empty() {
            return Ok(0);
        }

        let filter = Filter::must([Condition::matches("member_id", member_id.to_string())]);
        self.client
            .delete_points(qdrant_client::qdrant::DeletePointsBuilder::new(self.collection.clone()).points(filter))
            .await
            .context("qdrant delete failed")?;
        Ok(existing.len())
    }
}

impl QdrantVectorStore {
    async fn search_filtered(&self, filter: Filter, query_qa: &QaRecord, k: usize) -> Result<Vec<QaRecord>> {
        let vector = self.embedding.embed(&query_qa.render_embedding_text()).await?;
        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(self.collection.clone(), vector, k as u64)
                    .filter(filter)
                    .with_payload(true),
            )
            .await;

        match response {
            Ok(r) => Ok(r.result.iter().filter_map(|p| payload_to_qa(&p.payload)).collect()),
            Err(err) => {
                warn!(error = %err, "qdrant search failed, degrading to empty result");
                Ok(Vec::new())
            }
        }
    }

    async fn scan_filtered(&self, filter: Filter) -> Result<Vec<QaRecord>> {
        let mut records = Vec::new();
        let mut offset = None;
        loop {
            let mut builder = ScrollPointsBuilder::new(self.collection.clone())
                .filter(filter.clone())
                .with_payload(true)
                .limit(256);
            if let Some(id) = offset.take() {
                builder = builder.offset(id);
            }

            let response = self.client.scroll(builder).await.context("qdrant scroll failed")?;
            debug!(count = response.result.len(), "scanned qdrant batch");
            records.extend(response.result.iter().filter_map(|p| payload_to_qa(&p.payload)));

            match response.next_page_offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }
        Ok(records)
    }
}
