use std::sync::Arc;

use kindred_domain::DomainError;
use kindred_vectorstore::VectorStore;
use tracing::info;

/// Used at account deletion; deleting a member with no stored records is a
/// caller-visible failure distinct from a transport error.
pub struct MemberLifecycleUseCase {
    vector_store: Arc<dyn VectorStore>,
}

impl MemberLifecycleUseCase {
    pub fn new(vector_store: Arc<dyn VectorStore>) -> Self {
        Self { vector_store }
    }

    pub async fn delete_member(&self, member_id: &str) -> Result<usize, DomainError> {
        let deleted = self
            .vector_store
            .delete_by_member(member_id)
            .await
            .map_err(|e| DomainError::UpstreamUnavailable(e.to_string()))?;

        if deleted == 0 {
            return Err(DomainError::NotFound(format!("member {member_id} has no stored records")));
        }

        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use kindred_domain::QaRecord;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubStore(AtomicUsize);

    #[async_trait]
    impl VectorStore for StubStore {
        async fn store(&self, _qa: &QaRecord) -> anyhow::Result<bool> {
            Ok(true)
        }
        async fn search_by_member(&self, _: &str, _: &QaRecord, _: usize) -> anyhow::Result<Vec<QaRecord>> {
            Ok(vec![])
        }
        async fn search_by_family(&self, _: &str, _: &QaRecord, _: usize) -> anyhow::Result<Vec<QaRecord>> {
            Ok(vec![])
        }
        async fn search_similar_questions(&self, _: &str, _: &str) -> anyhow::Result<f64> {
            Ok(0.0)
        }
        async fn get_recent_questions_by_member(&self, _: &str, _: usize) -> anyhow::Result<Vec<QaRecord>> {
            Ok(vec![])
        }
        async fn get_recent_questions_by_family(&self, _: &str, _: usize) -> anyhow::Result<Vec<QaRecord>> {
            Ok(vec![])
        }
        async fn get_qa_by_family_in_range(
            &self,
            _: &str,
            _: DateTime<Utc>,
            _: DateTime<Utc>,
        ) -> anyhow::Result<Vec<QaRecord>> {
            Ok(vec![])
        }
        async fn delete_by_member(&self, _: &str) -> anyhow::Result<usize> {
            Ok(self.0.load(Ordering::SeqCst))
        }
    }

    #[tokio::test]
    async fn zero_deleted_is_not_found() {
        let use_case = MemberLifecycleUseCase::new(Arc::new(StubStore(AtomicUsize::new(0))));
        let result = use_case.delete_member("ghost").await;
        assert!(matches!(result, Err(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn nonzero_deleted_succeeds() {
        let use_case = MemberLifecycleUseCase::new(Arc::new(StubStore(AtomicUsize::new(4))));
        assert_eq!(use_case.delete_member("m1").await.unwrap(), 4);
    }
}
