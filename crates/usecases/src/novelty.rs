use std::future::Future;

use kindred_domain::{DomainError, NoveltyState};

use crate::generator::GeneratedQuestion;

#[derive(Debug, Clone, Copy)]
pub struct NoveltyPolicy {
    pub threshold: f64,
    pub max_attempts: u32,
}

impl Default for NoveltyPolicy {
    fn default() -> Self {
        Self { threshold: 0.9, max_attempts: 3 }
    }
}

/// Bounded-retry policy shared by every novelty-controlled use case. A
/// generation attempt that fails with [`DomainError::ContractViolation`]
/// still consumes one of the `M` attempts; the controller only propagates
/// that error once the budget is exhausted.
pub struct NoveltyController {
    policy: NoveltyPolicy,
}

impl NoveltyController {
    pub fn new(policy: NoveltyPolicy) -> Self {
        Self { policy }
    }

    pub async fn run<G, GFut, P, PFut>(
        &self,
        mut generate: G,
        mut probe: P,
    ) -> Result<(GeneratedQuestion, NoveltyState), DomainError>
    where
        G: FnMut() -> GFut,
        GFut: Future<Output = Result<GeneratedQuestion, DomainError>>,
        P: FnMut(String) -> PFut,
        PFut: Future<Output = Result<f64, DomainError>>,
    {
        let mut last_error = None;

        for attempt in 1..=self.policy.max_attempts {
            let generated = match generate().await {
                Ok(g) => g,
                Err(err @ DomainError::ContractViolation(_)) => {
                    last_error = Some(err);
                    continue;
                }
                Err(err) => return Err(err),
            };

            let similarity = probe(generated.question.clone()).await?;
            let too_similar = similarity >= self.policy.threshold;

            if !too_similar {
                return Ok((
                    generated,
                    NoveltyState {
                        attempts_used: attempt,
                        last_similarity: similarity,
                        similarity_warning: false,
                    },
                ));
            }

            if attempt == self.policy.max_attempts {
                return Ok((
                    generated,
                    NoveltyState {
                        attempts_used: attempt,
                        last_similarity: similarity,
                        similarity_warning: true,
                    },
                ));
            }
        }

        Err(last_error.unwrap_or_else(|| {
            DomainError::ContractViolation("generator exhausted retries with no valid output".into())
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kindred_domain::QuestionLevel;
    use std::cell::RefCell;

    fn question(text: &str) -> GeneratedQuestion {
        GeneratedQuestion { question: text.to_string(), level: QuestionLevel::from_any(2) }
    }

    #[tokio::test]
    async fn accepts_on_first_low_similarity() {
        let controller = NoveltyController::new(NoveltyPolicy::default());
        let calls = RefCell::new(0);

        let (generated, state) = controller
            .run(
                || {
                    *calls.borrow_mut() += 1;
                    async { Ok(question("새로운 질문")) }
                },
                |_| async { Ok(0.3) },
            )
            .await
            .unwrap();

        assert_eq!(generated.question, "새로운 질문");
        assert_eq!(state.attempts_used, 1);
        assert!(!state.similarity_warning);
        assert_eq!(*calls.borrow(), 1);
    }

    #[tokio::test]
    async fn warns_after_exhausting_all_attempts() {
        let controller = NoveltyController::new(NoveltyPolicy::default());
        let calls = RefCell::new(0);

        let (generated, state) = controller
            .run(
                || {
                    *calls.borrow_mut() += 1;
                    async { Ok(question("계속 유사한 질문")) }
                },
                |_| async { Ok(0.95) },
            )
            .await
            .unwrap();

        assert_eq!(generated.question, "계속 유사한 질문");
        assert_eq!(state.attempts_used, 3);
        assert_eq!(state.regeneration_count(), 2);
        assert!(state.similarity_warning);
        assert_eq!(*calls.borrow(), 3);
    }

    #[tokio::test]
    async fn contract_violation_retries_then_propagates() {
        let controller = NoveltyController::new(NoveltyPolicy::default());

        let result = controller
            .run(
                || async { Err(DomainError::ContractViolation("missing level".into())) },
                |_| async { Ok(0.0) },
            )
            .await;

        assert!(matches!(result, Err(DomainError::ContractViolation(_))));
    }

    #[tokio::test]
    async fn contract_violation_then_success_recovers() {
        let controller = NoveltyController::new(NoveltyPolicy::default());
        let attempt = RefCell::new(0);

        let (generated, state) = controller
            .run(
                || {
                    let mut n = attempt.borrow_mut();
                    *n += 1;
                    let current = *n;
                    async move {
                        if current == 1 {
                            Err(DomainError::ContractViolation("missing question".into()))
                        } else {
                            Ok(question("복구된 질문"))
                        }
                    }
                },
                |_| async { Ok(0.1) },
            )
            .await
            .unwrap();

        assert_eq!(generated.question, "복구된 질문");
        assert_eq!(state.attempts_used, 2);
    }
}
