/// Transient per-generation-attempt state. Never persisted; it only exists
/// to be folded into a use case's response metadata.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoveltyState {
    pub attempts_used: u32,
    pub last_similarity: f64,
    pub similarity_warning: bool,
}

impl NoveltyState {
    /// `regeneration_count` as exposed in response metadata: one less than
    /// the number of generator invocations, since the first attempt is not
    /// a "regeneration".
    pub fn regeneration_count(&self) -> u32 {
        self.attempts_used.saturating_sub(1)
    }
}
