use async_trait::async_trait;

use crate::error::InterestResult;

/// Turns interest names into fixed-length vectors.
///
/// Every call in a process returns vectors of length [`dimension`](Self::dimension).
/// Blank text, or text with no recognisable tokens, maps to the zero vector.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn dimension(&self) -> usize;

    async fn embed(&self, text: &str) -> InterestResult<Vec<f32>>;
}
