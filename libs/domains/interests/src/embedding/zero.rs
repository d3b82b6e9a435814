use async_trait::async_trait;

use super::EmbeddingProvider;
use crate::error::InterestResult;

/// Provider used when no model is configured or the model failed to load.
///
/// All interests embed to the zero vector, so every similarity is 0 and nothing
/// passes the threshold. Writes still succeed.
#[derive(Debug, Clone)]
pub struct ZeroEmbeddingProvider {
    dimension: usize,
}

impl ZeroEmbeddingProvider {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

#[async_trait]
impl EmbeddingProvider for ZeroEmbeddingProvider {
    fn name(&self) -> &'static str {
        "none"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, _text: &str) -> InterestResult<Vec<f32>> {
        Ok(vec![0.0; self.dimension])
    }
}
