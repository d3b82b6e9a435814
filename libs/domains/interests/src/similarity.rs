//! Candidate selection and similarity ranking.

use async_trait::async_trait;
use std::cmp::Ordering;
use std::sync::Arc;

use crate::error::InterestResult;
use crate::math::cosine_similarity;
use crate::models::{InterestCandidate, SimilarInterest};
use crate::repository::InterestRepository;
use crate::settings::{CandidateStrategy, EngineSettings};

/// Chooses which interests a source interest is compared against.
#[async_trait]
pub trait CandidateSelector: Send + Sync {
    async fn select(
        &self,
        repository: &dyn InterestRepository,
        source_id: &str,
    ) -> InterestResult<Vec<InterestCandidate>>;
}

/// Bounded random sample; approximate nearest neighbours at constant cost.
#[derive(Debug, Clone, Copy)]
pub struct RandomSampleSelector {
    pub sample_size: usize,
}

#[async_trait]
impl CandidateSelector for RandomSampleSelector {
    async fn select(
        &self,
        repository: &dyn InterestRepository,
        source_id: &str,
    ) -> InterestResult<Vec<InterestCandidate>> {
        repository
            .sample_interests_excluding(source_id, self.sample_size)
            .await
    }
}

/// Every other interest with a vector. Exact, linear in corpus size.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExhaustiveSelector;

#[async_trait]
impl CandidateSelector for ExhaustiveSelector {
    async fn select(
        &self,
        repository: &dyn InterestRepository,
        source_id: &str,
    ) -> InterestResult<Vec<InterestCandidate>> {
        repository.interests_with_vectors_excluding(source_id).await
    }
}

pub fn selector_for(settings: &EngineSettings) -> Arc<dyn CandidateSelector> {
    match settings.strategy {
        CandidateStrategy::Sample => Arc::new(RandomSampleSelector {
            sample_size: settings.sample_size,
        }),
        CandidateStrategy::Exhaustive => Arc::new(ExhaustiveSelector),
    }
}

/// Scores candidates against `source`, keeps those strictly above `threshold`
/// and returns at most `limit`, best first. Ties keep candidate order.
pub fn rank_candidates(
    source: &[f32],
    candidates: Vec<InterestCandidate>,
    threshold: f64,
    limit: usize,
) -> Vec<SimilarInterest> {
    let mut ranked: Vec<SimilarInterest> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let similarity = cosine_similarity(source, &candidate.vector);
            (similarity > threshold).then_some(SimilarInterest {
                interest_id: candidate.id,
                name: candidate.name,
                description: candidate.description,
                similarity,
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(Ordering::Equal)
    });
    ranked.truncate(limit);
    ranked
}
