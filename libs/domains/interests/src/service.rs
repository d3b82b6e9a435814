use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use validator::Validate;

use crate::embedding::EmbeddingProvider;
use crate::error::{InterestError, InterestResult};
use crate::models::{
    CreateUser, Interest, InterestInput, Recommendation, SimilarInterest, User, UserCreation,
};
use crate::recommendation::score_candidates;
use crate::repository::InterestRepository;
use crate::settings::EngineSettings;
use crate::similarity::{CandidateSelector, rank_candidates, selector_for};

/// Service layer for profiles, interest sets and recommendations
#[derive(Clone)]
pub struct InterestService<R: InterestRepository> {
    repository: Arc<R>,
    embedder: Arc<dyn EmbeddingProvider>,
    selector: Arc<dyn CandidateSelector>,
    settings: EngineSettings,
}

impl<R: InterestRepository> InterestService<R> {
    pub fn new(
        repository: R,
        embedder: Arc<dyn EmbeddingProvider>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            repository: Arc::new(repository),
            selector: selector_for(&settings),
            embedder,
            settings,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Create a profile; existing profiles are left untouched.
    pub async fn create_user(
        &self,
        user_id: &str,
        input: CreateUser,
    ) -> InterestResult<UserCreation> {
        validate_user_id(user_id)?;
        input.validate()?;

        if self.repository.user_exists(user_id).await? {
            return Ok(UserCreation::AlreadyExists);
        }

        let defaults = User::new(user_id);
        self.repository
            .create_user(
                user_id,
                input.name.as_deref().unwrap_or(&defaults.name),
                input.email.as_deref().unwrap_or(&defaults.email),
            )
            .await?;

        tracing::info!(user_id, "Created user");
        Ok(UserCreation::Created)
    }

    /// Interests of a user. Unknown users are created with an empty set.
    pub async fn get_interests(&self, user_id: &str) -> InterestResult<Vec<Interest>> {
        validate_user_id(user_id)?;

        if !self.ensure_user(user_id).await? {
            return Ok(Vec::new());
        }
        self.repository.get_user_interests(user_id).await
    }

    /// Replace a user's interest set.
    ///
    /// All edges are removed first, then each interest is embedded, upserted and
    /// linked in input order. A failure in the second phase leaves the user with
    /// a partial set and returns [`InterestError::PartialWrite`]; repeating the
    /// call with the same input converges.
    pub async fn set_interests(
        &self,
        user_id: &str,
        interests: Vec<InterestInput>,
    ) -> InterestResult<()> {
        validate_user_id(user_id)?;
        for interest in &interests {
            interest.validate()?;
        }

        self.ensure_user(user_id).await?;
        self.repository.delete_user_interest_edges(user_id).await?;

        for interest in &interests {
            if let Err(e) = self.link_interest(user_id, interest).await {
                tracing::error!(
                    user_id,
                    interest_id = %interest.id,
                    error = %e,
                    "Interest set update failed after edges were cleared"
                );
                return Err(InterestError::PartialWrite {
                    user_id: user_id.to_string(),
                    interest_id: interest.id.clone(),
                    reason: e.to_string(),
                });
            }
        }

        tracing::info!(user_id, count = interests.len(), "Updated interests");
        Ok(())
    }

    /// Interests most similar to `interest_id`, best first.
    ///
    /// An interest without a stored vector has no similar interests.
    pub async fn find_similar_interests(
        &self,
        interest_id: &str,
        limit: usize,
    ) -> InterestResult<Vec<SimilarInterest>> {
        let Some(source) = self.repository.get_interest_vector(interest_id).await? else {
            tracing::debug!(interest_id, "No vector stored for interest");
            return Ok(Vec::new());
        };

        let candidates = self
            .selector
            .select(self.repository.as_ref(), interest_id)
            .await?;
        let sampled = candidates.len();

        let similar = rank_candidates(
            &source,
            candidates,
            self.settings.similarity_threshold,
            limit,
        );

        tracing::debug!(
            interest_id,
            sampled,
            matched = similar.len(),
            "Ranked similar interests"
        );
        Ok(similar)
    }

    pub async fn recommend(
        &self,
        interest_id: &str,
        limit: usize,
    ) -> InterestResult<Recommendation> {
        self.recommend_at(interest_id, limit, Utc::now()).await
    }

    /// Similar interests plus the users to surface for them, as of `now`.
    ///
    /// `limit` bounds both lists. Every returned user has `last_recommended_at`
    /// set to `now` and is skipped by later calls until the cooldown elapses.
    pub async fn recommend_at(
        &self,
        interest_id: &str,
        limit: usize,
        now: DateTime<Utc>,
    ) -> InterestResult<Recommendation> {
        if limit == 0 {
            return Err(InterestError::Validation(
                "limit must be at least 1".to_string(),
            ));
        }

        let similar_interests = self.find_similar_interests(interest_id, limit).await?;
        if similar_interests.is_empty() {
            return Ok(Recommendation::empty(now));
        }

        let weights: HashMap<String, f64> = similar_interests
            .iter()
            .map(|s| (s.interest_id.clone(), s.similarity))
            .collect();
        let interest_ids: Vec<String> = similar_interests
            .iter()
            .map(|s| s.interest_id.clone())
            .collect();

        let candidates = self
            .repository
            .get_users_by_interests_with_cooldown(
                &interest_ids,
                self.settings.cooldown.cutoff(now),
                self.settings.candidate_cap,
            )
            .await?;

        let recommended_users = score_candidates(&weights, candidates, limit);

        if !recommended_users.is_empty() {
            let user_ids: Vec<String> = recommended_users
                .iter()
                .map(|u| u.user_id.clone())
                .collect();
            self.repository
                .set_user_last_recommended_at(&user_ids, now)
                .await?;
        }

        tracing::info!(
            interest_id,
            similar = similar_interests.len(),
            recommended = recommended_users.len(),
            "Recommendation computed"
        );

        Ok(Recommendation {
            similar_interests,
            recommended_users,
            timestamp: now,
        })
    }

    /// A random user with interests and one of their interests.
    pub async fn pick_random_user_interest(&self) -> InterestResult<Option<(String, String)>> {
        self.repository.random_user_interest().await
    }

    pub async fn ping(&self) -> InterestResult<()> {
        self.repository.ping().await
    }

    /// Returns whether the user already existed.
    async fn ensure_user(&self, user_id: &str) -> InterestResult<bool> {
        if self.repository.user_exists(user_id).await? {
            return Ok(true);
        }

        let user = User::new(user_id);
        self.repository
            .create_user(&user.id, &user.name, &user.email)
            .await?;
        tracing::info!(user_id, "Created user on first access");
        Ok(false)
    }

    async fn link_interest(&self, user_id: &str, interest: &InterestInput) -> InterestResult<()> {
        let vector = self.embedder.embed(&interest.name).await?;
        self.repository.upsert_interest(interest, &vector).await?;
        self.repository.ensure_edge(user_id, &interest.id).await
    }
}

fn validate_user_id(user_id: &str) -> InterestResult<()> {
    if user_id.trim().is_empty() {
        return Err(InterestError::Validation(
            "user id must not be blank".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{MockEmbeddingProvider, WordVectorProvider};
    use crate::models::{CandidateUser, MatchedInterest};
    use crate::repository::{InMemoryInterestRepository, MockInterestRepository};
    use crate::settings::CandidateStrategy;
    use chrono::Duration;
    use mockall::predicate;

    fn exhaustive() -> EngineSettings {
        EngineSettings {
            strategy: CandidateStrategy::Exhaustive,
            ..EngineSettings::default()
        }
    }

    /// Two-dimensional vocabulary where each word sits at a fixed angle to "chess".
    fn embedder() -> Arc<dyn EmbeddingProvider> {
        let at = |cos: f32| vec![cos, (1.0 - cos * cos).sqrt()];
        Arc::new(WordVectorProvider::from_vectors(
            HashMap::from([
                ("chess".to_string(), at(1.0)),
                ("checkers".to_string(), at(0.8)),
                ("backgammon".to_string(), at(0.6)),
                ("cooking".to_string(), at(0.2)),
            ]),
            2,
        ))
    }

    fn mock_embedder() -> Arc<dyn EmbeddingProvider> {
        let mut embedder = MockEmbeddingProvider::new();
        embedder.expect_embed().returning(|_| Ok(vec![1.0, 0.0]));
        Arc::new(embedder)
    }

    fn interest(id: &str) -> InterestInput {
        InterestInput::new(id, id)
    }

    async fn chess_club() -> InterestService<InMemoryInterestRepository> {
        chess_club_with(InMemoryInterestRepository::new(), exhaustive()).await
    }

    async fn chess_club_with(
        repository: InMemoryInterestRepository,
        settings: EngineSettings,
    ) -> InterestService<InMemoryInterestRepository> {
        let service = InterestService::new(repository, embedder(), settings);
        service
            .set_interests("source", vec![interest("chess")])
            .await
            .unwrap();
        service
            .set_interests("ann", vec![interest("checkers"), interest("cooking")])
            .await
            .unwrap();
        service
            .set_interests("bob", vec![interest("backgammon")])
            .await
            .unwrap();
        service
            .set_interests("cid", vec![interest("checkers"), interest("backgammon")])
            .await
            .unwrap();
        service
    }

    #[tokio::test]
    async fn test_get_interests_creates_unknown_user() {
        let service =
            InterestService::new(InMemoryInterestRepository::new(), embedder(), exhaustive());

        assert!(service.get_interests("newUser").await.unwrap().is_empty());
        assert!(service.repository().user_exists("newUser").await.unwrap());
        assert_eq!(
            service.repository().user("newUser").await.unwrap().name,
            "User newUser"
        );
    }

    #[tokio::test]
    async fn test_set_interests_replaces_edges() {
        let service =
            InterestService::new(InMemoryInterestRepository::new(), embedder(), exhaustive());

        service
            .set_interests(
                "u1",
                vec![interest("chess"), interest("cooking"), interest("chess")],
            )
            .await
            .unwrap();
        let ids: Vec<_> = service
            .get_interests("u1")
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(ids, ["chess", "cooking"]);

        service.set_interests("u1", vec![]).await.unwrap();
        assert!(service.get_interests("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_interests_rejects_invalid_input() {
        let service =
            InterestService::new(InMemoryInterestRepository::new(), embedder(), exhaustive());

        let err = service
            .set_interests("u1", vec![InterestInput::new("", "Chess")])
            .await
            .unwrap_err();
        assert!(matches!(err, InterestError::Validation(_)));
        assert!(!service.repository().user_exists("u1").await.unwrap());
    }

    #[tokio::test]
    async fn test_create_user_reports_existing() {
        let service =
            InterestService::new(InMemoryInterestRepository::new(), embedder(), exhaustive());

        let first = service
            .create_user(
                "u1",
                CreateUser {
                    name: Some("Ada".to_string()),
                    email: Some("ada@example.com".to_string()),
                },
            )
            .await
            .unwrap();
        let second = service.create_user("u1", CreateUser::default()).await.unwrap();

        assert_eq!(first, UserCreation::Created);
        assert_eq!(second, UserCreation::AlreadyExists);
        assert_eq!(service.repository().user("u1").await.unwrap().name, "Ada");
    }

    #[tokio::test]
    async fn test_find_similar_interests_chess_example() {
        let service = chess_club().await;

        let similar = service.find_similar_interests("chess", 2).await.unwrap();
        let ids: Vec<_> = similar.iter().map(|s| s.interest_id.as_str()).collect();

        assert_eq!(ids, ["checkers", "backgammon"]);
    }

    #[tokio::test]
    async fn test_unknown_interest_has_no_similar_interests() {
        let service = chess_club().await;

        let recommendation = service.recommend("knitting", 10).await.unwrap();
        assert!(recommendation.similar_interests.is_empty());
        assert!(recommendation.recommended_users.is_empty());
    }

    #[tokio::test]
    async fn test_recommend_scores_and_orders_users() {
        let service = chess_club().await;

        let recommendation = service.recommend("chess", 10).await.unwrap();
        let users: Vec<_> = recommendation
            .recommended_users
            .iter()
            .map(|u| (u.user_id.as_str(), u.score))
            .collect();

        assert_eq!(users.len(), 3);
        assert_eq!(users[0].0, "cid");
        assert!((users[0].1 - 1.4).abs() < 1e-5);
        assert_eq!(users[1].0, "ann");
        assert!((users[1].1 - 0.8).abs() < 1e-5);
        assert_eq!(users[2].0, "bob");
        assert!(
            recommendation.recommended_users[1]
                .matched_interests
                .iter()
                .all(|i| i.interest_id == "checkers")
        );
    }

    #[tokio::test]
    async fn test_recommend_applies_cooldown() {
        let service = chess_club().await;
        let now = Utc::now();

        let first = service.recommend_at("chess", 1, now).await.unwrap();
        assert_eq!(first.recommended_users.len(), 1);
        let picked = first.recommended_users[0].user_id.clone();
        assert_eq!(
            service.repository().user(&picked).await.unwrap().last_recommended_at,
            Some(now)
        );

        let soon = service
            .recommend_at("chess", 10, now + Duration::minutes(30))
            .await
            .unwrap();
        assert!(soon.recommended_users.iter().all(|u| u.user_id != picked));

        let after_cooldown = now + Duration::hours(1) + Duration::seconds(1);
        let later = service
            .recommend_at("chess", 10, after_cooldown)
            .await
            .unwrap();
        assert!(later.recommended_users.iter().any(|u| u.user_id == picked));
    }

    #[tokio::test]
    async fn test_recommend_respects_candidate_cap() {
        let settings = EngineSettings {
            candidate_cap: 1,
            ..exhaustive()
        };
        let service = chess_club_with(InMemoryInterestRepository::new(), settings).await;

        let recommendation = service.recommend("chess", 10).await.unwrap();

        // ann is the first eligible user in store order; cid would outscore ann.
        assert_eq!(recommendation.similar_interests.len(), 2);
        assert_eq!(recommendation.recommended_users.len(), 1);
        assert_eq!(recommendation.recommended_users[0].user_id, "ann");

        let cid = service.repository().user("cid").await.unwrap();
        assert!(cid.last_recommended_at.is_none());
    }

    #[tokio::test]
    async fn test_sampled_similarity_is_bounded() {
        let settings = EngineSettings {
            sample_size: 2,
            strategy: CandidateStrategy::Sample,
            ..EngineSettings::default()
        };
        let service = chess_club_with(InMemoryInterestRepository::with_seed(42), settings).await;

        for _ in 0..10 {
            let similar = service.find_similar_interests("chess", 10).await.unwrap();

            assert!(similar.len() <= 2);
            assert!(similar.iter().all(|s| s.interest_id != "chess"));
            assert!(similar.iter().all(|s| s.similarity > 0.5));
            let scores: Vec<f64> = similar.iter().map(|s| s.similarity).collect();
            assert!(scores.is_sorted_by(|a, b| a >= b));
        }
    }

    #[tokio::test]
    async fn test_recommend_rejects_zero_limit() {
        let service = chess_club().await;
        let err = service.recommend("chess", 0).await.unwrap_err();
        assert!(matches!(err, InterestError::Validation(_)));
    }

    #[tokio::test]
    async fn test_recommend_commits_cooldown_for_returned_users_only() {
        let now = Utc::now();
        let mut repository = MockInterestRepository::new();

        repository
            .expect_get_interest_vector()
            .with(predicate::eq("chess"))
            .returning(|_| Ok(Some(vec![1.0, 0.0])));
        repository
            .expect_interests_with_vectors_excluding()
            .returning(|_| {
                Ok(vec![crate::models::InterestCandidate {
                    id: "checkers".to_string(),
                    name: "Checkers".to_string(),
                    description: None,
                    vector: vec![0.9, 0.1],
                }])
            });
        repository
            .expect_get_users_by_interests_with_cooldown()
            .withf(move |ids, cutoff, cap| {
                ids == ["checkers".to_string()]
                    && *cutoff == now - Duration::hours(1)
                    && *cap == 100
            })
            .returning(|_, _, _| {
                Ok(vec![
                    CandidateUser {
                        user_id: "u1".to_string(),
                        user_name: "Ann".to_string(),
                        interests: vec![MatchedInterest {
                            interest_id: "checkers".to_string(),
                            interest_name: "Checkers".to_string(),
                        }],
                    },
                    CandidateUser {
                        user_id: "u2".to_string(),
                        user_name: "Bob".to_string(),
                        interests: vec![MatchedInterest {
                            interest_id: "checkers".to_string(),
                            interest_name: "Checkers".to_string(),
                        }],
                    },
                ])
            });
        repository
            .expect_set_user_last_recommended_at()
            .withf(move |ids, at| ids == ["u1".to_string()] && *at == now)
            .times(1)
            .returning(|_, _| Ok(()));

        let service = InterestService::new(repository, mock_embedder(), exhaustive());
        let recommendation = service.recommend_at("chess", 1, now).await.unwrap();

        assert_eq!(recommendation.recommended_users.len(), 1);
        assert_eq!(recommendation.timestamp, now);
    }

    #[tokio::test]
    async fn test_set_interests_reports_partial_write() {
        let mut repository = MockInterestRepository::new();
        repository.expect_user_exists().returning(|_| Ok(true));
        repository
            .expect_delete_user_interest_edges()
            .times(1)
            .returning(|_| Ok(()));
        repository
            .expect_upsert_interest()
            .withf(|interest, _| interest.id == "chess")
            .returning(|_, _| Ok(()));
        repository
            .expect_upsert_interest()
            .withf(|interest, _| interest.id == "cooking")
            .returning(|_, _| Err(InterestError::Store("connection reset".to_string())));
        repository
            .expect_ensure_edge()
            .times(1)
            .returning(|_, _| Ok(()));

        let service = InterestService::new(repository, mock_embedder(), exhaustive());
        let err = service
            .set_interests("u1", vec![interest("chess"), interest("cooking")])
            .await
            .unwrap_err();

        match err {
            InterestError::PartialWrite {
                user_id,
                interest_id,
                reason,
            } => {
                assert_eq!(user_id, "u1");
                assert_eq!(interest_id, "cooking");
                assert!(reason.contains("connection reset"));
            }
            other => panic!("expected partial write, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_store_failure_aborts_recommendation() {
        let mut repository = MockInterestRepository::new();
        repository
            .expect_get_interest_vector()
            .returning(|_| Err(InterestError::Store("timeout".to_string())));

        let service = InterestService::new(repository, mock_embedder(), exhaustive());
        let err = service.recommend("chess", 10).await.unwrap_err();

        assert!(matches!(err, InterestError::Store(_)));
    }

    #[tokio::test]
    async fn test_embedding_failure_stops_before_linking() {
        let mut repository = MockInterestRepository::new();
        repository.expect_user_exists().returning(|_| Ok(true));
        repository
            .expect_delete_user_interest_edges()
            .returning(|_| Ok(()));
        repository.expect_upsert_interest().never();
        repository.expect_ensure_edge().never();

        let mut embedder = MockEmbeddingProvider::new();
        embedder
            .expect_embed()
            .returning(|_| Err(InterestError::Embedding("model offline".to_string())));

        let service = InterestService::new(repository, Arc::new(embedder), exhaustive());
        let err = service
            .set_interests("u1", vec![interest("chess")])
            .await
            .unwrap_err();

        assert!(matches!(err, InterestError::PartialWrite { .. }));
    }
}
