use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;

use crate::cooldown::CooldownPolicy;
use crate::error::InterestResult;
use crate::models::{
    CandidateUser, Interest, InterestCandidate, InterestInput, MatchedInterest, User,
};

/// Graph store of users, interests and `INTERESTED_IN` edges.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InterestRepository: Send + Sync {
    async fn user_exists(&self, user_id: &str) -> InterestResult<bool>;

    /// Create a user node. Callers check [`user_exists`](Self::user_exists) first.
    async fn create_user(&self, user_id: &str, name: &str, email: &str) -> InterestResult<()>;

    /// Interests linked to the user, without vectors.
    async fn get_user_interests(&self, user_id: &str) -> InterestResult<Vec<Interest>>;

    async fn get_interest_vector(&self, interest_id: &str) -> InterestResult<Option<Vec<f32>>>;

    /// Up to `sample_size` random interests with a vector, never the excluded one.
    async fn sample_interests_excluding(
        &self,
        interest_id: &str,
        sample_size: usize,
    ) -> InterestResult<Vec<InterestCandidate>>;

    /// Every interest with a vector except the excluded one.
    async fn interests_with_vectors_excluding(
        &self,
        interest_id: &str,
    ) -> InterestResult<Vec<InterestCandidate>>;

    /// Users linked to any of `interest_ids` whose last recommendation is unset or
    /// strictly before `cutoff`, at most `cap` of them. Each carries only its
    /// interests that are in `interest_ids`.
    async fn get_users_by_interests_with_cooldown(
        &self,
        interest_ids: &[String],
        cutoff: DateTime<Utc>,
        cap: usize,
    ) -> InterestResult<Vec<CandidateUser>>;

    async fn delete_user_interest_edges(&self, user_id: &str) -> InterestResult<()>;

    /// Create the interest or overwrite its name, description and vector.
    async fn upsert_interest(
        &self,
        interest: &InterestInput,
        vector: &[f32],
    ) -> InterestResult<()>;

    /// Link user and interest; a no-op when the edge exists.
    async fn ensure_edge(&self, user_id: &str, interest_id: &str) -> InterestResult<()>;

    async fn set_user_last_recommended_at(
        &self,
        user_ids: &[String],
        at: DateTime<Utc>,
    ) -> InterestResult<()>;

    /// A random (user, interest) pair among users with at least one interest.
    async fn random_user_interest(&self) -> InterestResult<Option<(String, String)>>;

    async fn ping(&self) -> InterestResult<()>;
}

#[derive(Debug, Clone)]
struct StoredInterest {
    interest: Interest,
    vector: Option<Vec<f32>>,
}

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    interest_ids: Vec<String>,
}

#[derive(Debug, Default)]
struct Graph {
    users: Vec<StoredUser>,
    interests: Vec<StoredInterest>,
}

impl Graph {
    fn user_mut(&mut self, user_id: &str) -> Option<&mut StoredUser> {
        self.users.iter_mut().find(|u| u.user.id == user_id)
    }

    fn interest(&self, interest_id: &str) -> Option<&StoredInterest> {
        self.interests.iter().find(|i| i.interest.id == interest_id)
    }

    fn candidates_excluding(&self, interest_id: &str) -> Vec<InterestCandidate> {
        self.interests
            .iter()
            .filter(|i| i.interest.id != interest_id)
            .filter_map(|i| {
                i.vector.as_ref().map(|vector| InterestCandidate {
                    id: i.interest.id.clone(),
                    name: i.interest.name.clone(),
                    description: i.interest.description.clone(),
                    vector: vector.clone(),
                })
            })
            .collect()
    }
}

/// In-memory implementation of InterestRepository (for development/testing)
///
/// Users and interests are kept in insertion order, which is the "store order"
/// seen by callers. Pass a seed to make sampling reproducible.
#[derive(Debug, Clone, Default)]
pub struct InMemoryInterestRepository {
    graph: Arc<RwLock<Graph>>,
    rng: Option<Arc<Mutex<StdRng>>>,
}

impl InMemoryInterestRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            graph: Arc::default(),
            rng: Some(Arc::new(Mutex::new(StdRng::seed_from_u64(seed)))),
        }
    }

    pub async fn user(&self, user_id: &str) -> Option<User> {
        let graph = self.graph.read().await;
        graph
            .users
            .iter()
            .find(|u| u.user.id == user_id)
            .map(|u| u.user.clone())
    }

    fn shuffle<T>(&self, items: &mut [T]) {
        match &self.rng {
            Some(rng) => {
                let mut rng = rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                items.shuffle(&mut *rng);
            }
            None => items.shuffle(&mut rand::rng()),
        }
    }

    fn choose<'a, T>(&self, items: &'a [T]) -> Option<&'a T> {
        match &self.rng {
            Some(rng) => {
                let mut rng = rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                items.choose(&mut *rng)
            }
            None => items.choose(&mut rand::rng()),
        }
    }
}

#[async_trait]
impl InterestRepository for InMemoryInterestRepository {
    async fn user_exists(&self, user_id: &str) -> InterestResult<bool> {
        let graph = self.graph.read().await;
        Ok(graph.users.iter().any(|u| u.user.id == user_id))
    }

    async fn create_user(&self, user_id: &str, name: &str, email: &str) -> InterestResult<()> {
        let mut graph = self.graph.write().await;
        if graph.user_mut(user_id).is_none() {
            graph.users.push(StoredUser {
                user: User {
                    id: user_id.to_string(),
                    name: name.to_string(),
                    email: email.to_string(),
                    last_recommended_at: None,
                },
                interest_ids: Vec::new(),
            });
            tracing::debug!(user_id, "Created user");
        }
        Ok(())
    }

    async fn get_user_interests(&self, user_id: &str) -> InterestResult<Vec<Interest>> {
        let graph = self.graph.read().await;
        let Some(user) = graph.users.iter().find(|u| u.user.id == user_id) else {
            return Ok(Vec::new());
        };

        Ok(user
            .interest_ids
            .iter()
            .filter_map(|id| graph.interest(id).map(|i| i.interest.clone()))
            .collect())
    }

    async fn get_interest_vector(&self, interest_id: &str) -> InterestResult<Option<Vec<f32>>> {
        let graph = self.graph.read().await;
        Ok(graph.interest(interest_id).and_then(|i| i.vector.clone()))
    }

    async fn sample_interests_excluding(
        &self,
        interest_id: &str,
        sample_size: usize,
    ) -> InterestResult<Vec<InterestCandidate>> {
        let mut candidates = self.graph.read().await.candidates_excluding(interest_id);
        self.shuffle(&mut candidates);
        candidates.truncate(sample_size);
        Ok(candidates)
    }

    async fn interests_with_vectors_excluding(
        &self,
        interest_id: &str,
    ) -> InterestResult<Vec<InterestCandidate>> {
        Ok(self.graph.read().await.candidates_excluding(interest_id))
    }

    async fn get_users_by_interests_with_cooldown(
        &self,
        interest_ids: &[String],
        cutoff: DateTime<Utc>,
        cap: usize,
    ) -> InterestResult<Vec<CandidateUser>> {
        let graph = self.graph.read().await;

        let candidates = graph
            .users
            .iter()
            .filter(|u| {
                let state = CooldownPolicy::state_at_cutoff(u.user.last_recommended_at, cutoff);
                state.is_eligible()
            })
            .filter_map(|u| {
                let interests: Vec<MatchedInterest> = u
                    .interest_ids
                    .iter()
                    .filter(|id| interest_ids.contains(id))
                    .filter_map(|id| graph.interest(id))
                    .map(|i| MatchedInterest {
                        interest_id: i.interest.id.clone(),
                        interest_name: i.interest.name.clone(),
                    })
                    .collect();

                (!interests.is_empty()).then(|| CandidateUser {
                    user_id: u.user.id.clone(),
                    user_name: u.user.name.clone(),
                    interests,
                })
            })
            .take(cap)
            .collect();

        Ok(candidates)
    }

    async fn delete_user_interest_edges(&self, user_id: &str) -> InterestResult<()> {
        let mut graph = self.graph.write().await;
        if let Some(user) = graph.user_mut(user_id) {
            user.interest_ids.clear();
        }
        Ok(())
    }

    async fn upsert_interest(
        &self,
        interest: &InterestInput,
        vector: &[f32],
    ) -> InterestResult<()> {
        let mut graph = self.graph.write().await;
        let stored = StoredInterest {
            interest: Interest::from(interest.clone()),
            vector: Some(vector.to_vec()),
        };

        match graph
            .interests
            .iter_mut()
            .find(|i| i.interest.id == interest.id)
        {
            Some(existing) => *existing = stored,
            None => graph.interests.push(stored),
        }
        Ok(())
    }

    async fn ensure_edge(&self, user_id: &str, interest_id: &str) -> InterestResult<()> {
        let mut graph = self.graph.write().await;
        if graph.interest(interest_id).is_none() {
            return Ok(());
        }
        if let Some(user) = graph.user_mut(user_id)
            && !user.interest_ids.iter().any(|id| id == interest_id)
        {
            user.interest_ids.push(interest_id.to_string());
        }
        Ok(())
    }

    async fn set_user_last_recommended_at(
        &self,
        user_ids: &[String],
        at: DateTime<Utc>,
    ) -> InterestResult<()> {
        let mut graph = self.graph.write().await;
        for user in graph
            .users
            .iter_mut()
            .filter(|u| user_ids.contains(&u.user.id))
        {
            user.user.last_recommended_at = Some(at);
        }
        Ok(())
    }

    async fn random_user_interest(&self) -> InterestResult<Option<(String, String)>> {
        let graph = self.graph.read().await;
        let with_interests: Vec<&StoredUser> = graph
            .users
            .iter()
            .filter(|u| !u.interest_ids.is_empty())
            .collect();

        Ok(self.choose(&with_interests).and_then(|user| {
            self.choose(&user.interest_ids)
                .map(|interest_id| (user.user.id.clone(), interest_id.clone()))
        }))
    }

    async fn ping(&self) -> InterestResult<()> {
        Ok(())
    }
}
