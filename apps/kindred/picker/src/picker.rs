//! Random person picker: one user, one of their interests, and who to introduce them to.

use domain_interests::{InterestRepository, Recommendation};
use eyre::{Result, WrapErr};
use serde::Serialize;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

/// Result of one pick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PickOutcome {
    pub user_id: String,
    pub interest_id: String,
    /// Recommended users for the interest, without the picked user
    pub recommended_user_ids: Vec<String>,
}

pub struct Picker<R: InterestRepository> {
    repository: Arc<R>,
    client: reqwest::Client,
    api_url: String,
}

// Manual impl: cloning the picker never needs `R: Clone`.
impl<R: InterestRepository> Clone for Picker<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            client: self.client.clone(),
            api_url: self.api_url.clone(),
        }
    }
}

impl<R: InterestRepository + 'static> Picker<R> {
    pub fn new(repository: R, api_url: impl Into<String>) -> Self {
        Self {
            repository: Arc::new(repository),
            client: reqwest::Client::new(),
            api_url: api_url.into(),
        }
    }

    /// Picks a random user with interests and fetches recommendations for one of them.
    ///
    /// Returns `None` when no user has any interest yet.
    pub async fn pick_once(&self) -> Result<Option<PickOutcome>> {
        let Some((user_id, interest_id)) = self
            .repository
            .random_user_interest()
            .await
            .wrap_err("failed to pick a random user")?
        else {
            info!("No user with interests yet, nothing to pick");
            return Ok(None);
        };

        info!(user_id = %user_id, interest_id = %interest_id, "Picked user");

        let recommendation = self.fetch_recommendation(&interest_id).await?;
        let recommended_user_ids = peers_of(&user_id, &recommendation);

        info!(
            user_id = %user_id,
            interest_id = %interest_id,
            similar = recommendation.similar_interests.len(),
            recommended = recommended_user_ids.len(),
            "Recommendations fetched"
        );

        Ok(Some(PickOutcome {
            user_id,
            interest_id,
            recommended_user_ids,
        }))
    }

    async fn fetch_recommendation(&self, interest_id: &str) -> Result<Recommendation> {
        let url = format!("{}/interests/similar/{}", self.api_url, interest_id);

        let recommendation = self
            .client
            .get(&url)
            .send()
            .await
            .wrap_err_with(|| format!("request to {url} failed"))?
            .error_for_status()
            .wrap_err_with(|| format!("{url} returned an error status"))?
            .json::<Recommendation>()
            .await
            .wrap_err("invalid recommendation body")?;

        Ok(recommendation)
    }

    /// Runs [`Picker::pick_once`] on a cron schedule until the process is stopped.
    pub async fn run_scheduled(&self, cron_expr: &str) -> Result<()> {
        info!(cron = cron_expr, "Starting scheduled picks");

        let sched = JobScheduler::new().await?;
        let picker = self.clone();

        let job = Job::new_async(cron_expr, move |_uuid, _l| {
            let picker = picker.clone();

            Box::pin(async move {
                match picker.pick_once().await {
                    Ok(Some(outcome)) => {
                        info!(
                            user_id = %outcome.user_id,
                            recommended = ?outcome.recommended_user_ids,
                            "Scheduled pick complete"
                        );
                    }
                    Ok(None) => {}
                    Err(e) => {
                        error!(error = %e, "Scheduled pick failed");
                    }
                }
            })
        })?;

        sched.add(job).await?;
        sched.start().await?;

        // Keep running until interrupted
        info!("Scheduler started, waiting for jobs...");
        loop {
            tokio::time::sleep(tokio::time::Duration::from_secs(60)).await;
        }
    }
}

/// Recommended user ids for the picked user, who is never their own match.
pub fn peers_of(user_id: &str, recommendation: &Recommendation) -> Vec<String> {
    recommendation
        .recommended_users
        .iter()
        .filter(|u| u.user_id != user_id)
        .map(|u| u.user_id.clone())
        .collect()
}
