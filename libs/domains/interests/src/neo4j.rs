use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use core_config::neo4j::Neo4jConfig;
use neo4rs::{ConfigBuilder, Graph, Query, Row, query};
use std::sync::Arc;

use crate::error::{InterestError, InterestResult};
use crate::models::{CandidateUser, Interest, InterestCandidate, InterestInput, MatchedInterest};
use crate::repository::InterestRepository;

/// Neo4j-backed repository.
///
/// Graph shape:
///
/// ```text
/// (:User {id, name, email, createdAt, lastRecommendedAt})
///     -[:INTERESTED_IN]->
/// (:Interest {id, name, description, vector})
/// ```
#[derive(Clone)]
pub struct Neo4jInterestRepository {
    graph: Arc<Graph>,
}

impl Neo4jInterestRepository {
    pub fn new(graph: Arc<Graph>) -> Self {
        Self { graph }
    }

    pub async fn connect(config: &Neo4jConfig) -> InterestResult<Self> {
        let neo4j_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .max_connections(config.max_connections)
            .build()?;
        let graph = Graph::connect(neo4j_config).await?;

        tracing::info!(uri = %config.uri, "Connected to Neo4j");
        Ok(Self::new(Arc::new(graph)))
    }

    /// Uniqueness constraints on `User.id` and `Interest.id`; safe to run on every start.
    pub async fn ensure_schema(&self) -> InterestResult<()> {
        for cypher in [
            "CREATE CONSTRAINT user_id_unique IF NOT EXISTS FOR (u:User) REQUIRE u.id IS UNIQUE",
            "CREATE CONSTRAINT interest_id_unique IF NOT EXISTS \
             FOR (i:Interest) REQUIRE i.id IS UNIQUE",
        ] {
            self.graph.run(query(cypher)).await?;
        }
        Ok(())
    }

    async fn fetch_all(&self, q: Query) -> InterestResult<Vec<Row>> {
        let mut result = self.graph.execute(q).await?;
        let mut rows = Vec::new();
        while let Some(row) = result.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    async fn fetch_one(&self, q: Query) -> InterestResult<Option<Row>> {
        let mut result = self.graph.execute(q).await?;
        Ok(result.next().await?)
    }
}

fn to_bolt_vector(vector: &[f32]) -> Vec<f64> {
    vector.iter().map(|v| f64::from(*v)).collect()
}

fn from_bolt_vector(vector: Vec<f64>) -> Vec<f32> {
    vector.into_iter().map(|v| v as f32).collect()
}

fn to_cypher_datetime(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn bolt_int(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn candidate_from_row(row: &Row) -> InterestResult<InterestCandidate> {
    Ok(InterestCandidate {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        vector: from_bolt_vector(row.get("vector")?),
    })
}

#[async_trait]
impl InterestRepository for Neo4jInterestRepository {
    async fn user_exists(&self, user_id: &str) -> InterestResult<bool> {
        let row = self
            .fetch_one(
                query("MATCH (u:User {id: $id}) RETURN count(u) AS count").param("id", user_id),
            )
            .await?;

        match row {
            Some(row) => Ok(row.get::<i64>("count")? > 0),
            None => Ok(false),
        }
    }

    async fn create_user(&self, user_id: &str, name: &str, email: &str) -> InterestResult<()> {
        self.graph
            .run(
                query(
                    "MERGE (u:User {id: $id}) \
                     ON CREATE SET u.name = $name, u.email = $email, u.createdAt = datetime()",
                )
                .param("id", user_id)
                .param("name", name)
                .param("email", email),
            )
            .await?;
        Ok(())
    }

    async fn get_user_interests(&self, user_id: &str) -> InterestResult<Vec<Interest>> {
        let rows = self
            .fetch_all(
                query(
                    "MATCH (u:User {id: $id})-[:INTERESTED_IN]->(i:Interest) \
                     RETURN i.id AS id, i.name AS name, i.description AS description",
                )
                .param("id", user_id),
            )
            .await?;

        rows.iter()
            .map(|row| {
                Ok(Interest {
                    id: row.get("id")?,
                    name: row.get("name")?,
                    description: row.get("description")?,
                })
            })
            .collect()
    }

    async fn get_interest_vector(&self, interest_id: &str) -> InterestResult<Option<Vec<f32>>> {
        let row = self
            .fetch_one(
                query("MATCH (i:Interest {id: $id}) RETURN i.vector AS vector")
                    .param("id", interest_id),
            )
            .await?;

        match row {
            Some(row) => Ok(row.get::<Option<Vec<f64>>>("vector")?.map(from_bolt_vector)),
            None => Ok(None),
        }
    }

    async fn sample_interests_excluding(
        &self,
        interest_id: &str,
        sample_size: usize,
    ) -> InterestResult<Vec<InterestCandidate>> {
        let rows = self
            .fetch_all(
                query(
                    "MATCH (i:Interest) \
                     WHERE i.id <> $id AND i.vector IS NOT NULL \
                     RETURN i.id AS id, i.name AS name, \
                            i.description AS description, i.vector AS vector \
                     ORDER BY rand() \
                     LIMIT $limit",
                )
                .param("id", interest_id)
                .param("limit", bolt_int(sample_size)),
            )
            .await?;

        rows.iter().map(candidate_from_row).collect()
    }

    async fn interests_with_vectors_excluding(
        &self,
        interest_id: &str,
    ) -> InterestResult<Vec<InterestCandidate>> {
        let rows = self
            .fetch_all(
                query(
                    "MATCH (i:Interest) \
                     WHERE i.id <> $id AND i.vector IS NOT NULL \
                     RETURN i.id AS id, i.name AS name, \
                            i.description AS description, i.vector AS vector \
                     ORDER BY i.id",
                )
                .param("id", interest_id),
            )
            .await?;

        rows.iter().map(candidate_from_row).collect()
    }

    async fn get_users_by_interests_with_cooldown(
        &self,
        interest_ids: &[String],
        cutoff: DateTime<Utc>,
        cap: usize,
    ) -> InterestResult<Vec<CandidateUser>> {
        if interest_ids.is_empty() || cap == 0 {
            return Ok(Vec::new());
        }

        let rows = self
            .fetch_all(
                query(
                    "MATCH (u:User)-[:INTERESTED_IN]->(i:Interest) \
                     WHERE i.id IN $interest_ids \
                       AND (u.lastRecommendedAt IS NULL \
                            OR u.lastRecommendedAt < datetime($cutoff)) \
                     WITH u, collect(i.id) AS interest_ids, collect(i.name) AS interest_names \
                     RETURN u.id AS user_id, \
                            coalesce(u.name, 'User ' + u.id) AS user_name, \
                            interest_ids, interest_names \
                     ORDER BY u.id \
                     LIMIT $cap",
                )
                .param("interest_ids", interest_ids.to_vec())
                .param("cutoff", to_cypher_datetime(cutoff))
                .param("cap", bolt_int(cap)),
            )
            .await?;

        rows.iter()
            .map(|row| {
                let ids: Vec<String> = row.get("interest_ids")?;
                let names: Vec<String> = row.get("interest_names")?;
                if ids.len() != names.len() {
                    return Err(InterestError::Store(
                        "interest id and name lists differ in length".to_string(),
                    ));
                }

                Ok(CandidateUser {
                    user_id: row.get("user_id")?,
                    user_name: row.get("user_name")?,
                    interests: ids
                        .into_iter()
                        .zip(names)
                        .map(|(interest_id, interest_name)| MatchedInterest {
                            interest_id,
                            interest_name,
                        })
                        .collect(),
                })
            })
            .collect()
    }

    async fn delete_user_interest_edges(&self, user_id: &str) -> InterestResult<()> {
        self.graph
            .run(
                query("MATCH (u:User {id: $id})-[r:INTERESTED_IN]->() DELETE r")
                    .param("id", user_id),
            )
            .await?;
        Ok(())
    }

    async fn upsert_interest(
        &self,
        interest: &InterestInput,
        vector: &[f32],
    ) -> InterestResult<()> {
        let q = match &interest.description {
            Some(description) => query(
                "MERGE (i:Interest {id: $id}) \
                 SET i.name = $name, i.description = $description, i.vector = $vector",
            )
            .param("description", description.as_str()),
            None => query(
                "MERGE (i:Interest {id: $id}) \
                 SET i.name = $name, i.vector = $vector \
                 REMOVE i.description",
            ),
        };

        self.graph
            .run(
                q.param("id", interest.id.as_str())
                    .param("name", interest.name.as_str())
                    .param("vector", to_bolt_vector(vector)),
            )
            .await?;
        Ok(())
    }

    async fn ensure_edge(&self, user_id: &str, interest_id: &str) -> InterestResult<()> {
        self.graph
            .run(
                query(
                    "MATCH (u:User {id: $user_id}), (i:Interest {id: $interest_id}) \
                     MERGE (u)-[:INTERESTED_IN]->(i)",
                )
                .param("user_id", user_id)
                .param("interest_id", interest_id),
            )
            .await?;
        Ok(())
    }

    async fn set_user_last_recommended_at(
        &self,
        user_ids: &[String],
        at: DateTime<Utc>,
    ) -> InterestResult<()> {
        if user_ids.is_empty() {
            return Ok(());
        }

        self.graph
            .run(
                query(
                    "MATCH (u:User) WHERE u.id IN $ids \
                     SET u.lastRecommendedAt = datetime($at)",
                )
                .param("ids", user_ids.to_vec())
                .param("at", to_cypher_datetime(at)),
            )
            .await?;
        Ok(())
    }

    async fn random_user_interest(&self) -> InterestResult<Option<(String, String)>> {
        let row = self
            .fetch_one(query(
                "MATCH (u:User)-[:INTERESTED_IN]->(i:Interest) \
                 WITH u, collect(i.id) AS interests \
                 ORDER BY rand() \
                 LIMIT 1 \
                 RETURN u.id AS user_id, \
                        interests[toInteger(floor(rand() * size(interests)))] AS interest_id",
            ))
            .await?;

        match row {
            Some(row) => Ok(Some((row.get("user_id")?, row.get("interest_id")?))),
            None => Ok(None),
        }
    }

    async fn ping(&self) -> InterestResult<()> {
        self.graph.run(query("RETURN 1")).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_cypher_datetime_is_utc_rfc3339() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        assert_eq!(to_cypher_datetime(at), "2024-05-01T12:30:00.000000Z");
    }

    #[test]
    fn test_vector_round_trip_precision() {
        let vector = [0.25f32, -1.5, 3.0];
        assert_eq!(from_bolt_vector(to_bolt_vector(&vector)), vector.to_vec());
    }
}
