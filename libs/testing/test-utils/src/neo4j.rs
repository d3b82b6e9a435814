//! Neo4j test infrastructure
//!
//! Provides a `TestNeo4j` helper that starts a Neo4j 5 container for testing.

use neo4rs::{ConfigBuilder, Graph};
use std::sync::Arc;
use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage, ImageExt};

const BOLT_PORT: u16 = 7687;
const TEST_USER: &str = "neo4j";
const TEST_PASSWORD: &str = "testpassword";

/// Test Neo4j wrapper that ensures proper cleanup
///
/// The container is automatically stopped and removed when this struct is dropped.
///
/// # Example
///
/// ```no_run
/// use test_utils::TestNeo4j;
///
/// # async fn example() {
/// let neo4j = TestNeo4j::new().await;
/// let graph = neo4j.graph();
/// graph.run(neo4rs::query("CREATE (:User {id: 'u1'})")).await.unwrap();
/// # }
/// ```
pub struct TestNeo4j {
    #[allow(dead_code)]
    container: ContainerAsync<GenericImage>,
    graph: Arc<Graph>,
}

impl TestNeo4j {
    /// Create a new test Neo4j instance
    pub async fn new() -> Self {
        let container = GenericImage::new("neo4j", "5")
            .with_exposed_port(BOLT_PORT.tcp())
            .with_wait_for(WaitFor::message_on_stdout("Started."))
            .with_env_var("NEO4J_AUTH", format!("{TEST_USER}/{TEST_PASSWORD}"))
            .start()
            .await
            .expect("Failed to start Neo4j container");

        let host_port = container
            .get_host_port_ipv4(BOLT_PORT)
            .await
            .expect("Failed to get Neo4j bolt port");

        let uri = format!("127.0.0.1:{host_port}");

        let config = ConfigBuilder::default()
            .uri(&uri)
            .user(TEST_USER)
            .password(TEST_PASSWORD)
            .build()
            .expect("Failed to build Neo4j config");

        let graph = Graph::connect(config)
            .await
            .expect("Failed to connect to Neo4j");

        tracing::info!(uri = %uri, "Test Neo4j ready (neo4j:5)");

        Self {
            container,
            graph: Arc::new(graph),
        }
    }

    /// Shared handle to the connected graph (useful for passing to repositories)
    pub fn graph(&self) -> Arc<Graph> {
        Arc::clone(&self.graph)
    }
}

// Container is automatically cleaned up when TestNeo4j is dropped
impl Drop for TestNeo4j {
    fn drop(&mut self) {
        tracing::debug!("Cleaning up test Neo4j container");
    }
}
