//! Shared test utilities for domain testing
//!
//! This crate provides reusable test infrastructure for the domain crates:
//! - `TestNeo4j`: Neo4j container with automatic cleanup (feature: "neo4j")
//! - `TestDataBuilder`: Deterministic test data generation (always available)
//! - `assertions`: Custom assertion helpers (always available)
//!
//! # Features
//!
//! - `neo4j`: Enables Neo4j test infrastructure
//! - `all`: Enables all database test infrastructure
//!
//! # Usage
//!
//! Add `features = ["neo4j"]` to your dev-dependencies:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { workspace = true, features = ["neo4j"] }
//! ```
//!
//! Then in your tests:
//!
//! ```rust,ignore
//! use test_utils::{TestDataBuilder, TestNeo4j};
//!
//! #[tokio::test]
//! async fn my_graph_test() {
//!     let neo4j = TestNeo4j::new().await;
//!     let builder = TestDataBuilder::from_test_name("my_graph_test");
//!
//!     let user_id = builder.user_id();
//!     let interest_id = builder.interest_id("chess");
//! }
//! ```

#[cfg(feature = "neo4j")]
mod neo4j;

#[cfg(feature = "neo4j")]
pub use neo4j::TestNeo4j;

/// Builder for test data with deterministic identifiers
///
/// Ids embed a seed derived from the test name, so tests sharing one database
/// do not step on each other and reruns produce the same data.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    /// Create a new builder with a seed (for deterministic tests)
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Create from test name (generates seed from test name hash)
    ///
    /// # Example
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_recommend_users");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// The primary user of the test
    pub fn user_id(&self) -> String {
        self.named_user_id("main")
    }

    /// Additional users, distinguished by `suffix`
    pub fn named_user_id(&self, suffix: &str) -> String {
        format!("user-{:x}-{}", self.seed, suffix)
    }

    /// An interest id scoped to this test
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::new(255);
    /// assert_eq!(builder.interest_id("chess"), "interest-ff-chess");
    /// ```
    pub fn interest_id(&self, slug: &str) -> String {
        format!("interest-{:x}-{}", self.seed, slug)
    }
}

/// Test assertion helpers
pub mod assertions {
    /// Assert that `actual` contains exactly the `expected` ids, in any order
    pub fn assert_same_ids<S: AsRef<str>>(actual: &[S], expected: &[&str], context: &str) {
        let mut actual: Vec<&str> = actual.iter().map(AsRef::as_ref).collect();
        let mut expected = expected.to_vec();
        actual.sort_unstable();
        expected.sort_unstable();
        assert_eq!(
            actual, expected,
            "{}: expected ids {:?}, got {:?}",
            context, expected, actual
        );
    }

    /// Assert that two floats are within `epsilon` of each other
    pub fn assert_close(actual: f64, expected: f64, epsilon: f64, context: &str) {
        assert!(
            (actual - expected).abs() <= epsilon,
            "{}: expected {} (±{}), got {}",
            context,
            expected,
            epsilon,
            actual
        );
    }

    /// Assert that an optional value is Some
    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_builder_deterministic() {
        let builder1 = TestDataBuilder::new(42);
        let builder2 = TestDataBuilder::new(42);

        assert_eq!(builder1.user_id(), builder2.user_id());
        assert_eq!(builder1.interest_id("chess"), builder2.interest_id("chess"));
    }

    #[test]
    fn test_data_builder_from_name() {
        let builder1 = TestDataBuilder::from_test_name("my_test");
        let builder2 = TestDataBuilder::from_test_name("my_test");

        assert_eq!(builder1.user_id(), builder2.user_id());
        assert_eq!(builder1.interest_id("go"), builder2.interest_id("go"));
    }

    #[test]
    fn test_data_builder_different_names() {
        let builder1 = TestDataBuilder::from_test_name("test1");
        let builder2 = TestDataBuilder::from_test_name("test2");

        // Different test names should generate different data
        assert_ne!(builder1.user_id(), builder2.user_id());
    }

    #[test]
    fn test_named_users_are_distinct() {
        let builder = TestDataBuilder::new(7);
        assert_ne!(builder.named_user_id("a"), builder.named_user_id("b"));
        assert_eq!(builder.user_id(), "user-7-main");
    }

    #[test]
    fn test_assert_same_ids_ignores_order() {
        assertions::assert_same_ids(&["b".to_string(), "a".to_string()], &["a", "b"], "ids");
    }
}
