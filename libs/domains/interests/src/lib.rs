//! Interests Domain
//!
//! Profiles, interest sets and the similarity/recommendation engine behind
//! "people you might want to meet".
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐     ┌────────────────────┐
//! │   Service   │ ──▶ │ EmbeddingProvider  │  ← text → vector
//! └──────┬──────┘     └────────────────────┘
//!        │  similarity (CandidateSelector + cosine ranking)
//!        │  recommendation (weighted scoring + cooldown)
//! ┌──────▼──────┐
//! │ Repository  │  ← Neo4j graph or in-memory
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Interests, users, recommendations
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use domain_interests::{
//!     EngineSettings, InMemoryInterestRepository, InterestService, ZeroEmbeddingProvider,
//!     handlers,
//! };
//!
//! let service = InterestService::new(
//!     InMemoryInterestRepository::new(),
//!     Arc::new(ZeroEmbeddingProvider::new(100)),
//!     EngineSettings::default(),
//! );
//!
//! let router = handlers::router(service);
//! ```

pub mod cooldown;
pub mod embedding;
pub mod error;
pub mod handlers;
pub mod math;
pub mod models;
pub mod neo4j;
pub mod recommendation;
pub mod repository;
pub mod service;
pub mod settings;
pub mod similarity;

pub use cooldown::{CooldownPolicy, CooldownState};
pub use embedding::{
    EmbeddingConfig, EmbeddingProvider, OpenAIProvider, WordVectorProvider, ZeroEmbeddingProvider,
    build_provider,
};
pub use error::{InterestError, InterestResult};
pub use models::{
    CreateUser, Interest, InterestInput, MatchedInterest, Recommendation, RecommendedUser,
    SimilarInterest, User, UserCreation,
};
pub use neo4j::Neo4jInterestRepository;
pub use repository::{InMemoryInterestRepository, InterestRepository};
pub use service::InterestService;
pub use settings::{CandidateStrategy, EngineSettings};
pub use similarity::{CandidateSelector, ExhaustiveSelector, RandomSampleSelector};
