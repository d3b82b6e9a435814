use chrono::Duration;
use core_config::{ConfigError, FromEnv, env_or_default, env_parse_or};

use crate::cooldown::{CooldownPolicy, DEFAULT_COOLDOWN_SECS};

/// How the similarity search picks the interests it compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CandidateStrategy {
    /// Bounded random sample; approximate but constant cost per query.
    #[default]
    Sample,
    /// Every other interest with a vector.
    Exhaustive,
}

impl std::str::FromStr for CandidateStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sample" => Ok(CandidateStrategy::Sample),
            "exhaustive" => Ok(CandidateStrategy::Exhaustive),
            other => Err(ConfigError::ParseError {
                key: "CANDIDATE_STRATEGY".to_string(),
                details: format!("expected 'sample' or 'exhaustive', got '{other}'"),
            }),
        }
    }
}

/// Tuning knobs of the similarity and recommendation engine.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub sample_size: usize,
    /// Candidates must score strictly above this.
    pub similarity_threshold: f64,
    pub candidate_cap: usize,
    pub cooldown: CooldownPolicy,
    pub strategy: CandidateStrategy,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            sample_size: 100,
            similarity_threshold: 0.5,
            candidate_cap: 100,
            cooldown: CooldownPolicy::default(),
            strategy: CandidateStrategy::Sample,
        }
    }
}

impl FromEnv for EngineSettings {
    /// - SIMILARITY_SAMPLE_SIZE: defaults to 100
    /// - SIMILARITY_THRESHOLD: defaults to 0.5
    /// - RECOMMEND_CANDIDATE_CAP: defaults to 100
    /// - RECOMMEND_COOLDOWN_SECS: defaults to 3600
    /// - CANDIDATE_STRATEGY: sample | exhaustive, defaults to sample
    fn from_env() -> Result<Self, ConfigError> {
        let cooldown_secs: i64 = env_parse_or("RECOMMEND_COOLDOWN_SECS", DEFAULT_COOLDOWN_SECS)?;
        let window = Duration::try_seconds(cooldown_secs)
            .filter(|d| *d >= Duration::zero())
            .ok_or_else(|| ConfigError::ParseError {
                key: "RECOMMEND_COOLDOWN_SECS".to_string(),
                details: format!("{cooldown_secs} is not a valid cooldown window"),
            })?;

        let similarity_threshold: f64 = env_parse_or("SIMILARITY_THRESHOLD", 0.5)?;
        if !(-1.0..=1.0).contains(&similarity_threshold) {
            return Err(ConfigError::ParseError {
                key: "SIMILARITY_THRESHOLD".to_string(),
                details: format!("{similarity_threshold} is outside [-1, 1]"),
            });
        }

        Ok(Self {
            sample_size: env_parse_or("SIMILARITY_SAMPLE_SIZE", 100usize)?,
            similarity_threshold,
            candidate_cap: env_parse_or("RECOMMEND_CANDIDATE_CAP", 100usize)?,
            cooldown: CooldownPolicy::new(window),
            strategy: env_or_default("CANDIDATE_STRATEGY", "sample").parse()?,
        })
    }
}
