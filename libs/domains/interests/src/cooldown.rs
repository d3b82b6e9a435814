//! Per-user recommendation cooldown.
//!
//! A user is `Eligible` until recommended, then in `Cooldown` for one window.
//! Nothing is stored besides `last_recommended_at`; the state is derived at query time.

use chrono::{DateTime, Duration, Utc};

pub const DEFAULT_COOLDOWN_SECS: i64 = 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownState {
    Eligible,
    Cooldown { until: DateTime<Utc> },
}

impl CooldownState {
    pub fn is_eligible(&self) -> bool {
        matches!(self, CooldownState::Eligible)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownPolicy {
    window: Duration,
}

impl CooldownPolicy {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Users recommended at or after this instant are still cooling down.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.window
    }

    /// Eligible iff never recommended or last recommended strictly before the cutoff.
    pub fn state(
        &self,
        last_recommended_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> CooldownState {
        match last_recommended_at {
            Some(last) if last >= self.cutoff(now) => CooldownState::Cooldown {
                until: last + self.window,
            },
            _ => CooldownState::Eligible,
        }
    }

    /// State against a cutoff computed by [`CooldownPolicy::cutoff`] elsewhere.
    pub fn state_at_cutoff(
        last_recommended_at: Option<DateTime<Utc>>,
        cutoff: DateTime<Utc>,
    ) -> CooldownState {
        Self::new(Duration::zero()).state(last_recommended_at, cutoff)
    }
}

impl Default for CooldownPolicy {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_COOLDOWN_SECS))
    }
}
