//! Trade-price sampling inside a bar.
//!
//! The agent never trades exactly at a bar's open or close in practice. The
//! default takes the midpoint between open and close; `uniform-open-close`
//! draws a price between the two from a seeded RNG so episodes stay
//! reproducible.

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::MarketBar;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PriceSamplingPolicy {
    #[default]
    Midpoint,
    Open,
    Close,
    UniformOpenClose,
}

impl PriceSamplingPolicy {
    pub fn is_random(self) -> bool {
        matches!(self, Self::UniformOpenClose)
    }
}

/// Policy plus the RNG it draws from. Reseeded on every environment reset.
#[derive(Debug, Clone)]
pub struct PriceSampler {
    policy: PriceSamplingPolicy,
    rng: StdRng,
}

impl PriceSampler {
    pub fn new(policy: PriceSamplingPolicy, rng: StdRng) -> Self {
        Self { policy, rng }
    }

    pub fn policy(&self) -> PriceSamplingPolicy {
        self.policy
    }

    pub fn reseed(&mut self, rng: StdRng) {
        self.rng = rng;
    }

    pub fn sample(&mut self, bar: &MarketBar) -> f64 {
        match self.policy {
            PriceSamplingPolicy::Midpoint => bar.open_close_mid(),
            PriceSamplingPolicy::Open => bar.open,
            PriceSamplingPolicy::Close => bar.close,
            PriceSamplingPolicy::UniformOpenClose => {
                let (lo, hi) = if bar.open <= bar.close {
                    (bar.open, bar.close)
                } else {
                    (bar.close, bar.open)
                };
                if lo == hi {
                    lo
                } else {
                    self.rng.gen_range(lo..=hi)
                }
            }
        }
    }
}
