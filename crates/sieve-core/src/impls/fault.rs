//! FaultInjector の実装
//!
//! - RandomFault: 確率 p で壊す（rand）
//! - OddNanosecondFault: `now` のナノ秒が奇数なら壊す（おおむね 50%）
//! - NoFault: 壊さない

use chrono::{DateTime, Timelike, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

use crate::ports::FaultInjector;

/// Corrupts each task independently with a fixed probability.
#[derive(Debug)]
pub struct RandomFault {
    probability: f64,
    rng: Mutex<StdRng>,
}

impl RandomFault {
    /// `probability` is clamped to `[0, 1]`.
    pub fn new(probability: f64) -> Self {
        Self::with_rng(probability, StdRng::from_entropy())
    }

    /// Reproducible variant for tests.
    pub fn seeded(probability: f64, seed: u64) -> Self {
        Self::with_rng(probability, StdRng::seed_from_u64(seed))
    }

    fn with_rng(probability: f64, rng: StdRng) -> Self {
        let probability = if probability.is_nan() {
            0.0
        } else {
            probability.clamp(0.0, 1.0)
        };
        Self {
            probability,
            rng: Mutex::new(rng),
        }
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }
}

impl FaultInjector for RandomFault {
    fn corrupt(&self, _now: DateTime<Utc>) -> bool {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.gen_bool(self.probability)
    }
}

/// Corrupts the task when the creation instant has an odd nanosecond.
#[derive(Debug, Clone, Copy, Default)]
pub struct OddNanosecondFault;

impl FaultInjector for OddNanosecondFault {
    fn corrupt(&self, now: DateTime<Utc>) -> bool {
        now.nanosecond() % 2 == 1
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoFault;

impl FaultInjector for NoFault {
    fn corrupt(&self, _now: DateTime<Utc>) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn instant(nanos: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
            + chrono::TimeDelta::nanoseconds(nanos as i64)
    }

    #[test]
    fn odd_nanosecond_rule() {
        assert!(OddNanosecondFault.corrupt(instant(1)));
        assert!(OddNanosecondFault.corrupt(instant(999)));
        assert!(!OddNanosecondFault.corrupt(instant(0)));
        assert!(!OddNanosecondFault.corrupt(instant(1_000)));
    }

    #[test]
    fn random_fault_extremes_are_deterministic() {
        let never = RandomFault::seeded(0.0, 7);
        let always = RandomFault::seeded(1.0, 7);
        for _ in 0..100 {
            assert!(!never.corrupt(instant(0)));
            assert!(always.corrupt(instant(0)));
        }
    }

    #[test]
    fn random_fault_clamps_out_of_range_probability() {
        assert_eq!(RandomFault::new(1.5).probability(), 1.0);
        assert_eq!(RandomFault::new(-0.5).probability(), 0.0);
        assert_eq!(RandomFault::new(f64::NAN).probability(), 0.0);
    }

    #[test]
    fn random_fault_hits_roughly_the_requested_rate() {
        let fault = RandomFault::seeded(0.5, 42);
        let hits = (0..10_000).filter(|_| fault.corrupt(instant(0))).count();
        assert!((4_000..6_000).contains(&hits), "hits={hits}");
    }

    #[test]
    fn no_fault_never_corrupts() {
        assert!(!NoFault.corrupt(instant(1)));
    }
}
