//! Delay strategies between transaction retry attempts.

use rand::Rng;
use std::time::Duration;

/// Computes the wait before the next attempt.
///
/// `attempt` is zero-based: the delay after the first failed attempt is
/// `delay(0)`. Closures `Fn(u32) -> Duration` implement this trait too.
pub trait Backoff: Send + Sync {
    fn delay(&self, attempt: u32) -> Duration;
}

impl<F> Backoff for F
where
    F: Fn(u32) -> Duration + Send + Sync,
{
    fn delay(&self, attempt: u32) -> Duration {
        self(attempt)
    }
}

/// Randomization applied on top of an exponential delay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Jitter {
    #[default]
    None,
    /// Uniform in `[0, delay)`.
    Full,
    /// `delay / 2` plus uniform in `[0, delay / 2)`.
    Equal,
}

/// `base_delay * multiplier^attempt`, capped at `max_delay`, then jittered.
#[derive(Clone, Debug)]
pub struct ExponentialBackoff {
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
    pub jitter: Jitter,
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            multiplier: 2.0,
            jitter: Jitter::None,
        }
    }
}

impl ExponentialBackoff {
    pub fn with_jitter(mut self, jitter: Jitter) -> Self {
        self.jitter = jitter;
        self
    }

    fn capped(&self, attempt: u32) -> Duration {
        let exp = i32::try_from(attempt).unwrap_or(i32::MAX);
        let nanos = self.base_delay.as_nanos() as f64 * self.multiplier.powi(exp);
        // NaN and overflow fall through to the cap.
        if !(nanos < self.max_delay.as_nanos() as f64) {
            return self.max_delay;
        }
        if nanos <= 0.0 {
            return Duration::ZERO;
        }
        Duration::from_nanos(nanos as u64)
    }
}

impl Backoff for ExponentialBackoff {
    fn delay(&self, attempt: u32) -> Duration {
        let delay = self.capped(attempt);
        match self.jitter {
            Jitter::None => delay,
            Jitter::Full => random_below(delay).unwrap_or(delay),
            Jitter::Equal => {
                let half = delay / 2;
                match random_below(half) {
                    Some(r) => half + r,
                    None => delay,
                }
            }
        }
    }
}

/// Uniform duration in `[0, upper)`, or `None` when `upper` is zero.
fn random_below(upper: Duration) -> Option<Duration> {
    let nanos = u64::try_from(upper.as_nanos()).unwrap_or(u64::MAX);
    if nanos == 0 {
        return None;
    }
    Some(Duration::from_nanos(rand::rng().random_range(0..nanos)))
}

/// `base_delay + attempt * increment`, capped at `max_delay`.
#[derive(Clone, Debug)]
pub struct LinearBackoff {
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub increment: Duration,
}

impl Default for LinearBackoff {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            increment: Duration::from_millis(100),
        }
    }
}

impl Backoff for LinearBackoff {
    fn delay(&self, attempt: u32) -> Duration {
        self.increment
            .checked_mul(attempt)
            .and_then(|step| self.base_delay.checked_add(step))
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_growth_and_cap() {
        let b = ExponentialBackoff::default();
        assert_eq!(b.delay(0), Duration::from_millis(100));
        assert_eq!(b.delay(1), Duration::from_millis(200));
        assert_eq!(b.delay(3), Duration::from_millis(800));
        assert_eq!(b.delay(10), Duration::from_secs(5));
        assert_eq!(b.delay(u32::MAX), Duration::from_secs(5));

        let mut prev = Duration::ZERO;
        for attempt in 0..20 {
            let d = b.delay(attempt);
            assert!(d >= prev);
            prev = d;
        }
    }

    #[test]
    fn test_full_jitter_bounds() {
        let b = ExponentialBackoff::default().with_jitter(Jitter::Full);
        let delays: Vec<Duration> = (0..20).map(|_| b.delay(3)).collect();
        assert!(delays.iter().all(|d| *d < Duration::from_millis(800)));
        assert!(delays.iter().any(|d| *d != delays[0]));
    }

    #[test]
    fn test_equal_jitter_bounds() {
        let b = ExponentialBackoff::default().with_jitter(Jitter::Equal);
        for _ in 0..20 {
            let d = b.delay(2);
            assert!(d >= Duration::from_millis(200));
            assert!(d < Duration::from_millis(400));
        }
    }

    #[test]
    fn test_zero_base_has_no_jitter() {
        let b = ExponentialBackoff {
            base_delay: Duration::ZERO,
            ..ExponentialBackoff::default()
        }
        .with_jitter(Jitter::Full);
        assert_eq!(b.delay(4), Duration::ZERO);
    }

    #[test]
    fn test_linear() {
        let b = LinearBackoff::default();
        assert_eq!(b.delay(0), Duration::from_millis(100));
        assert_eq!(b.delay(4), Duration::from_millis(500));
        assert_eq!(b.delay(100), Duration::from_secs(5));
        assert_eq!(b.delay(u32::MAX), Duration::from_secs(5));
    }

    #[test]
    fn test_closure_backoff() {
        let b = |attempt: u32| Duration::from_millis(u64::from(attempt) * 10);
        assert_eq!(Backoff::delay(&b, 3), Duration::from_millis(30));
    }
}
