use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

struct Inner {
    failures: u32,
    last_failure: Option<Instant>,
    state: CircuitState,
}

/// Fail-fast guard for one provider. One instance per provider, shared by
/// every request for the lifetime of the process.
///
/// CLOSED: calls proceed, failures count up; reaching `max_failures` opens
/// the circuit. OPEN: calls are rejected until `half_open_after` has elapsed
/// since the last failure. HALF_OPEN is entered lazily by `can_proceed` (no
/// timer): one probe call goes through, success closes the circuit, failure
/// reopens it and restarts the wait window.
pub struct CircuitBreaker {
    max_failures: u32,
    half_open_after: Duration,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    pub fn new(max_failures: u32, half_open_after: Duration) -> Self {
        Self {
            max_failures,
            half_open_after,
            inner: Mutex::new(Inner {
                failures: 0,
                last_failure: None,
                state: CircuitState::Closed,
            }),
        }
    }

    pub fn can_proceed(&self) -> bool {
        let mut inner = self.inner.lock();
        if inner.state == CircuitState::Open {
            if let Some(last) = inner.last_failure {
                if last.elapsed() >= self.half_open_after {
                    inner.state = CircuitState::HalfOpen;
                }
            }
        }
        inner.state != CircuitState::Open
    }

    pub fn succeed(&self) {
        let mut inner = self.inner.lock();
        inner.failures = 0;
        inner.state = CircuitState::Closed;
    }

    pub fn fail(&self) {
        let mut inner = self.inner.lock();
        inner.failures += 1;
        inner.last_failure = Some(Instant::now());
        if inner.failures >= self.max_failures {
            inner.state = CircuitState::Open;
        }
    }

    pub fn state(&self) -> CircuitState {
        self.inner.lock().state
    }

    pub fn failures(&self) -> u32 {
        self.inner.lock().failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn opens_after_max_consecutive_failures() {
        let breaker = CircuitBreaker::new(4, Duration::from_secs(10));
        for _ in 0..3 {
            breaker.fail();
            assert!(breaker.can_proceed());
        }
        breaker.fail();
        assert!(!breaker.can_proceed());
        assert_eq!(breaker.state(), CircuitState::Open);
    }

    #[test]
    fn half_opens_after_the_cooldown_window() {
        let breaker = CircuitBreaker::new(2, Duration::from_millis(30));
        breaker.fail();
        breaker.fail();
        assert!(!breaker.can_proceed());

        thread::sleep(Duration::from_millis(40));
        assert!(breaker.can_proceed());
        assert_eq!(breaker.state(), CircuitState::HalfOpen);
    }

    #[test]
    fn probe_failure_reopens_and_restarts_the_window() {
        let breaker = CircuitBreaker::new(2, Duration::from_millis(30));
        breaker.fail();
        breaker.fail();
        thread::sleep(Duration::from_millis(40));
        assert!(breaker.can_proceed());

        breaker.fail();
        assert_eq!(breaker.state(), CircuitState::Open);
        assert!(!breaker.can_proceed());

        thread::sleep(Duration::from_millis(40));
        assert!(breaker.can_proceed());
    }

    #[test]
    fn probe_success_closes_and_resets_the_counter() {
        let breaker = CircuitBreaker::new(2, Duration::from_millis(30));
        breaker.fail();
        breaker.fail();
        thread::sleep(Duration::from_millis(40));
        assert!(breaker.can_proceed());

        breaker.succeed();
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert_eq!(breaker.failures(), 0);

        breaker.fail();
        assert!(breaker.can_proceed());
    }

    #[test]
    fn intervening_success_resets_the_failure_count() {
        let breaker = CircuitBreaker::new(2, Duration::from_secs(10));
        breaker.fail();
        breaker.succeed();
        breaker.fail();
        assert!(breaker.can_proceed());
        assert_eq!(breaker.state(), CircuitState::Closed);
    }
}
