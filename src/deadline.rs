use crate::error::{ResourceLimit, Result, SigilError};
use std::time::{Duration, Instant};

/// Wall-clock budget for one generation request, polled from the hot loops.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    budget: Duration,
}

impl Deadline {
    pub fn start(budget: Duration) -> Self {
        Self {
            started: Instant::now(),
            budget,
        }
    }

    pub fn unbounded() -> Self {
        Self::start(Duration::MAX)
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn check(&self) -> Result<()> {
        if self.started.elapsed() > self.budget {
            return Err(SigilError::ResourceLimitExceeded(
                ResourceLimit::TimeBudget {
                    budget: self.budget,
                },
            ));
        }
        Ok(())
    }
}
