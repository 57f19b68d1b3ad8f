//! Immediate retry of fallible async operations
//!
//! An attempt budget of `n` allows `n` retries after the first call, so an
//! operation runs at most `n + 1` times. A budget of 0 runs it exactly once.
//! There is no delay between attempts.

use std::future::Future;

/// Retry budget for one operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RetryPolicy {
    attempts: u32,
}

impl RetryPolicy {
    pub fn new(attempts: u32) -> Self {
        Self { attempts }
    }

    /// Retries left after the first call
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Upper bound on the number of calls made by [`RetryPolicy::run`]
    pub fn max_calls(&self) -> u32 {
        self.attempts.saturating_add(1)
    }

    /// Runs `op` until it succeeds or the budget is spent
    ///
    /// `on_failure` sees every failed call with its 1-based call number,
    /// including the last one. The last failure is returned on exhaustion.
    pub async fn run<T, E, F, Fut, L>(&self, mut op: F, mut on_failure: L) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        L: FnMut(u32, &E),
    {
        let mut remaining = self.attempts;
        let mut call = 1;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    on_failure(call, &error);
                    if remaining == 0 {
                        return Err(error);
                    }
                    remaining -= 1;
                    call += 1;
                }
            }
        }
    }
}

/// Runs `op` with `attempts` immediate retries, without failure reporting
pub async fn retry<T, E, F, Fut>(attempts: u32, op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    RetryPolicy::new(attempts).run(op, |_, _| {}).await
}
