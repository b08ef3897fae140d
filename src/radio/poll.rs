//! # Busy-Wait Polling
//!
//! Every wait in the driver is a status poll with a fixed delay between reads.
//! [`PollPolicy`] describes how long to keep going: the delay, an optional upper
//! bound on the number of reads, and an optional [`CancelToken`] that another
//! thread can trip to abort the wait at the next poll boundary.
//!
//! The default policy never gives up, which matches how the chip is normally
//! driven: a transmission always ends with TX_DONE unless the hardware is gone.

use crate::radio::registers::POLL_INTERVAL_MS;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag shared between a waiter and its controller
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; the waiter stops at its next poll boundary.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Re-arm the token so it can be used for another wait.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Why a wait ended without its condition becoming true
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStop {
    /// The bounded number of reads was used up
    Exhausted { attempts: u32 },
    /// The cancel token was tripped
    Cancelled,
}

/// Delay, bound and cancellation for a busy-wait
#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// Delay between two status reads in milliseconds
    pub interval_ms: u32,
    /// Maximum number of status reads, `None` for unbounded
    pub max_attempts: Option<u32>,
    /// Optional cancellation flag checked between reads
    pub cancel: Option<CancelToken>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval_ms: POLL_INTERVAL_MS,
            max_attempts: None,
            cancel: None,
        }
    }
}

impl PollPolicy {
    /// Unbounded policy with the given delay
    pub fn unbounded(interval_ms: u32) -> Self {
        Self {
            interval_ms,
            ..Self::default()
        }
    }

    /// Give up after `max_attempts` status reads
    pub fn bounded(interval_ms: u32, max_attempts: u32) -> Self {
        Self {
            interval_ms,
            max_attempts: Some(max_attempts),
            cancel: None,
        }
    }

    /// Attach a cancellation token
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Start tracking a new wait under this policy
    pub fn start(&self) -> Poller<'_> {
        Poller {
            policy: self,
            attempts: 0,
        }
    }
}

/// State of one wait in progress
///
/// The caller reads the status, and when the condition is not yet met calls
/// [`Poller::next_attempt`]. `Ok(())` means sleep for the interval and read
/// again; `Err` means stop waiting.
#[derive(Debug)]
pub struct Poller<'a> {
    policy: &'a PollPolicy,
    attempts: u32,
}

impl Poller<'_> {
    /// Record a failed status read and decide whether to keep going.
    pub fn next_attempt(&mut self) -> Result<(), PollStop> {
        self.attempts = self.attempts.saturating_add(1);

        if let Some(max) = self.policy.max_attempts {
            if self.attempts >= max {
                return Err(PollStop::Exhausted {
                    attempts: self.attempts,
                });
            }
        }

        if let Some(token) = &self.policy.cancel {
            if token.is_cancelled() {
                return Err(PollStop::Cancelled);
            }
        }

        Ok(())
    }

    /// Status reads recorded so far
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn interval_ms(&self) -> u32 {
        self.policy.interval_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unbounded() {
        let policy = PollPolicy::default();
        assert_eq!(policy.interval_ms, 1);
        let mut poller = policy.start();
        for _ in 0..10_000 {
            assert!(poller.next_attempt().is_ok());
        }
        assert_eq!(poller.attempts(), 10_000);
    }

    #[test]
    fn test_bounded_stops_after_max_reads() {
        let policy = PollPolicy::bounded(1, 3);
        let mut poller = policy.start();
        assert!(poller.next_attempt().is_ok());
        assert!(poller.next_attempt().is_ok());
        assert_eq!(
            poller.next_attempt(),
            Err(PollStop::Exhausted { attempts: 3 })
        );
    }

    #[test]
    fn test_cancel_between_reads() {
        let token = CancelToken::new();
        let policy = PollPolicy::unbounded(5).with_cancel(token.clone());
        let mut poller = policy.start();
        assert!(poller.next_attempt().is_ok());

        token.cancel();
        assert_eq!(poller.next_attempt(), Err(PollStop::Cancelled));

        token.reset();
        assert!(policy.start().next_attempt().is_ok());
    }

    #[test]
    fn test_cancel_token_shared_across_threads() {
        let token = CancelToken::new();
        let remote = token.clone();
        std::thread::spawn(move || remote.cancel())
            .join()
            .unwrap();
        assert!(token.is_cancelled());
    }
}
