/// Debouncing for the search box
///
/// The debouncer never owns a timer. `schedule` stores the latest value and
/// hands out a ticket; whoever runs the delay gives the ticket back through
/// `fire` once it elapses. Each `schedule` supersedes every earlier ticket,
/// so only the timer started by the last edit commits anything.

use std::time::Duration;

/// Quiet period before search text is applied
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceTicket(u64);

#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    generation: u64,
    pending: Option<T>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: 0,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replace the pending value and restart the quiet period
    pub fn schedule(&mut self, value: T) -> DebounceTicket {
        self.generation += 1;
        self.pending = Some(value);
        DebounceTicket(self.generation)
    }

    /// Called when a ticket's delay has elapsed. Yields the pending value
    /// only for the most recent ticket.
    pub fn fire(&mut self, ticket: DebounceTicket) -> Option<T> {
        if ticket.0 != self.generation {
            return None;
        }
        self.pending.take()
    }

    #[cfg(test)]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Wait out a ticket's delay. Runs as an async task.
pub async fn settle_after(delay: Duration, ticket: DebounceTicket) -> DebounceTicket {
    tokio::time::sleep(delay).await;
    ticket
}
