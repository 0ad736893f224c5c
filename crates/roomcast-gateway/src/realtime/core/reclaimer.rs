use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::time::Duration;

use tokio::task::AbortHandle;

struct PendingDeletion {
    ticket: u64,
    handle: AbortHandle,
}

/// Deferred deletion of rooms that became empty.
///
/// At most one timer per room name. Every armed timer carries a ticket; a
/// firing timer must claim its ticket with [`Reclaimer::claim`] before acting,
/// so a timer that was replaced or cancelled while it was waiting does nothing.
///
/// Between a successful claim and the end of the repository delete the room
/// is marked as reclaiming; joins treat such a room as already gone.
#[derive(Default)]
pub struct Reclaimer {
    timers: HashMap<String, PendingDeletion>,
    reclaiming: HashSet<String>,
    next_ticket: u64,
}

impl Reclaimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a one-shot timer for `room`, replacing any outstanding one.
    ///
    /// `fire` receives the ticket and builds the future that runs once
    /// `delay` has elapsed. Returns the ticket.
    pub fn schedule<F, Fut>(&mut self, room: &str, delay: Duration, fire: F) -> u64
    where
        F: FnOnce(u64) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel(room);

        self.next_ticket += 1;
        let ticket = self.next_ticket;
        let task = fire(ticket);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        })
        .abort_handle();

        tracing::debug!(%room, ticket, delay_secs = delay.as_secs(), "room reclamation armed");
        self.timers
            .insert(room.to_string(), PendingDeletion { ticket, handle });
        ticket
    }

    /// Cancel and forget the timer for `room`. Returns whether one existed.
    pub fn cancel(&mut self, room: &str) -> bool {
        match self.timers.remove(room) {
            Some(pending) => {
                pending.handle.abort();
                tracing::debug!(%room, ticket = pending.ticket, "room reclamation cancelled");
                true
            }
            None => false,
        }
    }

    /// Called by a firing timer: removes the entry if `ticket` is still the
    /// live one for `room`.
    pub fn claim(&mut self, room: &str, ticket: u64) -> bool {
        match self.timers.get(room) {
            Some(pending) if pending.ticket == ticket => {
                self.timers.remove(room);
                true
            }
            _ => false,
        }
    }

    pub fn begin_reclaim(&mut self, room: &str) {
        self.reclaiming.insert(room.to_string());
    }

    pub fn finish_reclaim(&mut self, room: &str) {
        self.reclaiming.remove(room);
    }

    pub fn is_reclaiming(&self, room: &str) -> bool {
        self.reclaiming.contains(room)
    }

    pub fn is_pending(&self, room: &str) -> bool {
        self.timers.contains_key(room)
    }

    pub fn pending_count(&self) -> usize {
        self.timers.len()
    }
}
