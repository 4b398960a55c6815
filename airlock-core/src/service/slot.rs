//! Reservation state for the single uplink slot.

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::events::EventBus;
use crate::models::Availability;
use crate::time::naive_utc_now;

/// The one shared slot. Occupancy is the id of the event holding it.
#[derive(Debug)]
pub struct StreamSlot {
    state: Mutex<Option<Uuid>>,
    events: EventBus,
}

impl StreamSlot {
    pub fn new(events: EventBus) -> Self {
        Self {
            state: Mutex::new(None),
            events,
        }
    }

    /// Current occupancy, stamped with the observation time.
    pub async fn current(&self) -> Availability {
        let state = self.state.lock().await;
        Availability {
            event: *state,
            checked_at: naive_utc_now(),
        }
    }

    /// Claim the slot for an event, failing with `StreamBusy` when occupied.
    /// The availability change is published while the lock is still held so
    /// subscribers observe claims and releases in the order they happened.
    pub async fn claim(&self, event_id: Uuid) -> Result<SlotClaim<'_>> {
        let mut state = self.state.lock().await;

        if let Some(current) = *state {
            return Err(Error::StreamBusy(current));
        }

        *state = Some(event_id);
        self.events.availability_changed(Availability {
            event: Some(event_id),
            checked_at: naive_utc_now(),
        });

        Ok(SlotClaim { slot: self })
    }

    /// Free the slot unconditionally and publish the change.
    pub async fn release(&self) {
        let mut state = self.state.lock().await;
        *state = None;
        self.events.availability_changed(Availability {
            event: None,
            checked_at: naive_utc_now(),
        });
    }
}

/// Proof of a successful claim. Resolved exactly once: `commit` hands the
/// release over to the pipeline watcher, `abort` rolls the claim back.
#[must_use = "a slot claim must be committed or aborted"]
#[derive(Debug)]
pub struct SlotClaim<'a> {
    slot: &'a StreamSlot,
}

impl SlotClaim<'_> {
    /// Keep the claim. The caller is now responsible for an eventual
    /// `release`, usually via the pipeline completion watcher.
    pub fn commit(self) {}

    /// Undo the claim, freeing the slot and republishing availability.
    pub async fn abort(self) {
        self.slot.release().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::StreamEvent;

    #[tokio::test]
    async fn test_claim_occupies_slot() {
        let slot = StreamSlot::new(EventBus::new());
        let event_id = Uuid::new_v4();

        let claim = slot.claim(event_id).await.expect("slot should be free");
        claim.commit();

        assert_eq!(slot.current().await.event, Some(event_id));
    }

    #[tokio::test]
    async fn test_second_claim_reports_holder() {
        let slot = StreamSlot::new(EventBus::new());
        let first = Uuid::new_v4();

        slot.claim(first).await.expect("slot should be free").commit();

        let err = slot.claim(Uuid::new_v4()).await.expect_err("slot is taken");
        match err {
            Error::StreamBusy(current) => assert_eq!(current, first),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_abort_frees_slot() {
        let slot = StreamSlot::new(EventBus::new());

        let claim = slot.claim(Uuid::new_v4()).await.expect("slot should be free");
        claim.abort().await;

        assert_eq!(slot.current().await.event, None);
    }

    #[tokio::test]
    async fn test_claim_and_release_publish_in_order() {
        let events = EventBus::new();
        let slot = StreamSlot::new(events.clone());
        let mut subscriber = events.subscribe();
        let event_id = Uuid::new_v4();

        slot.claim(event_id).await.expect("slot should be free").commit();
        slot.release().await;

        let StreamEvent::AvailabilityChanged { data: first, .. } =
            subscriber.recv().await.expect("claim event");
        assert_eq!(first.availability.event, Some(event_id));

        let StreamEvent::AvailabilityChanged { data: second, .. } =
            subscriber.recv().await.expect("release event");
        assert_eq!(second.availability.event, None);
    }
}
