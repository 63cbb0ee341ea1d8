use tokio::sync::broadcast;

use crate::dto::events::ServerEvent;

/// Broadcast hub fanning scoreboard events out to every connected viewer.
///
/// Publishing never waits on subscribers: a receiver that falls more than `capacity`
/// events behind observes a lag and skips ahead.
pub struct EventHub {
    sender: broadcast::Sender<ServerEvent>,
}

impl EventHub {
    /// Construct a new hub backed by a Tokio broadcast channel with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Register a new subscriber that will receive subsequent events only.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    /// Send an event to all current subscribers and return how many were reached.
    ///
    /// Having nobody listening is not an error; the event is simply dropped.
    pub fn broadcast(&self, event: ServerEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn events_reach_every_subscriber_in_order() {
        let hub = EventHub::new(8);
        let mut first = hub.subscribe();
        let mut second = hub.subscribe();

        assert_eq!(hub.broadcast(ServerEvent::new("a", json!(1))), 2);
        assert_eq!(hub.broadcast(ServerEvent::new("b", json!(2))), 2);

        for receiver in [&mut first, &mut second] {
            assert_eq!(receiver.recv().await.unwrap().event, "a");
            assert_eq!(receiver.recv().await.unwrap().event, "b");
        }
    }

    #[test]
    fn broadcasting_without_subscribers_is_a_no_op() {
        let hub = EventHub::new(4);
        assert_eq!(hub.broadcast(ServerEvent::new("score_update", json!({}))), 0);
    }

    #[tokio::test]
    async fn late_subscriber_does_not_see_earlier_events() {
        let hub = EventHub::new(4);
        let _early = hub.subscribe();
        hub.broadcast(ServerEvent::new("first", json!(null)));

        let mut late = hub.subscribe();
        hub.broadcast(ServerEvent::new("second", json!(null)));
        assert_eq!(late.recv().await.unwrap().event, "second");
    }

    #[tokio::test]
    async fn lagging_subscriber_does_not_block_the_publisher() {
        let hub = EventHub::new(2);
        let mut slow = hub.subscribe();
        for index in 0..10 {
            hub.broadcast(ServerEvent::new("tick", json!(index)));
        }
        assert!(matches!(
            slow.recv().await,
            Err(broadcast::error::RecvError::Lagged(_))
        ));
        assert_eq!(slow.recv().await.unwrap().payload, json!(8));
    }
}
