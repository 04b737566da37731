//! Topic-based broadcast bus.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::types::{GameUpdate, LobbyEvent, TurnNotice};

/// Topics for event routing
#[derive(
    Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize, strum::Display, strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum Topic {
    /// One entry per successful command, with its diff and domain events
    GameState,
    /// Turn, phase and generation changes
    Turn,
    /// Games created or removed and players joining
    Lobby,
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    GameState(GameUpdate),
    Turn(TurnNotice),
    Lobby(LobbyEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::GameState(_) => Topic::GameState,
            Event::Turn(_) => Topic::Turn,
            Event::Lobby(_) => Topic::Lobby,
        }
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Publishing never blocks; events sent while a
/// topic has no subscribers are dropped.
#[derive(Clone)]
pub struct EventBus {
    channels: Arc<HashMap<Topic, broadcast::Sender<Event>>>,
    // Kept so `subscribe` can always hand out a receiver.
    fallback: broadcast::Sender<Event>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        use strum::IntoEnumIterator;

        let capacity = capacity.max(1);
        let channels = Topic::iter()
            .map(|topic| (topic, broadcast::channel(capacity).0))
            .collect();

        Self {
            channels: Arc::new(channels),
            fallback: broadcast::channel(1).0,
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!(target: "runtime::events", %topic, "no subscribers");
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }

    /// Subscribe to multiple topics
    ///
    /// Returns receivers for each requested topic.
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }

    /// Number of live receivers on `topic`.
    pub fn receiver_count(&self, topic: Topic) -> usize {
        self.sender(topic).receiver_count()
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        self.channels.get(&topic).unwrap_or(&self.fallback)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terra_core::GameId;

    fn created(id: &str) -> Event {
        Event::Lobby(LobbyEvent::GameCreated {
            game_id: GameId::new(id),
        })
    }

    #[tokio::test]
    async fn subscribers_only_see_their_topic() {
        let bus = EventBus::with_capacity(8);
        let mut lobby = bus.subscribe(Topic::Lobby);
        let mut turns = bus.subscribe(Topic::Turn);

        bus.publish(created("g1"));

        let event = lobby.recv().await.unwrap();
        assert_eq!(event.topic(), Topic::Lobby);
        assert!(turns.try_recv().is_err());
    }

    #[test]
    fn publishing_without_subscribers_is_harmless() {
        let bus = EventBus::new();
        bus.publish(created("g1"));
        assert_eq!(bus.receiver_count(Topic::Lobby), 0);
    }

    #[test]
    fn subscribe_multiple_returns_one_receiver_per_topic() {
        let bus = EventBus::new();
        let receivers = bus.subscribe_multiple(&[Topic::GameState, Topic::Turn]);
        assert_eq!(receivers.len(), 2);
        assert_eq!(bus.receiver_count(Topic::GameState), 1);
    }
}
