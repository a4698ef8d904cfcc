use super::*;
use qf_core::*;
use tokio::sync::mpsc::UnboundedSender;

/// Handle returned by [`EventBus::subscribe`], required to unsubscribe.
///
/// Deliberately not Clone: exactly one teardown per binding, and tearing
/// down a handle the bus never issued is a lifecycle bug.
#[derive(Debug)]
pub struct Subscription {
    id: usize,
    channel: PlayerId,
    topic: Topic,
}

struct Binding {
    id: usize,
    channel: PlayerId,
    topic: Topic,
    sender: UnboundedSender<Event>,
}

/// Synchronous in-process pub/sub.
///
/// Each binding scopes a sender to one (channel, topic) pair, where the
/// channel is a session's player id. Publishing delivers to matching
/// bindings in subscription order before returning; sends are unbounded,
/// so nothing here ever blocks.
#[derive(Default)]
pub struct EventBus {
    next_id: usize,
    bindings: Vec<Binding>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }
    /// Binds a sender to (channel, topic). Returns the teardown handle.
    pub fn subscribe(
        &mut self,
        channel: PlayerId,
        topic: Topic,
        sender: UnboundedSender<Event>,
    ) -> Subscription {
        let id = self.next_id;
        self.next_id += 1;
        self.bindings.push(Binding {
            id,
            channel,
            topic,
            sender,
        });
        Subscription { id, channel, topic }
    }
    /// Removes one binding. Panics on a handle that is not registered:
    /// that indicates double-teardown or a foreign handle, not a
    /// legitimate state.
    pub fn unsubscribe(&mut self, subscription: Subscription) {
        let position = self
            .bindings
            .iter()
            .position(|b| b.id == subscription.id)
            .unwrap_or_else(|| {
                panic!(
                    "unsubscribing unknown binding {} (P{} {:?})",
                    subscription.id, subscription.channel, subscription.topic
                )
            });
        self.bindings.remove(position);
    }
    /// Delivers the event to every binding matching (channel, topic), in
    /// subscription order.
    pub fn publish(&self, channel: PlayerId, event: Event) {
        for binding in self
            .bindings
            .iter()
            .filter(|b| b.channel == channel && b.topic == event.topic())
        {
            if binding.sender.send(event.clone()).is_err() {
                log::warn!("[bus] delivery to P{} failed: receiver gone", channel);
            }
        }
    }
    /// Number of live bindings, across all channels.
    pub fn bindings(&self) -> usize {
        self.bindings.len()
    }
}
