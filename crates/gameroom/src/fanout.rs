use super::*;
use qf_core::*;

/// Broadcast composition over room membership.
///
/// Thin view over the bus plus the current member list; rooms build one
/// per delivery phase so membership mutation and fanout never overlap.
pub struct Fanout<'a> {
    bus: &'a EventBus,
    members: &'a [PlayerId],
}

impl<'a> Fanout<'a> {
    pub fn new(bus: &'a EventBus, members: &'a [PlayerId]) -> Self {
        Self { bus, members }
    }
    /// Delivers to every member's channel.
    pub fn send_all(&self, event: Event) {
        log::debug!("[fanout] all: {}", event);
        for &member in self.members {
            self.bus.publish(member, event.clone());
        }
    }
    /// Delivers to every member except one.
    pub fn send_except(&self, except: PlayerId, event: Event) {
        log::debug!("[fanout] all but P{}: {}", except, event);
        for &member in self.members.iter().filter(|&&m| m != except) {
            self.bus.publish(member, event.clone());
        }
    }
    /// Delivers to a single member.
    pub fn send_to(&self, player: PlayerId, event: Event) {
        log::debug!("[fanout] P{}: {}", player, event);
        self.bus.publish(player, event);
    }
}
