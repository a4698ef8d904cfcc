//! Hosting layer for quadfall rooms.
//!
//! The transport (HTTP routes, websocket framing) lives outside this
//! workspace; what it needs from the core is here:
//!
//! - [`Registry`] — constructor-injected room lookup: create, get, delete
//! - [`RoomHandle`] — cloneable intake endpoint for one room
//! - [`RoomActor`] — the task that serializes a room's inbound traffic
//!
//! A room's entire object graph lives on its actor task, so rooms are
//! isolated from each other by construction rather than by locking.

mod actor;
mod handle;
mod registry;

pub use actor::*;
pub use handle::*;
pub use registry::*;
