//! Live updates: change detection, the update hub and WebSocket delivery.

mod debouncer;
mod hub;
mod watcher;
mod websocket;

pub use hub::{DEFAULT_SESSION_CAPACITY, Hub, HubHandle, Subscription, UpdateEvent};
pub(crate) use watcher::ChangeWatcher;
pub(crate) use websocket::upgrade;
