//! Update hub.
//!
//! Brokers content-change notifications to live connections. One coordinator
//! task owns the session registry; handles talk to it through a FIFO command
//! channel, so registration, removal and matching never race.
//!
//! Each session gets a bounded queue. A publish makes one `try_send` per
//! matching session; a full or closed queue drops that session and nobody
//! else.

use std::collections::HashMap;

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use uuid::Uuid;

use folio_repo::Route;

/// Default per-session queue length.
pub const DEFAULT_SESSION_CAPACITY: usize = 16;

/// Notification that content below a route changed.
///
/// Serializes as `{"type":"update","route":"/a/b"}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename = "update")]
pub struct UpdateEvent {
    /// Changed route.
    pub route: Route,
}

enum Command {
    Register {
        id: Uuid,
        route: Route,
        sender: mpsc::Sender<UpdateEvent>,
    },
    Unregister {
        id: Uuid,
    },
    Publish {
        route: Route,
    },
    Count {
        reply: oneshot::Sender<usize>,
    },
    Shutdown,
}

/// Registry state, for logging transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RegistryState {
    Idle,
    Active,
}

struct Session {
    route: Route,
    sender: mpsc::Sender<UpdateEvent>,
}

/// Coordinator owning the session registry.
pub struct Hub {
    sessions: HashMap<Uuid, Session>,
    state: RegistryState,
}

impl Hub {
    /// Start the coordinator task.
    ///
    /// Must be called from within a tokio runtime. The task ends after
    /// [`HubHandle::shutdown`].
    pub fn spawn(capacity: usize) -> (HubHandle, JoinHandle<()>) {
        let (commands, receiver) = mpsc::unbounded_channel();
        let hub = Self {
            sessions: HashMap::new(),
            state: RegistryState::Idle,
        };
        let task = tokio::spawn(hub.run(receiver));
        let handle = HubHandle {
            commands,
            capacity: capacity.max(1),
        };
        (handle, task)
    }

    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        tracing::debug!("Update hub started");

        while let Some(command) = commands.recv().await {
            match command {
                Command::Shutdown => {
                    // Refuse new commands; `recv` yields what is queued, then `None`.
                    commands.close();
                }
                command => self.handle(command),
            }
        }

        let closed = self.sessions.len();
        self.sessions.clear();
        self.update_state();
        tracing::debug!(sessions = closed, "Update hub stopped");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Register { id, route, sender } => {
                tracing::debug!(%id, route = %route, "Live session registered");
                self.sessions.insert(id, Session { route, sender });
            }
            Command::Unregister { id } => {
                if self.sessions.remove(&id).is_some() {
                    tracing::debug!(%id, "Live session unregistered");
                }
            }
            Command::Publish { route } => self.publish(&route),
            Command::Count { reply } => {
                let _ = reply.send(self.sessions.len());
            }
            Command::Shutdown => {}
        }
        self.update_state();
    }

    fn publish(&mut self, changed: &Route) {
        let event = UpdateEvent {
            route: changed.clone(),
        };
        let mut delivered = 0usize;

        self.sessions.retain(|id, session| {
            if !changed.starts_with(&session.route) {
                return true;
            }
            match session.sender.try_send(event.clone()) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(%id, route = %session.route, "Live session queue full, dropping session");
                    false
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    tracing::debug!(%id, "Live session gone");
                    false
                }
            }
        });

        tracing::info!(route = %changed, delivered, "Published content update");
    }

    fn update_state(&mut self) {
        let next = if self.sessions.is_empty() {
            RegistryState::Idle
        } else {
            RegistryState::Active
        };
        if next != self.state {
            tracing::debug!(from = ?self.state, to = ?next, "Update hub state changed");
            self.state = next;
        }
    }
}

/// Cloneable handle to a running hub.
///
/// Every method is non-blocking; commands sent after the hub stopped are
/// ignored.
#[derive(Clone, Debug)]
pub struct HubHandle {
    commands: mpsc::UnboundedSender<Command>,
    capacity: usize,
}

impl HubHandle {
    /// Admit a live session interested in `route` and everything below it.
    #[must_use]
    pub fn register(&self, route: Route) -> Subscription {
        let id = Uuid::new_v4();
        let (sender, receiver) = mpsc::channel(self.capacity);
        // On a stopped hub the sender is dropped here and the subscription
        // reads as closed straight away.
        let _ = self.commands.send(Command::Register {
            id,
            route: route.clone(),
            sender,
        });
        Subscription {
            id,
            route,
            receiver,
            hub: self.clone(),
        }
    }

    /// Remove a session. Unknown ids are ignored.
    pub fn unregister(&self, id: Uuid) {
        let _ = self.commands.send(Command::Unregister { id });
    }

    /// Notify every session whose route equals or contains `route`.
    pub fn publish(&self, route: Route) {
        let _ = self.commands.send(Command::Publish { route });
    }

    /// Number of registered sessions, 0 once the hub has stopped.
    pub async fn session_count(&self) -> usize {
        let (reply, count) = oneshot::channel();
        if self.commands.send(Command::Count { reply }).is_err() {
            return 0;
        }
        count.await.unwrap_or(0)
    }

    /// Drain queued commands, close all sessions and stop the coordinator.
    pub fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown);
    }

    /// Whether the coordinator still accepts commands.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.commands.is_closed()
    }
}

/// One live session's end of the hub.
///
/// Dropping it unregisters the session, so every exit path of a connection
/// task cleans up.
#[derive(Debug)]
pub struct Subscription {
    id: Uuid,
    route: Route,
    receiver: mpsc::Receiver<UpdateEvent>,
    hub: HubHandle,
}

impl Subscription {
    /// Session id.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Interest route.
    #[must_use]
    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Next event, `None` once the hub dropped this session.
    pub async fn recv(&mut self) -> Option<UpdateEvent> {
        self.receiver.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.hub.unregister(self.id);
    }
}
