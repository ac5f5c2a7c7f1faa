use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};
use uuid::Uuid;

/// Serialized dashboard message, shared between every client buffer.
pub type Frame = Arc<str>;

/// Identifier of a registered client.
pub type ClientId = Uuid;

/// Work items processed, in order, by the dispatch loop.
enum HubCommand {
    Register {
        id: ClientId,
        tx: mpsc::Sender<Frame>,
        initial: Frame,
    },
    Unregister(ClientId),
    Publish(Frame),
}

/// Fan-out hub pushing state messages to every connected dashboard client.
///
/// Registration, removal and publication all travel through one inbound
/// queue, so a client registered with a snapshot only ever sees messages
/// enqueued after that snapshot was taken.
#[derive(Clone)]
pub struct BroadcastHub {
    inbound: mpsc::UnboundedSender<HubCommand>,
    clients: Arc<DashMap<ClientId, mpsc::Sender<Frame>>>,
    client_buffer: usize,
}

/// Receiving side of the hub, drained by [`HubDispatcher::run`].
pub struct HubDispatcher {
    inbound: mpsc::UnboundedReceiver<HubCommand>,
    clients: Arc<DashMap<ClientId, mpsc::Sender<Frame>>>,
}

/// A registered client's private buffer. Dropping it unregisters the client.
pub struct ClientSubscription {
    id: ClientId,
    receiver: mpsc::Receiver<Frame>,
    hub: BroadcastHub,
}

impl BroadcastHub {
    /// Build a hub whose clients each buffer at most `client_buffer` messages.
    pub fn new(client_buffer: usize) -> (Self, HubDispatcher) {
        let (inbound, inbound_rx) = mpsc::unbounded_channel();
        let clients = Arc::new(DashMap::new());
        let hub = Self {
            inbound,
            clients: clients.clone(),
            client_buffer: client_buffer.max(1),
        };
        let dispatcher = HubDispatcher {
            inbound: inbound_rx,
            clients,
        };
        (hub, dispatcher)
    }

    /// Queue a message for every client registered at dispatch time.
    pub fn publish(&self, frame: Frame) {
        if self.inbound.send(HubCommand::Publish(frame)).is_err() {
            warn!("broadcast hub dispatcher stopped; dropping message");
        }
    }

    /// Register a new client; `initial` is delivered to it alone, before any broadcast.
    pub fn register(&self, initial: Frame) -> ClientSubscription {
        let id = Uuid::new_v4();
        let (tx, receiver) = mpsc::channel(self.client_buffer);
        if self
            .inbound
            .send(HubCommand::Register { id, tx, initial })
            .is_err()
        {
            warn!(client = %id, "broadcast hub dispatcher stopped; client will receive nothing");
        }
        ClientSubscription {
            id,
            receiver,
            hub: self.clone(),
        }
    }

    /// Queue removal of a client. Never blocks.
    pub fn unregister(&self, id: ClientId) {
        let _ = self.inbound.send(HubCommand::Unregister(id));
    }

    /// Number of clients currently receiving broadcasts.
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }
}

impl HubDispatcher {
    /// Drain the inbound queue until every hub handle is dropped.
    pub async fn run(mut self) {
        while let Some(command) = self.inbound.recv().await {
            match command {
                HubCommand::Register { id, tx, initial } => {
                    if tx.try_send(initial).is_ok() {
                        self.clients.insert(id, tx);
                        debug!(client = %id, "dashboard client registered");
                    }
                }
                HubCommand::Unregister(id) => {
                    if self.clients.remove(&id).is_some() {
                        debug!(client = %id, "dashboard client unregistered");
                    }
                }
                HubCommand::Publish(frame) => self.dispatch(frame),
            }
        }
        debug!("broadcast hub dispatcher stopped");
    }

    fn dispatch(&self, frame: Frame) {
        let mut closed = Vec::new();
        for entry in self.clients.iter() {
            match entry.value().try_send(frame.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    warn!(client = %entry.key(), "client buffer full; dropping message");
                }
                Err(TrySendError::Closed(_)) => closed.push(*entry.key()),
            }
        }
        for id in closed {
            self.clients.remove(&id);
            debug!(client = %id, "evicted disconnected dashboard client");
        }
    }
}

impl ClientSubscription {
    /// Identifier assigned at registration.
    pub fn id(&self) -> ClientId {
        self.id
    }

    /// Next message for this client; `None` once the hub is gone.
    pub async fn recv(&mut self) -> Option<Frame> {
        self.receiver.recv().await
    }

    /// Next already-buffered message, without waiting.
    pub fn try_recv(&mut self) -> Option<Frame> {
        self.receiver.try_recv().ok()
    }
}

impl Drop for ClientSubscription {
    fn drop(&mut self) {
        self.hub.unregister(self.id);
    }
}
