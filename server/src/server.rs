use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};

use system::{ConnectionId, Envelope};

use crate::broadcast;
use crate::canvas::CanvasLog;
use crate::connection::{ConnectionCommand, ConnectionEvent, ConnectionSeq, ConnectionTx};
use crate::registry::{RegistryError, SessionRegistry};

// Unbounded so a burst of inbound events can never fail command delivery;
// teardown commands in particular must not be lost. Memory growth is bounded
// by what connections can produce between polls of the server task.
pub type ServerTx = UnboundedSender<ConnectionCommand>;

/// Owns the authoritative whiteboard state: the session registry and the
/// canvas log. Every command is handled on the single server task, so no
/// per-structure locks are needed and snapshot reads are never torn.
pub struct Server {
    registry: SessionRegistry,
    canvas: CanvasLog,
}

impl Server {
    pub fn new() -> Self {
        Self {
            registry: SessionRegistry::new(),
            canvas: CanvasLog::new(),
        }
    }

    pub fn handle_command(&mut self, command: ConnectionCommand) {
        match command {
            ConnectionCommand::Connect { client_id, seq, tx } => self.connect(client_id, seq, tx),
            ConnectionCommand::Inbound { from, envelope } => self.handle_envelope(from, envelope),
            ConnectionCommand::Disconnect { from, seq } => self.disconnect(&from, seq),
        }
    }

    fn connect(&mut self, client_id: ConnectionId, seq: ConnectionSeq, mut tx: ConnectionTx) {
        let user_name = match self.registry.register(client_id.clone(), seq, tx.clone()) {
            Ok(user_name) => user_name,
            Err(RegistryError::DuplicateSession) => {
                log::warn!("rejecting connect: session {} is already live", client_id);
                if tx.try_send(ConnectionEvent::Rejected).is_err() {
                    log::debug!("rejected connection {} is already gone", client_id);
                }
                return;
            }
        };
        log::info!("session {} joined as {}", client_id, user_name);

        if tx.try_send(ConnectionEvent::Accepted).is_err() {
            // The actor died mid-handshake; its Disconnect will clean up.
            log::debug!("accepted connection {} is already gone", client_id);
        }

        // The joiner sees canvas state and the roster before any join/leave
        // chatter about itself; its own join is announced to everyone else.
        broadcast::send_to(
            &self.registry,
            &client_id,
            Envelope::CanvasState {
                data: self.canvas.snapshot(),
            },
        );
        self.broadcast_user_list();
        broadcast::broadcast(
            &self.registry,
            &Envelope::UserJoined {
                client_id: client_id.clone(),
                user_name,
            },
            Some(&client_id),
        );
    }

    fn handle_envelope(&mut self, from: ConnectionId, envelope: Envelope) {
        match envelope {
            Envelope::Draw { data } => {
                self.canvas.append(data.clone());
                // Echoed to the sender too: every client replicates from the
                // same authoritative stream.
                broadcast::broadcast(&self.registry, &Envelope::Draw { data }, None);
            }
            Envelope::Clear => {
                self.canvas.clear();
                broadcast::broadcast(&self.registry, &Envelope::Clear, None);
            }
            Envelope::Chat { text, .. } => {
                // The sender's claimed name is never trusted; stamp whatever
                // the registry knows. A racing disconnect yields "Unknown".
                let user_name = self
                    .registry
                    .display_name_of(&from)
                    .unwrap_or("Unknown")
                    .to_string();
                broadcast::broadcast(&self.registry, &Envelope::Chat { text, user_name }, None);
            }
            other => {
                log::debug!("ignoring inbound {:?} from session {}", other, from);
            }
        }
    }

    fn disconnect(&mut self, from: &ConnectionId, seq: ConnectionSeq) {
        let user_name = match self.registry.unregister(from, seq) {
            // Already torn down, or a teardown from a connection instance
            // that never registered; either way announce nothing.
            Some(user_name) => user_name,
            None => return,
        };
        log::info!("session {} ({}) left", from, user_name);

        broadcast::broadcast(
            &self.registry,
            &Envelope::UserLeft {
                client_id: from.clone(),
                user_name,
            },
            None,
        );
        self.broadcast_user_list();
    }

    fn broadcast_user_list(&mut self) {
        let users = self.registry.roster();
        broadcast::broadcast(&self.registry, &Envelope::UserList { users }, None);
    }
}

pub fn spawn_server() -> ServerTx {
    let (srv_tx, mut srv_rx) = unbounded_channel::<ConnectionCommand>();

    tokio::spawn(async move {
        let mut server = Server::new();

        while let Some(command) = srv_rx.recv().await {
            server.handle_command(command);
        }
    });

    srv_tx
}
