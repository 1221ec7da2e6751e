use std::sync::atomic::{AtomicU64, Ordering};

use actix::{Actor, ActorContext, AsyncContext, Handler, Message, Running, StreamHandler};
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use actix_web_actors::ws::{CloseCode, CloseReason};

use system::{serde_json, ConnectionId, Envelope};

use crate::server::ServerTx;

/// Distinguishes connection instances that share a caller-supplied id. The
/// server honors a `Disconnect` only from the instance it registered.
pub type ConnectionSeq = u64;

static NEXT_CONNECTION_SEQ: AtomicU64 = AtomicU64::new(0);

#[derive(Debug)]
pub enum ConnectionCommand {
    Connect {
        client_id: ConnectionId,
        seq: ConnectionSeq,
        tx: ConnectionTx,
    },
    Inbound {
        from: ConnectionId,
        envelope: Envelope,
    },
    Disconnect {
        from: ConnectionId,
        seq: ConnectionSeq,
    },
}

#[derive(Debug)]
pub enum ConnectionEvent {
    Accepted,
    Rejected,
    Envelope(Envelope),
}

pub type ConnectionTx = tokio::sync::mpsc::Sender<ConnectionEvent>;

#[derive(Message)]
#[rtype(result = "()")]
struct ConnectionActorMessage(ConnectionEvent);

enum ConnectionState {
    Connecting,
    Active,
    Closed,
}

struct ConnectionActor {
    state: ConnectionState,
    srv_tx: ServerTx,
    client_id: ConnectionId,
    seq: ConnectionSeq,
}

impl ConnectionActor {
    fn send_disconnect(&mut self) {
        if let ConnectionState::Closed = self.state {
            return;
        }
        self.state = ConnectionState::Closed;
        // The seq lets the server drop a teardown from an instance it never
        // registered, e.g. a rejected duplicate racing its own close.
        if self
            .srv_tx
            .send(ConnectionCommand::Disconnect {
                from: self.client_id.clone(),
                seq: self.seq,
            })
            .is_err()
        {
            log::debug!("server task is gone, skipping disconnect notification");
        }
    }
}

impl Actor for ConnectionActor {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let (tx, mut rx) = tokio::sync::mpsc::channel::<ConnectionEvent>(32);

        if self
            .srv_tx
            .send(ConnectionCommand::Connect {
                client_id: self.client_id.clone(),
                seq: self.seq,
                tx,
            })
            .is_err()
        {
            log::error!("server task is gone, refusing connection {}", self.client_id);
            self.state = ConnectionState::Closed;
            ctx.stop();
            return;
        }

        let addr = ctx.address().recipient();

        tokio::spawn(async move {
            log::debug!("connection green thread - started");
            while let Some(msg) = rx.recv().await {
                if addr.try_send(ConnectionActorMessage(msg)).is_err() {
                    break;
                }
            }
            log::debug!("connection green thread - terminated");
        });
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        self.send_disconnect();
        Running::Stop
    }
}

/// Ingress
impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ConnectionActor {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => ctx.pong(&msg),
            Ok(ws::Message::Text(text)) => {
                if let ConnectionState::Active = self.state {
                    match serde_json::from_str::<Envelope>(&text) {
                        Ok(envelope) => {
                            log::debug!("ingress from {}: {:?}", self.client_id, envelope);
                            // A lost event costs the event, never the session.
                            if self
                                .srv_tx
                                .send(ConnectionCommand::Inbound {
                                    from: self.client_id.clone(),
                                    envelope,
                                })
                                .is_err()
                            {
                                log::warn!(
                                    "server task is gone, dropping event from {}",
                                    self.client_id
                                );
                            }
                        }
                        Err(err) => {
                            // A malformed payload costs the event, not the
                            // session.
                            log::debug!(
                                "dropping malformed envelope from {}: {}",
                                self.client_id,
                                err
                            );
                        }
                    }
                }
            }
            Ok(ws::Message::Close(_)) => {
                self.send_disconnect();
                ctx.stop();
            }
            _ => (),
        }
    }
}

/// Egress
impl Handler<ConnectionActorMessage> for ConnectionActor {
    type Result = ();

    fn handle(
        &mut self,
        msg: ConnectionActorMessage,
        ctx: &mut ws::WebsocketContext<Self>,
    ) -> Self::Result {
        match msg.0 {
            ConnectionEvent::Accepted => {
                self.state = ConnectionState::Active;
            }
            ConnectionEvent::Rejected => {
                self.state = ConnectionState::Closed;
                ctx.close(Some(CloseReason {
                    code: CloseCode::Policy,
                    description: Some("duplicate session".into()),
                }));
                ctx.stop();
            }
            ConnectionEvent::Envelope(envelope) => {
                let serialized = serde_json::to_string(&envelope).expect("must serialize");
                ctx.text(serialized);
            }
        }
    }
}

pub async fn ws_index(
    req: HttpRequest,
    stream: web::Payload,
    srv_tx: web::Data<ServerTx>,
) -> Result<HttpResponse, Error> {
    let client_id: ConnectionId = req.match_info().get("client_id").unwrap().to_string();
    ws::start(
        ConnectionActor {
            srv_tx: srv_tx.get_ref().clone(),
            state: ConnectionState::Connecting,
            client_id,
            seq: NEXT_CONNECTION_SEQ.fetch_add(1, Ordering::Relaxed),
        },
        &req,
        stream,
    )
}
