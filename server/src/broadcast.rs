use tokio::sync::mpsc::error::TrySendError;

use system::{ConnectionId, Envelope};

use crate::connection::{ConnectionEvent, ConnectionTx};
use crate::registry::SessionRegistry;

/// Delivers one envelope to exactly one live session. A session that vanished
/// between selection and send is logged and skipped; the race with a
/// concurrent disconnect is expected.
pub fn send_to(registry: &SessionRegistry, to: &ConnectionId, envelope: Envelope) {
    match registry.handle_of(to) {
        Some(mut tx) => deliver(to, &mut tx, envelope),
        None => log::debug!("session {} vanished before delivery", to),
    }
}

/// Fans one envelope out to every live session except `excluding`, each
/// recipient independently. Delivery never awaits a peer's buffer, so one
/// slow or broken connection cannot stall the rest; successive broadcasts
/// stay FIFO per recipient through its channel.
pub fn broadcast(registry: &SessionRegistry, envelope: &Envelope, excluding: Option<&ConnectionId>) {
    for (id, mut tx) in registry.handles() {
        if excluding == Some(&id) {
            continue;
        }
        deliver(&id, &mut tx, envelope.clone());
    }
}

fn deliver(to: &ConnectionId, tx: &mut ConnectionTx, envelope: Envelope) {
    if let Err(err) = tx.try_send(ConnectionEvent::Envelope(envelope)) {
        match err {
            TrySendError::Full(_) => {
                log::warn!("session {} outbound buffer is full, dropping event", to)
            }
            TrySendError::Closed(_) => {
                log::debug!("session {} is already closed, dropping event", to)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use system::serde_json::json;
    use tokio::sync::mpsc::{channel, Receiver};

    fn registry_with(ids: &[&str], capacity: usize) -> (SessionRegistry, Vec<Receiver<ConnectionEvent>>) {
        let mut registry = SessionRegistry::new();
        let mut rxs = Vec::new();
        for (seq, id) in ids.iter().enumerate() {
            let (tx, rx) = channel(capacity);
            registry
                .register(id.to_string(), seq as u64, tx)
                .expect("fresh id");
            rxs.push(rx);
        }
        (registry, rxs)
    }

    fn received(rx: &mut Receiver<ConnectionEvent>) -> Vec<Envelope> {
        let mut envelopes = Vec::new();
        while let Ok(ConnectionEvent::Envelope(envelope)) = rx.try_recv() {
            envelopes.push(envelope);
        }
        envelopes
    }

    #[test]
    fn it_broadcasts_to_every_session() {
        let (registry, mut rxs) = registry_with(&["a", "b"], 4);
        broadcast(&registry, &Envelope::Clear, None);
        for rx in rxs.iter_mut() {
            assert_eq!(received(rx), vec![Envelope::Clear]);
        }
    }

    #[test]
    fn it_excludes_a_single_session() {
        let (registry, mut rxs) = registry_with(&["a", "b"], 4);
        broadcast(&registry, &Envelope::Clear, Some(&"a".to_string()));
        assert!(received(&mut rxs[0]).is_empty());
        assert_eq!(received(&mut rxs[1]), vec![Envelope::Clear]);
    }

    #[test]
    fn it_keeps_fanning_out_past_a_full_peer() {
        let (registry, mut rxs) = registry_with(&["a", "b"], 1);
        // Fill a's buffer so the next delivery to it fails.
        send_to(&registry, &"a".to_string(), Envelope::Clear);
        broadcast(
            &registry,
            &Envelope::Draw {
                data: json!({"op": 1}),
            },
            None,
        );

        assert_eq!(received(&mut rxs[0]), vec![Envelope::Clear]);
        assert_eq!(
            received(&mut rxs[1]),
            vec![Envelope::Draw {
                data: json!({"op": 1})
            }]
        );
    }

    #[test]
    fn it_drops_silently_when_the_target_vanished() {
        let (registry, _rxs) = registry_with(&["a"], 4);
        send_to(&registry, &"ghost".to_string(), Envelope::Clear);
    }
}
