use std::collections::HashMap;

use system::{generate_display_name, ConnectionId, RosterEntry};

use crate::connection::{ConnectionSeq, ConnectionTx};

#[derive(Debug, PartialEq)]
pub enum RegistryError {
    /// Two connects with the same identifier while one is live.
    DuplicateSession,
}

struct LiveSession {
    tx: ConnectionTx,
    seq: ConnectionSeq,
    user_name: String,
}

/// Owns every live session's connection handle and display name for exactly
/// the session's lifetime. All access happens on the server task, so a
/// registry read is always a consistent snapshot.
pub struct SessionRegistry {
    sessions: HashMap<ConnectionId, LiveSession>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }

    /// Stores the session as live and allocates its display name. Rejects a
    /// second connect for a live identifier rather than orphaning the first
    /// connection's handle.
    pub fn register(
        &mut self,
        id: ConnectionId,
        seq: ConnectionSeq,
        tx: ConnectionTx,
    ) -> Result<String, RegistryError> {
        if self.sessions.contains_key(&id) {
            return Err(RegistryError::DuplicateSession);
        }
        let user_name = generate_display_name();
        self.sessions.insert(
            id,
            LiveSession {
                tx,
                seq,
                user_name: user_name.clone(),
            },
        );
        Ok(user_name)
    }

    /// Removes the session and returns its display name. Absent identifiers
    /// are a no-op, not an error, and so is a `seq` from a connection
    /// instance other than the registered one: a rejected duplicate tearing
    /// itself down must not remove the live holder of the id.
    pub fn unregister(&mut self, id: &ConnectionId, seq: ConnectionSeq) -> Option<String> {
        match self.sessions.get(id) {
            Some(session) if session.seq == seq => {
                self.sessions.remove(id).map(|session| session.user_name)
            }
            _ => None,
        }
    }

    pub fn display_name_of(&self, id: &ConnectionId) -> Option<&str> {
        self.sessions.get(id).map(|session| session.user_name.as_str())
    }

    pub fn handle_of(&self, id: &ConnectionId) -> Option<ConnectionTx> {
        self.sessions.get(id).map(|session| session.tx.clone())
    }

    /// (id, name) pairs of every live session. Order is arbitrary; consumers
    /// must treat the roster as a set.
    pub fn roster(&self) -> Vec<RosterEntry> {
        self.sessions
            .iter()
            .map(|(id, session)| RosterEntry {
                id: id.clone(),
                name: session.user_name.clone(),
            })
            .collect()
    }

    /// Cloned handle snapshot for fan-out. Delivery happens on the snapshot,
    /// never while iterating the registry itself.
    pub fn handles(&self) -> Vec<(ConnectionId, ConnectionTx)> {
        self.sessions
            .iter()
            .map(|(id, session)| (id.clone(), session.tx.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }
}
