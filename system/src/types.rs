use serde::{Deserialize, Serialize};

/// Opaque, caller-supplied identifier of one connection. The server never
/// generates these; uniqueness is the caller's responsibility.
pub type ConnectionId = String;

/// One entry of the live-user roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub id: ConnectionId,
    pub name: String,
}
