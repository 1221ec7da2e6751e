use system::serde_json::Value;

/// Append-only history of drawing operations since the last clear.
///
/// Replaying the log in order reconstructs the exact canvas a client would
/// have seen from the start. Growth is unbounded; capping or compaction is an
/// extension point, not implicit behavior.
pub struct CanvasLog {
    ops: Vec<Value>,
}

impl CanvasLog {
    pub fn new() -> Self {
        Self { ops: Vec::new() }
    }

    pub fn append(&mut self, op: Value) {
        self.ops.push(op);
    }

    /// Truncates the whole history. Clears do not append to the log.
    pub fn clear(&mut self) {
        self.ops.clear();
    }

    /// Owned copy of the log, used to replay history to a new session.
    pub fn snapshot(&self) -> Vec<Value> {
        self.ops.clone()
    }
}
