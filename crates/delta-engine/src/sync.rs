//! Two-party synchronization.
//!
//! A [`Replica`] owns one copy of a shared state and talks to exactly one
//! peer (a client to its server, or the server's per-client session). Local
//! edits apply immediately and accumulate in an unsent buffer; [`flush`]
//! turns the buffer into a numbered [`SyncMessage`]. Every message carries
//! how many peer messages its sender had applied, which acknowledges the
//! sender's view so that both sides drop what the other has already seen.
//!
//! On receipt, the remote change is rebased over every local change the peer
//! has not seen yet, and those local changes are rebased over the remote one.
//! The two sides must use opposite priorities.
//!
//! [`flush`]: Replica::flush

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::compose::{apply, compose};
use crate::delta::Delta;
use crate::error::DeltaError;
use crate::rebase::rebase;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncMessage {
    pub delta: Delta,
    /// Messages from the recipient that the sender had applied.
    pub seen: u64,
}

#[derive(Debug, Clone)]
pub struct Replica {
    state: Delta,
    /// Sent but not yet acknowledged, tagged with their sequence number.
    pending: VecDeque<(u64, Delta)>,
    /// Applied locally, not sent yet.
    buffer: Delta,
    sent: u64,
    received: u64,
    priority: bool,
}

impl Replica {
    pub fn new(state: Delta, priority: bool) -> Result<Self, DeltaError> {
        if !state.is_state() {
            return Err(DeltaError::mismatch("replica state must be a state delta"));
        }
        Ok(Self {
            state,
            pending: VecDeque::new(),
            buffer: Delta::new(),
            sent: 0,
            received: 0,
            priority,
        })
    }

    pub fn state(&self) -> &Delta {
        &self.state
    }

    /// `true` while some local change is unsent or unacknowledged.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty() || !self.buffer.is_empty()
    }

    /// Apply a local change.
    pub fn edit(&mut self, change: &Delta) -> Result<(), DeltaError> {
        let state = apply(&self.state, change)?;
        let buffer = compose(&self.buffer, change)?;
        self.state = state;
        self.buffer = buffer;
        Ok(())
    }

    /// Package the buffered local changes for the peer.
    pub fn flush(&mut self) -> Option<SyncMessage> {
        if self.buffer.is_empty() {
            return None;
        }
        let delta = std::mem::take(&mut self.buffer);
        self.pending.push_back((self.sent, delta.clone()));
        self.sent += 1;
        tracing::debug!(seq = self.sent - 1, seen = self.received, "Sending change");
        Some(SyncMessage {
            delta,
            seen: self.received,
        })
    }

    /// Integrate a change from the peer. On error the replica is unchanged.
    pub fn receive(&mut self, message: SyncMessage) -> Result<(), DeltaError> {
        let acked = message.seen;
        let mut remote = message.delta;
        let mut pending = VecDeque::with_capacity(self.pending.len());
        for (seq, local) in self.pending.iter().filter(|(seq, _)| *seq >= acked) {
            let local_rebased = rebase(local, &remote, self.priority)?;
            remote = rebase(&remote, local, !self.priority)?;
            pending.push_back((*seq, local_rebased));
        }
        let buffer = rebase(&self.buffer, &remote, self.priority)?;
        let remote_rebased = rebase(&remote, &self.buffer, !self.priority)?;
        let state = apply(&self.state, &remote_rebased)?;

        let dropped = self.pending.len() - pending.len();
        self.pending = pending;
        self.buffer = buffer;
        self.state = state;
        self.received += 1;
        tracing::debug!(
            received = self.received,
            acked,
            dropped,
            pending = self.pending.len(),
            "Received change"
        );
        Ok(())
    }
}
