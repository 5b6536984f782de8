use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::normalize::is_falsy;
use crate::peer_info::{PeerId, PeerRecord, UserSession};

/// Peer records of the room plus the local identity. Owned by a single session.
#[derive(Debug)]
pub struct PeerRecordStore {
    peers: HashMap<PeerId, PeerRecord>,
    session: Option<UserSession>,
    local_user_data: Value,
}

impl Default for PeerRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PeerRecordStore {
    pub fn new() -> Self {
        Self {
            peers: HashMap::new(),
            session: None,
            local_user_data: Value::String(String::new()),
        }
    }

    /// Assigns the connection identity. It cannot be replaced afterwards.
    pub fn set_session(&mut self, session: UserSession) -> Result<()> {
        if let Some(existing) = &self.session {
            return Err(AppError::SessionAlreadyAssigned(
                existing.session_peer_id.clone(),
            ));
        }
        debug!("User session assigned: peer {}", session.session_peer_id);
        self.session = Some(session);
        Ok(())
    }

    pub fn session(&self) -> Option<&UserSession> {
        self.session.as_ref()
    }

    pub fn local_peer_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.session_peer_id.as_str())
    }

    pub fn set_local_user_data(&mut self, data: Option<Value>) {
        self.local_user_data = match data {
            Some(value) if !is_falsy(&value) => value,
            _ => Value::String(String::new()),
        };
    }

    pub fn local_user_data(&self) -> &Value {
        &self.local_user_data
    }

    /// User data of a known remote peer (`null` when the record carries none),
    /// falling back to the local user's data for anything else.
    pub fn user_data(&self, peer_id: Option<&str>) -> Value {
        match peer_id.and_then(|id| self.remote_peer(id)) {
            Some(record) => record.user_data.clone().unwrap_or(Value::Null),
            None => self.local_user_data.clone(),
        }
    }

    /// Returns true when the peer was not known before.
    pub fn upsert_peer(&mut self, peer_id: impl Into<PeerId>, record: PeerRecord) -> bool {
        self.peers.insert(peer_id.into(), record).is_none()
    }

    pub fn remove_peer(&mut self, peer_id: &str) -> Option<PeerRecord> {
        self.peers.remove(peer_id)
    }

    pub fn peer(&self, peer_id: &str) -> Option<&PeerRecord> {
        self.peers.get(peer_id)
    }

    pub fn peer_mut(&mut self, peer_id: &str) -> Option<&mut PeerRecord> {
        self.peers.get_mut(peer_id)
    }

    /// A stored record that is not the local user's own entry.
    pub fn remote_peer(&self, peer_id: &str) -> Option<&PeerRecord> {
        if self.local_peer_id() == Some(peer_id) {
            return None;
        }
        self.peers.get(peer_id)
    }

    pub fn contains(&self, peer_id: &str) -> bool {
        self.peers.contains_key(peer_id)
    }

    pub fn list_peer_ids(&self) -> Vec<PeerId> {
        self.peers.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Drops every peer record. The local identity and data survive.
    pub fn clear(&mut self) {
        self.peers.clear();
    }
}
