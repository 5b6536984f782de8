use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

use crate::peer_info::RoomDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomState {
    NotJoined,
    Joined,
}

impl fmt::Display for RoomState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomState::NotJoined => write!(f, "NotJoined"),
            RoomState::Joined => write!(f, "Joined"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoomStatus {
    pub state: RoomState,
    pub room: Option<RoomDescriptor>,
}

impl Default for RoomStatus {
    fn default() -> Self {
        Self {
            state: RoomState::NotJoined,
            room: None,
        }
    }
}

/// Tracks whether the local user is in a room; observers subscribe through a watch channel.
#[derive(Clone)]
pub struct RoomMonitor {
    status: Arc<watch::Sender<RoomStatus>>,
    receiver: watch::Receiver<RoomStatus>,
}

impl Default for RoomMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomMonitor {
    pub fn new() -> Self {
        let (status, receiver) = watch::channel(RoomStatus::default());
        Self {
            status: Arc::new(status),
            receiver,
        }
    }

    pub fn joined(&self, room: RoomDescriptor) {
        self.status.send_modify(|status| {
            status.state = RoomState::Joined;
            status.room = Some(room);
        });
    }

    pub fn left(&self) {
        self.status.send_modify(|status| {
            status.state = RoomState::NotJoined;
            status.room = None;
        });
    }

    pub fn is_joined(&self) -> bool {
        self.receiver.borrow().state == RoomState::Joined
    }

    pub fn room(&self) -> Option<RoomDescriptor> {
        self.receiver.borrow().room.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<RoomStatus> {
        self.receiver.clone()
    }
}
