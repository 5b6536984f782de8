use tokio::sync::mpsc;
use tracing::warn;

use crate::peer_info::{PeerId, PeerInfo};

/// Local notifications raised while processing signaling traffic and API calls.
#[derive(Debug, Clone, PartialEq)]
pub enum PeerEvent {
    PeerJoined {
        peer_id: PeerId,
        info: PeerInfo,
        is_self: bool,
    },
    PeerUpdated {
        peer_id: PeerId,
        info: PeerInfo,
        is_self: bool,
    },
    PeerLeft {
        peer_id: PeerId,
        info: PeerInfo,
        is_self: bool,
    },
}

impl PeerEvent {
    pub fn peer_id(&self) -> &str {
        match self {
            PeerEvent::PeerJoined { peer_id, .. }
            | PeerEvent::PeerUpdated { peer_id, .. }
            | PeerEvent::PeerLeft { peer_id, .. } => peer_id,
        }
    }

    pub fn is_self(&self) -> bool {
        match self {
            PeerEvent::PeerJoined { is_self, .. }
            | PeerEvent::PeerUpdated { is_self, .. }
            | PeerEvent::PeerLeft { is_self, .. } => *is_self,
        }
    }
}

pub trait EventSink {
    fn emit(&self, event: PeerEvent);
}

impl EventSink for mpsc::UnboundedSender<PeerEvent> {
    fn emit(&self, event: PeerEvent) {
        if let Err(e) = self.send(event) {
            warn!("Dropping peer event, no listener: {:?}", e.0.peer_id());
        }
    }
}
