//! Session metadata for the local user and remote peers of a signaling room,
//! and its encoding on and off the signaling channel.

pub mod config;
pub mod connection;
pub mod error;
pub mod events;
pub mod inbound;
pub mod media;
pub mod normalize;
pub mod outbound;
pub mod peer_info;
pub mod room;
pub mod session;
pub mod signaling;
pub mod view;

pub use config::SessionConfig;
pub use error::{AppError, Result};
pub use events::{EventSink, PeerEvent};
pub use peer_info::{PeerInfo, PeerRecord, RoomDescriptor, UserSession, MCU_PEER_ID};
pub use session::{PeerSession, Propagation};
pub use signaling::{SignalingClient, SignalingMessage, SignalingSink};
