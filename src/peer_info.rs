//! Session metadata records for the local user and remote peers.
//!
//! [`PeerRecord`] is what the room keeps for each remote peer. [`PeerInfo`] is the
//! fully populated snapshot handed to callers; it is always built by
//! [`crate::view::PeerInfoView`] and never stored.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Peer identifier reserved for the server-side mixing unit.
pub const MCU_PEER_ID: &str = "MCU";

/// uniquely identifies peers
pub type PeerId = String;

/// Identity of the local user, handed out by the signaling server once per connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    pub user_id: String,
    pub token: String,
    pub timestamp: String,
    pub session_peer_id: PeerId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomDescriptor {
    pub id: String,
    pub name: String,
}

/// `false` means no capability, an object carries the stream settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MediaSetting<T> {
    Flag(bool),
    Detailed(T),
}

impl<T> MediaSetting<T> {
    pub fn is_enabled(&self) -> bool {
        match self {
            MediaSetting::Flag(enabled) => *enabled,
            MediaSetting::Detailed(_) => true,
        }
    }

    pub fn detailed_mut(&mut self) -> Option<&mut T> {
        match self {
            MediaSetting::Detailed(settings) => Some(settings),
            MediaSetting::Flag(_) => None,
        }
    }
}

impl<T> Default for MediaSetting<T> {
    fn default() -> Self {
        MediaSetting::Flag(false)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioSettings {
    #[serde(default)]
    pub stereo: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub echo_cancellation: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    // Experimental opus parameters. Snapshots always show them as null.
    #[serde(default)]
    pub usedtx: Option<bool>,
    #[serde(default)]
    pub maxplaybackrate: Option<f64>,
    #[serde(default)]
    pub useinbandfec: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
    /// `None` when the sender left the frame rate unspecified.
    #[serde(default)]
    pub frame_rate: Option<f64>,
    #[serde(default)]
    pub screenshare: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

/// Bandwidth caps in kbps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bandwidth {
    #[serde(rename = "as", default, skip_serializing_if = "Option::is_none")]
    pub as_: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoogleXBandwidth {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

/// Settings as stored for a remote peer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerSettings {
    #[serde(default)]
    pub audio: MediaSetting<AudioSettings>,
    #[serde(default)]
    pub video: MediaSetting<VideoSettings>,
    #[serde(default)]
    pub bandwidth: Bandwidth,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_x_bandwidth: Option<GoogleXBandwidth>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaStatus {
    pub audio_muted: bool,
    pub video_muted: bool,
}

impl MediaStatus {
    pub fn muted() -> Self {
        Self {
            audio_muted: true,
            video_muted: true,
        }
    }
}

impl Default for MediaStatus {
    fn default() -> Self {
        Self::muted()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentInfo {
    pub name: String,
    pub version: f64,
    pub os: String,
    pub plugin_version: Option<String>,
}

impl AgentInfo {
    /// Descriptor advertised by this build.
    pub fn local() -> Self {
        let version = format!(
            "{}.{}",
            env!("CARGO_PKG_VERSION_MAJOR"),
            env!("CARGO_PKG_VERSION_MINOR")
        );
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: version.parse().unwrap_or(0.0),
            os: std::env::consts::OS.to_string(),
            plugin_version: None,
        }
    }
}

impl Default for AgentInfo {
    fn default() -> Self {
        Self {
            name: "other".to_string(),
            version: 0.0,
            os: String::new(),
            plugin_version: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerConfig {
    pub enable_data_channel: bool,
    pub enable_ice_trickle: bool,
    pub enable_ice_restart: bool,
    pub priority_weight: f64,
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            enable_data_channel: true,
            enable_ice_trickle: true,
            enable_ice_restart: false,
            priority_weight: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_data: Option<Value>,
    #[serde(default)]
    pub settings: PeerSettings,
    #[serde(default)]
    pub media_status: MediaStatus,
    #[serde(default)]
    pub agent: AgentInfo,
    #[serde(default)]
    pub config: PeerConfig,
}

/// Settings as exposed on a snapshot: both bandwidth blocks are always present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsSnapshot {
    pub audio: MediaSetting<AudioSettings>,
    pub video: MediaSetting<VideoSettings>,
    pub bandwidth: Bandwidth,
    pub google_x_bandwidth: GoogleXBandwidth,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerInfo {
    pub user_data: Value,
    pub settings: SettingsSnapshot,
    pub media_status: MediaStatus,
    pub agent: AgentInfo,
    pub room: Option<RoomDescriptor>,
    pub config: PeerConfig,
}
