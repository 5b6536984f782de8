//! Wire shape of the local user's info as broadcast to peers.
//!
//! The wire structs list exactly what peers may see. Agent and room travel
//! elsewhere (or not at all), googleXBandwidth is local only and the
//! experimental opus fields are never sent.

use serde::Serialize;
use serde_json::Value;

use crate::normalize;
use crate::peer_info::{
    AudioSettings, Bandwidth, MediaSetting, MediaStatus, PeerConfig, PeerInfo, Resolution,
    VideoSettings,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireAudioSettings {
    pub stereo: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub echo_cancellation: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireVideoSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
    /// `-1` when unspecified.
    pub frame_rate: f64,
    pub screenshare: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireSettings {
    pub audio: MediaSetting<WireAudioSettings>,
    pub video: MediaSetting<WireVideoSettings>,
    pub bandwidth: Bandwidth,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundInfo {
    pub user_data: Value,
    pub settings: WireSettings,
    pub media_status: MediaStatus,
    pub config: PeerConfig,
}

/// Builds the broadcast payload from a local snapshot.
pub fn serialize_outbound(info: &PeerInfo) -> OutboundInfo {
    OutboundInfo {
        user_data: info.user_data.clone(),
        settings: WireSettings {
            audio: map_setting(&info.settings.audio, wire_audio),
            video: map_setting(&info.settings.video, wire_video),
            bandwidth: info.settings.bandwidth.clone(),
        },
        media_status: info.media_status,
        config: info.config.clone(),
    }
}

fn map_setting<T, W>(setting: &MediaSetting<T>, f: impl FnOnce(&T) -> W) -> MediaSetting<W> {
    match setting {
        MediaSetting::Flag(enabled) => MediaSetting::Flag(*enabled),
        MediaSetting::Detailed(settings) => MediaSetting::Detailed(f(settings)),
    }
}

fn wire_audio(audio: &AudioSettings) -> WireAudioSettings {
    WireAudioSettings {
        stereo: audio.stereo,
        echo_cancellation: audio.echo_cancellation,
        device_id: audio.device_id.clone(),
    }
}

fn wire_video(video: &VideoSettings) -> WireVideoSettings {
    WireVideoSettings {
        resolution: video.resolution,
        frame_rate: normalize::encode_frame_rate(video.frame_rate),
        screenshare: video.screenshare,
        device_id: video.device_id.clone(),
    }
}
