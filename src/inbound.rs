//! Parses peer descriptions off `enter`, `welcome` and `restart` messages.
//!
//! Senders run different client versions, so every field is type-checked and
//! falls back to its own default. Parsing never fails.

use serde_json::{Map, Value};

use crate::normalize;
use crate::peer_info::{
    AgentInfo, AudioSettings, Bandwidth, MediaSetting, MediaStatus, PeerConfig, PeerRecord,
    PeerSettings, Resolution, VideoSettings,
};

type Object = Map<String, Value>;

pub fn parse_inbound(message: &Value) -> PeerRecord {
    let user_info = message.get("userInfo").and_then(Value::as_object);

    PeerRecord {
        user_data: Some(parse_user_data(user_info)),
        settings: parse_settings(user_info.and_then(|info| info.get("settings"))),
        media_status: parse_media_status(user_info.and_then(|info| info.get("mediaStatus"))),
        agent: parse_agent(message),
        config: parse_config(message),
    }
}

fn parse_user_data(user_info: Option<&Object>) -> Value {
    match user_info.and_then(|info| info.get("userData")) {
        Some(value) if !value.is_null() => value.clone(),
        _ => Value::String(String::new()),
    }
}

pub fn parse_settings(raw: Option<&Value>) -> PeerSettings {
    let Some(settings) = raw.and_then(Value::as_object) else {
        return PeerSettings::default();
    };
    PeerSettings {
        audio: parse_media(settings.get("audio"), parse_audio),
        video: parse_media(settings.get("video"), parse_video),
        bandwidth: settings
            .get("bandwidth")
            .and_then(Value::as_object)
            .map(parse_bandwidth)
            .unwrap_or_default(),
        google_x_bandwidth: None,
    }
}

fn parse_media<T>(raw: Option<&Value>, detailed: impl FnOnce(&Object) -> T) -> MediaSetting<T> {
    match raw {
        Some(Value::Bool(enabled)) => MediaSetting::Flag(*enabled),
        Some(Value::Object(settings)) => MediaSetting::Detailed(detailed(settings)),
        _ => MediaSetting::Flag(false),
    }
}

fn parse_audio(audio: &Object) -> AudioSettings {
    AudioSettings {
        stereo: bool_field(audio, "stereo").unwrap_or(false),
        echo_cancellation: bool_field(audio, "echoCancellation"),
        device_id: string_field(audio, "deviceId"),
        usedtx: bool_field(audio, "usedtx"),
        maxplaybackrate: number_field(audio, "maxplaybackrate"),
        useinbandfec: bool_field(audio, "useinbandfec"),
    }
}

fn parse_video(video: &Object) -> VideoSettings {
    VideoSettings {
        resolution: video
            .get("resolution")
            .and_then(Value::as_object)
            .and_then(parse_resolution),
        frame_rate: normalize::decode_frame_rate_value(video.get("frameRate")),
        screenshare: bool_field(video, "screenshare").unwrap_or(false),
        device_id: string_field(video, "deviceId"),
    }
}

fn parse_resolution(resolution: &Object) -> Option<Resolution> {
    let dimension = |key: &str| {
        resolution
            .get(key)
            .and_then(Value::as_f64)
            .filter(|n| n.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(n))
            .map(|n| n as u32)
    };
    Some(Resolution {
        width: dimension("width")?,
        height: dimension("height")?,
    })
}

fn parse_bandwidth(bandwidth: &Object) -> Bandwidth {
    Bandwidth {
        as_: number_field(bandwidth, "as"),
        audio: number_field(bandwidth, "audio"),
        video: number_field(bandwidth, "video"),
        data: number_field(bandwidth, "data"),
    }
}

// Legacy behavior: a flag is only cleared by a JSON boolean. Older senders
// publish other shapes here, which therefore always read as muted.
fn parse_media_status(raw: Option<&Value>) -> MediaStatus {
    let mut status = MediaStatus::muted();
    if let Some(carried) = raw.and_then(Value::as_object) {
        status.audio_muted = bool_field(carried, "audioMuted").unwrap_or(true);
        status.video_muted = bool_field(carried, "videoMuted").unwrap_or(true);
    }
    status
}

fn parse_agent(message: &Value) -> AgentInfo {
    let defaults = AgentInfo::default();
    let Some(message) = message.as_object() else {
        return defaults;
    };
    AgentInfo {
        name: non_empty_string_field(message, "agent").unwrap_or(defaults.name),
        version: number_field(message, "version")
            .filter(|version| *version != 0.0)
            .unwrap_or(defaults.version),
        os: string_field(message, "os").unwrap_or(defaults.os),
        plugin_version: non_empty_string_field(message, "temasysPluginVersion"),
    }
}

fn parse_config(message: &Value) -> PeerConfig {
    let defaults = PeerConfig::default();
    let Some(message) = message.as_object() else {
        return defaults;
    };
    PeerConfig {
        enable_data_channel: bool_field(message, "enableDataChannel")
            .unwrap_or(defaults.enable_data_channel),
        enable_ice_trickle: bool_field(message, "enableIceTrickle")
            .unwrap_or(defaults.enable_ice_trickle),
        enable_ice_restart: bool_field(message, "enableIceRestart")
            .unwrap_or(defaults.enable_ice_restart),
        priority_weight: number_field(message, "weight").unwrap_or(defaults.priority_weight),
    }
}

fn bool_field(object: &Object, key: &str) -> Option<bool> {
    object.get(key).and_then(Value::as_bool)
}

fn number_field(object: &Object, key: &str) -> Option<f64> {
    object
        .get(key)
        .and_then(Value::as_f64)
        .filter(|n| n.is_finite())
}

fn string_field(object: &Object, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_string)
}

fn non_empty_string_field(object: &Object, key: &str) -> Option<String> {
    string_field(object, key).filter(|s| !s.is_empty())
}
