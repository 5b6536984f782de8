//! Protocol compliance transforms shared by the inbound and outbound paths.

use serde_json::Value;

use crate::peer_info::{AudioSettings, MediaSetting, MediaStatus, PeerInfo, SettingsSnapshot};

/// Wire value standing in for an unspecified frame rate.
pub const FRAME_RATE_UNSPECIFIED: f64 = -1.0;

pub fn encode_frame_rate(frame_rate: Option<f64>) -> f64 {
    match frame_rate {
        Some(rate) if rate.is_finite() => rate,
        _ => FRAME_RATE_UNSPECIFIED,
    }
}

pub fn decode_frame_rate(frame_rate: Option<f64>) -> Option<f64> {
    frame_rate.filter(|rate| rate.is_finite() && *rate != FRAME_RATE_UNSPECIFIED)
}

/// Decodes a raw wire value; anything but a number means unspecified.
pub fn decode_frame_rate_value(raw: Option<&Value>) -> Option<f64> {
    decode_frame_rate(raw.and_then(Value::as_f64))
}

/// Snapshots present the experimental opus fields as explicit nulls.
pub fn null_audio_extensions(audio: &mut AudioSettings) {
    audio.usedtx = None;
    audio.maxplaybackrate = None;
    audio.useinbandfec = None;
}

/// JavaScript-style falsiness, used when defaulting user data.
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().map_or(false, |n| n == 0.0 || n.is_nan()),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// A peer without an audio (video) capability is always reported muted.
pub fn enforce_mute_invariant(settings: &SettingsSnapshot, status: &mut MediaStatus) {
    if !settings.audio.is_enabled() {
        status.audio_muted = true;
    }
    if !settings.video.is_enabled() {
        status.video_muted = true;
    }
}

/// The mixing unit never publishes media of its own.
pub fn apply_mixing_unit_override(info: &mut PeerInfo) {
    info.settings.audio = MediaSetting::Flag(false);
    info.settings.video = MediaSetting::Flag(false);
    info.media_status = MediaStatus::muted();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn frame_rate_sentinel() {
        assert_eq!(encode_frame_rate(None), -1.0);
        assert_eq!(encode_frame_rate(Some(f64::NAN)), -1.0);
        assert_eq!(encode_frame_rate(Some(f64::INFINITY)), -1.0);
        assert_eq!(encode_frame_rate(Some(30.0)), 30.0);

        assert_eq!(decode_frame_rate(Some(-1.0)), None);
        assert_eq!(decode_frame_rate(Some(24.0)), Some(24.0));
        assert_eq!(decode_frame_rate_value(Some(&json!("30"))), None);
        assert_eq!(decode_frame_rate_value(Some(&json!(15))), Some(15.0));
        assert_eq!(decode_frame_rate_value(None), None);
    }

    #[test]
    fn falsy_values() {
        for value in [json!(null), json!(false), json!(0), json!(""), json!(0.0)] {
            assert!(is_falsy(&value), "{value} should be falsy");
        }
        for value in [json!("x"), json!(1), json!(true), json!({}), json!([])] {
            assert!(!is_falsy(&value), "{value} should be truthy");
        }
    }

    #[test]
    fn mute_invariant_only_forces_muted() {
        let mut settings = SettingsSnapshot::default();
        settings.video = MediaSetting::Flag(true);
        let mut status = MediaStatus {
            audio_muted: false,
            video_muted: false,
        };
        enforce_mute_invariant(&settings, &mut status);
        assert!(status.audio_muted);
        assert!(!status.video_muted);
    }
}
