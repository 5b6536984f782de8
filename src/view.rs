//! Read-only, protocol-shaped snapshots of the local user and remote peers.

use std::collections::HashMap;

use serde_json::Value;

use crate::config::SessionConfig;
use crate::media::LocalMedia;
use crate::normalize;
use crate::peer_info::{
    MediaSetting, PeerId, PeerInfo, PeerRecord, RoomDescriptor, SettingsSnapshot, MCU_PEER_ID,
};
use crate::room::PeerRecordStore;

/// Borrows everything a snapshot is derived from. Snapshots are owned copies;
/// nothing done to them reaches the borrowed state.
pub struct PeerInfoView<'a> {
    pub store: &'a PeerRecordStore,
    pub media: &'a LocalMedia,
    pub config: &'a SessionConfig,
    pub room: Option<&'a RoomDescriptor>,
}

impl PeerInfoView<'_> {
    /// Snapshot of a known remote peer, or of the local user when `peer_id` is
    /// absent or unknown.
    pub fn view(&self, peer_id: Option<&str>) -> PeerInfo {
        let mut info = match peer_id.and_then(|id| self.store.remote_peer(id).map(|r| (id, r))) {
            Some((id, record)) => self.remote(id, record),
            None => self.local(),
        };
        normalize::enforce_mute_invariant(&info.settings, &mut info.media_status);
        info
    }

    pub fn list_all(&self) -> HashMap<PeerId, PeerInfo> {
        self.store
            .list_peer_ids()
            .into_iter()
            .map(|id| {
                let info = self.view(Some(&id));
                (id, info)
            })
            .collect()
    }

    fn remote(&self, peer_id: &str, record: &PeerRecord) -> PeerInfo {
        let record = record.clone();
        let mut settings = SettingsSnapshot {
            audio: record.settings.audio,
            video: record.settings.video,
            bandwidth: record.settings.bandwidth,
            google_x_bandwidth: record.settings.google_x_bandwidth.unwrap_or_default(),
        };
        present_settings(&mut settings);

        let mut info = PeerInfo {
            user_data: record.user_data.unwrap_or_else(|| Value::String(String::new())),
            settings,
            media_status: record.media_status,
            agent: record.agent,
            room: self.room.cloned(),
            config: record.config,
        };
        if peer_id == MCU_PEER_ID {
            normalize::apply_mixing_unit_override(&mut info);
        }
        info
    }

    fn local(&self) -> PeerInfo {
        let (audio, video) = match self.media.active_settings() {
            Some(stream) => (stream.audio.clone(), stream.video.clone()),
            None => (MediaSetting::Flag(false), MediaSetting::Flag(false)),
        };
        let mut settings = SettingsSnapshot {
            audio,
            video,
            bandwidth: self.config.bandwidth.clone(),
            google_x_bandwidth: self.config.google_x_bandwidth.clone(),
        };
        present_settings(&mut settings);

        PeerInfo {
            user_data: self.store.local_user_data().clone(),
            settings,
            media_status: self.media.media_status(),
            agent: self.config.agent.clone(),
            room: self.room.cloned(),
            config: self.config.feature_flags(),
        }
    }
}

fn present_settings(settings: &mut SettingsSnapshot) {
    if let Some(audio) = settings.audio.detailed_mut() {
        normalize::null_audio_extensions(audio);
    }
    if let Some(video) = settings.video.detailed_mut() {
        video.frame_rate = normalize::decode_frame_rate(video.frame_rate);
    }
}
