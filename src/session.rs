//! The peer session: local identity, peer records and their signaling traffic.
//!
//! A [`PeerSession`] belongs to one connection and is driven from a single
//! event-processing context. Inbound messages go through
//! [`PeerSession::handle_message`]; local changes are broadcast through the
//! [`SignalingSink`] only while the user is in a room.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::connection::RoomMonitor;
use crate::error::{AppError, Result};
use crate::events::{EventSink, PeerEvent};
use crate::inbound::parse_inbound;
use crate::media::LocalMedia;
use crate::normalize::is_falsy;
use crate::outbound::{serialize_outbound, OutboundInfo};
use crate::peer_info::{PeerId, PeerInfo, PeerRecord, RoomDescriptor, UserSession};
use crate::room::PeerRecordStore;
use crate::signaling::{Introduction, SignalingMessage, SignalingSink};
use crate::view::PeerInfoView;

/// Outcome of a local change with respect to the other peers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    Broadcast,
    /// Stored locally only; peers learn about it on the next `enter`.
    NotJoined,
    Unchanged,
}

pub struct PeerSession {
    store: PeerRecordStore,
    media: LocalMedia,
    config: SessionConfig,
    monitor: RoomMonitor,
    signaling: Box<dyn SignalingSink>,
    events: Box<dyn EventSink>,
}

impl PeerSession {
    pub fn new(
        config: SessionConfig,
        signaling: impl SignalingSink + 'static,
        events: impl EventSink + 'static,
    ) -> Self {
        Self {
            store: PeerRecordStore::new(),
            media: LocalMedia::new(),
            config,
            monitor: RoomMonitor::new(),
            signaling: Box::new(signaling),
            events: Box::new(events),
        }
    }

    pub fn set_user_session(&mut self, session: UserSession) -> Result<()> {
        self.store.set_session(session)
    }

    pub fn user_session(&self) -> Option<&UserSession> {
        self.store.session()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn media_mut(&mut self) -> &mut LocalMedia {
        &mut self.media
    }

    pub fn room_monitor(&self) -> &RoomMonitor {
        &self.monitor
    }

    pub fn is_joined(&self) -> bool {
        self.monitor.is_joined()
    }

    /// Marks the user as in `room` and announces the local info with `enter`.
    pub fn enter_room(&mut self, room: RoomDescriptor) -> Result<()> {
        let peer_id = self.local_peer_id().ok_or_else(|| {
            AppError::Signaling("cannot enter a room before the user session is assigned".into())
        })?;
        info!("Entering room {} as {}", room.id, peer_id);
        self.monitor.joined(room);
        let intro = self.introduction(None);
        self.signaling.send(SignalingMessage::Enter(intro));
        Ok(())
    }

    /// Leaves the room: the room gets a `bye`, every peer is reported gone and
    /// the records are dropped.
    pub fn leave_room(&mut self) {
        let Some((mid, rid)) = self.broadcast_target() else {
            return;
        };
        self.signaling.send(SignalingMessage::Bye { mid, rid });
        for peer_id in self.store.list_peer_ids() {
            let info = self.peer_info(Some(&peer_id));
            self.events.emit(PeerEvent::PeerLeft {
                peer_id,
                info,
                is_self: false,
            });
        }
        self.emit_self(|peer_id, info| PeerEvent::PeerLeft {
            peer_id,
            info,
            is_self: true,
        });
        self.store.clear();
        self.monitor.left();
        info!("Left room");
    }

    /// Replaces the local user data; falsy values become `""`.
    pub fn set_user_data(&mut self, data: Option<Value>) -> Propagation {
        self.store.set_local_user_data(data);
        let propagation = self.broadcast_user_data();
        if propagation == Propagation::Broadcast {
            self.emit_self(|peer_id, info| PeerEvent::PeerUpdated {
                peer_id,
                info,
                is_self: true,
            });
        } else {
            debug!("User data stored locally, not in a room");
        }
        propagation
    }

    fn broadcast_user_data(&self) -> Propagation {
        let Some((mid, rid)) = self.broadcast_target() else {
            return Propagation::NotJoined;
        };
        self.signaling.send(SignalingMessage::UpdateUserEvent {
            mid,
            rid,
            user_data: self.store.local_user_data().clone(),
            stamp: stamp(),
        });
        Propagation::Broadcast
    }

    pub fn user_data(&self, peer_id: Option<&str>) -> Value {
        self.store.user_data(peer_id)
    }

    pub fn peer_info(&self, peer_id: Option<&str>) -> PeerInfo {
        self.with_view(|view| view.view(peer_id))
    }

    pub fn peers_in_room(&self) -> HashMap<PeerId, PeerInfo> {
        self.with_view(|view| view.list_all())
    }

    pub fn serialize_outbound_info(&self) -> OutboundInfo {
        serialize_outbound(&self.peer_info(None))
    }

    pub fn parse_inbound_info(&self, message: &Value) -> PeerRecord {
        parse_inbound(message)
    }

    /// Updates the local mute flags and tells the room about the ones that changed.
    pub fn mute_stream(
        &mut self,
        audio_muted: Option<bool>,
        video_muted: Option<bool>,
    ) -> Propagation {
        let audio_changed = audio_muted.map_or(false, |m| self.media.set_audio_muted(m));
        let video_changed = video_muted.map_or(false, |m| self.media.set_video_muted(m));
        if !audio_changed && !video_changed {
            return Propagation::Unchanged;
        }
        let Some((mid, rid)) = self.broadcast_target() else {
            return Propagation::NotJoined;
        };

        let status = self.media.media_status();
        if audio_changed {
            self.signaling.send(SignalingMessage::MuteAudioEvent {
                mid: mid.clone(),
                rid: rid.clone(),
                muted: status.audio_muted,
                stamp: stamp(),
            });
        }
        if video_changed {
            self.signaling.send(SignalingMessage::MuteVideoEvent {
                mid,
                rid,
                muted: status.video_muted,
                stamp: stamp(),
            });
        }
        self.emit_self(|peer_id, info| PeerEvent::PeerUpdated {
            peer_id,
            info,
            is_self: true,
        });
        Propagation::Broadcast
    }

    /// Applies one raw signaling message to the peer records.
    pub fn handle_message(&mut self, message: &Value) {
        let Some(kind) = message.get("type").and_then(Value::as_str) else {
            debug!("Ignoring signaling message without a type");
            return;
        };
        let Some(peer_id) = message.get("mid").and_then(Value::as_str) else {
            debug!("Ignoring {} without a sender", kind);
            return;
        };
        if self.local_peer_id() == Some(peer_id) {
            debug!("Ignoring own {} echo", kind);
            return;
        }
        if !self.is_joined() {
            debug!("Ignoring {} from {} outside a room", kind, peer_id);
            return;
        }

        match kind {
            "enter" | "welcome" | "restart" => self.handle_introduction(kind, peer_id, message),
            "updateUserEvent" => self.handle_user_data_update(peer_id, message),
            "muteAudioEvent" | "muteVideoEvent" => self.handle_mute(kind, peer_id, message),
            "bye" => self.handle_bye(peer_id),
            other => debug!("Ignoring signaling message {}", other),
        }
    }

    fn handle_introduction(&mut self, kind: &str, peer_id: &str, message: &Value) {
        if let Some(target) = message.get("target").and_then(Value::as_str) {
            if self.local_peer_id() != Some(target) {
                debug!("Ignoring {} addressed to {}", kind, target);
                return;
            }
        }

        let record = parse_inbound(message);
        let is_new = self.store.upsert_peer(peer_id, record);
        let info = self.peer_info(Some(peer_id));
        let peer_id = peer_id.to_string();
        info!("Peer {} {} (agent {})", peer_id, kind, info.agent.name);

        if kind == "enter" {
            let intro = self.introduction(Some(peer_id.clone()));
            self.signaling.send(SignalingMessage::Welcome(intro));
        }

        self.events.emit(if is_new {
            PeerEvent::PeerJoined {
                peer_id,
                info,
                is_self: false,
            }
        } else {
            PeerEvent::PeerUpdated {
                peer_id,
                info,
                is_self: false,
            }
        });
    }

    fn handle_user_data_update(&mut self, peer_id: &str, message: &Value) {
        let Some(record) = self.store.peer_mut(peer_id) else {
            debug!("Ignoring user data of unknown peer {}", peer_id);
            return;
        };
        record.user_data = Some(match message.get("userData") {
            Some(data) if !is_falsy(data) => data.clone(),
            _ => Value::String(String::new()),
        });
        debug!("Peer {} updated user data", peer_id);
        self.emit_peer_updated(peer_id);
    }

    fn handle_mute(&mut self, kind: &str, peer_id: &str, message: &Value) {
        let Some(muted) = message.get("muted").and_then(Value::as_bool) else {
            warn!("Ignoring {} from {} without a boolean flag", kind, peer_id);
            return;
        };
        let Some(record) = self.store.peer_mut(peer_id) else {
            debug!("Ignoring {} of unknown peer {}", kind, peer_id);
            return;
        };
        if kind == "muteAudioEvent" {
            record.media_status.audio_muted = muted;
        } else {
            record.media_status.video_muted = muted;
        }
        debug!("Peer {} {} muted={}", peer_id, kind, muted);
        self.emit_peer_updated(peer_id);
    }

    fn handle_bye(&mut self, peer_id: &str) {
        if !self.store.contains(peer_id) {
            debug!("Ignoring bye of unknown peer {}", peer_id);
            return;
        }
        let info = self.peer_info(Some(peer_id));
        self.store.remove_peer(peer_id);
        info!("Peer {} left", peer_id);
        self.events.emit(PeerEvent::PeerLeft {
            peer_id: peer_id.to_string(),
            info,
            is_self: false,
        });
    }

    fn emit_peer_updated(&self, peer_id: &str) {
        let info = self.peer_info(Some(peer_id));
        self.events.emit(PeerEvent::PeerUpdated {
            peer_id: peer_id.to_string(),
            info,
            is_self: false,
        });
    }

    fn emit_self(&self, event: impl FnOnce(PeerId, PeerInfo) -> PeerEvent) {
        let peer_id = self.local_peer_id().unwrap_or_default().to_string();
        self.events.emit(event(peer_id, self.peer_info(None)));
    }

    fn local_peer_id(&self) -> Option<&str> {
        self.store.local_peer_id()
    }

    /// Sender and room ids, present only while joined.
    fn broadcast_target(&self) -> Option<(PeerId, String)> {
        if !self.is_joined() {
            return None;
        }
        let room = self.monitor.room()?;
        let mid = self.local_peer_id()?.to_string();
        Some((mid, room.id))
    }

    fn introduction(&self, target: Option<PeerId>) -> Introduction {
        let agent = &self.config.agent;
        let flags = self.config.feature_flags();
        Introduction {
            mid: self.local_peer_id().unwrap_or_default().to_string(),
            rid: self.monitor.room().map(|room| room.id).unwrap_or_default(),
            agent: agent.name.clone(),
            version: agent.version,
            os: agent.os.clone(),
            temasys_plugin_version: agent.plugin_version.clone(),
            user_info: self.serialize_outbound_info(),
            enable_ice_trickle: flags.enable_ice_trickle,
            enable_data_channel: flags.enable_data_channel,
            enable_ice_restart: flags.enable_ice_restart,
            weight: flags.priority_weight,
            target,
        }
    }

    fn with_view<R>(&self, f: impl FnOnce(&PeerInfoView<'_>) -> R) -> R {
        let room = self.monitor.room();
        let view = PeerInfoView {
            store: &self.store,
            media: &self.media,
            config: &self.config,
            room: room.as_ref(),
        };
        f(&view)
    }
}

fn stamp() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
