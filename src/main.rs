use std::time::Duration;

use anyhow::Context;
use peer_info::{
    PeerEvent, PeerSession, RoomDescriptor, SessionConfig, SignalingClient, UserSession,
};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const ROOM_ID: &str = "test-room";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = SessionConfig::default()
        .with_env_overrides()
        .context("invalid configuration")?;

    let mut client = SignalingClient::connect(&config.signaling_url)
        .await
        .with_context(|| format!("connecting to {}", config.signaling_url))?;

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let mut session = PeerSession::new(config, client.sender(), events_tx);

    let peer_id = format!("user-{}", rand::random::<u32>());
    session.set_user_session(UserSession {
        user_id: peer_id.clone(),
        token: String::new(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        session_peer_id: peer_id.clone(),
    })?;
    session.set_user_data(Some(serde_json::json!({ "name": peer_id })));
    session.enter_room(RoomDescriptor {
        id: ROOM_ID.to_string(),
        name: ROOM_ID.to_string(),
    })?;

    loop {
        tokio::select! {
            msg = client.receive() => match msg {
                Some(msg) => session.handle_message(&msg),
                None => {
                    warn!("Signaling connection closed");
                    break;
                }
            },
            Some(event) = events_rx.recv() => log_event(&event),
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    session.leave_room();
    // give the writer task a moment to flush the bye
    tokio::time::sleep(Duration::from_millis(100)).await;
    while let Ok(event) = events_rx.try_recv() {
        log_event(&event);
    }
    Ok(())
}

fn log_event(event: &PeerEvent) {
    match event {
        PeerEvent::PeerJoined { peer_id, info, .. } => {
            info!("{} joined with user data {}", peer_id, info.user_data)
        }
        PeerEvent::PeerUpdated { peer_id, info, is_self } => info!(
            "{} updated (self: {}), audio muted {}, video muted {}",
            peer_id, is_self, info.media_status.audio_muted, info.media_status.video_muted
        ),
        PeerEvent::PeerLeft { peer_id, is_self, .. } => {
            info!("{} left (self: {})", peer_id, is_self)
        }
    }
}
