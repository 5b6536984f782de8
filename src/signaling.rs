use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};

use crate::error::{AppError, Result};
use crate::outbound::OutboundInfo;
use crate::peer_info::PeerId;

const CHANNEL_CAPACITY: usize = 100;

/// Body shared by `enter` and `welcome`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Introduction {
    pub mid: PeerId,
    pub rid: String,
    pub agent: String,
    pub version: f64,
    pub os: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temasys_plugin_version: Option<String>,
    pub user_info: OutboundInfo,
    pub enable_ice_trickle: bool,
    pub enable_data_channel: bool,
    pub enable_ice_restart: bool,
    pub weight: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<PeerId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SignalingMessage {
    Enter(Introduction),
    Welcome(Introduction),
    UpdateUserEvent {
        mid: PeerId,
        rid: String,
        #[serde(rename = "userData")]
        user_data: Value,
        stamp: i64,
    },
    MuteAudioEvent {
        mid: PeerId,
        rid: String,
        muted: bool,
        stamp: i64,
    },
    MuteVideoEvent {
        mid: PeerId,
        rid: String,
        muted: bool,
        stamp: i64,
    },
    Bye {
        mid: PeerId,
        rid: String,
    },
}

impl SignalingMessage {
    pub fn type_name(&self) -> &'static str {
        match self {
            SignalingMessage::Enter(_) => "enter",
            SignalingMessage::Welcome(_) => "welcome",
            SignalingMessage::UpdateUserEvent { .. } => "updateUserEvent",
            SignalingMessage::MuteAudioEvent { .. } => "muteAudioEvent",
            SignalingMessage::MuteVideoEvent { .. } => "muteVideoEvent",
            SignalingMessage::Bye { .. } => "bye",
        }
    }
}

/// Fire-and-forget delivery to the room's signaling channel.
pub trait SignalingSink {
    fn send(&self, message: SignalingMessage);
}

impl SignalingSink for mpsc::UnboundedSender<SignalingMessage> {
    fn send(&self, message: SignalingMessage) {
        if let Err(e) = mpsc::UnboundedSender::send(self, message) {
            warn!("Signaling channel closed, dropped {}", e.0.type_name());
        }
    }
}

/// Cloneable handle onto a connected [`SignalingClient`].
#[derive(Debug, Clone)]
pub struct SignalingSender {
    tx: mpsc::Sender<SignalingMessage>,
}

impl SignalingSink for SignalingSender {
    fn send(&self, message: SignalingMessage) {
        if let Err(e) = self.tx.try_send(message) {
            warn!("Failed to queue signaling message: {}", e);
        }
    }
}

pub struct SignalingClient {
    tx: mpsc::Sender<SignalingMessage>,
    rx: mpsc::Receiver<Value>,
}

impl SignalingClient {
    pub async fn connect(url: &str) -> Result<Self> {
        let (ws_stream, _) = connect_async(url).await?;
        let (mut write, mut read) = ws_stream.split();
        debug!("Signaling connected to {}", url);

        let (incoming_tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (tx, mut outgoing_rx) = mpsc::channel::<SignalingMessage>(CHANNEL_CAPACITY);

        // Handle outgoing messages
        tokio::spawn(async move {
            while let Some(msg) = outgoing_rx.recv().await {
                let json = match serde_json::to_string(&msg) {
                    Ok(json) => json,
                    Err(e) => {
                        warn!("Failed to encode {}: {}", msg.type_name(), e);
                        continue;
                    }
                };
                if let Err(e) = write.send(Message::Text(json)).await {
                    warn!("Signaling write failed: {}", e);
                    break;
                }
            }
        });

        // Handle incoming messages
        tokio::spawn(async move {
            while let Some(frame) = read.next().await {
                match frame {
                    Ok(Message::Text(text)) => match serde_json::from_str::<Value>(&text) {
                        Ok(value) => {
                            if incoming_tx.send(value).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => warn!("Ignoring malformed signaling frame: {}", e),
                    },
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!("Signaling read failed: {}", e);
                        break;
                    }
                }
            }
            debug!("Signaling reader finished");
        });

        Ok(Self { tx, rx })
    }

    pub fn sender(&self) -> SignalingSender {
        SignalingSender {
            tx: self.tx.clone(),
        }
    }

    pub async fn send(&self, msg: SignalingMessage) -> Result<()> {
        self.tx
            .send(msg)
            .await
            .map_err(|e| AppError::Signaling(format!("Failed to send message: {}", e)))
    }

    /// Next raw message from the channel, `None` once the connection is gone.
    pub async fn receive(&mut self) -> Option<Value> {
        self.rx.recv().await
    }
}
