//! Local session configuration: feature flags, bandwidth caps and the agent descriptor.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::peer_info::{AgentInfo, Bandwidth, GoogleXBandwidth, PeerConfig};

const DEFAULT_SIGNALING_URL: &str = "ws://127.0.0.1:8080";

pub const ENV_SIGNALING_URL: &str = "PEER_INFO_SIGNALING_URL";
pub const ENV_PRIORITY_WEIGHT: &str = "PEER_INFO_PRIORITY_WEIGHT";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    pub signaling_url: String,
    pub enable_data_channel: bool,
    pub enable_ice_trickle: bool,
    pub enable_ice_restart: bool,
    pub priority_weight: f64,
    pub bandwidth: Bandwidth,
    pub google_x_bandwidth: GoogleXBandwidth,
    pub agent: AgentInfo,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let flags = PeerConfig::default();
        Self {
            signaling_url: DEFAULT_SIGNALING_URL.to_string(),
            enable_data_channel: flags.enable_data_channel,
            enable_ice_trickle: flags.enable_ice_trickle,
            enable_ice_restart: flags.enable_ice_restart,
            priority_weight: flags.priority_weight,
            bandwidth: Bandwidth::default(),
            google_x_bandwidth: GoogleXBandwidth::default(),
            agent: AgentInfo::local(),
        }
    }
}

impl SessionConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `PEER_INFO_*` environment overrides on top of `self`.
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(url) = std::env::var(ENV_SIGNALING_URL) {
            self.signaling_url = url;
        }
        if let Ok(weight) = std::env::var(ENV_PRIORITY_WEIGHT) {
            self.priority_weight = weight.parse().map_err(|_| {
                AppError::Config(format!("{ENV_PRIORITY_WEIGHT} is not a number: {weight}"))
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.priority_weight.is_finite() {
            return Err(AppError::Config("priorityWeight must be finite".to_string()));
        }
        if self.signaling_url.is_empty() {
            return Err(AppError::Config("signalingUrl is empty".to_string()));
        }
        Ok(())
    }

    pub fn feature_flags(&self) -> PeerConfig {
        PeerConfig {
            enable_data_channel: self.enable_data_channel,
            enable_ice_trickle: self.enable_ice_trickle,
            enable_ice_restart: self.enable_ice_restart,
            priority_weight: self.priority_weight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = SessionConfig::from_json(
            r#"{"enableIceRestart": true, "priorityWeight": 5, "bandwidth": {"video": 512}}"#,
        )
        .unwrap();
        assert!(config.enable_ice_restart);
        assert!(config.enable_ice_trickle);
        assert_eq!(config.priority_weight, 5.0);
        assert_eq!(config.bandwidth.video, Some(512.0));
        assert_eq!(config.signaling_url, DEFAULT_SIGNALING_URL);
        assert_eq!(config.agent.name, "peer-info");
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(matches!(
            SessionConfig::from_json("{not json"),
            Err(AppError::Json(_))
        ));
        assert!(matches!(
            SessionConfig::from_json(r#"{"signalingUrl": ""}"#),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn feature_flags_mirror_config() {
        let config = SessionConfig {
            enable_data_channel: false,
            priority_weight: 3.5,
            ..Default::default()
        };
        let flags = config.feature_flags();
        assert!(!flags.enable_data_channel);
        assert_eq!(flags.priority_weight, 3.5);
    }

    #[test]
    fn env_overrides_apply_and_validate() {
        // one test so the process-wide variables are never touched concurrently
        std::env::set_var(ENV_SIGNALING_URL, "ws://signaling.test:9000");
        std::env::set_var(ENV_PRIORITY_WEIGHT, "7.5");
        let config = SessionConfig::default().with_env_overrides().unwrap();
        assert_eq!(config.signaling_url, "ws://signaling.test:9000");
        assert_eq!(config.priority_weight, 7.5);
        assert_eq!(config.feature_flags().priority_weight, 7.5);

        std::env::set_var(ENV_PRIORITY_WEIGHT, "heavy");
        assert!(matches!(
            SessionConfig::default().with_env_overrides(),
            Err(AppError::Config(_))
        ));

        std::env::set_var(ENV_PRIORITY_WEIGHT, "inf");
        assert!(matches!(
            SessionConfig::default().with_env_overrides(),
            Err(AppError::Config(_))
        ));

        std::env::remove_var(ENV_PRIORITY_WEIGHT);
        std::env::set_var(ENV_SIGNALING_URL, "");
        assert!(matches!(
            SessionConfig::default().with_env_overrides(),
            Err(AppError::Config(_))
        ));

        std::env::remove_var(ENV_SIGNALING_URL);
        let config = SessionConfig::default().with_env_overrides().unwrap();
        assert_eq!(config.signaling_url, DEFAULT_SIGNALING_URL);
        assert_eq!(config.priority_weight, 0.0);
    }
}
