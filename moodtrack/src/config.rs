//! Configuration types and defaults

use moodtrack_core::{MoodTrackError, MoodTrackResult};
use moodtrack_media::{MediaStreamConstraints, OverlayStyle};
use serde::{Deserialize, Serialize};

/// Public STUN server used when nothing else is configured
pub const DEFAULT_STUN_URL: &str = "stun:stun.l.google.com:19302";

/// Global mood tracker configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Install a tracing subscriber on init
    pub debug_logging: bool,
    /// Filter used when `RUST_LOG` is not set
    pub log_filter: String,
    /// Maximum number of concurrent sessions
    pub max_sessions: usize,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            debug_logging: false,
            log_filter: "info".to_string(),
            max_sessions: 100,
        }
    }
}

impl GlobalConfig {
    /// Validate configuration
    pub fn validate(&self) -> MoodTrackResult<()> {
        if self.max_sessions == 0 {
            return Err(MoodTrackError::InvalidConfiguration {
                message: "max_sessions must be > 0".to_string(),
            });
        }
        Ok(())
    }
}

/// One ICE server entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServer {
    /// `stun:`/`turn:` URLs
    pub urls: Vec<String>,
}

/// ICE configuration handed to the browser side of the connection
///
/// Serializes to the shape `RTCPeerConnection` expects:
/// `{"iceServers":[{"urls":["stun:stun.l.google.com:19302"]}]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RtcConfiguration {
    /// ICE servers, in preference order
    pub ice_servers: Vec<IceServer>,
}

impl Default for RtcConfiguration {
    fn default() -> Self {
        Self {
            ice_servers: vec![IceServer {
                urls: vec![DEFAULT_STUN_URL.to_string()],
            }],
        }
    }
}

impl RtcConfiguration {
    /// Validate that every URL uses a known ICE scheme
    pub fn validate(&self) -> MoodTrackResult<()> {
        for url in self.ice_servers.iter().flat_map(|server| &server.urls) {
            let known = ["stun:", "stuns:", "turn:", "turns:"]
                .iter()
                .any(|scheme| url.starts_with(scheme));
            if !known {
                return Err(MoodTrackError::InvalidConfiguration {
                    message: format!("Unsupported ICE server URL: {}", url),
                });
            }
        }
        Ok(())
    }

    /// JSON for the browser
    pub fn to_json(&self) -> MoodTrackResult<String> {
        serde_json::to_string(self).map_err(|e| MoodTrackError::InvalidConfiguration {
            message: format!("Failed to serialize RTC configuration: {}", e),
        })
    }
}

/// Per-session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Stream key identifying the video component
    pub key: String,
    /// ICE configuration for the browser connection
    pub rtc: RtcConfiguration,
    /// Media constraints requested from the browser
    pub constraints: MediaStreamConstraints,
    /// Overlay placement and color
    pub overlay: OverlayStyle,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            key: "mood".to_string(),
            rtc: RtcConfiguration::default(),
            constraints: MediaStreamConstraints::default(),
            overlay: OverlayStyle::default(),
        }
    }
}

impl SessionConfig {
    /// Parse from JSON, filling missing fields with defaults
    pub fn from_json(json: &str) -> MoodTrackResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| MoodTrackError::InvalidConfiguration {
                message: format!("Failed to parse session configuration: {}", e),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> MoodTrackResult<()> {
        if self.key.trim().is_empty() {
            return Err(MoodTrackError::MissingConfiguration {
                field: "key".to_string(),
            });
        }
        self.rtc.validate()?;
        self.constraints.validate()?;
        self.overlay.validate()?;
        Ok(())
    }
}
