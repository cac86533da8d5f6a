use tracing::warn;

use crate::engine::board::Layout;

/// Server configuration parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Bind host shared by the game and status listeners.
    pub host: String,
    /// Game protocol port.
    pub port: u16,
    /// Status HTTP port.
    pub status_port: u16,
    /// Serve the status HTTP surface at all.
    pub status_enabled: bool,
    /// Starting position for every new session.
    pub layout: Layout,
}

impl AppConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        let defaults = AppConfig::default();
        AppConfig {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            status_port: std::env::var("STATUS_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.status_port),
            status_enabled: std::env::var("CHESS_STATUS_ENABLED")
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.status_enabled),
            layout: std::env::var("CHESS_LAYOUT")
                .ok()
                .map(|v| {
                    Layout::from_str_loose(&v).unwrap_or_else(|| {
                        warn!(value = %v, "unknown CHESS_LAYOUT, using standard");
                        Layout::Standard
                    })
                })
                .unwrap_or(defaults.layout),
        }
    }

    /// Socket address string for the game listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Socket address string for the status listener.
    pub fn status_addr(&self) -> String {
        format!("{}:{}", self.host, self.status_port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "0.0.0.0".to_string(),
            port: 1101,
            status_port: 8082,
            status_enabled: true,
            layout: Layout::Standard,
        }
    }
}

fn parse_flag(v: &str) -> bool {
    !matches!(
        v.trim().to_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}
