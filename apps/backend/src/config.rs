//! Server configuration from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use matchup_core::{DropTolerance, GameConfig, ScoringRule};

/// Runtime configuration.
///
/// Read from the environment (after `.env` is loaded):
/// - HOST / PORT: listen address (default `0.0.0.0:3000`)
/// - LESSON_DIR: directory of lesson JSON files (default `./lessons`)
/// - PREFERENCES_PATH: JSON file for player preferences (in-memory if unset)
/// - FINISH_DELAY_MS: celebration delay before a perfect game finishes
/// - MOBILE_BREAKPOINT_PX: viewports narrower than this get the wider drop margin
/// - MOBILE_DROP_TOLERANCE_PX: drop margin below the breakpoint
/// - SESSION_TTL_SECS: idle time before a session is dropped (0 keeps them forever)
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub lesson_dir: PathBuf,
    pub preferences_path: Option<PathBuf>,
    pub finish_delay_ms: u64,
    pub drop_tolerance: DropTolerance,
    pub session_ttl_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let game = GameConfig::default();
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            lesson_dir: PathBuf::from("./lessons"),
            preferences_path: None,
            finish_delay_ms: game.finish_delay_ms,
            drop_tolerance: game.drop_tolerance,
            session_ttl_secs: 30 * 60,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let port = match std::env::var("PORT") {
            Ok(value) => value.parse()?,
            Err(_) => defaults.port,
        };
        let finish_delay_ms = match std::env::var("FINISH_DELAY_MS") {
            Ok(value) => value.parse()?,
            Err(_) => defaults.finish_delay_ms,
        };
        let session_ttl_secs = match std::env::var("SESSION_TTL_SECS") {
            Ok(value) => value.parse()?,
            Err(_) => defaults.session_ttl_secs,
        };
        let mut drop_tolerance = defaults.drop_tolerance;
        if let Ok(value) = std::env::var("MOBILE_BREAKPOINT_PX") {
            drop_tolerance.breakpoint_px = value.parse()?;
        }
        if let Ok(value) = std::env::var("MOBILE_DROP_TOLERANCE_PX") {
            drop_tolerance.narrow_px = value.parse()?;
        }

        Ok(Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port,
            lesson_dir: std::env::var("LESSON_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.lesson_dir),
            preferences_path: std::env::var("PREFERENCES_PATH").ok().map(PathBuf::from),
            finish_delay_ms,
            drop_tolerance,
            session_ttl_secs,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// How long a session may sit untouched, if it expires at all.
    pub fn session_ttl(&self) -> Option<Duration> {
        (self.session_ttl_secs > 0).then(|| Duration::from_secs(self.session_ttl_secs))
    }

    /// Game configuration for one session.
    pub fn game_config(&self, scoring: ScoringRule, seed: Option<u64>) -> GameConfig {
        GameConfig {
            finish_delay_ms: self.finish_delay_ms,
            drop_tolerance: self.drop_tolerance,
            scoring,
            seed,
        }
    }
}
