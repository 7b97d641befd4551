//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use blackjack_table::{RoomConfig, game::constants::DEFAULT_BALANCE, game::entities::Chips};
use std::net::{Ipv4Addr, SocketAddr};

/// Port used when neither `--bind` nor `SERVER_BIND` is given
pub const DEFAULT_PORT: u16 = 6969;

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Number of rooms to create on startup
    pub initial_rooms: usize,
    /// Balance granted to every new user
    pub default_balance: Chips,
    /// Pacing shared by every room
    pub room: RoomConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            initial_rooms: 1,
            default_balance: DEFAULT_BALANCE,
            room: RoomConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `rooms_override` - Optional number of rooms override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if a variable is present but unusable, or if the
    /// resulting configuration fails validation
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        rooms_override: Option<usize>,
    ) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok(), bind_override, rooms_override)
    }

    /// Same as [`ServerConfig::from_env`] with a custom variable source
    pub fn from_lookup<F>(
        lookup: F,
        bind_override: Option<SocketAddr>,
        rooms_override: Option<usize>,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        // A malformed bind address is an error rather than a silent fallback
        let bind = match bind_override {
            Some(bind) => bind,
            None => match lookup("SERVER_BIND") {
                Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                    var: "SERVER_BIND".to_string(),
                    reason: format!("'{raw}' is not an IP:PORT address"),
                })?,
                None => defaults.bind,
            },
        };

        let room_defaults = defaults.room;
        let room = RoomConfig {
            starting_countdown_secs: parse_env_or(
                &lookup,
                "ROOM_STARTING_COUNTDOWN_SECS",
                room_defaults.starting_countdown_secs,
            ),
            betting_turn_secs: parse_env_or(
                &lookup,
                "ROOM_BETTING_TURN_SECS",
                room_defaults.betting_turn_secs,
            ),
            playing_turn_secs: parse_env_or(
                &lookup,
                "ROOM_PLAYING_TURN_SECS",
                room_defaults.playing_turn_secs,
            ),
            tick_millis: parse_env_or(&lookup, "ROOM_TICK_MILLIS", room_defaults.tick_millis),
            deal_interval_millis: parse_env_or(
                &lookup,
                "ROOM_DEAL_INTERVAL_MILLIS",
                room_defaults.deal_interval_millis,
            ),
            reveal_delay_millis: parse_env_or(
                &lookup,
                "ROOM_REVEAL_DELAY_MILLIS",
                room_defaults.reveal_delay_millis,
            ),
            dealer_draw_delay_millis: parse_env_or(
                &lookup,
                "ROOM_DEALER_DRAW_DELAY_MILLIS",
                room_defaults.dealer_draw_delay_millis,
            ),
            settle_delay_millis: parse_env_or(
                &lookup,
                "ROOM_SETTLE_DELAY_MILLIS",
                room_defaults.settle_delay_millis,
            ),
            restart_delay_secs: parse_env_or(
                &lookup,
                "ROOM_RESTART_DELAY_SECS",
                room_defaults.restart_delay_secs,
            ),
            dealer_stands_on: parse_env_or(
                &lookup,
                "ROOM_DEALER_STANDS_ON",
                room_defaults.dealer_stands_on,
            ),
            inbox_capacity: parse_env_or(
                &lookup,
                "ROOM_INBOX_CAPACITY",
                room_defaults.inbox_capacity,
            ),
            subscriber_capacity: parse_env_or(
                &lookup,
                "ROOM_SUBSCRIBER_CAPACITY",
                room_defaults.subscriber_capacity,
            ),
        };

        let config = ServerConfig {
            bind,
            initial_rooms: rooms_override
                .unwrap_or_else(|| parse_env_or(&lookup, "INITIAL_ROOMS", defaults.initial_rooms)),
            default_balance: parse_env_or(&lookup, "DEFAULT_BALANCE", defaults.default_balance),
            room,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_rooms == 0 {
            return Err(ConfigError::Invalid {
                var: "INITIAL_ROOMS".to_string(),
                reason: "Must be at least 1".to_string(),
            });
        }

        if self.default_balance <= 0 {
            return Err(ConfigError::Invalid {
                var: "DEFAULT_BALANCE".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        self.room.validate().map_err(|reason| ConfigError::Invalid {
            var: "ROOM_*".to_string(),
            reason,
        })
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Parse a variable with default fallback. Unparseable values fall back too.
fn parse_env_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|raw| raw.parse()) {
        Some(Ok(value)) => value,
        Some(Err(_)) => {
            log::warn!("Ignoring unparseable {}, using default", key);
            default
        }
        None => default,
    }
}
