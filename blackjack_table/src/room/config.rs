//! Room configuration models.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::game::constants::DEALER_HITS_ON_OR_BELOW;

/// Room pacing configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Countdown before betting opens, in ticks (default: 10)
    pub starting_countdown_secs: u32,

    /// Time a player has to bet, in ticks (default: 30)
    pub betting_turn_secs: u32,

    /// Time a player has to hit or stand, in ticks (default: 30)
    pub playing_turn_secs: u32,

    /// Length of one countdown tick
    pub tick_millis: u64,

    /// Pause between two dealt cards
    pub deal_interval_millis: u64,

    /// Pause after the hole card is revealed
    pub reveal_delay_millis: u64,

    /// Pause between two dealer draws
    pub dealer_draw_delay_millis: u64,

    /// Pause before payouts are settled
    pub settle_delay_millis: u64,

    /// Pause after payouts before the next round (5 to 10 seconds)
    pub restart_delay_secs: u64,

    /// Dealer stops drawing at or above this count (default: 17)
    pub dealer_stands_on: u8,

    /// Capacity of the actor inbox
    pub inbox_capacity: usize,

    /// Capacity of each subscriber's event channel
    pub subscriber_capacity: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            starting_countdown_secs: 10,
            betting_turn_secs: 30,
            playing_turn_secs: 30,
            tick_millis: 1000,
            deal_interval_millis: 1000,
            reveal_delay_millis: 1000,
            dealer_draw_delay_millis: 1000,
            settle_delay_millis: 1000,
            restart_delay_secs: 5,
            dealer_stands_on: DEALER_HITS_ON_OR_BELOW + 1,
            inbox_capacity: 100,
            subscriber_capacity: 32,
        }
    }
}

impl RoomConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.starting_countdown_secs == 0 {
            return Err("Starting countdown must be at least one tick".to_string());
        }

        if self.betting_turn_secs == 0 || self.playing_turn_secs == 0 {
            return Err("Turn timers must be at least one tick".to_string());
        }

        if self.tick_millis == 0 {
            return Err("Tick length must be positive".to_string());
        }

        if !(5..=10).contains(&self.restart_delay_secs) {
            return Err("Restart delay must be between 5 and 10 seconds".to_string());
        }

        if !(2..=21).contains(&self.dealer_stands_on) {
            return Err("Dealer stand threshold must be between 2 and 21".to_string());
        }

        if self.inbox_capacity == 0 || self.subscriber_capacity == 0 {
            return Err("Channel capacities must be positive".to_string());
        }

        Ok(())
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }

    pub fn deal_interval(&self) -> Duration {
        Duration::from_millis(self.deal_interval_millis)
    }

    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_millis)
    }

    pub fn dealer_draw_delay(&self) -> Duration {
        Duration::from_millis(self.dealer_draw_delay_millis)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_millis)
    }

    pub fn restart_delay(&self) -> Duration {
        Duration::from_secs(self.restart_delay_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = RoomConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.starting_countdown_secs, 10);
        assert_eq!(config.dealer_stands_on, 17);
        assert_eq!(config.restart_delay(), Duration::from_secs(5));
    }

    #[test]
    fn test_restart_delay_bounds() {
        let mut config = RoomConfig {
            restart_delay_secs: 4,
            ..RoomConfig::default()
        };
        assert!(config.validate().is_err());

        config.restart_delay_secs = 10;
        assert!(config.validate().is_ok());

        config.restart_delay_secs = 11;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timers_rejected() {
        let config = RoomConfig {
            betting_turn_secs: 0,
            ..RoomConfig::default()
        };
        assert!(config.validate().is_err());

        let config = RoomConfig {
            tick_millis: 0,
            ..RoomConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
