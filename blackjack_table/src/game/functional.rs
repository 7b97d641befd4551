//! Pure hand-counting and settlement rules.

use super::{
    constants::BLACKJACK,
    entities::{Card, CardValue, Chips, DealerStatus, PlayerStatus},
};

/// Count a hand with soft aces: every ace counts high unless that would
/// bust the hand, in which case aces drop to their low value one at a time.
#[must_use]
pub fn hand_count(cards: &[Card]) -> u8 {
    let mut count: u8 = 0;
    let mut soft_aces: u8 = 0;
    for card in cards {
        match card.value() {
            CardValue::Single(value) => count = count.saturating_add(value),
            CardValue::Pair(_, high) => {
                count = count.saturating_add(high);
                soft_aces += 1;
            }
        }
    }
    while count > BLACKJACK && soft_aces > 0 {
        // Ace pairs are always (1, 11).
        count -= 10;
        soft_aces -= 1;
    }
    count
}

/// Result of settling one player's hand against the dealer's.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Settlement {
    pub outcome: PlayerStatus,
    /// Chips credited back to the player. The bet itself was debited
    /// when it was placed.
    pub credit: Chips,
}

#[must_use]
pub fn settle(
    player_status: PlayerStatus,
    player_count: u8,
    dealer_status: DealerStatus,
    dealer_count: u8,
    bet: Chips,
) -> Settlement {
    let won = Settlement {
        outcome: PlayerStatus::Won,
        credit: 2 * bet,
    };
    let lost = Settlement {
        outcome: PlayerStatus::Lost,
        credit: 0,
    };
    let push = Settlement {
        outcome: PlayerStatus::StandOff,
        credit: bet,
    };

    match (player_status, dealer_status) {
        (PlayerStatus::Blackjack, DealerStatus::Blackjack) => push,
        (PlayerStatus::Blackjack, _) => won,
        (PlayerStatus::Bust, _) => lost,
        (PlayerStatus::Idle, DealerStatus::Bust) => won,
        (PlayerStatus::Idle, DealerStatus::Blackjack) => lost,
        (PlayerStatus::Idle, DealerStatus::Idle) => match player_count.cmp(&dealer_count) {
            std::cmp::Ordering::Equal => push,
            std::cmp::Ordering::Greater => won,
            std::cmp::Ordering::Less => lost,
        },
        // Already settled this round.
        (settled, _) => Settlement {
            outcome: settled,
            credit: 0,
        },
    }
}
