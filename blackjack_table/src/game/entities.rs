use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use std::{collections::VecDeque, fmt};
use thiserror::Error;
use uuid::Uuid;

use super::{
    constants::{self, BET_DENOMINATIONS, BLACKJACK, MAX_SEATS},
    functional,
};

/// Type alias for chip amounts. Balances and bets are whole chips.
pub type Chips = i64;

/// Stable, opaque user identity issued by the account service.
pub type UserId = Uuid;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    pub const ALL: [Self; 4] = [Self::Clubs, Self::Diamonds, Self::Hearts, Self::Spades];
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Clubs => "♣",
            Self::Diamonds => "♦",
            Self::Hearts => "♥",
            Self::Spades => "♠",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Rank {
    Ace,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
}

impl Rank {
    pub const ALL: [Self; 13] = [
        Self::Ace,
        Self::Two,
        Self::Three,
        Self::Four,
        Self::Five,
        Self::Six,
        Self::Seven,
        Self::Eight,
        Self::Nine,
        Self::Ten,
        Self::Jack,
        Self::Queen,
        Self::King,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Ace => "A",
            Self::Two => "2",
            Self::Three => "3",
            Self::Four => "4",
            Self::Five => "5",
            Self::Six => "6",
            Self::Seven => "7",
            Self::Eight => "8",
            Self::Nine => "9",
            Self::Ten => "10",
            Self::Jack => "J",
            Self::Queen => "Q",
            Self::King => "K",
        }
    }

    #[must_use]
    pub fn value(self) -> CardValue {
        match self {
            Self::Ace => CardValue::Pair(1, 11),
            Self::Two => CardValue::Single(2),
            Self::Three => CardValue::Single(3),
            Self::Four => CardValue::Single(4),
            Self::Five => CardValue::Single(5),
            Self::Six => CardValue::Single(6),
            Self::Seven => CardValue::Single(7),
            Self::Eight => CardValue::Single(8),
            Self::Nine => CardValue::Single(9),
            Self::Ten | Self::Jack | Self::Queen | Self::King => CardValue::Single(10),
        }
    }
}

/// Counted value of a card. Rank-flexible cards (the ace) carry a
/// `(low, high)` pair and are resolved by [`functional::hand_count`].
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CardValue {
    Single(u8),
    Pair(u8, u8),
}

/// A playing card. Everything but visibility is fixed at creation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Card {
    suit: Suit,
    rank: Rank,
    visible: bool,
}

impl Card {
    #[must_use]
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Self {
            suit,
            rank,
            visible: true,
        }
    }

    #[must_use]
    pub fn suit(&self) -> Suit {
        self.suit
    }

    #[must_use]
    pub fn rank(&self) -> Rank {
        self.rank
    }

    #[must_use]
    pub fn value(&self) -> CardValue {
        self.rank.value()
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = format!("{}/{}", self.rank.label(), self.suit);
        write!(f, "{repr:>4}")
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DeckError {
    #[error("deck exhausted")]
    Exhausted,
}

/// A finite stack of cards. Cards are drawn from the top (the back of
/// the underlying vector).
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// The 52 canonical cards, unshuffled.
    #[must_use]
    pub fn ordered() -> Self {
        let mut cards = Vec::with_capacity(constants::DECK_SIZE);
        for suit in Suit::ALL {
            for rank in Rank::ALL {
                cards.push(Card::new(rank, suit));
            }
        }
        Self { cards }
    }

    /// A fresh, uniformly shuffled deck of the 52 canonical cards.
    #[must_use]
    pub fn shuffled<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::ordered();
        deck.cards.shuffle(rng);
        deck
    }

    /// A deck that deals `cards` in the given order, first element first.
    #[must_use]
    pub fn stacked(cards: impl IntoIterator<Item = Card>) -> Self {
        let mut cards: Vec<Card> = cards.into_iter().collect();
        cards.reverse();
        Self { cards }
    }

    pub fn draw(&mut self) -> Result<Card, DeckError> {
        self.cards.pop().ok_or(DeckError::Exhausted)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::shuffled(&mut rand::rng())
    }
}

/// Supplies the deck a room plays each round with.
pub trait DeckSource: Send + Sync {
    fn fresh_deck(&mut self) -> Deck;
}

/// Default deck source: a new uniform shuffle every round.
pub struct ShuffledDecks {
    rng: StdRng,
}

impl ShuffledDecks {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible shuffles, mainly for tests and replays.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for ShuffledDecks {
    fn default() -> Self {
        Self::new()
    }
}

impl DeckSource for ShuffledDecks {
    fn fresh_deck(&mut self) -> Deck {
        Deck::shuffled(&mut self.rng)
    }
}

/// Hands out prepared decks in order, then falls back to seeded shuffles.
pub struct StackedDecks {
    queue: VecDeque<Deck>,
    fallback: ShuffledDecks,
}

impl StackedDecks {
    #[must_use]
    pub fn new(decks: impl IntoIterator<Item = Deck>) -> Self {
        Self {
            queue: decks.into_iter().collect(),
            fallback: ShuffledDecks::seeded(0),
        }
    }
}

impl DeckSource for StackedDecks {
    fn fresh_deck(&mut self) -> Deck {
        self.queue
            .pop_front()
            .unwrap_or_else(|| self.fallback.fresh_deck())
    }
}

/// One of the six seats at a room, numbered from 1.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Seat(u8);

impl Seat {
    /// Zero-based position in the seat table.
    #[must_use]
    pub fn index(self) -> usize {
        usize::from(self.0) - 1
    }

    #[must_use]
    pub fn number(self) -> u8 {
        self.0
    }

}

impl TryFrom<u8> for Seat {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (1..=MAX_SEATS as u8).contains(&value) {
            Ok(Self(value))
        } else {
            Err(format!("seat must be between 1 and {MAX_SEATS}, got {value}"))
        }
    }
}

impl From<Seat> for u8 {
    fn from(value: Seat) -> Self {
        value.0
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "seat {}", self.0)
    }
}

/// A bet restricted to the fixed chip denominations.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(try_from = "Chips", into = "Chips")]
pub struct BetAmount(Chips);

impl BetAmount {
    #[must_use]
    pub fn chips(self) -> Chips {
        self.0
    }
}

impl TryFrom<Chips> for BetAmount {
    type Error = String;

    fn try_from(value: Chips) -> Result<Self, Self::Error> {
        if BET_DENOMINATIONS.contains(&value) {
            Ok(Self(value))
        } else {
            Err(format!("bet must be one of {BET_DENOMINATIONS:?}, got {value}"))
        }
    }
}

impl From<BetAmount> for Chips {
    fn from(value: BetAmount) -> Self {
        value.0
    }
}

impl fmt::Display for BetAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DealerStatus {
    #[default]
    Idle,
    Bust,
    Blackjack,
}

impl fmt::Display for DealerStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Idle => "idle",
            Self::Bust => "bust",
            Self::Blackjack => "blackjack",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayerStatus {
    #[default]
    Idle,
    Bust,
    Blackjack,
    Lost,
    Won,
    #[serde(rename = "STAND-OFF")]
    StandOff,
}

impl fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Idle => "idle",
            Self::Bust => "bust",
            Self::Blackjack => "blackjack",
            Self::Lost => "lost",
            Self::Won => "won",
            Self::StandOff => "stand-off",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Debug)]
pub struct Dealer {
    pub id: Uuid,
    pub cards: Vec<Card>,
    pub count: u8,
    pub status: DealerStatus,
}

impl Dealer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            cards: Vec::with_capacity(4),
            count: 0,
            status: DealerStatus::Idle,
        }
    }

    /// The second card dealt to the dealer is the hole card and stays
    /// hidden until [`Dealer::reveal_hole`].
    pub fn deal_card(&mut self, mut card: Card) {
        if self.cards.len() == 1 {
            card.hide();
        }
        self.cards.push(card);
        self.count = functional::hand_count(&self.cards);
        if self.count == BLACKJACK {
            self.status = DealerStatus::Blackjack;
        } else if self.count > BLACKJACK {
            self.status = DealerStatus::Bust;
        }
    }

    pub fn reveal_hole(&mut self) {
        for card in &mut self.cards {
            card.show();
        }
    }

    /// Count over the cards a spectator is allowed to see.
    #[must_use]
    pub fn visible_count(&self) -> u8 {
        let visible: Vec<Card> = self.cards.iter().copied().filter(Card::is_visible).collect();
        functional::hand_count(&visible)
    }

    pub fn reset(&mut self) {
        self.cards.clear();
        self.count = 0;
        self.status = DealerStatus::Idle;
    }
}

impl Default for Dealer {
    fn default() -> Self {
        Self::new()
    }
}

/// A user bound to a seat for as long as they stay seated. Hand state
/// is cleared every round; identity and balance are not.
#[derive(Clone, Debug)]
pub struct Player {
    pub id: UserId,
    pub seat: Seat,
    pub name: String,
    pub avatar: String,
    /// Last balance reported by the account service.
    pub balance: Chips,
    pub online: bool,
    pub cards: Vec<Card>,
    pub count: u8,
    pub status: PlayerStatus,
    pub played: bool,
    pub bet: Chips,
    /// Not dealt into the current round.
    pub sitting_out: bool,
}

impl Player {
    #[must_use]
    pub fn new(id: UserId, seat: Seat, name: String, avatar: String, balance: Chips) -> Self {
        Self {
            id,
            seat,
            name,
            avatar,
            balance,
            online: true,
            cards: Vec::with_capacity(2),
            count: 0,
            status: PlayerStatus::Idle,
            played: false,
            bet: 0,
            sitting_out: false,
        }
    }

    pub fn deal_card(&mut self, card: Card) {
        self.cards.push(card);
        self.count = functional::hand_count(&self.cards);
        if self.count == BLACKJACK {
            self.status = PlayerStatus::Blackjack;
        } else if self.count > BLACKJACK {
            self.status = PlayerStatus::Bust;
        }
    }

    /// Whether this player has a bet riding on the current round.
    #[must_use]
    pub fn in_round(&self) -> bool {
        !self.sitting_out && self.bet > 0
    }

    pub fn reset(&mut self) {
        self.cards.clear();
        self.count = 0;
        self.status = PlayerStatus::Idle;
        self.played = false;
        self.bet = 0;
        self.sitting_out = false;
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct CardView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suit: Option<Suit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<CardValue>,
    pub visible: bool,
}

impl From<&Card> for CardView {
    fn from(card: &Card) -> Self {
        if card.is_visible() {
            Self {
                suit: Some(card.suit()),
                label: Some(card.rank().label().to_string()),
                value: Some(card.value()),
                visible: true,
            }
        } else {
            Self {
                suit: None,
                label: None,
                value: None,
                visible: false,
            }
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct DealerView {
    pub id: Uuid,
    pub status: DealerStatus,
    pub cards: Vec<CardView>,
    pub count: u8,
}

impl From<&Dealer> for DealerView {
    fn from(dealer: &Dealer) -> Self {
        let hidden = dealer.cards.iter().any(|card| !card.is_visible());
        Self {
            id: dealer.id,
            // A hidden hole card must not leak through the status either.
            status: if hidden {
                DealerStatus::Idle
            } else {
                dealer.status
            },
            cards: dealer.cards.iter().map(CardView::from).collect(),
            count: dealer.visible_count(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub id: UserId,
    pub seat: Seat,
    pub name: String,
    pub avatar: String,
    pub balance: Chips,
    pub online: bool,
    pub status: PlayerStatus,
    pub cards: Vec<CardView>,
    pub count: u8,
    pub played: bool,
    pub bet: Chips,
    pub sitting_out: bool,
}

impl From<&Player> for PlayerView {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id,
            seat: player.seat,
            name: player.name.clone(),
            avatar: player.avatar.clone(),
            balance: player.balance,
            online: player.online,
            status: player.status,
            cards: player.cards.iter().map(CardView::from).collect(),
            count: player.count,
            played: player.played,
            bet: player.bet,
            sitting_out: player.sitting_out,
        }
    }
}
