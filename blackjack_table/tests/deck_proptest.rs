/// Property-based tests for decks and hand counting using proptest
///
/// These tests verify that every shuffled deck is a permutation of the
/// canonical 52 cards and that soft-ace counting holds for arbitrary hands.
use blackjack_table::game::{
    constants::{BLACKJACK, DECK_SIZE},
    entities::{Card, CardValue, DeckSource, Rank, ShuffledDecks, Suit},
    functional::hand_count,
};
use proptest::prelude::*;
use std::collections::BTreeSet;

// Strategy to generate any canonical card
fn card_strategy() -> impl Strategy<Value = Card> {
    (0usize..13, 0usize..4).prop_map(|(rank, suit)| Card::new(Rank::ALL[rank], Suit::ALL[suit]))
}

// Sum of a hand with every ace counted low
fn hard_total(cards: &[Card]) -> u8 {
    cards
        .iter()
        .map(|card| match card.value() {
            CardValue::Single(value) => value,
            CardValue::Pair(low, _) => low,
        })
        .sum()
}

proptest! {
    #[test]
    fn test_shuffled_deck_is_permutation(seed in any::<u64>()) {
        let mut deck = ShuffledDecks::seeded(seed).fresh_deck();
        prop_assert_eq!(deck.len(), DECK_SIZE);

        let mut seen = BTreeSet::new();
        while let Ok(card) = deck.draw() {
            prop_assert!(card.is_visible());
            prop_assert!(seen.insert((card.suit(), card.rank())), "duplicate card {}", card);
        }

        prop_assert_eq!(seen.len(), DECK_SIZE);
        prop_assert!(deck.is_empty());
        prop_assert!(deck.draw().is_err());
    }

    #[test]
    fn test_same_seed_same_order(seed in any::<u64>()) {
        let mut first = ShuffledDecks::seeded(seed).fresh_deck();
        let mut second = ShuffledDecks::seeded(seed).fresh_deck();
        while let Ok(card) = first.draw() {
            prop_assert_eq!(Some(card), second.draw().ok());
        }
    }

    #[test]
    fn test_soft_aces_only_count_high_when_safe(
        cards in prop::collection::vec(card_strategy(), 0..8)
    ) {
        let count = hand_count(&cards);
        let hard = hard_total(&cards);
        let has_ace = cards.iter().any(|card| card.rank() == Rank::Ace);

        // At most one ace can ever count high.
        prop_assert!(count == hard || (has_ace && count == hard + 10));
        if count == hard + 10 {
            prop_assert!(count <= BLACKJACK);
        }
        if has_ace && hard + 10 <= BLACKJACK {
            prop_assert_eq!(count, hard + 10);
        }
    }
}
