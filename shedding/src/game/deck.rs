//! Card values, deck construction, and shuffling.

use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::constants::{COPIES_PER_RANK, DECK_SIZE};

/// Card value token. Cards have no suit, so the value is the whole identity
/// of a card and cards with equal values are interchangeable.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Value {
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "8")]
    Eight,
    #[serde(rename = "9")]
    Nine,
    #[serde(rename = "10")]
    Ten,
    #[serde(rename = "J")]
    Jack,
    #[serde(rename = "Q")]
    Queen,
    #[serde(rename = "K")]
    King,
    #[serde(rename = "A")]
    Ace,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "Red Joker")]
    RedJoker,
    #[serde(rename = "Black Joker")]
    BlackJoker,
}

impl Value {
    /// The 13 ranks that appear four times in a deck.
    pub const RANKS: [Value; 13] = [
        Value::Three,
        Value::Four,
        Value::Five,
        Value::Six,
        Value::Seven,
        Value::Eight,
        Value::Nine,
        Value::Ten,
        Value::Jack,
        Value::Queen,
        Value::King,
        Value::Ace,
        Value::Two,
    ];

    /// The two jokers, one copy each.
    pub const JOKERS: [Value; 2] = [Value::RedJoker, Value::BlackJoker];

    pub fn as_str(&self) -> &'static str {
        match self {
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
            Self::Ace => "A",
            Self::Two => "2",
            Self::RedJoker => "Red Joker",
            Self::BlackJoker => "Black Joker",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single card as it appears in a hand. Serialized as `{"value": "..."}`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card {
    pub value: Value,
}

impl Card {
    #[must_use]
    pub const fn new(value: Value) -> Self {
        Self { value }
    }
}

impl From<Value> for Card {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}

/// Build a freshly shuffled 54-card deck using the thread-local RNG.
#[must_use]
pub fn create_deck() -> Vec<Card> {
    create_deck_with(&mut rand::rng())
}

/// Build a freshly shuffled 54-card deck with the given RNG.
pub fn create_deck_with<R: Rng + ?Sized>(rng: &mut R) -> Vec<Card> {
    let mut deck = Vec::with_capacity(DECK_SIZE);
    for value in Value::RANKS {
        deck.extend(std::iter::repeat_n(Card::new(value), COPIES_PER_RANK));
    }
    deck.extend(Value::JOKERS.into_iter().map(Card::new));
    shuffle_array(&mut deck, rng);
    deck
}

/// Uniform in-place shuffle (Fisher-Yates).
pub fn shuffle_array<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    items.shuffle(rng);
}
