//! Tournament record structures.
//!
//! These types are the on-disk contract read by the downstream loaders, so
//! every field is renamed explicitly and no collection is ever skipped.

use serde::{Deserialize, Serialize};

/// A fully crawled tournament, ready to be written once.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tournament {
    pub id: String,
    pub name: String,
    pub date: String,
    pub organizer: String,
    pub format: String,

    /// Player count announced by the listing (not the number of kept players)
    #[serde(rename = "nb_players")]
    pub declared_player_count: u32,

    pub players: Vec<Player>,
    pub matches: Vec<Match>,
}

impl Tournament {
    /// Number of kept players with at least one card in their decklist.
    pub fn decklist_count(&self) -> usize {
        self.players
            .iter()
            .filter(|p| !p.decklist.is_empty())
            .count()
    }
}

/// A tournament participant with a fetched decklist.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Player {
    /// Normalized player id (see [`crate::utils::normalize_player_id`])
    pub id: String,
    pub name: String,

    /// Final standing, `None` when the site does not publish one.
    /// Written as `-1` when unknown; loaders read it as an integer.
    #[serde(with = "placing")]
    pub placing: Option<u32>,

    pub country: Option<String>,
    pub decklist: Vec<DeckListItem>,
}

/// One card line of a decklist.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeckListItem {
    /// Card role taken from the section heading (e.g. "Pokémon", "Trainer")
    #[serde(rename = "type")]
    pub category: String,

    /// Canonical card URL, doubles as the card catalog key
    pub url: String,

    pub name: String,
    pub count: u32,
}

/// A two-sided match.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Match {
    pub match_results: [MatchResult; 2],
}

impl Match {
    pub fn new(first: MatchResult, second: MatchResult) -> Self {
        Self {
            match_results: [first, second],
        }
    }

    /// Build a match from the sides found on a page.
    ///
    /// Returns `None` unless there are exactly two sides; a single side is
    /// how byes show up.
    pub fn from_sides(sides: Vec<MatchResult>) -> Option<Self> {
        let [first, second]: [MatchResult; 2] = sides.try_into().ok()?;
        Some(Self::new(first, second))
    }
}

/// One side of a match.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchResult {
    pub player_id: String,
    pub score: u32,
}

impl MatchResult {
    pub fn new(player_id: impl Into<String>, score: u32) -> Self {
        Self {
            player_id: player_id.into(),
            score,
        }
    }
}

/// On-disk form of [`Player::placing`].
mod placing {
    use serde::{Deserialize, Deserializer, Serializer};

    const UNKNOWN: i64 = -1;

    pub fn serialize<S: Serializer>(
        value: &Option<u32>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(placing) => serializer.serialize_u32(*placing),
            None => serializer.serialize_i64(UNKNOWN),
        }
    }

    /// Accepts `-1` and `null` for an unknown placing.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<u32>, D::Error> {
        let raw = Option::<i64>::deserialize(deserializer)?;
        Ok(raw.and_then(|p| u32::try_from(p).ok()))
    }
}
