//! Utility functions and helpers.

pub mod http;

use url::Url;

/// Player id the site uses for some accounts; it collides with other uses
/// of the word, so it is never used verbatim.
pub const SENTINEL_PLAYER_ID: &str = "nul";

/// Replacement for [`SENTINEL_PLAYER_ID`].
pub const REMAPPED_PLAYER_ID: &str = "joueur_nul";

/// Normalize a raw player id read from a page.
///
/// This is the only place the sentinel id is remapped; every URL, cache key
/// and match result is built from the normalized value.
pub fn normalize_player_id(raw: &str) -> String {
    let id = raw.trim();
    if id == SENTINEL_PLAYER_ID {
        REMAPPED_PLAYER_ID.to_string()
    } else {
        id.to_string()
    }
}

/// Relative URL of a tournament's standings page.
pub fn standings_url(tournament_id: &str) -> String {
    format!("/tournament/{tournament_id}/standings?players")
}

/// Relative URL of a tournament's latest pairings page.
pub fn pairings_url(tournament_id: &str) -> String {
    format!("/tournament/{tournament_id}/pairings")
}

/// Relative URL of one player's decklist. `player_id` must be normalized.
pub fn decklist_url(tournament_id: &str, player_id: &str) -> String {
    format!("/tournament/{tournament_id}/player/{player_id}/decklist")
}

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}
