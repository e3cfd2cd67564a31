//! Typed fragments extracted from individual pages.

/// Pagination bounds of a listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub current: u32,
    pub max: u32,
}

impl Pagination {
    pub fn has_next(&self) -> bool {
        self.current < self.max
    }
}

/// One page of the completed-tournaments listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPage {
    pub pagination: Pagination,
    pub tournaments: Vec<TournamentRow>,
}

/// A tournament as announced by the listing, before any of its pages are fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TournamentRow {
    pub id: String,
    pub name: String,
    pub date: String,
    pub organizer: String,
    pub format: String,
    pub declared_player_count: u32,
}

/// A player row of a standings page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandingsRow {
    /// Already normalized
    pub id: String,
    pub name: String,
    pub placing: Option<u32>,
    pub country: Option<String>,

    /// Relative decklist URL, present only when the row links to one
    pub decklist_url: Option<String>,
}
