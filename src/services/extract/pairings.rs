//! Pairings page extractor.
//!
//! The site renders pairings in one of two unrelated layouts: a live
//! bracket for single-elimination rounds and a table for Swiss rounds.
//! [`classify_pairings`] decides which one a page uses, once, and the
//! extraction matches on the result.

use scraper::{ElementRef, Html};

use crate::error::{AppError, Result};
use crate::models::{Match, MatchResult};
use crate::utils::normalize_player_id;

use super::{parse_selector, required_attr, required_number};

/// Layout of a pairings page, holding the container the matches live in.
#[derive(Debug, Clone, Copy)]
pub enum PairingLayout<'a> {
    /// `div.live-bracket`
    Bracket(ElementRef<'a>),
    /// First `table[data-tournament]` inside `div.pairings`. Matches are
    /// read from every completed row of the page, not only this table.
    Table(ElementRef<'a>),
}

/// Decide the layout of a pairings page.
///
/// A bracket container wins even when a pairings table is also present.
/// A page with neither is an error: the site format changed and silently
/// returning no matches would hide it.
pub fn classify_pairings<'a>(document: &'a Html, url: &str) -> Result<PairingLayout<'a>> {
    let bracket_sel = parse_selector("div.live-bracket")?;
    if let Some(bracket) = document.select(&bracket_sel).next() {
        return Ok(PairingLayout::Bracket(bracket));
    }

    let table_sel = parse_selector("div.pairings table[data-tournament]")?;
    if let Some(table) = document.select(&table_sel).next() {
        return Ok(PairingLayout::Table(table));
    }

    Err(AppError::UnknownPairingLayout {
        url: url.to_string(),
    })
}

/// Extract every two-sided match of a pairings page.
pub fn extract_matches(document: &Html, url: &str) -> Result<Vec<Match>> {
    let context = format!("pairings {url}");
    match classify_pairings(document, url)? {
        PairingLayout::Bracket(bracket) => bracket_matches(&bracket, &context),
        PairingLayout::Table(_) => table_matches(&document.root_element(), &context),
    }
}

/// URLs of the earlier pairing pages linked from the round navigation.
///
/// The last navigation entry points to the next round and is left out.
pub fn extract_history_urls(document: &Html) -> Result<Vec<String>> {
    let nav_sel = parse_selector(".mini-nav")?;
    let link_sel = parse_selector("a")?;

    let Some(nav) = document.select(&nav_sel).next() else {
        return Ok(Vec::new());
    };

    let mut links: Vec<_> = nav.select(&link_sel).collect();
    links.pop();

    links
        .iter()
        .map(|a| required_attr(a, "href", "pairings navigation").map(str::to_string))
        .collect()
}

fn bracket_matches(bracket: &ElementRef<'_>, context: &str) -> Result<Vec<Match>> {
    let match_sel = parse_selector("div.bracket-match")?;
    let bye_sel = parse_selector("a.bye")?;
    let player_sel = parse_selector("div.live-bracket-player")?;
    let score_sel = parse_selector("div.score")?;

    let mut matches = Vec::new();
    for node in bracket.select(&match_sel) {
        if node.select(&bye_sel).next().is_some() {
            continue;
        }

        let sides = node
            .select(&player_sel)
            .map(|player| -> Result<MatchResult> {
                let id = required_attr(&player, "data-id", context)?;
                let score = player
                    .select(&score_sel)
                    .next()
                    .ok_or_else(|| AppError::extract(context, format!("no score for {id}")))?;
                Ok(MatchResult::new(
                    normalize_player_id(id),
                    required_number(&score, "data-score", context)?,
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        match Match::from_sides(sides) {
            Some(m) => matches.push(m),
            None => log::debug!("Dropping one-sided bracket match in {}", context),
        }
    }
    Ok(matches)
}

fn table_matches(page: &ElementRef<'_>, context: &str) -> Result<Vec<Match>> {
    let row_sel = parse_selector(r#"tr[data-completed="1"]"#)?;
    let p1_sel = parse_selector("td.p1")?;
    let p2_sel = parse_selector("td.p2")?;

    let mut matches = Vec::new();
    for row in page.select(&row_sel) {
        let (Some(p1), Some(p2)) = (row.select(&p1_sel).next(), row.select(&p2_sel).next())
        else {
            continue;
        };
        matches.push(Match::new(
            table_side(&p1, context)?,
            table_side(&p2, context)?,
        ));
    }
    Ok(matches)
}

fn table_side(cell: &ElementRef<'_>, context: &str) -> Result<MatchResult> {
    Ok(MatchResult::new(
        normalize_player_id(required_attr(cell, "data-id", context)?),
        required_number(cell, "data-count", context)?,
    ))
}
