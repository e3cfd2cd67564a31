//! Standings page extractor.

use regex::Regex;
use scraper::Html;

use crate::error::{AppError, Result};
use crate::models::StandingsRow;
use crate::utils::{decklist_url, normalize_player_id};

use super::{find_link, required_attr, table_rows};

const PLAYER_LINK: &str = r"/tournament/[a-zA-Z0-9_\-]*/player/([^/?#]+)";
const DECKLIST_LINK: &str = r"/tournament/[a-zA-Z0-9_\-]*/player/[a-zA-Z0-9_]*/decklist";

/// Extract one row per player from a standings page.
///
/// Player ids are normalized here; rows that link to a decklist get the
/// decklist URL built from the normalized id.
pub fn extract_standings(
    document: &Html,
    tournament_id: &str,
    url: &str,
) -> Result<Vec<StandingsRow>> {
    let context = format!("standings {url}");
    let player_link = Regex::new(PLAYER_LINK)?;
    let decklist_link = Regex::new(DECKLIST_LINK)?;

    table_rows(document, "striped")?
        .iter()
        .map(|row| -> Result<StandingsRow> {
            let href = find_link(row, &player_link)?
                .ok_or_else(|| AppError::extract(&context, "row without player link"))?;
            let raw_id = player_link
                .captures(href)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str())
                .ok_or_else(|| AppError::extract(&context, format!("bad player link {href}")))?;
            let id = normalize_player_id(raw_id);

            let has_decklist = find_link(row, &decklist_link)?.is_some();
            let placing = row
                .value()
                .attr("data-placing")
                .and_then(|p| p.trim().parse().ok());
            let country = row
                .value()
                .attr("data-country")
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string);

            Ok(StandingsRow {
                name: required_attr(row, "data-name", &context)?.to_string(),
                placing,
                country,
                decklist_url: has_decklist.then(|| decklist_url(tournament_id, &id)),
                id,
            })
        })
        .collect()
}
