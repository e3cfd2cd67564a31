//! Completed-tournaments listing extractor.

use regex::Regex;
use scraper::Html;

use crate::error::{AppError, Result};
use crate::models::{ListingPage, Pagination, TournamentRow};

use super::{find_link, parse_selector, required_attr, required_number, table_rows};

const STANDINGS_LINK: &str = r"/tournament/([a-zA-Z0-9_\-]+)/standings";

/// Extract pagination bounds and tournament rows from a listing page.
pub fn extract_listing(document: &Html, url: &str) -> Result<ListingPage> {
    let context = format!("listing {url}");

    let pagination_sel = parse_selector("ul.pagination")?;
    let pagination = document
        .select(&pagination_sel)
        .next()
        .ok_or_else(|| AppError::extract(&context, "no pagination control"))?;
    let pagination = Pagination {
        current: required_number(&pagination, "data-current", &context)?,
        max: required_number(&pagination, "data-max", &context)?,
    };

    let standings_link = Regex::new(STANDINGS_LINK)?;
    let tournaments = table_rows(document, "completed-tournaments")?
        .iter()
        .map(|row| -> Result<TournamentRow> {
            let href = find_link(row, &standings_link)?
                .ok_or_else(|| AppError::extract(&context, "row without standings link"))?;
            let id = standings_link
                .captures(href)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
                .ok_or_else(|| AppError::extract(&context, format!("bad standings link {href}")))?;

            Ok(TournamentRow {
                name: required_attr(row, "data-name", &context)?.to_string(),
                date: required_attr(row, "data-date", &context)?.to_string(),
                organizer: required_attr(row, "data-organizer", &context)?.to_string(),
                format: required_attr(row, "data-format", &context)?.to_string(),
                declared_player_count: required_number(row, "data-players", &context)?,
                id,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ListingPage {
        pagination,
        tournaments,
    })
}
