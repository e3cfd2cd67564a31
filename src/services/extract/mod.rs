//! Page extractors.
//!
//! Each extractor is a pure function from one parsed page to typed
//! fragments. None of them performs I/O. A missing attribute on a row the
//! extractor needs is an error for the whole page, not a skipped row.

pub mod decklist;
pub mod listing;
pub mod pairings;
pub mod standings;

use std::str::FromStr;

use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};

pub use decklist::extract_decklist;
pub use listing::extract_listing;
pub use pairings::{PairingLayout, classify_pairings, extract_history_urls, extract_matches};
pub use standings::extract_standings;

pub(crate) fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// Rows of the first element carrying `table_class`, header row excluded.
pub(crate) fn table_rows<'a>(document: &'a Html, table_class: &str) -> Result<Vec<ElementRef<'a>>> {
    let table_sel = parse_selector(&format!(".{table_class}"))?;
    let row_sel = parse_selector("tr")?;

    Ok(document
        .select(&table_sel)
        .next()
        .map(|table| table.select(&row_sel).skip(1).collect())
        .unwrap_or_default())
}

/// Read an attribute that must be present.
pub(crate) fn required_attr<'a>(
    element: &ElementRef<'a>,
    name: &str,
    context: &str,
) -> Result<&'a str> {
    element
        .value()
        .attr(name)
        .ok_or_else(|| AppError::extract(context, format!("missing attribute `{name}`")))
}

/// Read and parse an attribute that must be present and well-formed.
pub(crate) fn required_number<T: FromStr>(
    element: &ElementRef<'_>,
    name: &str,
    context: &str,
) -> Result<T> {
    let raw = required_attr(element, name, context)?;
    raw.trim().parse().map_err(|_| {
        AppError::extract(context, format!("attribute `{name}` is not a number: {raw:?}"))
    })
}

/// First `a` under `element` whose `href` matches `pattern`.
pub(crate) fn find_link<'a>(
    element: &ElementRef<'a>,
    pattern: &regex::Regex,
) -> Result<Option<&'a str>> {
    let link_sel = parse_selector("a[href]")?;
    Ok(element
        .select(&link_sel)
        .filter_map(|a| a.value().attr("href"))
        .find(|href| pattern.is_match(href)))
}
