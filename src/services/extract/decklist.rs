//! Decklist page extractor.

use regex::Regex;
use scraper::{ElementRef, Html};

use crate::error::{AppError, Result};
use crate::models::DeckListItem;

use super::parse_selector;

const CARD_LINK: &str = r"pocket\.limitlesstcg\.com/cards/.*";

/// Extract every card of a decklist page.
///
/// Card links look like `<a href=".../cards/A1/1">2 Bulbasaur</a>`: the
/// first character is the copy count and the name starts two characters
/// later. The category is the first word of the heading of the section the
/// link sits in.
pub fn extract_decklist(document: &Html, url: &str) -> Result<Vec<DeckListItem>> {
    let context = format!("decklist {url}");
    let card_link = Regex::new(CARD_LINK)?;
    let decklist_sel = parse_selector("div.decklist")?;
    let link_sel = parse_selector("a[href]")?;
    let heading_sel = parse_selector("div.heading")?;

    let Some(decklist) = document.select(&decklist_sel).next() else {
        return Ok(Vec::new());
    };

    decklist
        .select(&link_sel)
        .filter_map(|a| a.value().attr("href").map(|href| (a, href)))
        .filter(|(_, href)| card_link.is_match(href))
        .map(|(card, href)| -> Result<DeckListItem> {
            let category = section_of(&card)
                .and_then(|section| section.select(&heading_sel).next())
                .map(|heading| heading.text().collect::<String>())
                .and_then(|text| text.split_whitespace().next().map(str::to_string))
                .ok_or_else(|| AppError::extract(&context, format!("no heading for {href}")))?;

            let text: String = card.text().collect();
            let text = text.trim();
            let count = text
                .chars()
                .next()
                .and_then(|c| c.to_digit(10))
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    AppError::extract(&context, format!("no card count in {text:?}"))
                })?;
            let name: String = text.chars().skip(2).collect();

            Ok(DeckListItem {
                category,
                url: href.to_string(),
                name,
                count,
            })
        })
        .collect()
}

/// The element two levels above a card link, which holds the section heading.
fn section_of<'a>(card: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    card.parent()
        .and_then(|parent| parent.parent())
        .and_then(ElementRef::wrap)
}
