use scraper::{Html, Selector};

use crate::error::ExtractionError;

/// Apply a CSS selector and return the trimmed text of every match in
/// document order. No match is an empty list, not an error.
pub fn extract(html: &str, selector: &str) -> Result<Vec<String>, ExtractionError> {
    let parsed = Selector::parse(selector).map_err(|e| ExtractionError::InvalidSelector {
        selector: selector.to_string(),
        message: e.to_string(),
    })?;

    let doc = Html::parse_document(html);
    let matches = doc
        .select(&parsed)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .collect();
    Ok(matches)
}
