//! Text item normalisation: raw decoder items → [`PositionedFragment`]s.
//!
//! A decoder reports each text run as a string plus the affine transform
//! that places its baseline on the page. Only the translation part matters
//! here; rotation and scale are ignored because tables in financial
//! statements are upright.

use crate::error::ExtractError;
use crate::output::PositionedFragment;
use serde::{Deserialize, Serialize};

/// One text run as delivered by a PDF decoder.
///
/// Mirrors the usual decoder shape (`str`, transform translation,
/// optional size), so JSON dumps from other tools deserialise directly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTextItem {
    /// String payload. `None` for marked-content and other non-text items.
    #[serde(default, alias = "str")]
    pub text: Option<String>,
    pub transform_x: f64,
    pub transform_y: f64,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

impl RawTextItem {
    /// A text item at baseline position `(x, y)` with unknown size.
    pub fn new(text: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            text: Some(text.into()),
            transform_x: x,
            transform_y: y,
            width: None,
            height: None,
        }
    }

    /// Attach a known width and height.
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Build from a full `[a, b, c, d, e, f]` transform; `(e, f)` is the
    /// translation.
    pub fn from_transform(
        text: Option<String>,
        transform: [f64; 6],
        width: Option<f64>,
        height: Option<f64>,
    ) -> Self {
        Self {
            text,
            transform_x: transform[4],
            transform_y: transform[5],
            width,
            height,
        }
    }
}

/// The text items of one page, in decoder order (not position order).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPage {
    pub items: Vec<RawTextItem>,
}

impl RawPage {
    pub fn new(items: Vec<RawTextItem>) -> Self {
        Self { items }
    }
}

/// Normalise one page's items into fragments.
///
/// Items without a string payload, or whose text is blank once invisible
/// characters are removed, are skipped. Non-finite coordinates mean the
/// decoder produced garbage for this page, which is reported as
/// [`ExtractError::MalformedPage`].
pub fn normalize_page(
    page_num: usize,
    page: &RawPage,
) -> Result<Vec<PositionedFragment>, ExtractError> {
    let mut fragments = Vec::with_capacity(page.items.len());

    for (i, item) in page.items.iter().enumerate() {
        let Some(raw) = item.text.as_deref() else {
            continue;
        };
        let text = remove_invisible_chars(raw);
        if text.trim().is_empty() {
            continue;
        }

        let width = item.width.unwrap_or(0.0);
        let height = item.height.unwrap_or(0.0);
        for (name, value) in [
            ("x", item.transform_x),
            ("y", item.transform_y),
            ("width", width),
            ("height", height),
        ] {
            if !value.is_finite() {
                return Err(ExtractError::MalformedPage {
                    page: page_num,
                    detail: format!("text item {i} ({text:?}) has non-finite {name}: {value}"),
                });
            }
        }

        fragments.push(PositionedFragment {
            text,
            x: item.transform_x,
            y: item.transform_y,
            width,
            height,
            page: page_num,
        });
    }

    Ok(fragments)
}

/// Strip zero-width and soft-hyphen characters that PDF producers sprinkle
/// into text runs.
fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}
