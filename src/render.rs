//! Presentation layer: magazine graph → readable text.
//!
//! The renderer produces plain text with light typographic markers; colour
//! and terminal dressing belong to the CLI, which wraps these strings. The
//! layout rules come straight from the reading experience:
//!
//! * elements are bucketed into a fixed three-column array, out-of-range
//!   assignments falling back to column 1 (see [`crate::model::Element::column`]);
//! * a page lays out as many columns as its highest occupied one, and empty
//!   columns inside that range render an explicit placeholder instead of
//!   collapsing;
//! * an element with a free teaser shows the teaser and an obscured paywall
//!   block — the raw body of paywalled content is never emitted.

use crate::model::{Element, Magazine, Page};
use crate::viewer::ViewerState;
use std::fmt::Write;

/// Style bucket selected purely from the element-type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementStyle {
    MainTitle,
    Subtitle,
    Paragraph,
    Image,
    Ad,
    Default,
}

impl ElementStyle {
    /// Fixed enumerated mapping; unrecognised tags get the default style.
    pub fn for_kind(kind: &str) -> Self {
        match kind {
            "Titulo Principal" => ElementStyle::MainTitle,
            "Subtítulo" => ElementStyle::Subtitle,
            "Parágrafo de Texto" => ElementStyle::Paragraph,
            "Imagem" => ElementStyle::Image,
            "Anúncio" => ElementStyle::Ad,
            _ => ElementStyle::Default,
        }
    }
}

/// Bucket a page's elements into the fixed 1..=3 column array.
///
/// Index 0 of the result is column 1. Elements with out-of-range or
/// unparsable column strings land in column 1 per the documented fallback.
pub fn bucket_columns(page: &Page) -> [Vec<&Element>; 3] {
    let mut buckets: [Vec<&Element>; 3] = [Vec::new(), Vec::new(), Vec::new()];
    for element in &page.elements {
        buckets[element.column() - 1].push(element);
    }
    buckets
}

/// Highest occupied column index for the page, at least 1.
pub fn max_column(page: &Page) -> usize {
    page.elements
        .iter()
        .map(|e| e.column())
        .max()
        .unwrap_or(1)
}

/// Render one element according to its style.
pub fn render_element(element: &Element) -> String {
    let mut out = String::new();
    let style = ElementStyle::for_kind(&element.kind);

    // Tag line: type and approximate position, mirroring the element card.
    let _ = writeln!(out, "[{}] {}", element.kind, element.approx_position);

    if element.has_teaser() {
        // Teaser first, then the paywall affordance. The raw body stays out.
        push_body(&mut out, style, &element.free_teaser);
        out.push_str(PAYWALL_BLOCK);
    } else {
        push_body(&mut out, style, &element.text);
    }
    out
}

/// Obscured placeholder standing in for paywalled body text.
const PAYWALL_BLOCK: &str = "\
░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░
░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░
   Premium content — subscribe to read
            the full article.
░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░
";

fn push_body(out: &mut String, style: ElementStyle, body: &str) {
    // Line breaks inside the body are preserved verbatim.
    match style {
        ElementStyle::MainTitle => {
            let _ = writeln!(out, "# {body}");
        }
        ElementStyle::Subtitle => {
            let _ = writeln!(out, "## {body}");
        }
        ElementStyle::Image => {
            let _ = writeln!(out, "(imagem) {body}");
        }
        ElementStyle::Ad => {
            let _ = writeln!(out, "(anúncio) {body}");
        }
        ElementStyle::Paragraph | ElementStyle::Default => {
            let _ = writeln!(out, "{body}");
        }
    }
}

/// Render one page: header with layout tag and monetization badge, then its
/// occupied column range with placeholders for empty columns.
pub fn render_page(page: &Page) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Page {} · {} · [{}]",
        page.page_number,
        page.layout_type,
        page.status_label().to_uppercase()
    );
    let _ = writeln!(out, "{}", "─".repeat(48));

    let buckets = bucket_columns(page);
    let columns = max_column(page);

    for (i, bucket) in buckets.iter().enumerate().take(columns) {
        let col = i + 1;
        if columns > 1 {
            let _ = writeln!(out, "── Column {col} ──");
        }
        if bucket.is_empty() {
            let _ = writeln!(out, "(empty column {col})");
        } else {
            for element in bucket {
                out.push_str(&render_element(element));
            }
        }
        out.push('\n');
    }
    out
}

/// Render the metadata header plus every page, in order.
pub fn render_magazine(magazine: &Magazine) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", magazine.meta.title);
    let _ = writeln!(
        out,
        "{} — {}",
        magazine.meta.edition, magazine.meta.language
    );
    let _ = writeln!(out, "{}", "═".repeat(48));
    out.push('\n');

    for page in &magazine.pages {
        out.push_str(&render_page(page));
        out.push('\n');
    }
    out
}

/// Render the page the viewer is currently on, with the reading footer.
///
/// The extracted-content pane of the reader loop: page body first, position
/// label underneath.
pub fn render_current(magazine: &Magazine, state: &ViewerState) -> String {
    let mut out = String::new();
    match magazine.page(state.current_page()) {
        Some(page) => out.push_str(&render_page(page)),
        None => {
            let _ = writeln!(out, "No content extracted for this page.");
        }
    }
    let _ = writeln!(out, "{}", "─".repeat(48));
    let _ = writeln!(out, "{}", state.position_label());
    out
}
