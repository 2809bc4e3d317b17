//! The extracted magazine graph: `Magazine` → `Page` → `Element`.
//!
//! Field names on the wire are the Portuguese identifiers the upstream
//! extraction schema has always used (`meta_revista`, `paginas`,
//! `elementos`, …); the Rust side carries English names via serde renames so
//! both this crate and stored JSON stay compatible with the schema in
//! [`crate::prompts`].
//!
//! Everything is string-typed on purpose: the response schema declares every
//! leaf as text, and a model that writes `"coluna": "2ª"` should degrade to a
//! layout fallback, not a parse failure. The accessor methods below implement
//! those documented fallbacks; the raw strings stay available for display.
//!
//! A `Magazine` is created atomically from one extraction response and is
//! read-only for the rest of the session. A new upload replaces the whole
//! graph; there is no merging of extraction calls.

use crate::error::MagazineError;
use serde::{Deserialize, Serialize};
use tracing::error;

/// Monetization status string that engages the paywall affordance.
pub const PREMIUM_STATUS: &str = "premium_assinatura";

/// Root of the extraction result: magazine metadata plus ordered pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Magazine {
    #[serde(rename = "meta_revista")]
    pub meta: MagazineMeta,
    /// Ordered pages. Defaults to empty when the model omits the array.
    #[serde(rename = "paginas", default)]
    pub pages: Vec<Page>,
}

/// Magazine-level metadata identified by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MagazineMeta {
    #[serde(rename = "titulo")]
    pub title: String,
    /// Edition label, e.g. "Junho 2025".
    #[serde(rename = "edicao")]
    pub edition: String,
    #[serde(rename = "idioma")]
    pub language: String,
}

/// One magazine page with its layout tag, monetization status, and elements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// String-typed in the source data; used as both ordinal and display label.
    #[serde(rename = "numero_pagina")]
    pub page_number: String,
    /// Cover / index / editorial / article / ad tag, free text.
    #[serde(rename = "tipo_layout")]
    pub layout_type: String,
    /// "gratis" or "premium_assinatura" per the schema; tolerated as free text.
    #[serde(rename = "status_monetizacao")]
    pub monetization_status: String,
    #[serde(rename = "elementos", default)]
    pub elements: Vec<Element>,
}

impl Page {
    /// Whether this page is behind the paywall. Only the exact schema value
    /// counts; anything else renders as open content.
    pub fn is_premium(&self) -> bool {
        self.monetization_status == PREMIUM_STATUS
    }

    /// Human-readable monetization badge text (underscores become spaces).
    pub fn status_label(&self) -> String {
        self.monetization_status.replace('_', " ")
    }
}

/// One content element on a page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Element {
    /// Element-type tag: "Titulo Principal", "Subtítulo", "Parágrafo de
    /// Texto", "Imagem", "Anúncio". Unrecognised tags get the default style.
    #[serde(rename = "tipo")]
    pub kind: String,
    /// Body text; for images and ads this is the caption or description.
    /// Empty on premium elements that only exist behind the paywall.
    #[serde(rename = "texto", default)]
    pub text: String,
    /// Column assignment, "1"–"3" as a string.
    #[serde(rename = "coluna", default)]
    pub column_raw: String,
    /// Free-text position label, e.g. "Superior Central".
    #[serde(rename = "coordenadas_aproximadas", default)]
    pub approx_position: String,
    /// Free-text font hint, e.g. "Serif Negrito".
    #[serde(rename = "estilo_fonte", default)]
    pub font_style: String,
    /// Teaser shown before the paywall; populated only on the first text
    /// element of a premium page.
    #[serde(rename = "teaser_gratuito", default)]
    pub free_teaser: String,
    /// "1" for main titles, "2" for subtitles, "3" for body text.
    #[serde(rename = "nivel_hierarquico", default)]
    pub hierarchy_raw: String,
}

impl Element {
    /// Column index in 1..=3. Anything unparsable or out of range is treated
    /// as column 1 — a tolerant layout fallback, not an error.
    pub fn column(&self) -> usize {
        match self.column_raw.trim().parse::<usize>() {
            Ok(c) if (1..=3).contains(&c) => c,
            _ => 1,
        }
    }

    /// Advisory hierarchy level clamped to 1..=3; defaults to body level.
    pub fn hierarchy(&self) -> u8 {
        match self.hierarchy_raw.trim().parse::<u8>() {
            Ok(h) => h.clamp(1, 3),
            Err(_) => 3,
        }
    }

    /// True when a free teaser exists and must replace the body in rendering.
    pub fn has_teaser(&self) -> bool {
        !self.free_teaser.trim().is_empty()
    }
}

impl Magazine {
    /// Number of pages in display order.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Page by 1-indexed position (the viewer's `current_page`).
    pub fn page(&self, n: usize) -> Option<&Page> {
        if n == 0 {
            return None;
        }
        self.pages.get(n - 1)
    }

    /// Parse a model response body into a `Magazine`.
    ///
    /// This is the shape gate of the extraction flow: the model was asked for
    /// a strict schema but is not contractually bound to it, so both invalid
    /// JSON and shape violations map to
    /// [`MagazineError::InvalidModelOutput`]. The raw payload goes to the
    /// diagnostic log here and nowhere else.
    pub fn from_model_json(raw: &str) -> Result<Self, MagazineError> {
        serde_json::from_str::<Magazine>(raw).map_err(|e| {
            error!(payload = raw, "model output failed magazine parse: {e}");
            MagazineError::InvalidModelOutput {
                reason: e.to_string(),
            }
        })
    }
}
