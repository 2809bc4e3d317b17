//! # pdf2mag
//!
//! Turn a magazine PDF into a structured, paywall-aware digital edition
//! using Gemini's document understanding.
//!
//! ## Why this crate?
//!
//! Print magazines are the worst case for classic text extraction: multi-
//! column layouts, pull quotes, ads, and editorial pages interleave in ways
//! pdftotext mangles. Instead this crate sends the PDF itself to a
//! multimodal model with a strict structured-output schema and gets back the
//! layout as data — pages with a layout tag and a monetization status,
//! elements with column assignments and style hints, plus the free teaser
//! that goes in front of the paywall on premium articles.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    resolve local file or download from URL, check %PDF magic
//!  ├─ 2. Encode   raw bytes → base64 inline-data part
//!  ├─ 3. Gemini   one generateContent call with responseSchema
//!  └─ 4. Model    parse + shape-check into the Magazine graph
//! ```
//!
//! Reading the result is local and instant: [`ViewerState`] is the
//! pagination/zoom/swipe state machine, [`render`] turns pages into styled
//! text, and [`PdfHandle`] keeps a revocable copy of the original binary for
//! a platform PDF viewer.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2mag::{analyze, render, AnalysisConfig, ViewerState};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads GEMINI_API_KEY from the environment.
//!     let config = AnalysisConfig::default();
//!     let output = analyze("edition-june.pdf", &config).await?;
//!
//!     let mut state = ViewerState::new(output.magazine.page_count());
//!     println!("{}", render::render_current(&output.magazine, &state));
//!     state.next_page();
//!     println!("{}", render::render_current(&output.magazine, &state));
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2mag` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdf2mag = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analyze;
pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod prompts;
pub mod render;
pub mod viewer;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analyze::{
    analyze, analyze_from_bytes, analyze_sync, save_magazine_json, AnalysisOutput, AnalysisStats,
};
pub use config::{AnalysisConfig, AnalysisConfigBuilder};
pub use error::MagazineError;
pub use model::{Element, Magazine, MagazineMeta, Page};
pub use viewer::{PdfHandle, ViewDescriptor, ViewMode, ViewerState};
