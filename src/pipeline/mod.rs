//! Pipeline stages for PDF-magazine extraction.
//!
//! Each submodule implements exactly one transformation step, so every stage
//! is independently testable and the network-facing code stays isolated in
//! one place.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ encode ──▶ gemini
//! (URL/path) (base64)  (one generateContent call)
//! ```
//!
//! 1. [`input`]  — canonicalise the user-supplied path or URL to local PDF
//!    bytes, validating the `%PDF` magic
//! 2. [`encode`] — wrap the raw bytes as a base64 inline-data part for the
//!    multimodal request body
//! 3. [`gemini`] — issue the single structured-output call; the only stage
//!    with network I/O

pub mod encode;
pub mod gemini;
pub mod input;
