//! Viewer state: pagination, zoom, swipe gestures, and the PDF handle.
//!
//! [`ViewerState`] is a plain, serialisable state machine layered over an
//! immutable [`crate::model::Magazine`]. It owns nothing about rendering —
//! every UI (the bundled CLI reader, a GUI embedding, tests) drives it
//! through the named transitions and reads a [`ViewDescriptor`] back. The
//! descriptor implements `Eq`, so consumers re-render exactly when its value
//! changes and never act on a stale view.
//!
//! All transitions are total: out-of-range jumps, boundary page turns, and
//! sub-threshold swipes are silent no-ops, matching the reading experience
//! (buttons disable at boundaries; bad input reverts).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Minimum horizontal displacement, in device-independent pixels, for a
/// gesture to count as a page swipe.
pub const SWIPE_THRESHOLD_PX: f32 = 50.0;

/// Zoom bounds and step, in percent.
pub const ZOOM_MIN: u16 = 50;
pub const ZOOM_MAX: u16 = 400;
pub const ZOOM_STEP: u16 = 25;
/// Zoom restored when fit-to-width is engaged.
pub const ZOOM_BASELINE: u16 = 100;

/// The viewer's mutable state. Created once per loaded magazine and mutated
/// only through the transition methods below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerState {
    total_pages: usize,
    current_page: usize,
    zoom_percent: u16,
    fit_to_width: bool,
    /// X coordinate where the active gesture started, if any.
    touch_start_x: Option<f32>,
    /// Most recent X coordinate of the active gesture.
    touch_end_x: Option<f32>,
}

impl ViewerState {
    /// New state for a magazine with `total_pages` pages: page 1, baseline
    /// zoom, fit-to-width engaged (the initial reading view).
    pub fn new(total_pages: usize) -> Self {
        Self {
            total_pages,
            current_page: 1,
            zoom_percent: ZOOM_BASELINE,
            fit_to_width: true,
            touch_start_x: None,
            touch_end_x: None,
        }
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// Current page, 1-indexed.
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn zoom_percent(&self) -> u16 {
        self.zoom_percent
    }

    pub fn fit_to_width(&self) -> bool {
        self.fit_to_width
    }

    /// Whether the next-page affordance should be enabled.
    pub fn can_go_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// Whether the previous-page affordance should be enabled.
    pub fn can_go_prev(&self) -> bool {
        self.current_page > 1
    }

    /// Footer label, e.g. `"2 / 12"`.
    pub fn position_label(&self) -> String {
        format!("{} / {}", self.current_page, self.total_pages)
    }

    // ── Page transitions ─────────────────────────────────────────────────

    /// Advance one page; no-op on the last page.
    pub fn next_page(&mut self) {
        if self.can_go_next() {
            self.current_page += 1;
        }
    }

    /// Go back one page; no-op on the first page.
    pub fn prev_page(&mut self) {
        if self.can_go_prev() {
            self.current_page -= 1;
        }
    }

    /// Jump to page `n` if it is within `[1, total_pages]`; anything else is
    /// a silent no-op (the caller's input field reverts to the current page).
    pub fn jump_to_page(&mut self, n: usize) {
        if n >= 1 && n <= self.total_pages {
            self.current_page = n;
        } else {
            debug!("ignoring out-of-range page jump to {n}");
        }
    }

    // ── Zoom transitions ─────────────────────────────────────────────────

    /// Zoom in one step, leaving fit-to-width mode.
    pub fn zoom_in(&mut self) {
        self.fit_to_width = false;
        self.zoom_percent = (self.zoom_percent + ZOOM_STEP).min(ZOOM_MAX);
    }

    /// Zoom out one step, leaving fit-to-width mode.
    pub fn zoom_out(&mut self) {
        self.fit_to_width = false;
        self.zoom_percent = self.zoom_percent.saturating_sub(ZOOM_STEP).max(ZOOM_MIN);
    }

    /// Engage fit-to-width and reset the zoom display to its baseline, so a
    /// later manual zoom starts from 100%. Idempotent.
    pub fn fit_width(&mut self) {
        self.fit_to_width = true;
        self.zoom_percent = ZOOM_BASELINE;
    }

    // ── Swipe gesture ────────────────────────────────────────────────────

    /// Begin a gesture at horizontal position `x`.
    pub fn touch_start(&mut self, x: f32) {
        self.touch_end_x = None;
        self.touch_start_x = Some(x);
    }

    /// Update the gesture's current horizontal position.
    pub fn touch_move(&mut self, x: f32) {
        self.touch_end_x = Some(x);
    }

    /// Complete the gesture: a displacement past [`SWIPE_THRESHOLD_PX`]
    /// leftward advances a page, rightward goes back; anything else —
    /// including an aborted gesture that never moved — is ignored. Gesture
    /// state resets unconditionally.
    pub fn touch_end(&mut self) {
        if let (Some(start), Some(end)) = (self.touch_start_x, self.touch_end_x) {
            let distance = start - end;
            if distance > SWIPE_THRESHOLD_PX {
                self.next_page();
            } else if distance < -SWIPE_THRESHOLD_PX {
                self.prev_page();
            }
        }
        self.touch_start_x = None;
        self.touch_end_x = None;
    }

    // ── Derived view ─────────────────────────────────────────────────────

    /// The value handed to the embedding document viewer. Compare
    /// descriptors across transitions to decide when to re-render.
    pub fn view_descriptor(&self) -> ViewDescriptor {
        ViewDescriptor {
            page: self.current_page,
            mode: if self.fit_to_width {
                ViewMode::FitWidth
            } else {
                ViewMode::Zoom(self.zoom_percent)
            },
        }
    }
}

/// How the document viewer should scale the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewMode {
    FitWidth,
    /// Explicit zoom percentage in `[ZOOM_MIN, ZOOM_MAX]`.
    Zoom(u16),
}

/// Target page plus scaling mode for the embedded viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewDescriptor {
    pub page: usize,
    pub mode: ViewMode,
}

impl ViewDescriptor {
    /// PDF open-parameters fragment understood by platform viewers,
    /// e.g. `#page=3&zoom=150` or `#page=1&view=FitH`.
    pub fn open_parameters(&self) -> String {
        match self.mode {
            ViewMode::FitWidth => format!("#page={}&view=FitH", self.page),
            ViewMode::Zoom(z) => format!("#page={}&zoom={}", self.page, z),
        }
    }
}

// ── PDF handle ───────────────────────────────────────────────────────────

/// Scoped, revocable reference to the uploaded PDF binary.
///
/// Created exactly once per loaded file: the bytes are copied into a named
/// temporary file whose path can be handed to a platform PDF viewer together
/// with [`ViewDescriptor::open_parameters`]. Dropping the handle deletes the
/// file on every exit path — replacing the magazine, tearing down the
/// reader, or unwinding through an error all release the binary
/// deterministically.
pub struct PdfHandle {
    file: tempfile::NamedTempFile,
}

impl PdfHandle {
    /// Materialise the PDF bytes into a scoped temp file.
    pub fn new(bytes: &[u8]) -> std::io::Result<Self> {
        use std::io::Write;
        let mut file = tempfile::Builder::new()
            .prefix("pdf2mag-")
            .suffix(".pdf")
            .tempfile()?;
        file.write_all(bytes)?;
        file.flush()?;
        debug!("PDF handle created at {}", file.path().display());
        Ok(Self { file })
    }

    /// Path of the scoped copy, valid until the handle is dropped.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// `file://` URL with the viewer fragment for the given descriptor.
    pub fn viewer_url(&self, descriptor: &ViewDescriptor) -> String {
        format!(
            "file://{}{}",
            self.path().display(),
            descriptor.open_parameters()
        )
    }

    /// Path as an owned value, for display after the handle may be gone.
    pub fn path_buf(&self) -> PathBuf {
        self.file.path().to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_page_one_fit_width() {
        let s = ViewerState::new(12);
        assert_eq!(s.current_page(), 1);
        assert_eq!(s.zoom_percent(), 100);
        assert!(s.fit_to_width());
        assert!(!s.can_go_prev());
        assert!(s.can_go_next());
        assert_eq!(s.position_label(), "1 / 12");
    }

    #[test]
    fn page_turns_clamp_at_boundaries() {
        let mut s = ViewerState::new(3);
        s.prev_page();
        assert_eq!(s.current_page(), 1);
        s.next_page();
        s.next_page();
        assert_eq!(s.current_page(), 3);
        assert!(!s.can_go_next());
        s.next_page();
        assert_eq!(s.current_page(), 3);
    }

    #[test]
    fn jump_in_range_sets_exactly() {
        let mut s = ViewerState::new(10);
        for n in 1..=10 {
            s.jump_to_page(n);
            assert_eq!(s.current_page(), n);
        }
    }

    #[test]
    fn jump_out_of_range_is_noop() {
        let mut s = ViewerState::new(10);
        s.jump_to_page(4);
        for n in [0usize, 11, 9999, usize::MAX] {
            s.jump_to_page(n);
            assert_eq!(s.current_page(), 4, "jump_to_page({n}) must not move");
        }
    }

    #[test]
    fn zoom_round_trip_and_bounds() {
        let mut s = ViewerState::new(1);
        s.zoom_in();
        assert_eq!(s.zoom_percent(), 125);
        assert!(!s.fit_to_width());
        s.zoom_out();
        assert_eq!(s.zoom_percent(), 100);

        for _ in 0..50 {
            s.zoom_in();
        }
        assert_eq!(s.zoom_percent(), ZOOM_MAX);
        for _ in 0..50 {
            s.zoom_out();
        }
        assert_eq!(s.zoom_percent(), ZOOM_MIN);
    }

    #[test]
    fn fit_width_resets_baseline_and_is_idempotent() {
        let mut s = ViewerState::new(5);
        s.zoom_in();
        s.zoom_in();
        s.fit_width();
        assert!(s.fit_to_width());
        assert_eq!(s.zoom_percent(), ZOOM_BASELINE);
        let once = s.clone();
        s.fit_width();
        assert_eq!(s, once);
    }

    #[test]
    fn left_swipe_advances_once() {
        let mut s = ViewerState::new(3);
        s.touch_start(300.0);
        s.touch_move(200.0);
        s.touch_end();
        assert_eq!(s.current_page(), 2);
    }

    #[test]
    fn left_swipe_on_last_page_is_noop() {
        let mut s = ViewerState::new(3);
        s.jump_to_page(3);
        s.touch_start(300.0);
        s.touch_move(100.0);
        s.touch_end();
        assert_eq!(s.current_page(), 3);
    }

    #[test]
    fn right_swipe_goes_back() {
        let mut s = ViewerState::new(3);
        s.jump_to_page(2);
        s.touch_start(100.0);
        s.touch_move(250.0);
        s.touch_end();
        assert_eq!(s.current_page(), 1);
    }

    #[test]
    fn sub_threshold_swipe_ignored() {
        let mut s = ViewerState::new(3);
        s.touch_start(100.0);
        s.touch_move(60.0); // 40 px, under the 50 px threshold
        s.touch_end();
        assert_eq!(s.current_page(), 1);
    }

    #[test]
    fn aborted_gesture_resets_cleanly() {
        let mut s = ViewerState::new(3);
        s.touch_start(100.0);
        s.touch_end(); // never moved
        assert_eq!(s.current_page(), 1);

        // Gesture state must not leak into the next gesture.
        s.touch_move(500.0); // move without a start
        s.touch_end();
        assert_eq!(s.current_page(), 1);
    }

    #[test]
    fn descriptor_changes_with_every_constituent() {
        let mut s = ViewerState::new(5);
        let d0 = s.view_descriptor();
        assert_eq!(d0.open_parameters(), "#page=1&view=FitH");

        s.next_page();
        let d1 = s.view_descriptor();
        assert_ne!(d0, d1);

        s.zoom_in();
        let d2 = s.view_descriptor();
        assert_ne!(d1, d2);
        assert_eq!(d2.open_parameters(), "#page=2&zoom=125");

        s.fit_width();
        let d3 = s.view_descriptor();
        assert_ne!(d2, d3);

        // No transition, no identity change.
        assert_eq!(s.view_descriptor(), d3);
    }

    #[test]
    fn empty_magazine_pins_to_page_one() {
        let mut s = ViewerState::new(0);
        assert_eq!(s.current_page(), 1);
        s.next_page();
        s.prev_page();
        s.jump_to_page(1);
        assert_eq!(s.current_page(), 1);
        assert_eq!(s.position_label(), "1 / 0");
    }

    #[test]
    fn pdf_handle_releases_file_on_drop() {
        let handle = PdfHandle::new(b"%PDF-1.4 tiny").expect("create handle");
        let path = handle.path_buf();
        assert!(path.exists());
        assert!(handle
            .viewer_url(&ViewDescriptor {
                page: 2,
                mode: ViewMode::Zoom(150)
            })
            .ends_with("#page=2&zoom=150"));
        drop(handle);
        assert!(!path.exists(), "temp file must be removed on drop");
    }
}
