//! Virtual document scrolling.
//!
//! Input events only move the raw offset and mark the tracker dirty; the
//! normalized progress is recomputed at most once per frame in [`ScrollTracker::sample`].

use serde::{Deserialize, Serialize};

use super::observable::{observable, Publisher, Watch};

/// Normalized scroll progress in [0, 1].
/// A document that does not scroll (`scrollable <= 0`) is always at 0.
pub fn scroll_progress(offset: f32, scrollable: f32) -> f32 {
    if scrollable.is_nan() || scrollable <= 0.0 || !offset.is_finite() {
        return 0.0;
    }
    (offset / scrollable).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollSettings {
    /// Document height in viewport heights
    pub pages: f32,
    /// Pixels moved per wheel line or arrow key
    pub line_height: f32,
}

impl Default for ScrollSettings {
    fn default() -> Self {
        Self {
            pages: 3.0,
            line_height: 48.0,
        }
    }
}

/// Snapshot published to readers once per frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollSample {
    pub offset: f32,
    pub progress: f32,
    pub viewport_height: f32,
}

/// Keyboard scroll commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollKey {
    LineUp,
    LineDown,
    PageUp,
    PageDown,
    Home,
    End,
}

#[derive(Debug)]
pub struct ScrollTracker {
    settings: ScrollSettings,
    offset: f32,
    viewport_height: f32,
    /// Progress held while the viewport is collapsed to zero height
    held_progress: Option<f32>,
    dirty: bool,
    publisher: Publisher<ScrollSample>,
}

impl ScrollTracker {
    pub fn new(settings: ScrollSettings, viewport_height: f32) -> Self {
        let (publisher, _) = observable(ScrollSample {
            offset: 0.0,
            progress: 0.0,
            viewport_height: viewport_height.max(0.0),
        });
        Self {
            settings,
            offset: 0.0,
            viewport_height: viewport_height.max(0.0),
            held_progress: None,
            dirty: true,
            publisher,
        }
    }

    /// Read-only handle on the latest published sample
    pub fn watch(&self) -> Watch<ScrollSample> {
        self.publisher.watch()
    }

    pub fn document_height(&self) -> f32 {
        self.settings.pages.max(0.0) * self.viewport_height
    }

    /// Document height minus viewport height; may be zero or negative
    pub fn scrollable_height(&self) -> f32 {
        self.document_height() - self.viewport_height
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn scroll_by(&mut self, delta: f32) {
        self.scroll_to(self.offset + delta);
    }

    pub fn scroll_to(&mut self, offset: f32) {
        let max = self.scrollable_height().max(0.0);
        let clamped = if offset.is_finite() { offset.clamp(0.0, max) } else { self.offset };
        if clamped != self.offset {
            self.offset = clamped;
            self.dirty = true;
        }
    }

    /// Wheel input in lines
    pub fn scroll_lines(&mut self, lines: f32) {
        self.scroll_by(lines * self.settings.line_height);
    }

    pub fn apply_key(&mut self, key: ScrollKey) {
        let line = self.settings.line_height;
        let page = self.viewport_height;
        match key {
            ScrollKey::LineUp => self.scroll_by(-line),
            ScrollKey::LineDown => self.scroll_by(line),
            ScrollKey::PageUp => self.scroll_by(-page),
            ScrollKey::PageDown => self.scroll_by(page),
            ScrollKey::Home => self.scroll_to(0.0),
            ScrollKey::End => self.scroll_to(f32::MAX),
        }
    }

    /// Keeps the same progress across a viewport change.
    /// A zero-height viewport (minimized window) holds the last progress
    /// until the next non-zero resize restores it.
    pub fn resize(&mut self, viewport_height: f32) {
        let viewport_height = if viewport_height.is_finite() { viewport_height.max(0.0) } else { 0.0 };
        if viewport_height == self.viewport_height {
            return;
        }
        let progress = self
            .held_progress
            .unwrap_or_else(|| scroll_progress(self.offset, self.scrollable_height()));
        self.viewport_height = viewport_height;
        if viewport_height == 0.0 {
            self.held_progress = Some(progress);
            self.offset = 0.0;
        } else {
            self.held_progress = None;
            self.offset = progress * self.scrollable_height().max(0.0);
        }
        self.dirty = true;
    }

    /// Recompute and publish if anything changed since the last frame
    pub fn sample(&mut self) -> ScrollSample {
        if self.dirty {
            self.dirty = false;
            self.publisher.publish(ScrollSample {
                offset: self.offset,
                progress: scroll_progress(self.offset, self.scrollable_height()),
                viewport_height: self.viewport_height,
            });
        }
        self.publisher.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker(height: f32) -> ScrollTracker {
        ScrollTracker::new(ScrollSettings::default(), height)
    }

    #[test]
    fn progress_guards_zero_range() {
        assert_eq!(scroll_progress(100.0, 0.0), 0.0);
        assert_eq!(scroll_progress(100.0, -5.0), 0.0);
        assert_eq!(scroll_progress(0.0, 0.0), 0.0);
        assert_eq!(scroll_progress(10.0, f32::NAN), 0.0);
    }

    #[test]
    fn progress_clamps_overscroll() {
        assert_eq!(scroll_progress(-20.0, 100.0), 0.0);
        assert_eq!(scroll_progress(250.0, 100.0), 1.0);
        assert_eq!(scroll_progress(50.0, 100.0), 0.5);
    }

    #[test]
    fn document_is_pages_tall() {
        let t = tracker(600.0);
        assert_eq!(t.document_height(), 1800.0);
        assert_eq!(t.scrollable_height(), 1200.0);
    }

    #[test]
    fn events_coalesce_into_one_publish() {
        let mut t = tracker(600.0);
        let watch = t.watch();
        t.sample();
        let before = watch.version();

        for _ in 0..20 {
            t.scroll_by(10.0);
        }
        assert_eq!(watch.version(), before, "nothing published until sampled");

        let sample = t.sample();
        assert_eq!(watch.version(), before + 1);
        assert_eq!(sample.offset, 200.0);
        assert!(!t.is_dirty());

        t.sample();
        assert_eq!(watch.version(), before + 1, "clean sample publishes nothing");
    }

    #[test]
    fn offset_stays_in_range() {
        let mut t = tracker(600.0);
        t.scroll_by(-50.0);
        assert_eq!(t.offset(), 0.0);
        t.apply_key(ScrollKey::End);
        assert_eq!(t.offset(), 1200.0);
        t.apply_key(ScrollKey::PageDown);
        assert_eq!(t.offset(), 1200.0);
        assert_eq!(t.sample().progress, 1.0);
    }

    #[test]
    fn resize_preserves_progress() {
        let mut t = tracker(600.0);
        t.scroll_to(600.0);
        assert_eq!(t.sample().progress, 0.5);

        t.resize(400.0);
        let sample = t.sample();
        assert_eq!(sample.offset, 400.0);
        assert_eq!(sample.progress, 0.5);
        assert_eq!(sample.viewport_height, 400.0);
    }

    #[test]
    fn collapsed_viewport_holds_progress() {
        let mut t = tracker(600.0);
        t.scroll_to(600.0);
        t.sample();

        t.resize(0.0);
        assert_eq!(t.sample().progress, 0.0);
        t.resize(0.0);

        t.resize(600.0);
        let sample = t.sample();
        assert_eq!(sample.offset, 600.0);
        assert_eq!(sample.progress, 0.5);
    }

    #[test]
    fn single_page_document_never_scrolls() {
        let settings = ScrollSettings {
            pages: 1.0,
            ..ScrollSettings::default()
        };
        let mut t = ScrollTracker::new(settings, 600.0);
        t.scroll_by(300.0);
        let sample = t.sample();
        assert_eq!(sample.offset, 0.0);
        assert_eq!(sample.progress, 0.0);
    }
}
