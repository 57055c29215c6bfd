//! Explicit application state.
//!
//! All UI-visible state (viewport, popup, error banner) lives here and is
//! mutated only through the update operations below. Display widgets read
//! it; they never own it.

use std::time::{Duration, Instant};

/// Zoom span applied while following the position stream.
pub const TRACKING_SPAN_DEGREES: f64 = 75.0;

/// How long the error banner stays visible.
pub const BANNER_TIMEOUT: Duration = Duration::from_secs(3);

/// The visible map region: center plus zoom span in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub latitude: f64,
    pub longitude: f64,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl Viewport {
    pub fn new(latitude: f64, longitude: f64, span_degrees: f64) -> Self {
        Self {
            latitude,
            longitude,
            latitude_delta: span_degrees,
            longitude_delta: span_degrees,
        }
    }

    /// Tile zoom level equivalent to this span (zoom 0 shows the whole
    /// world, each level halves the visible span).
    pub fn zoom(&self) -> f64 {
        let span = self.longitude_delta.max(f64::EPSILON);
        (360.0 / span).log2().clamp(0.0, 19.0)
    }
}

/// Weather popup: visibility plus the last resolved place/temperature pair.
#[derive(Debug, Clone, Default)]
pub struct PopupState {
    visible: bool,
    place: Option<String>,
    temperature_c: Option<f64>,
}

impl PopupState {
    /// Show the popup with the given values. Reopening while open simply
    /// replaces the displayed values.
    pub fn open(&mut self, place: String, temperature_c: f64) {
        self.place = Some(place);
        self.temperature_c = Some(temperature_c);
        self.visible = true;
    }

    pub fn close(&mut self) {
        self.visible = false;
    }

    pub fn is_open(&self) -> bool {
        self.visible
    }

    pub fn place(&self) -> Option<&str> {
        self.place.as_deref()
    }

    pub fn temperature_c(&self) -> Option<f64> {
        self.temperature_c
    }
}

/// Transient failure banner with a fixed auto-dismiss deadline.
///
/// A new failure replaces the pending deadline rather than stacking a
/// second one, so a late first deadline can never hide a newer message
/// early.
#[derive(Debug, Clone, Default)]
pub struct ErrorBanner {
    deadline: Option<Instant>,
}

impl ErrorBanner {
    pub fn show(&mut self, now: Instant) {
        self.deadline = Some(now + BANNER_TIMEOUT);
    }

    pub fn is_visible(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now < deadline)
    }

    /// Drop an expired deadline. Call once per frame.
    pub fn tick(&mut self, now: Instant) {
        if self.deadline.is_some_and(|deadline| now >= deadline) {
            self.deadline = None;
        }
    }

    /// Time until auto-dismiss, if the banner is visible.
    pub fn time_remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .filter(|deadline| now < *deadline)
            .map(|deadline| deadline - now)
    }
}

/// Top-level application state, owned by the UI shell and passed down
/// read-only to display widgets.
#[derive(Debug, Clone)]
pub struct AppState {
    pub viewport: Viewport,
    pub popup: PopupState,
    pub banner: ErrorBanner,
    recenter_pending: bool,
    lookup_seq: u64,
}

impl AppState {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            popup: PopupState::default(),
            banner: ErrorBanner::default(),
            recenter_pending: false,
            lookup_seq: 0,
        }
    }

    /// Apply a position update: the viewport center becomes the reported
    /// coordinate exactly, at the fixed tracking span, and the map is asked
    /// to recenter.
    pub fn apply_position(&mut self, latitude: f64, longitude: f64) {
        self.viewport = Viewport::new(latitude, longitude, TRACKING_SPAN_DEGREES);
        self.recenter_pending = true;
    }

    /// Consume a pending recenter request, returning the target center.
    pub fn take_recenter(&mut self) -> Option<(f64, f64)> {
        if self.recenter_pending {
            self.recenter_pending = false;
            Some((self.viewport.latitude, self.viewport.longitude))
        } else {
            None
        }
    }

    /// Register a new lookup. Returns its sequence number; only the most
    /// recently issued lookup may apply its result.
    pub fn begin_lookup(&mut self) -> u64 {
        self.lookup_seq += 1;
        self.lookup_seq
    }

    /// Apply a finished lookup. Stale completions (an older sequence
    /// number) are discarded, so a slow response can never overwrite the
    /// result of a newer gesture.
    pub fn finish_lookup(&mut self, seq: u64, outcome: Option<(String, f64)>, now: Instant) {
        if seq != self.lookup_seq {
            tracing::debug!(seq, latest = self.lookup_seq, "discarding stale lookup result");
            return;
        }
        match outcome {
            Some((place, temperature_c)) => self.popup.open(place, temperature_c),
            None => self.banner.show(now),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn state() -> AppState {
        AppState::new(Viewport::new(40.0, -73.0, 20.0))
    }

    #[test]
    fn position_update_replaces_viewport_exactly_and_requests_recenter() {
        let mut state = state();
        state.apply_position(57.05, 9.92);

        assert_eq!(state.viewport.latitude, 57.05);
        assert_eq!(state.viewport.longitude, 9.92);
        assert_eq!(state.viewport.latitude_delta, TRACKING_SPAN_DEGREES);
        assert_eq!(state.take_recenter(), Some((57.05, 9.92)));
        // Consumed: a second take without a new update yields nothing.
        assert_eq!(state.take_recenter(), None);
    }

    #[test]
    fn successful_lookup_opens_popup_with_exact_values() {
        let mut state = state();
        let now = Instant::now();
        let seq = state.begin_lookup();
        state.finish_lookup(seq, Some(("Springfield".to_string(), 18.0)), now);

        assert!(state.popup.is_open());
        assert_eq!(state.popup.place(), Some("Springfield"));
        assert_eq!(state.popup.temperature_c(), Some(18.0));
        assert!(!state.banner.is_visible(now));
    }

    #[test]
    fn closing_popup_does_not_alter_viewport() {
        let mut state = state();
        let before = state.viewport;
        let now = Instant::now();
        let seq = state.begin_lookup();
        state.finish_lookup(seq, Some(("Springfield".to_string(), 18.0)), now);
        state.popup.close();

        assert!(!state.popup.is_open());
        assert_eq!(state.viewport, before);
    }

    #[test]
    fn reopening_popup_replaces_values() {
        let mut state = state();
        let now = Instant::now();
        let seq = state.begin_lookup();
        state.finish_lookup(seq, Some(("Springfield".to_string(), 18.0)), now);
        let seq = state.begin_lookup();
        state.finish_lookup(seq, Some(("Shelbyville".to_string(), -3.5)), now);

        assert!(state.popup.is_open());
        assert_eq!(state.popup.place(), Some("Shelbyville"));
        assert_eq!(state.popup.temperature_c(), Some(-3.5));
    }

    #[test]
    fn failed_lookup_shows_banner_until_timeout() {
        let mut state = state();
        let t0 = Instant::now();
        let seq = state.begin_lookup();
        state.finish_lookup(seq, None, t0);

        assert!(!state.popup.is_open());
        assert!(state.banner.is_visible(t0 + Duration::from_secs(2)));
        assert!(!state.banner.is_visible(t0 + Duration::from_secs(4)));
    }

    #[test]
    fn new_failure_restarts_banner_deadline() {
        let mut banner = ErrorBanner::default();
        let t0 = Instant::now();
        banner.show(t0);
        // A second failure two seconds in replaces the deadline.
        banner.show(t0 + Duration::from_secs(2));

        assert!(banner.is_visible(t0 + Duration::from_secs(4)));
        assert!(!banner.is_visible(t0 + Duration::from_secs(6)));
    }

    #[test]
    fn banner_tick_clears_expired_deadline() {
        let mut banner = ErrorBanner::default();
        let t0 = Instant::now();
        banner.show(t0);
        banner.tick(t0 + Duration::from_secs(4));
        assert_eq!(banner.time_remaining(t0 + Duration::from_secs(4)), None);
    }

    #[test]
    fn stale_lookup_result_is_discarded() {
        let mut state = state();
        let now = Instant::now();
        let first = state.begin_lookup();
        let second = state.begin_lookup();

        // The newer lookup resolves first.
        state.finish_lookup(second, Some(("Aalborg".to_string(), 12.0)), now);
        // The slow older one must not overwrite it, nor show a banner.
        state.finish_lookup(first, None, now);

        assert_eq!(state.popup.place(), Some("Aalborg"));
        assert!(!state.banner.is_visible(now));
    }

    #[test]
    fn viewport_zoom_matches_known_anchors() {
        assert_eq!(Viewport::new(0.0, 0.0, 360.0).zoom(), 0.0);
        assert_eq!(Viewport::new(0.0, 0.0, 90.0).zoom(), 2.0);

        // Narrower spans zoom further in.
        let wide = Viewport::new(0.0, 0.0, TRACKING_SPAN_DEGREES).zoom();
        let narrow = Viewport::new(0.0, 0.0, 20.0).zoom();
        assert!(narrow > wide);
    }
}
