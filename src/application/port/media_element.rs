// SPDX-License-Identifier: MPL-2.0
//! Native playable element port definition.
//!
//! This module defines the [`MediaElement`] trait: the imperative surface of
//! a browser-style `<video>`/`<audio>` element. Backends implement it and
//! report readiness transitions as [`NativeEvent`]s.
//!
//! # Lifecycle
//!
//! 1. The adapter asks an [`ElementFactory`] for an element, handing it a
//!    [`NativeEventSink`] tagged with a fresh [`SessionId`]
//! 2. `load()` starts fetching a source; `LoadedMetadata` follows once the
//!    duration is known, or `Error` if the source cannot be used
//! 3. `play()`/`pause()`/`set_current_time()` drive playback; the element
//!    reports `Play`, `Pause`, `TimeUpdate`, `Waiting`, `Progress`, `Ended`
//! 4. `release()` detaches the source; the session is over and any event
//!    still queued for it is discarded by the adapter
//!
//! Native events carry no payload beyond error details: like the DOM, the
//! receiver reads the element's properties when it handles the event.

use tokio::sync::mpsc;

/// Identifies one element lifetime.
///
/// Every element created by the adapter gets a new id, so events emitted
/// by an element that has since been disposed can be recognised and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub(crate) u64);

impl SessionId {
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

/// A buffered time range in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    #[must_use]
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Returns true if `time` falls within this range (inclusive).
    #[must_use]
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time <= self.end
    }
}

/// Reason an element refused to start playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayRejection {
    /// The runtime requires a user gesture first (autoplay policy).
    NotAllowed,
    /// The source cannot be played.
    NotSupported(String),
    /// A later `pause()` or `load()` interrupted the pending play request.
    Aborted,
}

/// Raw events emitted by a playable element.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeEvent {
    /// The playhead moved (`timeupdate`).
    TimeUpdate,
    /// Duration and dimensions are known (`loadedmetadata`).
    LoadedMetadata,
    /// Enough data is available to start or resume (`canplay`).
    CanPlay,
    /// Playback stalled waiting for data (`waiting`).
    Waiting,
    /// Playback resumed after a stall or start (`playing`).
    Playing,
    /// More data was downloaded (`progress`).
    Progress,
    /// The playhead reached the end (`ended`).
    Ended,
    /// Playback started (`play`).
    Play,
    /// Playback paused (`pause`).
    Pause,
    /// A play request was rejected after the fact (rejected `play()` promise).
    PlayRejected(PlayRejection),
    /// Loading or decoding failed (`error`). `code` follows `MediaError.code`.
    Error { code: u16, message: String },
}

/// A native event tagged with the session of the element that emitted it.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeEnvelope {
    pub session: SessionId,
    pub event: NativeEvent,
}

/// Handle an element uses to report its events.
///
/// Cloneable so that backends can emit from callbacks. Emission never
/// blocks; events are queued in order and applied by the store.
#[derive(Debug, Clone)]
pub struct NativeEventSink {
    session: SessionId,
    tx: mpsc::UnboundedSender<NativeEnvelope>,
}

impl NativeEventSink {
    pub(crate) fn new(session: SessionId, tx: mpsc::UnboundedSender<NativeEnvelope>) -> Self {
        Self { session, tx }
    }

    /// The session this sink reports for.
    #[must_use]
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Queues an event. Returns false if the engine has shut down.
    pub fn emit(&self, event: NativeEvent) -> bool {
        self.tx
            .send(NativeEnvelope {
                session: self.session,
                event,
            })
            .is_ok()
    }
}

/// Port for a single playable element.
///
/// Property getters follow DOM semantics: `duration()` is `NaN` until
/// metadata is loaded.
pub trait MediaElement {
    /// Sets the source and starts loading it.
    fn load(&mut self, url: &str);

    /// Requests playback.
    ///
    /// # Errors
    ///
    /// Returns a [`PlayRejection`] if the element refuses immediately.
    /// Deferred refusals arrive as [`NativeEvent::PlayRejected`].
    fn play(&mut self) -> Result<(), PlayRejection>;

    fn pause(&mut self);

    /// Returns true if the element is paused.
    fn paused(&self) -> bool;

    fn current_time(&self) -> f64;

    fn set_current_time(&mut self, secs: f64);

    /// Returns the media duration, `NaN` while unknown.
    fn duration(&self) -> f64;

    fn volume(&self) -> f32;

    fn set_volume(&mut self, volume: f32);

    fn set_muted(&mut self, muted: bool);

    fn playback_rate(&self) -> f64;

    fn set_playback_rate(&mut self, rate: f64);

    /// Returns the buffered ranges, ordered by start time.
    fn buffered(&self) -> Vec<TimeRange>;

    /// Stops any network activity and detaches the source.
    fn release(&mut self);
}

/// Creates playable elements on demand.
pub trait ElementFactory {
    /// Creates a new element reporting through `sink`.
    fn create(&mut self, sink: NativeEventSink) -> Box<dyn MediaElement>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test that the traits are object-safe
    fn _assert_object_safe(_: &dyn MediaElement, _: &dyn ElementFactory) {}

    #[test]
    fn sink_tags_events_with_its_session() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = NativeEventSink::new(SessionId(7), tx);

        assert!(sink.emit(NativeEvent::TimeUpdate));
        let envelope = rx.try_recv().expect("event queued");
        assert_eq!(envelope.session, SessionId(7));
        assert_eq!(envelope.event, NativeEvent::TimeUpdate);
    }

    #[test]
    fn sink_reports_closed_engine() {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = NativeEventSink::new(SessionId(1), tx);
        drop(rx);

        assert!(!sink.emit(NativeEvent::Ended));
    }

    #[test]
    fn sink_preserves_emission_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = NativeEventSink::new(SessionId(1), tx);
        sink.emit(NativeEvent::Play);
        sink.emit(NativeEvent::TimeUpdate);
        sink.emit(NativeEvent::Pause);

        let order: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|e| e.event)
            .collect();
        assert_eq!(
            order,
            vec![NativeEvent::Play, NativeEvent::TimeUpdate, NativeEvent::Pause]
        );
    }

    #[test]
    fn time_range_contains_bounds() {
        let range = TimeRange::new(2.0, 5.0);
        assert!(range.contains(2.0));
        assert!(range.contains(5.0));
        assert!(!range.contains(5.1));
    }
}
