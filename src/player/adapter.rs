// SPDX-License-Identifier: MPL-2.0
//! Media element adapter.
//!
//! Owns exactly one playable element at a time and translates between the
//! engine and the element:
//!
//! - commands (`load_source`, `play`, `pause`, `set_current_time`, ...) are
//!   forwarded to the element
//! - raw [`NativeEvent`]s are normalized into [`MediaEvent`]s
//!
//! Every `load_source` disposes the previous element and creates a new one
//! under a fresh [`SessionId`]. Events still queued for an older session are
//! dropped, so a disposed element can never mutate engine state.

use super::progress;
use crate::application::port::{
    ElementFactory, MediaElement, NativeEnvelope, NativeEvent, NativeEventSink, PlayRejection,
    SessionId,
};
use crate::domain::playback::{PlaybackRate, Volume};
use crate::error::PlaybackError;
use tokio::sync::mpsc;

/// Normalized events delivered to the store.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// The element reported its playhead position.
    TimeUpdate(f64),
    /// Metadata loaded; carries the duration in seconds.
    DurationKnown(f64),
    BufferingStarted,
    BufferingEnded,
    /// Buffered share of the duration (0–100), never decreasing within a session.
    BufferedProgress(f64),
    Ended,
    Error(PlaybackError),
    /// The element started (`true`) or stopped (`false`) playing.
    PlayStateChanged(bool),
}

/// Bookkeeping for the element of the current session.
#[derive(Debug, Default)]
struct LoadCycle {
    buffering: bool,
    duration_known: bool,
    buffered_high_water: f64,
}

/// Adapter between the engine and one playable element.
pub struct MediaElementAdapter {
    factory: Box<dyn ElementFactory>,
    native_tx: mpsc::UnboundedSender<NativeEnvelope>,

    element: Option<Box<dyn MediaElement>>,
    session: Option<SessionId>,
    next_session: u64,
    source: Option<String>,
    cycle: LoadCycle,

    /// Settings re-applied to every new element.
    volume: Volume,
    muted: bool,
    rate: PlaybackRate,
}

impl MediaElementAdapter {
    /// Creates an adapter with no element attached.
    ///
    /// Elements created later report through `native_tx`.
    pub fn new(
        factory: Box<dyn ElementFactory>,
        native_tx: mpsc::UnboundedSender<NativeEnvelope>,
    ) -> Self {
        Self {
            factory,
            native_tx,
            element: None,
            session: None,
            next_session: 1,
            source: None,
            cycle: LoadCycle::default(),
            volume: Volume::default(),
            muted: false,
            rate: PlaybackRate::default(),
        }
    }

    /// Returns the session of the attached element.
    pub fn session(&self) -> Option<SessionId> {
        self.session
    }

    /// Returns the URL currently loaded.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Highest buffered percentage seen for the current session.
    pub fn buffered_percent(&self) -> f64 {
        self.cycle.buffered_high_water
    }

    /// Loads `url` into a new element, replacing the current one.
    ///
    /// Volume, mute state and playback rate carry over.
    pub fn load_source(&mut self, url: &str) -> SessionId {
        self.dispose();

        let session = SessionId(self.next_session);
        self.next_session += 1;

        let sink = NativeEventSink::new(session, self.native_tx.clone());
        let mut element = self.factory.create(sink);
        element.set_volume(self.volume.value());
        element.set_muted(self.muted);
        element.set_playback_rate(self.rate.value());
        element.load(url);

        log::info!("Loading {} (session {})", url, session.value());

        self.element = Some(element);
        self.session = Some(session);
        self.source = Some(url.to_string());
        self.cycle = LoadCycle::default();
        session
    }

    /// Requests playback. A refusal is reported as an event.
    pub fn play(&mut self) {
        let (Some(element), Some(session)) = (self.element.as_mut(), self.session) else {
            log::debug!("play() ignored: no element attached");
            return;
        };
        log::debug!("play (session {})", session.value());
        if let Err(rejection) = element.play() {
            let sink = NativeEventSink::new(session, self.native_tx.clone());
            sink.emit(NativeEvent::PlayRejected(rejection));
        }
    }

    pub fn pause(&mut self) {
        if let Some(element) = self.element.as_mut() {
            if !element.paused() {
                log::debug!("pause");
                element.pause();
            }
        }
    }

    pub fn set_current_time(&mut self, secs: f64) {
        if let Some(element) = self.element.as_mut() {
            log::debug!("set_current_time({secs:.3})");
            element.set_current_time(secs);
        }
    }

    pub fn set_volume(&mut self, volume: Volume) {
        self.volume = volume;
        if let Some(element) = self.element.as_mut() {
            element.set_volume(volume.value());
        }
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if let Some(element) = self.element.as_mut() {
            element.set_muted(muted);
        }
    }

    pub fn set_playback_rate(&mut self, rate: PlaybackRate) {
        self.rate = rate;
        if let Some(element) = self.element.as_mut() {
            element.set_playback_rate(rate.value());
        }
    }

    /// Releases the element. Queued events of its session are dropped.
    pub fn dispose(&mut self) {
        if let Some(mut element) = self.element.take() {
            element.release();
            if let Some(session) = self.session {
                log::debug!("Disposed element (session {})", session.value());
            }
        }
        self.session = None;
        self.source = None;
        self.cycle = LoadCycle::default();
    }

    /// Normalizes a native event.
    ///
    /// Returns no events if the envelope belongs to a disposed element.
    pub fn normalize(&mut self, envelope: NativeEnvelope) -> Vec<MediaEvent> {
        if self.session != Some(envelope.session) {
            log::debug!(
                "Dropping {:?} from stale session {}",
                envelope.event,
                envelope.session.value()
            );
            return Vec::new();
        }
        let Some(element) = self.element.as_ref() else {
            return Vec::new();
        };

        let mut events = Vec::with_capacity(2);
        match envelope.event {
            NativeEvent::TimeUpdate => {
                events.push(MediaEvent::TimeUpdate(element.current_time()));
            }
            NativeEvent::LoadedMetadata => {
                if let Some(duration) = Self::take_duration(&mut self.cycle, element.as_ref()) {
                    events.push(MediaEvent::DurationKnown(duration));
                }
            }
            NativeEvent::CanPlay => {
                // Some backends skip loadedmetadata
                if let Some(duration) = Self::take_duration(&mut self.cycle, element.as_ref()) {
                    events.push(MediaEvent::DurationKnown(duration));
                }
                if std::mem::take(&mut self.cycle.buffering) {
                    events.push(MediaEvent::BufferingEnded);
                }
            }
            NativeEvent::Playing => {
                if std::mem::take(&mut self.cycle.buffering) {
                    events.push(MediaEvent::BufferingEnded);
                }
            }
            NativeEvent::Waiting => {
                if !self.cycle.buffering {
                    self.cycle.buffering = true;
                    events.push(MediaEvent::BufferingStarted);
                }
            }
            NativeEvent::Progress => {
                let percent =
                    progress::buffered_percent_from_ranges(&element.buffered(), element.duration());
                if percent > self.cycle.buffered_high_water {
                    self.cycle.buffered_high_water = percent;
                    events.push(MediaEvent::BufferedProgress(percent));
                }
            }
            NativeEvent::Ended => {
                self.cycle.buffering = false;
                events.push(MediaEvent::Ended);
            }
            NativeEvent::Play => {
                events.push(MediaEvent::PlayStateChanged(true));
            }
            NativeEvent::Pause => {
                if std::mem::take(&mut self.cycle.buffering) {
                    events.push(MediaEvent::BufferingEnded);
                }
                events.push(MediaEvent::PlayStateChanged(false));
            }
            NativeEvent::PlayRejected(rejection) => match rejection {
                PlayRejection::NotAllowed => {
                    events.push(MediaEvent::Error(PlaybackError::AutoplayBlocked));
                }
                PlayRejection::NotSupported(message) => {
                    events.push(MediaEvent::Error(PlaybackError::SourceNotSupported(message)));
                }
                PlayRejection::Aborted => {
                    log::debug!("Play request interrupted");
                }
            },
            NativeEvent::Error { code, message } => {
                events.push(MediaEvent::Error(PlaybackError::from_media_error(
                    code, &message,
                )));
            }
        }
        events
    }

    /// Reads the duration once per load cycle.
    fn take_duration(cycle: &mut LoadCycle, element: &dyn MediaElement) -> Option<f64> {
        if cycle.duration_known {
            return None;
        }
        let duration = element.duration();
        if duration.is_nan() {
            return None;
        }
        cycle.duration_known = true;
        // Unbounded streams have no seekable range
        Some(if duration.is_finite() { duration.max(0.0) } else { 0.0 })
    }
}

impl std::fmt::Debug for MediaElementAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaElementAdapter")
            .field("session", &self.session)
            .field("source", &self.source)
            .field("volume", &self.volume)
            .field("muted", &self.muted)
            .field("rate", &self.rate)
            .finish()
    }
}
