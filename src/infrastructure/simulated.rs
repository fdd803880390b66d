// SPDX-License-Identifier: MPL-2.0
//! In-memory playable element driven by an explicit clock.
//!
//! [`SimulatedFactory`] creates [`SimulatedElement`]s that behave like a
//! browser media element without decoding anything: metadata arrives as
//! soon as a source is loaded, the download runs ahead of the playhead at a
//! fixed speed, and time only moves when [`SimulatedController::advance`]
//! is called.
//!
//! ```text
//! load(url) ──▶ loadedmetadata, canplay      (or error / nothing if stalled)
//! advance(dt) ──▶ progress, timeupdate        (waiting/playing on underrun)
//!              └▶ timeupdate, pause, ended    (at the end)
//! ```
//!
//! Scripts use the controller to mark sources as failing or stalled and to
//! emulate an autoplay policy.

use crate::application::port::{
    ElementFactory, MediaElement, NativeEvent, NativeEventSink, PlayRejection, TimeRange,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

/// Duration given to sources without an explicit profile.
pub const DEFAULT_MEDIA_DURATION_SECS: f64 = 60.0;

/// Media seconds downloaded per second of simulated time.
pub const DEFAULT_DOWNLOAD_SPEED: f64 = 20.0;

#[derive(Debug, Clone)]
enum SourceProfile {
    Playable { duration: f64 },
    Failing { code: u16, message: String },
    /// Never produces metadata.
    Stalled,
}

#[derive(Debug)]
struct World {
    default_duration: f64,
    download_speed: f64,
    autoplay_blocked: bool,
    profiles: HashMap<String, SourceProfile>,
    current: Option<Rc<RefCell<ElementState>>>,
    created: usize,
}

impl World {
    fn profile(&self, url: &str) -> SourceProfile {
        self.profiles
            .get(url)
            .cloned()
            .unwrap_or(SourceProfile::Playable {
                duration: self.default_duration,
            })
    }
}

#[derive(Debug)]
struct ElementState {
    sink: NativeEventSink,
    source: Option<String>,
    paused: bool,
    waiting: bool,
    time: f64,
    duration: f64,
    downloaded: f64,
    volume: f32,
    muted: bool,
    rate: f64,
    released: bool,
}

impl ElementState {
    fn new(sink: NativeEventSink) -> Self {
        Self {
            sink,
            source: None,
            paused: true,
            waiting: false,
            time: 0.0,
            duration: f64::NAN,
            downloaded: 0.0,
            volume: 1.0,
            muted: false,
            rate: 1.0,
            released: false,
        }
    }

    fn has_metadata(&self) -> bool {
        !self.duration.is_nan()
    }

    fn emit(&self, event: NativeEvent) {
        self.sink.emit(event);
    }

    /// Moves simulated time forward by `secs`.
    fn tick(&mut self, secs: f64, download_speed: f64) {
        if self.released || !self.has_metadata() || secs <= 0.0 {
            return;
        }

        if self.downloaded < self.duration {
            self.downloaded = (self.downloaded + secs * download_speed).min(self.duration);
            self.emit(NativeEvent::Progress);
        }

        if self.paused {
            return;
        }

        if self.waiting {
            if self.downloaded > self.time || self.downloaded >= self.duration {
                self.waiting = false;
                self.emit(NativeEvent::Playing);
            } else {
                return;
            }
        }

        let next = self.time + secs * self.rate;
        if next > self.downloaded && self.downloaded < self.duration {
            self.time = self.downloaded;
            self.waiting = true;
            self.emit(NativeEvent::TimeUpdate);
            self.emit(NativeEvent::Waiting);
            return;
        }

        if next >= self.duration {
            self.time = self.duration;
            self.paused = true;
            self.emit(NativeEvent::TimeUpdate);
            self.emit(NativeEvent::Pause);
            self.emit(NativeEvent::Ended);
            return;
        }

        self.time = next;
        self.emit(NativeEvent::TimeUpdate);
    }
}

/// A playable element backed by nothing but arithmetic.
#[derive(Debug)]
pub struct SimulatedElement {
    state: Rc<RefCell<ElementState>>,
    world: Rc<RefCell<World>>,
}

impl MediaElement for SimulatedElement {
    fn load(&mut self, url: &str) {
        let profile = self.world.borrow().profile(url);
        let mut state = self.state.borrow_mut();
        state.source = Some(url.to_string());
        state.paused = true;
        state.waiting = false;
        state.time = 0.0;
        state.duration = f64::NAN;
        state.downloaded = 0.0;

        match profile {
            SourceProfile::Playable { duration } => {
                state.duration = duration;
                state.emit(NativeEvent::LoadedMetadata);
                state.emit(NativeEvent::CanPlay);
            }
            SourceProfile::Failing { code, message } => {
                state.emit(NativeEvent::Error { code, message });
            }
            SourceProfile::Stalled => {
                log::debug!("Simulated source {url} stalls");
            }
        }
    }

    fn play(&mut self) -> Result<(), PlayRejection> {
        if self.world.borrow().autoplay_blocked {
            return Err(PlayRejection::NotAllowed);
        }
        let mut state = self.state.borrow_mut();
        if state.released || state.source.is_none() {
            return Err(PlayRejection::NotSupported("no source loaded".into()));
        }
        if state.has_metadata() && state.time >= state.duration {
            state.time = 0.0;
        }
        if state.paused {
            state.paused = false;
            state.emit(NativeEvent::Play);
            if state.has_metadata() {
                state.emit(NativeEvent::Playing);
            }
        }
        Ok(())
    }

    fn pause(&mut self) {
        let mut state = self.state.borrow_mut();
        if !state.paused {
            state.paused = true;
            state.emit(NativeEvent::Pause);
        }
    }

    fn paused(&self) -> bool {
        self.state.borrow().paused
    }

    fn current_time(&self) -> f64 {
        self.state.borrow().time
    }

    fn set_current_time(&mut self, secs: f64) {
        let mut state = self.state.borrow_mut();
        let upper = if state.has_metadata() {
            state.duration
        } else {
            f64::INFINITY
        };
        state.time = if secs.is_nan() { 0.0 } else { secs.clamp(0.0, upper) };
        if state.has_metadata() {
            state.emit(NativeEvent::TimeUpdate);
        }
    }

    fn duration(&self) -> f64 {
        self.state.borrow().duration
    }

    fn volume(&self) -> f32 {
        self.state.borrow().volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.state.borrow_mut().volume = volume;
    }

    fn set_muted(&mut self, muted: bool) {
        self.state.borrow_mut().muted = muted;
    }

    fn playback_rate(&self) -> f64 {
        self.state.borrow().rate
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.state.borrow_mut().rate = rate;
    }

    fn buffered(&self) -> Vec<TimeRange> {
        let state = self.state.borrow();
        if state.has_metadata() && state.downloaded > 0.0 {
            vec![TimeRange::new(0.0, state.downloaded)]
        } else {
            Vec::new()
        }
    }

    fn release(&mut self) {
        let mut state = self.state.borrow_mut();
        state.released = true;
        state.paused = true;
        state.source = None;
    }
}

/// Creates [`SimulatedElement`]s sharing one scripted world.
#[derive(Debug)]
pub struct SimulatedFactory {
    world: Rc<RefCell<World>>,
}

impl SimulatedFactory {
    pub fn new() -> Self {
        Self {
            world: Rc::new(RefCell::new(World {
                default_duration: DEFAULT_MEDIA_DURATION_SECS,
                download_speed: DEFAULT_DOWNLOAD_SPEED,
                autoplay_blocked: false,
                profiles: HashMap::new(),
                current: None,
                created: 0,
            })),
        }
    }

    /// Sets the duration of sources without an explicit profile.
    #[must_use]
    pub fn with_default_duration(self, secs: f64) -> Self {
        self.world.borrow_mut().default_duration = secs.max(0.0);
        self
    }

    /// Sets how many media seconds download per simulated second.
    #[must_use]
    pub fn with_download_speed(self, speed: f64) -> Self {
        self.world.borrow_mut().download_speed = speed.max(0.0);
        self
    }

    /// Returns a handle for scripting the elements this factory creates.
    pub fn controller(&self) -> SimulatedController {
        SimulatedController {
            world: Rc::clone(&self.world),
        }
    }
}

impl Default for SimulatedFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementFactory for SimulatedFactory {
    fn create(&mut self, sink: NativeEventSink) -> Box<dyn MediaElement> {
        let state = Rc::new(RefCell::new(ElementState::new(sink)));
        let mut world = self.world.borrow_mut();
        world.current = Some(Rc::clone(&state));
        world.created += 1;
        Box::new(SimulatedElement {
            state,
            world: Rc::clone(&self.world),
        })
    }
}

/// Script-side handle on a [`SimulatedFactory`].
#[derive(Debug, Clone)]
pub struct SimulatedController {
    world: Rc<RefCell<World>>,
}

impl SimulatedController {
    /// Advances the most recently created element by `dt`.
    pub fn advance(&self, dt: Duration) {
        let world = self.world.borrow();
        if let Some(current) = world.current.as_ref() {
            current
                .borrow_mut()
                .tick(dt.as_secs_f64(), world.download_speed);
        }
    }

    pub fn set_duration(&self, url: &str, secs: f64) {
        self.world.borrow_mut().profiles.insert(
            url.to_string(),
            SourceProfile::Playable {
                duration: secs.max(0.0),
            },
        );
    }

    /// Makes every later load of `url` fail with a `MediaError` code.
    pub fn fail_source(&self, url: &str, code: u16, message: &str) {
        self.world.borrow_mut().profiles.insert(
            url.to_string(),
            SourceProfile::Failing {
                code,
                message: message.to_string(),
            },
        );
    }

    /// Makes every later load of `url` hang before metadata.
    pub fn stall_source(&self, url: &str) {
        self.world
            .borrow_mut()
            .profiles
            .insert(url.to_string(), SourceProfile::Stalled);
    }

    /// Rejects `play()` as a browser autoplay policy would.
    pub fn block_autoplay(&self, blocked: bool) {
        self.world.borrow_mut().autoplay_blocked = blocked;
    }

    pub fn elements_created(&self) -> usize {
        self.world.borrow().created
    }

    /// Source of the live element, if any.
    pub fn current_source(&self) -> Option<String> {
        let world = self.world.borrow();
        let state = world.current.as_ref()?.borrow();
        state.source.clone()
    }

    /// Playhead of the live element, if any.
    pub fn current_time(&self) -> Option<f64> {
        let world = self.world.borrow();
        let state = world.current.as_ref()?.borrow();
        (!state.released).then_some(state.time)
    }

    /// Returns true if the live element is playing.
    pub fn is_playing(&self) -> bool {
        let world = self.world.borrow();
        world
            .current
            .as_ref()
            .is_some_and(|state| !state.borrow().paused)
    }
}
