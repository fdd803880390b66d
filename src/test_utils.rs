// SPDX-License-Identifier: MPL-2.0
//! Test utilities for float comparisons and a scriptable fake element.
//!
//! This module re-exports the `approx` crate's assertion macros for float comparison,
//! which properly handle floating-point precision issues that `assert_eq!` cannot.
//!
//! [`FakeFactory`] creates [`FakeElement`]s whose state is shared with the
//! test through [`FakeElementHandle`], so tests can inspect the commands the
//! engine sent and inject native events in any order.

// Re-export approx macros for convenient use in tests
pub use approx::{assert_abs_diff_eq, assert_abs_diff_ne, assert_relative_eq, assert_relative_ne};

use crate::application::port::{
    ElementFactory, MediaElement, NativeEvent, NativeEventSink, PlayRejection, TimeRange,
};
use std::cell::RefCell;
use std::rc::Rc;

/// A command received by a fake element.
#[derive(Debug, Clone, PartialEq)]
pub enum FakeCommand {
    Load(String),
    Play,
    Pause,
    Seek(f64),
    Volume(f32),
    Muted(bool),
    Rate(f64),
    Release,
}

#[derive(Debug)]
struct FakeElementState {
    source: Option<String>,
    paused: bool,
    current_time: f64,
    duration: f64,
    volume: f32,
    muted: bool,
    rate: f64,
    buffered: Vec<TimeRange>,
    reject_play: Option<PlayRejection>,
    released: bool,
    commands: Vec<FakeCommand>,
}

impl Default for FakeElementState {
    fn default() -> Self {
        Self {
            source: None,
            paused: true,
            current_time: 0.0,
            duration: f64::NAN,
            volume: 1.0,
            muted: false,
            rate: 1.0,
            buffered: Vec::new(),
            reject_play: None,
            released: false,
            commands: Vec::new(),
        }
    }
}

/// Element that only records commands.
///
/// Mirrors the DOM where it matters to the engine: a successful `play()`
/// emits `play`, `pause()` emits `pause`.
pub struct FakeElement {
    state: Rc<RefCell<FakeElementState>>,
    sink: NativeEventSink,
}

impl MediaElement for FakeElement {
    fn load(&mut self, url: &str) {
        let mut state = self.state.borrow_mut();
        state.source = Some(url.to_string());
        state.paused = true;
        state.current_time = 0.0;
        state.duration = f64::NAN;
        state.commands.push(FakeCommand::Load(url.to_string()));
    }

    fn play(&mut self) -> Result<(), PlayRejection> {
        let mut state = self.state.borrow_mut();
        state.commands.push(FakeCommand::Play);
        if let Some(rejection) = state.reject_play.clone() {
            return Err(rejection);
        }
        if state.paused {
            state.paused = false;
            drop(state);
            self.sink.emit(NativeEvent::Play);
        }
        Ok(())
    }

    fn pause(&mut self) {
        let mut state = self.state.borrow_mut();
        state.commands.push(FakeCommand::Pause);
        if !state.paused {
            state.paused = true;
            drop(state);
            self.sink.emit(NativeEvent::Pause);
        }
    }

    fn paused(&self) -> bool {
        self.state.borrow().paused
    }

    fn current_time(&self) -> f64 {
        self.state.borrow().current_time
    }

    fn set_current_time(&mut self, secs: f64) {
        let mut state = self.state.borrow_mut();
        state.current_time = secs;
        state.commands.push(FakeCommand::Seek(secs));
    }

    fn duration(&self) -> f64 {
        self.state.borrow().duration
    }

    fn volume(&self) -> f32 {
        self.state.borrow().volume
    }

    fn set_volume(&mut self, volume: f32) {
        let mut state = self.state.borrow_mut();
        state.volume = volume;
        state.commands.push(FakeCommand::Volume(volume));
    }

    fn set_muted(&mut self, muted: bool) {
        let mut state = self.state.borrow_mut();
        state.muted = muted;
        state.commands.push(FakeCommand::Muted(muted));
    }

    fn playback_rate(&self) -> f64 {
        self.state.borrow().rate
    }

    fn set_playback_rate(&mut self, rate: f64) {
        let mut state = self.state.borrow_mut();
        state.rate = rate;
        state.commands.push(FakeCommand::Rate(rate));
    }

    fn buffered(&self) -> Vec<TimeRange> {
        self.state.borrow().buffered.clone()
    }

    fn release(&mut self) {
        let mut state = self.state.borrow_mut();
        state.released = true;
        state.paused = true;
        state.commands.push(FakeCommand::Release);
    }
}

/// Test-side view of one fake element.
#[derive(Clone)]
pub struct FakeElementHandle {
    state: Rc<RefCell<FakeElementState>>,
    sink: NativeEventSink,
}

impl FakeElementHandle {
    /// Emits a native event as the element would.
    pub fn emit(&self, event: NativeEvent) {
        self.sink.emit(event);
    }

    /// Sets the duration and emits `loadedmetadata`.
    pub fn load_metadata(&self, duration: f64) {
        self.set_duration(duration);
        self.emit(NativeEvent::LoadedMetadata);
    }

    /// Moves the playhead and emits `timeupdate`.
    pub fn advance_to(&self, secs: f64) {
        self.state.borrow_mut().current_time = secs;
        self.emit(NativeEvent::TimeUpdate);
    }

    /// Fails the current source with a `MediaError` code.
    pub fn fail(&self, code: u16, message: &str) {
        self.emit(NativeEvent::Error {
            code,
            message: message.to_string(),
        });
    }

    pub fn set_duration(&self, duration: f64) {
        self.state.borrow_mut().duration = duration;
    }

    pub fn set_buffered(&self, ranges: Vec<(f64, f64)>) {
        self.state.borrow_mut().buffered = ranges
            .into_iter()
            .map(|(start, end)| TimeRange::new(start, end))
            .collect();
    }

    pub fn reject_play(&self, rejection: Option<PlayRejection>) {
        self.state.borrow_mut().reject_play = rejection;
    }

    pub fn source(&self) -> Option<String> {
        self.state.borrow().source.clone()
    }

    pub fn current_time(&self) -> f64 {
        self.state.borrow().current_time
    }

    pub fn paused(&self) -> bool {
        self.state.borrow().paused
    }

    pub fn volume(&self) -> f32 {
        self.state.borrow().volume
    }

    pub fn muted(&self) -> bool {
        self.state.borrow().muted
    }

    pub fn playback_rate(&self) -> f64 {
        self.state.borrow().rate
    }

    pub fn released(&self) -> bool {
        self.state.borrow().released
    }

    pub fn commands(&self) -> Vec<FakeCommand> {
        self.state.borrow().commands.clone()
    }

    /// Number of recorded commands matching `command`.
    pub fn count(&self, command: &FakeCommand) -> usize {
        self.state
            .borrow()
            .commands
            .iter()
            .filter(|c| *c == command)
            .count()
    }

    /// Number of `set_current_time` calls.
    pub fn seek_count(&self) -> usize {
        self.state
            .borrow()
            .commands
            .iter()
            .filter(|c| matches!(c, FakeCommand::Seek(_)))
            .count()
    }
}

#[derive(Default)]
struct FakeRegistry {
    elements: Vec<FakeElementHandle>,
}

/// Shared view of everything a [`FakeFactory`] created.
#[derive(Clone)]
pub struct FakeHandle {
    registry: Rc<RefCell<FakeRegistry>>,
}

impl FakeHandle {
    /// Number of elements created so far.
    pub fn created(&self) -> usize {
        self.registry.borrow().elements.len()
    }

    /// The most recently created element.
    ///
    /// # Panics
    ///
    /// Panics if no element has been created.
    pub fn current(&self) -> FakeElementHandle {
        self.registry
            .borrow()
            .elements
            .last()
            .cloned()
            .expect("no element created yet")
    }
}

/// Factory producing [`FakeElement`]s.
pub struct FakeFactory {
    registry: Rc<RefCell<FakeRegistry>>,
}

impl FakeFactory {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(FakeRegistry::default())),
        }
    }

    pub fn handle(&self) -> FakeHandle {
        FakeHandle {
            registry: Rc::clone(&self.registry),
        }
    }
}

impl ElementFactory for FakeFactory {
    fn create(&mut self, sink: NativeEventSink) -> Box<dyn MediaElement> {
        let state = Rc::new(RefCell::new(FakeElementState::default()));
        self.registry.borrow_mut().elements.push(FakeElementHandle {
            state: Rc::clone(&state),
            sink: sink.clone(),
        });
        Box::new(FakeElement { state, sink })
    }
}
