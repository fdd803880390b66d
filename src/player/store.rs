// SPDX-License-Identifier: MPL-2.0
//! Playback store: the single source of truth for what is playing.
//!
//! Every surface reads [`PlaybackSnapshot`]s from [`PlaybackStore::subscribe`]
//! and calls the store's operations; nothing else mutates playback state.
//!
//! Operations return immediately. Their effect on the element is reported
//! back as native events, which are applied in receipt order by
//! [`PlaybackStore::run_until_idle`] or [`PlaybackStore::next_native_event`].
//! Where an operation guesses the outcome (e.g. `play()` moves to `Playing`
//! right away), the element's event is authoritative and corrects it.

use super::adapter::{MediaElementAdapter, MediaEvent};
use super::progress;
use super::snapshot::{PlaybackSnapshot, PlaybackState};
use super::switcher::{ModalitySwitcher, SwitchProgress, SwitchRequest, SwitchResult};
use crate::application::port::{ElementFactory, NativeEnvelope};
use crate::config::{EngineSettings, END_RESTART_TOLERANCE_SECS};
use crate::domain::playback::{ContentAtom, Modality, PlaybackRate, PlaybackStatus, Volume};
use crate::error::PlaybackError;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, watch};

/// State container composing the adapter, the switcher and progress math.
pub struct PlaybackStore {
    settings: EngineSettings,
    adapter: MediaElementAdapter,
    switcher: ModalitySwitcher,
    native_rx: mpsc::UnboundedReceiver<NativeEnvelope>,

    atom: Option<Arc<ContentAtom>>,
    state: PlaybackState,
    /// Start playback as soon as metadata arrives.
    play_when_ready: bool,
    /// Last position the element reported (or was told to seek to).
    reported_time: f64,

    snapshot_tx: watch::Sender<PlaybackSnapshot>,
}

impl PlaybackStore {
    /// Creates an idle store. Elements are created through `factory`.
    pub fn new(factory: Box<dyn ElementFactory>, settings: EngineSettings) -> Self {
        let (native_tx, native_rx) = mpsc::unbounded_channel();
        let mut adapter = MediaElementAdapter::new(factory, native_tx);
        adapter.set_volume(settings.volume);
        adapter.set_playback_rate(settings.playback_rate);

        let state = PlaybackState {
            volume: settings.volume,
            playback_rate: settings.playback_rate,
            ..PlaybackState::default()
        };
        let (snapshot_tx, _) =
            watch::channel(PlaybackSnapshot::new(None, state.clone(), None));

        Self {
            settings,
            adapter,
            switcher: ModalitySwitcher::new(settings.switch_timeout),
            native_rx,
            atom: None,
            state,
            play_when_ready: false,
            reported_time: 0.0,
            snapshot_tx,
        }
    }

    // =========================================================================
    // Read access
    // =========================================================================

    /// Subscribes to snapshots. The receiver sees the current one immediately.
    pub fn subscribe(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Builds a snapshot of the current state.
    pub fn snapshot(&self) -> PlaybackSnapshot {
        let switching_to = self
            .switcher
            .pending_target()
            .filter(|&target| target != self.state.modality);
        PlaybackSnapshot::new(self.atom.clone(), self.state.clone(), switching_to)
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn atom(&self) -> Option<&ContentAtom> {
        self.atom.as_deref()
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Returns true while a modality switch is in flight.
    pub fn is_switching(&self) -> bool {
        self.switcher.is_active()
    }

    /// Deadline of the in-flight switch, for callers driving their own loop.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.switcher.deadline()
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Starts playback of `atom`, replacing whatever was loaded.
    ///
    /// `initial_modality` is honoured if the atom has a source for it;
    /// otherwise video is preferred over audio. An atom without any source
    /// ends up in `Error` with the atom kept for display.
    ///
    /// Loading the atom that is already loaded in the same modality is a
    /// no-op unless the store is in `Error`.
    pub fn load(&mut self, atom: ContentAtom, initial_modality: Option<Modality>) {
        let modality = initial_modality
            .filter(|&m| atom.supports(m))
            .or_else(|| atom.preferred_modality());

        let unchanged = self.atom.as_deref() == Some(&atom)
            && modality == Some(self.state.modality)
            && !matches!(
                self.state.status,
                PlaybackStatus::Idle | PlaybackStatus::Error
            );
        if unchanged {
            log::debug!("load({}) ignored: already loaded", atom.id);
            return;
        }

        self.switcher.cancel();
        self.atom = Some(Arc::new(atom));
        self.state.is_visible = true;

        match modality {
            Some(modality) => self.begin_load(modality, self.settings.autoplay),
            None => {
                self.adapter.dispose();
                self.reset_position();
                self.state.is_playing = false;
                self.play_when_ready = false;
                let missing = initial_modality.unwrap_or(Modality::Watch);
                self.fail(PlaybackError::SourceMissing(missing));
            }
        }
        self.publish();
    }

    /// Reloads the current atom after an error.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::InvalidArgument`] unless the store is in
    /// `Error`, and [`PlaybackError::SourceMissing`] if the atom has no
    /// source at all.
    pub fn retry(&mut self) -> Result<(), PlaybackError> {
        if !self.state.status.is_error() {
            return Err(PlaybackError::InvalidArgument(format!(
                "retry is only possible after an error (status is {})",
                self.state.status
            )));
        }
        let Some(atom) = self.atom.clone() else {
            return Err(PlaybackError::InvalidArgument("nothing is loaded".into()));
        };
        let modality = if atom.supports(self.state.modality) {
            self.state.modality
        } else {
            atom.preferred_modality()
                .ok_or(PlaybackError::SourceMissing(self.state.modality))?
        };

        log::info!("Retrying {} ({})", atom.id, modality);
        self.switcher.cancel();
        self.begin_load(modality, self.settings.autoplay);
        self.publish();
        Ok(())
    }

    /// Tears down the element and hides the player.
    pub fn close(&mut self) {
        if let Some(atom) = self.atom.take() {
            log::info!("Closing {}", atom.id);
        }
        self.switcher.cancel();
        self.adapter.dispose();
        self.play_when_ready = false;
        self.reported_time = 0.0;
        self.state = PlaybackState {
            volume: self.state.volume,
            is_muted: self.state.is_muted,
            playback_rate: self.state.playback_rate,
            ..PlaybackState::default()
        };
        self.publish();
    }

    /// Loads the source of `modality` for the current atom, resetting the
    /// position and status.
    fn begin_load(&mut self, modality: Modality, play_when_ready: bool) {
        let Some(url) = self
            .atom
            .as_deref()
            .and_then(|atom| atom.source(modality))
            .map(str::to_string)
        else {
            return;
        };

        self.adapter.load_source(&url);
        self.state.modality = modality;
        self.state.status = PlaybackStatus::Loading;
        self.state.error_message = None;
        self.state.autoplay_blocked = false;
        self.state.is_playing = play_when_ready;
        self.play_when_ready = play_when_ready;
        self.reset_position();
    }

    fn reset_position(&mut self) {
        self.state.current_time = 0.0;
        self.state.duration = 0.0;
        self.state.buffered_percent = 0.0;
        self.reported_time = 0.0;
    }

    // =========================================================================
    // Transport
    // =========================================================================

    /// Starts or resumes playback.
    ///
    /// - Loading: playback starts once metadata arrives
    /// - Ended, or paused at the end: restarts from the beginning
    /// - Playing: no-op
    pub fn play(&mut self) {
        if self.atom.is_none() {
            log::debug!("play() ignored: nothing loaded");
            return;
        }

        if self.switcher.is_active() {
            self.switcher.set_resume_playing(true);
            self.state.is_playing = true;
            self.publish();
            return;
        }

        match self.state.status {
            PlaybackStatus::Idle | PlaybackStatus::Error => {
                log::debug!("play() ignored in {}", self.state.status);
                return;
            }
            PlaybackStatus::Loading => {
                self.play_when_ready = true;
                self.state.is_playing = true;
                self.publish();
                return;
            }
            PlaybackStatus::Playing | PlaybackStatus::Buffering if self.state.is_playing => {
                return;
            }
            _ => {}
        }

        let at_end = self.state.status == PlaybackStatus::Ended
            || (self.state.duration > 0.0
                && self.state.duration - self.state.current_time < END_RESTART_TOLERANCE_SECS);
        if at_end {
            log::debug!("Restarting from the beginning");
            self.state.current_time = 0.0;
            self.reported_time = 0.0;
            self.adapter.set_current_time(0.0);
        }

        self.state.is_playing = true;
        if self.state.status != PlaybackStatus::Buffering {
            self.state.status = PlaybackStatus::Playing;
        }
        self.adapter.play();
        self.publish();
    }

    /// Pauses playback. No-op unless playing or about to play.
    pub fn pause(&mut self) {
        if self.atom.is_none() {
            return;
        }

        if self.switcher.is_active() {
            self.switcher.set_resume_playing(false);
            self.state.is_playing = false;
            self.publish();
            return;
        }

        match self.state.status {
            PlaybackStatus::Loading => {
                self.play_when_ready = false;
                self.state.is_playing = false;
            }
            PlaybackStatus::Playing | PlaybackStatus::Buffering => {
                self.state.is_playing = false;
                self.state.status = PlaybackStatus::Paused;
                self.adapter.pause();
            }
            _ => return,
        }
        self.publish();
    }

    pub fn toggle_play_pause(&mut self) {
        if self.state.is_playing {
            self.pause();
        } else {
            self.play();
        }
    }

    // =========================================================================
    // Seeking
    // =========================================================================

    /// Moves the playhead to `time`, clamped to `[0, duration]`.
    ///
    /// The store's position changes immediately. The element is only told
    /// to seek when the target diverges from its own last reported position
    /// by more than the sync threshold.
    pub fn seek(&mut self, time: f64) {
        if self.atom.is_none() {
            return;
        }
        let target = progress::clamp_seek(time, self.state.duration);
        self.state.current_time = target;

        if self.switcher.is_active() {
            self.switcher.set_resume_time(target);
        } else if self.state.status.has_metadata()
            && progress::exceeds_sync_threshold(
                target,
                self.reported_time,
                self.settings.time_sync_threshold_secs,
            )
        {
            self.adapter.set_current_time(target);
            self.reported_time = target;
        }

        if self.state.status == PlaybackStatus::Ended && target < self.state.duration {
            self.state.status = PlaybackStatus::Paused;
        }
        self.publish();
    }

    /// Seeks by `delta_secs` from the current position.
    pub fn seek_relative(&mut self, delta_secs: f64) {
        let target =
            progress::relative_seek_target(self.state.current_time, delta_secs, self.state.duration);
        self.seek(target);
    }

    /// Seeks to a share (0–100) of the duration, as a scrubber does.
    pub fn seek_to_percent(&mut self, percent: f64) {
        self.seek(progress::time_from_percent(percent, self.state.duration));
    }

    pub fn skip_forward(&mut self) {
        self.seek_relative(self.settings.seek_step.value());
    }

    pub fn skip_backward(&mut self) {
        self.seek_relative(-self.settings.seek_step.value());
    }

    // =========================================================================
    // Volume and rate
    // =========================================================================

    /// Sets the volume, clamped to `[0, 1]`.
    pub fn set_volume(&mut self, volume: f32) {
        let volume = Volume::new(volume);
        if volume == self.state.volume {
            return;
        }
        self.state.volume = volume;
        self.adapter.set_volume(volume);
        self.publish();
    }

    pub fn volume_up(&mut self) {
        if self.state.volume.is_max() {
            log::debug!("Volume already at maximum");
            return;
        }
        self.set_volume(self.state.volume.increase().value());
    }

    pub fn volume_down(&mut self) {
        if self.state.volume.is_min() {
            log::debug!("Volume already at minimum");
            return;
        }
        self.set_volume(self.state.volume.decrease().value());
    }

    pub fn set_muted(&mut self, muted: bool) {
        if muted == self.state.is_muted {
            return;
        }
        self.state.is_muted = muted;
        self.adapter.set_muted(muted);
        self.publish();
    }

    pub fn toggle_mute(&mut self) {
        self.set_muted(!self.state.is_muted);
    }

    /// Sets the playback rate.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::InvalidArgument`] if `rate` is not one of
    /// the presets; the current rate is kept.
    pub fn set_playback_rate(&mut self, rate: f64) -> Result<(), PlaybackError> {
        let rate = PlaybackRate::try_new(rate).inspect_err(|err| log::warn!("{err}"))?;
        self.apply_rate(rate);
        Ok(())
    }

    /// Moves to the next faster preset; a no-op at the fastest one.
    pub fn cycle_playback_rate_up(&mut self) {
        if self.state.playback_rate.is_max() {
            log::debug!("Playback rate already at maximum");
            return;
        }
        self.apply_rate(self.state.playback_rate.increase());
    }

    pub fn cycle_playback_rate_down(&mut self) {
        if self.state.playback_rate.is_min() {
            log::debug!("Playback rate already at minimum");
            return;
        }
        self.apply_rate(self.state.playback_rate.decrease());
    }

    fn apply_rate(&mut self, rate: PlaybackRate) {
        if rate == self.state.playback_rate {
            return;
        }
        self.state.playback_rate = rate;
        self.adapter.set_playback_rate(rate);
        self.publish();
    }

    // =========================================================================
    // Modality and UI flags
    // =========================================================================

    /// Switches between the video and audio source of the current atom,
    /// keeping the position and the play/pause intent.
    ///
    /// `state.modality` changes only once the new source is live.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::SourceMissing`] if the atom has no source
    /// for `target`, or [`PlaybackError::InvalidArgument`] if nothing is
    /// loaded. State is left untouched in both cases.
    pub fn switch_modality(&mut self, target: Modality) -> Result<(), PlaybackError> {
        let Some(atom) = self.atom.clone() else {
            return Err(PlaybackError::InvalidArgument("nothing is loaded".into()));
        };
        if !atom.supports(target) {
            let err = PlaybackError::SourceMissing(target);
            log::warn!("switch_modality rejected: {err}");
            return Err(err);
        }

        // Nothing to preserve yet: load the target directly
        if !self.switcher.is_active() && !self.state.status.has_metadata() {
            if target != self.state.modality || self.state.status == PlaybackStatus::Error {
                log::info!("Loading {} directly in {}", atom.id, target);
                let intent = self.play_when_ready || self.settings.autoplay;
                self.begin_load(target, intent);
                self.publish();
            }
            return Ok(());
        }

        let outcome = self.switcher.request(
            target,
            self.state.modality,
            &atom,
            self.state.current_time,
            self.state.is_playing,
            &mut self.adapter,
            Instant::now(),
        )?;
        if outcome == SwitchRequest::Started {
            self.reported_time = 0.0;
        }
        if outcome != SwitchRequest::Ignored {
            self.publish();
        }
        Ok(())
    }

    /// Toggles the compact presentation. No media side effect.
    pub fn set_is_minimized(&mut self, minimized: bool) {
        if self.state.is_minimized != minimized {
            self.state.is_minimized = minimized;
            self.publish();
        }
    }

    // =========================================================================
    // Event application
    // =========================================================================

    /// Applies every native event already queued. Returns how many were read.
    pub fn run_until_idle(&mut self) -> usize {
        let mut count = 0;
        while let Ok(envelope) = self.native_rx.try_recv() {
            self.handle_native(envelope);
            count += 1;
        }
        if count > 0 {
            self.publish();
        }
        count
    }

    /// Waits for the next native event or the switch deadline and applies it.
    ///
    /// Returns false if no element can report events any more.
    pub async fn next_native_event(&mut self) -> bool {
        let deadline = self.switcher.deadline();
        let wake = tokio::select! {
            envelope = self.native_rx.recv() => Wake::Native(envelope),
            expired = sleep_until(deadline) => Wake::Deadline(expired),
        };
        match wake {
            Wake::Native(Some(envelope)) => {
                self.handle_native(envelope);
                self.publish();
                true
            }
            Wake::Native(None) => false,
            Wake::Deadline(expired) => {
                self.poll_timeouts(expired);
                true
            }
        }
    }

    /// Fails an in-flight switch whose metadata wait expired at `now`.
    pub fn poll_timeouts(&mut self, now: Instant) {
        let Some(atom) = self.atom.clone() else {
            return;
        };
        let progress = self.switcher.poll_timeout(now, &atom, &mut self.adapter);
        if progress != SwitchProgress::Pending {
            log::warn!("Switch timed out");
            self.apply_switch_progress(progress);
            self.publish();
        }
    }

    fn handle_native(&mut self, envelope: NativeEnvelope) {
        let session = envelope.session;
        for event in self.adapter.normalize(envelope) {
            // A handler may have replaced the element
            if self.adapter.session() != Some(session) {
                break;
            }
            self.apply_media_event(event);
        }
    }

    fn apply_media_event(&mut self, event: MediaEvent) {
        if self.switcher.is_active() {
            self.apply_switch_event(event);
            return;
        }
        if matches!(self.state.status, PlaybackStatus::Idle | PlaybackStatus::Error) {
            log::debug!("{event:?} ignored in {}", self.state.status);
            return;
        }

        match event {
            MediaEvent::TimeUpdate(time) => {
                self.reported_time = time;
                self.state.current_time = progress::clamp_seek(time, self.state.duration);
            }
            MediaEvent::DurationKnown(duration) => self.on_duration_known(duration),
            MediaEvent::BufferingStarted => {
                if self.state.status == PlaybackStatus::Playing {
                    self.state.status = PlaybackStatus::Buffering;
                }
            }
            MediaEvent::BufferingEnded => {
                if self.state.status == PlaybackStatus::Buffering {
                    self.state.status = if self.state.is_playing {
                        PlaybackStatus::Playing
                    } else {
                        PlaybackStatus::Paused
                    };
                }
            }
            MediaEvent::BufferedProgress(percent) => {
                self.state.buffered_percent =
                    self.state.buffered_percent.max(percent.clamp(0.0, 100.0));
            }
            MediaEvent::Ended => {
                self.state.status = PlaybackStatus::Ended;
                self.state.is_playing = false;
                self.state.current_time = self.state.duration;
                self.play_when_ready = false;
            }
            MediaEvent::PlayStateChanged(true) => {
                self.state.is_playing = true;
                self.state.autoplay_blocked = false;
                if matches!(
                    self.state.status,
                    PlaybackStatus::Ready | PlaybackStatus::Paused | PlaybackStatus::Ended
                ) {
                    self.state.status = PlaybackStatus::Playing;
                }
            }
            MediaEvent::PlayStateChanged(false) => {
                self.state.is_playing = false;
                if matches!(
                    self.state.status,
                    PlaybackStatus::Playing | PlaybackStatus::Buffering
                ) {
                    self.state.status = PlaybackStatus::Paused;
                }
            }
            MediaEvent::Error(err) if err.is_recoverable() => self.on_autoplay_blocked(),
            MediaEvent::Error(err) => self.fail(err),
        }
    }

    fn on_duration_known(&mut self, duration: f64) {
        self.state.duration = duration;
        self.state.current_time = progress::clamp_seek(self.state.current_time, duration);
        if self.state.status != PlaybackStatus::Loading {
            return;
        }

        log::info!("Ready: {:.2}s", duration);
        self.state.status = PlaybackStatus::Ready;
        if std::mem::take(&mut self.play_when_ready) {
            self.state.is_playing = true;
            self.state.status = PlaybackStatus::Playing;
            self.adapter.play();
        } else {
            self.state.is_playing = false;
        }
    }

    fn on_autoplay_blocked(&mut self) {
        log::warn!("Playback blocked until a user gesture");
        self.state.autoplay_blocked = true;
        self.state.is_playing = false;
        self.play_when_ready = false;
        if self.state.status.has_metadata() && self.state.status != PlaybackStatus::Ended {
            self.state.status = PlaybackStatus::Paused;
        }
    }

    /// Moves to `Error`, keeping the atom so the UI can offer a retry.
    fn fail(&mut self, err: PlaybackError) {
        log::error!("Playback failed: {err}");
        self.state.status = PlaybackStatus::Error;
        self.state.error_message = Some(err.user_message());
        self.state.is_playing = false;
        self.play_when_ready = false;
    }

    // =========================================================================
    // Switch handling
    // =========================================================================

    /// While a switch is in flight only metadata and failures matter: the
    /// element being loaded is not the one the state describes yet.
    fn apply_switch_event(&mut self, event: MediaEvent) {
        let Some(atom) = self.atom.clone() else {
            return;
        };
        let progress = match event {
            MediaEvent::DurationKnown(duration) => {
                self.switcher
                    .on_duration_known(duration, &atom, &mut self.adapter, Instant::now())
            }
            MediaEvent::Error(err) if err.is_media_failure() => {
                self.switcher.on_error(err, &atom, &mut self.adapter, Instant::now())
            }
            other => {
                log::trace!("{other:?} ignored during switch");
                return;
            }
        };
        self.apply_switch_progress(progress);
    }

    fn apply_switch_progress(&mut self, progress: SwitchProgress) {
        match progress {
            SwitchProgress::Pending => {}
            SwitchProgress::Completed(result) => {
                log::info!("Switched to {} at {:.2}s", result.modality, result.resume_time);
                self.commit_switch(result);
            }
            SwitchProgress::Reverting(err) => {
                self.state.status = PlaybackStatus::Error;
                self.state.error_message = Some(err.user_message());
            }
            SwitchProgress::Reverted(result) => {
                log::info!("Restored {} at {:.2}s", result.modality, result.resume_time);
                self.commit_switch(result);
            }
            SwitchProgress::Failed(err) => self.fail(err),
        }
    }

    fn commit_switch(&mut self, result: SwitchResult) {
        self.state.modality = result.modality;
        self.state.duration = result.duration;
        self.state.current_time = result.resume_time;
        // Progress seen while the switch was in flight belongs to the new element
        self.state.buffered_percent = self.adapter.buffered_percent();
        self.state.is_playing = result.playing;
        self.state.status = if result.playing {
            PlaybackStatus::Playing
        } else {
            PlaybackStatus::Paused
        };
        self.state.error_message = None;
        self.reported_time = result.resume_time;
    }

    /// Broadcasts the current snapshot if it changed.
    fn publish(&self) {
        let snapshot = self.snapshot();
        self.snapshot_tx.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }
}

impl std::fmt::Debug for PlaybackStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackStore")
            .field("atom", &self.atom.as_ref().map(|a| a.id.as_str()))
            .field("state", &self.state)
            .field("switcher", &self.switcher)
            .field("adapter", &self.adapter)
            .finish()
    }
}

enum Wake {
    Native(Option<NativeEnvelope>),
    Deadline(Instant),
}

/// Resolves at `deadline`, or never if there is none.
async fn sleep_until(deadline: Option<Instant>) -> Instant {
    match deadline {
        Some(deadline) => {
            tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;
            deadline
        }
        None => std::future::pending().await,
    }
}
