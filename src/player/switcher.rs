// SPDX-License-Identifier: MPL-2.0
//! Modality switching (watch ⇄ listen) for the current content atom.
//!
//! A switch runs as:
//!
//! 1. capture the play intent and resume position
//! 2. pause the element
//! 3. load the target source into a new element
//! 4. wait for the metadata of the new source (the only suspension point)
//! 5. seek to the resume position, clamped to the new duration
//! 6. resume playback if it was playing
//! 7. only then commit the new modality
//!
//! While a switch is in flight, at most one further request is queued; a
//! newer request replaces it. A queued request never aborts the load that
//! is already running: it is acted upon once that load resolves.
//!
//! If the target source fails (or its metadata does not arrive before the
//! deadline), the previous source is reloaded at the captured position.
//! Only a failure of that reload escalates.

use super::adapter::MediaElementAdapter;
use super::progress;
use crate::domain::playback::{ContentAtom, Modality};
use crate::error::PlaybackError;
use std::time::{Duration, Instant};

/// What a switch request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchRequest {
    /// Nothing to do: the target is already current or already in flight.
    Ignored,
    /// The target source is loading.
    Started,
    /// A switch is in flight; the target will be handled after it resolves.
    Queued,
}

/// Outcome of feeding an element event into an in-flight switch.
#[derive(Debug, Clone, PartialEq)]
pub enum SwitchProgress {
    /// Nothing observable changed.
    Pending,
    /// The target source is live: commit `modality`.
    Completed(SwitchResult),
    /// The target failed; the previous source is being reloaded.
    Reverting(PlaybackError),
    /// The previous source is live again: `modality` is unchanged.
    Reverted(SwitchResult),
    /// The target failed and the previous source could not be restored.
    Failed(PlaybackError),
}

/// Position and intent to apply once a source is live.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwitchResult {
    pub modality: Modality,
    pub duration: f64,
    pub resume_time: f64,
    pub playing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Waiting for the target's metadata.
    Loading,
    /// Waiting for the previous source's metadata after a failure.
    Reverting,
}

/// The switch currently in flight.
#[derive(Debug, Clone, Copy)]
struct SwitchPlan {
    target: Modality,
    previous: Modality,
    resume_time: f64,
    was_playing: bool,
    deadline: Instant,
    phase: Phase,
}

impl SwitchPlan {
    /// Modality whose source the element is loading right now.
    fn loading(&self) -> Modality {
        match self.phase {
            Phase::Loading => self.target,
            Phase::Reverting => self.previous,
        }
    }
}

/// Orchestrates source swaps between the two presentations of an atom.
#[derive(Debug)]
pub struct ModalitySwitcher {
    in_flight: Option<SwitchPlan>,
    queued: Option<Modality>,
    timeout: Duration,
}

impl ModalitySwitcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            in_flight: None,
            queued: None,
            timeout,
        }
    }

    /// Returns true while a switch is in flight.
    pub fn is_active(&self) -> bool {
        self.in_flight.is_some()
    }

    /// The modality playback will end up in once pending work resolves,
    /// or `None` if no switch is in flight.
    pub fn pending_target(&self) -> Option<Modality> {
        let plan = self.in_flight.as_ref()?;
        Some(self.queued.unwrap_or(match plan.phase {
            Phase::Loading => plan.target,
            Phase::Reverting => plan.previous,
        }))
    }

    /// Deadline of the metadata wait, if a switch is in flight.
    pub fn deadline(&self) -> Option<Instant> {
        self.in_flight.as_ref().map(|plan| plan.deadline)
    }

    /// Updates the position to resume at (user seeked mid-switch).
    pub fn set_resume_time(&mut self, time: f64) {
        if let Some(plan) = self.in_flight.as_mut() {
            plan.resume_time = time;
        }
    }

    /// Updates the play intent (user pressed play or pause mid-switch).
    pub fn set_resume_playing(&mut self, playing: bool) {
        if let Some(plan) = self.in_flight.as_mut() {
            plan.was_playing = playing;
        }
    }

    /// Requests a switch to `target`.
    ///
    /// `current` is the committed modality; `current_time`/`is_playing` are
    /// captured as the resume point when a new switch starts.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::SourceMissing`] if the atom has no source
    /// for `target`. The adapter is not touched in that case.
    #[allow(clippy::too_many_arguments)]
    pub fn request(
        &mut self,
        target: Modality,
        current: Modality,
        atom: &ContentAtom,
        current_time: f64,
        is_playing: bool,
        adapter: &mut MediaElementAdapter,
        now: Instant,
    ) -> Result<SwitchRequest, PlaybackError> {
        let Some(url) = atom.source(target) else {
            return Err(PlaybackError::SourceMissing(target));
        };

        if let Some(plan) = self.in_flight.as_ref() {
            if plan.loading() == target {
                // Latest request matches what is loading: drop anything queued
                self.queued = None;
                return Ok(SwitchRequest::Ignored);
            }
            log::debug!(
                "Switch to {} in flight, queueing {}",
                plan.loading(),
                target
            );
            self.queued = Some(target);
            return Ok(SwitchRequest::Queued);
        }

        if target == current {
            return Ok(SwitchRequest::Ignored);
        }

        log::info!("Switching {} -> {} at {:.2}s", current, target, current_time);
        adapter.pause();
        adapter.load_source(url);
        self.in_flight = Some(SwitchPlan {
            target,
            previous: current,
            resume_time: current_time,
            was_playing: is_playing,
            deadline: now + self.timeout,
            phase: Phase::Loading,
        });
        Ok(SwitchRequest::Started)
    }

    /// Feeds the new source's duration into the in-flight switch.
    pub fn on_duration_known(
        &mut self,
        duration: f64,
        atom: &ContentAtom,
        adapter: &mut MediaElementAdapter,
        now: Instant,
    ) -> SwitchProgress {
        let Some(plan) = self.in_flight.take() else {
            return SwitchProgress::Pending;
        };

        let queued = self.queued.take();
        if let Some(next) = queued.filter(|&q| q != plan.loading()) {
            // Superseded: the loaded source is not wanted any more
            if let Some(url) = atom.source(next) {
                log::info!("Switch to {} superseded by {}", plan.loading(), next);
                adapter.load_source(url);
                self.in_flight = Some(SwitchPlan {
                    target: next,
                    previous: plan.previous,
                    deadline: now + self.timeout,
                    phase: if next == plan.previous {
                        Phase::Reverting
                    } else {
                        Phase::Loading
                    },
                    ..plan
                });
                return SwitchProgress::Pending;
            }
        }

        let resume_time = progress::clamp_seek(plan.resume_time, duration);
        adapter.set_current_time(resume_time);
        if plan.was_playing {
            adapter.play();
        }

        let result = SwitchResult {
            modality: plan.loading(),
            duration,
            resume_time,
            playing: plan.was_playing,
        };
        match plan.phase {
            Phase::Loading => SwitchProgress::Completed(result),
            Phase::Reverting => SwitchProgress::Reverted(result),
        }
    }

    /// Feeds an element error into the in-flight switch.
    pub fn on_error(
        &mut self,
        error: PlaybackError,
        atom: &ContentAtom,
        adapter: &mut MediaElementAdapter,
        now: Instant,
    ) -> SwitchProgress {
        let Some(mut plan) = self.in_flight.take() else {
            return SwitchProgress::Pending;
        };
        self.queued = None;

        match plan.phase {
            Phase::Loading => {
                let Some(url) = atom.source(plan.previous) else {
                    log::error!("Switch to {} failed and {} has no source", plan.target, plan.previous);
                    return SwitchProgress::Failed(error);
                };
                log::warn!(
                    "Switch to {} failed ({}), restoring {}",
                    plan.target,
                    error,
                    plan.previous
                );
                adapter.load_source(url);
                plan.phase = Phase::Reverting;
                plan.deadline = now + self.timeout;
                self.in_flight = Some(plan);
                SwitchProgress::Reverting(error)
            }
            Phase::Reverting => {
                log::error!("Could not restore {} after failed switch: {}", plan.previous, error);
                SwitchProgress::Failed(error)
            }
        }
    }

    /// Fails the in-flight switch if its metadata wait expired.
    pub fn poll_timeout(
        &mut self,
        now: Instant,
        atom: &ContentAtom,
        adapter: &mut MediaElementAdapter,
    ) -> SwitchProgress {
        match self.in_flight.as_ref() {
            Some(plan) if now >= plan.deadline => {
                let error = PlaybackError::Network(format!(
                    "{} source did not load within {}s",
                    plan.loading(),
                    self.timeout.as_secs()
                ));
                self.on_error(error, atom, adapter, now)
            }
            _ => SwitchProgress::Pending,
        }
    }

    /// Forgets any in-flight or queued switch.
    pub fn cancel(&mut self) {
        self.in_flight = None;
        self.queued = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::port::NativeEnvelope;
    use crate::error::media_error_code;
    use crate::test_utils::{assert_abs_diff_eq, FakeCommand, FakeFactory, FakeHandle};
    use tokio::sync::mpsc;

    const TIMEOUT: Duration = Duration::from_secs(15);

    fn atom() -> ContentAtom {
        ContentAtom::new("lesson-1", "Lesson 1")
            .with_video("v.mp4")
            .with_audio("a.mp3")
    }

    fn setup() -> (
        ModalitySwitcher,
        MediaElementAdapter,
        mpsc::UnboundedReceiver<NativeEnvelope>,
        FakeHandle,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let factory = FakeFactory::new();
        let handle = factory.handle();
        let mut adapter = MediaElementAdapter::new(Box::new(factory), tx);
        adapter.load_source("v.mp4");
        (ModalitySwitcher::new(TIMEOUT), adapter, rx, handle)
    }

    #[test]
    fn request_to_current_modality_is_ignored() {
        let (mut switcher, mut adapter, _rx, handle) = setup();
        let now = Instant::now();

        let outcome = switcher
            .request(Modality::Watch, Modality::Watch, &atom(), 10.0, true, &mut adapter, now)
            .unwrap();

        assert_eq!(outcome, SwitchRequest::Ignored);
        assert!(!switcher.is_active());
        assert_eq!(handle.created(), 1);
    }

    #[test]
    fn request_without_source_is_rejected_before_touching_adapter() {
        let (mut switcher, mut adapter, _rx, handle) = setup();
        let video_only = ContentAtom::new("x", "X").with_video("v.mp4");

        let err = switcher
            .request(
                Modality::Listen,
                Modality::Watch,
                &video_only,
                0.0,
                false,
                &mut adapter,
                Instant::now(),
            )
            .unwrap_err();

        assert_eq!(err, PlaybackError::SourceMissing(Modality::Listen));
        assert_eq!(handle.created(), 1);
        assert!(handle.current().commands().iter().all(|c| *c != FakeCommand::Pause));
    }

    #[test]
    fn completed_switch_seeks_and_resumes() {
        let (mut switcher, mut adapter, _rx, handle) = setup();
        let now = Instant::now();
        let atom = atom();

        switcher
            .request(Modality::Listen, Modality::Watch, &atom, 10.0, true, &mut adapter, now)
            .unwrap();
        assert_eq!(adapter.source(), Some("a.mp3"));
        assert_eq!(switcher.pending_target(), Some(Modality::Listen));

        let progress = switcher.on_duration_known(100.0, &atom, &mut adapter, now);

        assert_eq!(
            progress,
            SwitchProgress::Completed(SwitchResult {
                modality: Modality::Listen,
                duration: 100.0,
                resume_time: 10.0,
                playing: true,
            })
        );
        let element = handle.current();
        assert_eq!(element.count(&FakeCommand::Seek(10.0)), 1);
        assert_eq!(element.count(&FakeCommand::Play), 1);
        assert!(!switcher.is_active());
    }

    #[test]
    fn resume_time_is_clamped_to_new_duration() {
        let (mut switcher, mut adapter, _rx, _handle) = setup();
        let now = Instant::now();
        let atom = atom();

        switcher
            .request(Modality::Listen, Modality::Watch, &atom, 95.0, false, &mut adapter, now)
            .unwrap();
        let progress = switcher.on_duration_known(90.0, &atom, &mut adapter, now);

        match progress {
            SwitchProgress::Completed(result) => {
                assert_abs_diff_eq!(result.resume_time, 90.0);
                assert!(!result.playing);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn repeated_request_for_same_target_is_ignored() {
        let (mut switcher, mut adapter, _rx, handle) = setup();
        let now = Instant::now();
        let atom = atom();

        switcher
            .request(Modality::Listen, Modality::Watch, &atom, 10.0, true, &mut adapter, now)
            .unwrap();
        let second = switcher
            .request(Modality::Listen, Modality::Watch, &atom, 10.0, true, &mut adapter, now)
            .unwrap();

        assert_eq!(second, SwitchRequest::Ignored);
        assert_eq!(handle.created(), 2);
    }

    #[test]
    fn superseding_request_reloads_previous_after_load_resolves() {
        let (mut switcher, mut adapter, _rx, handle) = setup();
        let now = Instant::now();
        let atom = atom();

        switcher
            .request(Modality::Listen, Modality::Watch, &atom, 10.0, true, &mut adapter, now)
            .unwrap();
        let queued = switcher
            .request(Modality::Watch, Modality::Watch, &atom, 10.0, true, &mut adapter, now)
            .unwrap();
        assert_eq!(queued, SwitchRequest::Queued);
        assert_eq!(switcher.pending_target(), Some(Modality::Watch));
        // The running load is not aborted
        assert_eq!(handle.created(), 2);

        let progress = switcher.on_duration_known(100.0, &atom, &mut adapter, now);
        assert_eq!(progress, SwitchProgress::Pending);
        assert_eq!(adapter.source(), Some("v.mp4"));
        assert_eq!(handle.created(), 3);

        let progress = switcher.on_duration_known(100.0, &atom, &mut adapter, now);
        match progress {
            SwitchProgress::Reverted(result) => {
                assert_eq!(result.modality, Modality::Watch);
                assert_abs_diff_eq!(result.resume_time, 10.0);
                assert!(result.playing);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn failed_target_reverts_to_previous_source() {
        let (mut switcher, mut adapter, _rx, _handle) = setup();
        let now = Instant::now();
        let atom = atom();

        switcher
            .request(Modality::Listen, Modality::Watch, &atom, 30.0, false, &mut adapter, now)
            .unwrap();
        let error = PlaybackError::from_media_error(media_error_code::NETWORK, "offline");
        let progress = switcher.on_error(error.clone(), &atom, &mut adapter, now);

        assert_eq!(progress, SwitchProgress::Reverting(error));
        assert_eq!(adapter.source(), Some("v.mp4"));
        assert_eq!(switcher.pending_target(), Some(Modality::Watch));

        match switcher.on_duration_known(100.0, &atom, &mut adapter, now) {
            SwitchProgress::Reverted(result) => {
                assert_eq!(result.modality, Modality::Watch);
                assert_abs_diff_eq!(result.resume_time, 30.0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn failed_revert_escalates() {
        let (mut switcher, mut adapter, _rx, _handle) = setup();
        let now = Instant::now();
        let atom = atom();

        switcher
            .request(Modality::Listen, Modality::Watch, &atom, 30.0, false, &mut adapter, now)
            .unwrap();
        switcher.on_error(PlaybackError::Network("offline".into()), &atom, &mut adapter, now);
        let progress =
            switcher.on_error(PlaybackError::Decode("broken".into()), &atom, &mut adapter, now);

        assert_eq!(progress, SwitchProgress::Failed(PlaybackError::Decode("broken".into())));
        assert!(!switcher.is_active());
    }

    #[test]
    fn expired_wait_is_treated_as_network_failure() {
        let (mut switcher, mut adapter, _rx, _handle) = setup();
        let start = Instant::now();
        let atom = atom();

        switcher
            .request(Modality::Listen, Modality::Watch, &atom, 5.0, true, &mut adapter, start)
            .unwrap();
        assert_eq!(
            switcher.poll_timeout(start + Duration::from_secs(5), &atom, &mut adapter),
            SwitchProgress::Pending
        );

        match switcher.poll_timeout(start + TIMEOUT, &atom, &mut adapter) {
            SwitchProgress::Reverting(PlaybackError::Network(message)) => {
                assert!(message.contains("listen"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(adapter.source(), Some("v.mp4"));
    }

    #[test]
    fn mid_switch_intent_changes_are_applied() {
        let (mut switcher, mut adapter, _rx, handle) = setup();
        let now = Instant::now();
        let atom = atom();

        switcher
            .request(Modality::Listen, Modality::Watch, &atom, 10.0, true, &mut adapter, now)
            .unwrap();
        switcher.set_resume_playing(false);
        switcher.set_resume_time(42.0);

        match switcher.on_duration_known(100.0, &atom, &mut adapter, now) {
            SwitchProgress::Completed(result) => {
                assert!(!result.playing);
                assert_abs_diff_eq!(result.resume_time, 42.0);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(handle.current().count(&FakeCommand::Play), 0);
    }
}
