// SPDX-License-Identifier: MPL-2.0
//! Presentation surface contract.
//!
//! Surfaces never hold playback state of their own: they render whatever
//! snapshot they are handed and call store operations in response to input.

use super::snapshot::PlaybackSnapshot;
use tokio::sync::watch;

/// The presentations of the player shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    /// Floating compact player shown while minimized.
    MiniPlayer,
    /// Transport bar pinned to the bottom of the page.
    BottomBar,
    /// Full view with artwork or video.
    Expanded,
}

impl SurfaceKind {
    /// Returns true if this surface is visible for `snapshot`.
    #[must_use]
    pub fn is_shown(self, snapshot: &PlaybackSnapshot) -> bool {
        if !snapshot.state.is_visible {
            return false;
        }
        match self {
            Self::MiniPlayer => snapshot.state.is_minimized,
            Self::Expanded => !snapshot.state.is_minimized,
            Self::BottomBar => true,
        }
    }
}

/// A read-only consumer of playback snapshots.
pub trait Surface {
    fn kind(&self) -> SurfaceKind;

    /// Redraws from `snapshot`.
    fn render(&mut self, snapshot: &PlaybackSnapshot);
}

/// Fans one snapshot out to every registered surface.
#[derive(Default)]
pub struct SurfaceSet {
    surfaces: Vec<Box<dyn Surface>>,
}

impl SurfaceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, surface: Box<dyn Surface>) {
        self.surfaces.push(surface);
    }

    /// Renders `snapshot` on every surface shown for it.
    ///
    /// Returns the number of surfaces rendered.
    pub fn render_all(&mut self, snapshot: &PlaybackSnapshot) -> usize {
        let mut rendered = 0;
        for surface in &mut self.surfaces {
            if surface.kind().is_shown(snapshot) {
                surface.render(snapshot);
                rendered += 1;
            }
        }
        rendered
    }

    /// Renders the latest snapshot if the store published a new one since
    /// the last call. Returns false if nothing changed.
    pub fn render_changed(&mut self, rx: &mut watch::Receiver<PlaybackSnapshot>) -> bool {
        if !rx.has_changed().unwrap_or(false) {
            return false;
        }
        let snapshot = rx.borrow_and_update().clone();
        self.render_all(&snapshot);
        true
    }
}

impl std::fmt::Debug for SurfaceSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kinds: Vec<SurfaceKind> = self.surfaces.iter().map(|s| s.kind()).collect();
        f.debug_struct("SurfaceSet").field("surfaces", &kinds).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::snapshot::PlaybackState;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder {
        kind: SurfaceKind,
        seen: Rc<RefCell<Vec<(SurfaceKind, f64)>>>,
    }

    impl Surface for Recorder {
        fn kind(&self) -> SurfaceKind {
            self.kind
        }

        fn render(&mut self, snapshot: &PlaybackSnapshot) {
            self.seen
                .borrow_mut()
                .push((self.kind, snapshot.state.current_time));
        }
    }

    fn snapshot(visible: bool, minimized: bool) -> PlaybackSnapshot {
        PlaybackSnapshot::new(
            None,
            PlaybackState {
                is_visible: visible,
                is_minimized: minimized,
                current_time: 12.0,
                duration: 60.0,
                ..PlaybackState::default()
            },
            None,
        )
    }

    fn set() -> (SurfaceSet, Rc<RefCell<Vec<(SurfaceKind, f64)>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut set = SurfaceSet::new();
        for kind in [SurfaceKind::MiniPlayer, SurfaceKind::BottomBar, SurfaceKind::Expanded] {
            set.add(Box::new(Recorder {
                kind,
                seen: Rc::clone(&seen),
            }));
        }
        (set, seen)
    }

    #[test]
    fn hidden_player_shows_nothing() {
        let (mut set, seen) = set();
        assert_eq!(set.render_all(&snapshot(false, false)), 0);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn minimized_flag_selects_mini_or_expanded() {
        let (mut set, seen) = set();
        set.render_all(&snapshot(true, true));
        let kinds: Vec<_> = seen.borrow().iter().map(|(k, _)| *k).collect();
        assert_eq!(kinds, vec![SurfaceKind::MiniPlayer, SurfaceKind::BottomBar]);

        seen.borrow_mut().clear();
        set.render_all(&snapshot(true, false));
        let kinds: Vec<_> = seen.borrow().iter().map(|(k, _)| *k).collect();
        assert_eq!(kinds, vec![SurfaceKind::BottomBar, SurfaceKind::Expanded]);
    }

    #[test]
    fn every_surface_renders_the_same_position() {
        let (mut set, seen) = set();
        set.render_all(&snapshot(true, false));
        assert!(seen.borrow().iter().all(|(_, time)| (*time - 12.0).abs() < f64::EPSILON));
    }

    #[test]
    fn render_changed_skips_unchanged_snapshots() {
        let (mut set, seen) = set();
        let (tx, mut rx) = watch::channel(snapshot(true, false));
        rx.borrow_and_update();

        assert!(!set.render_changed(&mut rx));
        tx.send_replace(snapshot(true, true));
        assert!(set.render_changed(&mut rx));
        assert!(!set.render_changed(&mut rx));
        assert_eq!(seen.borrow().len(), 2);
    }
}
