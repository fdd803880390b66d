// SPDX-License-Identifier: MPL-2.0
//! Headless demo: plays one lesson on the simulated backend and prints what
//! the bottom bar and the expanded view would show.

use course_player::config::{self, PlayerConfig};
use course_player::domain::playback::{ContentAtom, Modality, PlaybackStatus};
use course_player::infrastructure::SimulatedFactory;
use course_player::player::{PlaybackSnapshot, PlaybackStore, Surface, SurfaceKind, SurfaceSet};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

const TICK: Duration = Duration::from_millis(100);

const HELP: &str = "\
course-player: play a lesson on the simulated backend

USAGE:
  course-player [OPTIONS]

OPTIONS:
  --video <URL>        Video source (default: lesson.mp4 when no source is given)
  --audio <URL>        Audio source (default: lesson.mp3 when no source is given)
  --title <TEXT>       Lesson title
  --duration <SECS>    Simulated media duration [default: 60]
  --switch-at <SECS>   Switch to the other modality at this position
  --listen             Start in listen mode
  --speed <FACTOR>     Simulated seconds per real second [default: 10]
  --config <PATH>      Read settings from this player.toml
  -h, --help           Print this help
";

struct Args {
    video: Option<String>,
    audio: Option<String>,
    title: String,
    duration: f64,
    switch_at: Option<f64>,
    listen: bool,
    speed: f64,
    config: Option<PathBuf>,
}

fn parse_args() -> Result<Args, pico_args::Error> {
    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let mut parsed = Args {
        video: args.opt_value_from_str("--video")?,
        audio: args.opt_value_from_str("--audio")?,
        title: args
            .opt_value_from_str("--title")?
            .unwrap_or_else(|| "Untitled lesson".to_string()),
        duration: args.opt_value_from_str("--duration")?.unwrap_or(60.0),
        switch_at: args.opt_value_from_str("--switch-at")?,
        listen: args.contains("--listen"),
        speed: args.opt_value_from_str("--speed")?.unwrap_or(10.0),
        config: args.opt_value_from_str("--config")?,
    };

    let remaining = args.finish();
    if !remaining.is_empty() {
        log::warn!("Ignoring unused arguments: {remaining:?}");
    }

    if parsed.video.is_none() && parsed.audio.is_none() {
        parsed.video = Some("lesson.mp4".to_string());
        parsed.audio = Some("lesson.mp3".to_string());
    }
    Ok(parsed)
}

/// Prints a one-line transport bar on every change.
struct BottomBar;

impl Surface for BottomBar {
    fn kind(&self) -> SurfaceKind {
        SurfaceKind::BottomBar
    }

    fn render(&mut self, snapshot: &PlaybackSnapshot) {
        let state = &snapshot.state;
        let icon = if state.is_playing { "▶" } else { "⏸" };
        let switching = snapshot
            .switching_to
            .map(|m| format!(" → {m}"))
            .unwrap_or_default();
        println!(
            "{icon} {} / {} [{:>5.1}% buffered {:>5.1}%] {}{} x{}",
            snapshot.formatted_current_time,
            snapshot.formatted_duration,
            snapshot.progress_percent,
            state.buffered_percent,
            state.modality,
            switching,
            state.playback_rate.value(),
        );
    }
}

/// Prints a heading whenever status or modality changes.
#[derive(Default)]
struct ExpandedView {
    last: Option<(PlaybackStatus, Modality)>,
}

impl Surface for ExpandedView {
    fn kind(&self) -> SurfaceKind {
        SurfaceKind::Expanded
    }

    fn render(&mut self, snapshot: &PlaybackSnapshot) {
        let current = (snapshot.state.status, snapshot.state.modality);
        if self.last == Some(current) {
            return;
        }
        self.last = Some(current);

        let title = snapshot.display_title().unwrap_or_default();
        println!("== {title} [{} · {}] ==", current.1, current.0);
        if let Some(message) = &snapshot.state.error_message {
            println!("   {message}");
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("Error: {err}\n\n{HELP}");
            return ExitCode::FAILURE;
        }
    };

    let player_config = match &args.config {
        Some(path) => config::load_from_path(path),
        None => config::load(),
    }
    .unwrap_or_else(|err| {
        log::warn!("Using default settings: {err}");
        PlayerConfig::default()
    });

    let factory = SimulatedFactory::new().with_default_duration(args.duration);
    let controller = factory.controller();
    let mut store = PlaybackStore::new(Box::new(factory), player_config.engine_settings());
    let mut snapshots = store.subscribe();

    let mut surfaces = SurfaceSet::new();
    surfaces.add(Box::new(BottomBar));
    surfaces.add(Box::new(ExpandedView::default()));

    let mut atom = ContentAtom::new("demo", args.title.clone()).with_course_title("Demo course");
    atom.video_src = args.video.clone();
    atom.audio_src = args.audio.clone();
    store.load(atom, args.listen.then_some(Modality::Listen));
    store.play();

    let step = TICK.mul_f64(args.speed.max(0.0));
    let mut ticker = tokio::time::interval(TICK);
    let mut pending_switch = args.switch_at;

    loop {
        let mut ticked = false;
        tokio::select! {
            alive = store.next_native_event() => {
                if !alive {
                    break;
                }
            }
            _ = ticker.tick() => ticked = true,
        }
        if ticked {
            controller.advance(step);
        }

        if let Some(at) = pending_switch {
            let state = store.state();
            if state.status.is_active() && state.current_time >= at {
                pending_switch = None;
                let target = state.modality.other();
                if let Err(err) = store.switch_modality(target) {
                    log::warn!("Cannot switch to {target}: {err}");
                }
            }
        }

        surfaces.render_changed(&mut snapshots);

        match store.state().status {
            PlaybackStatus::Ended => {
                println!("Finished.");
                break;
            }
            status if status.is_error() && !store.is_switching() => {
                return ExitCode::FAILURE;
            }
            _ => {}
        }
    }

    store.close();
    ExitCode::SUCCESS
}
