//! Attune Demo Application
//!
//! Drives a tree or blob session in the terminal:
//! - A background task plays the face tracker at ~30 Hz
//! - The keyboard moves the simulated nose
//! - A 60 Hz frame loop ticks the session and prints a status line
//!
//! Logs go to stderr (`RUST_LOG`, default `attune=info`).

mod config;
mod feed;
mod terminal;

use std::time::Duration;

use attune_runtime::{
    BlobCharacter, Character, InputEvent, Session, SessionPhase, SessionSummary, TracingSink,
    TreeCharacter,
};
use crossterm::event::{self, Event};
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use config::{CharacterKind, DemoConfig};
use feed::SimulatedFace;
use terminal::{command_for, Command, RawMode, StatusLine};

/// ~60 Hz
const FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

fn init_logging() {
    let mut filter = EnvFilter::from_default_env();
    if std::env::var_os("RUST_LOG").is_none() {
        if let Ok(d) = "attune=info".parse() {
            filter = filter.add_directive(d);
        }
    }
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let config = DemoConfig::from_args(std::env::args().skip(1))?;

    println!("╔════════════════════════════════════════════════════════════╗");
    println!("║                 Attune Demo - {:<29}║", format!("{:?}", config.character));
    println!("╠════════════════════════════════════════════════════════════╣");
    println!("║  ← ↑ → ↓  move your nose        f  face on/off             ║");
    println!("║  m        open/close mouth      b  bloom (click)           ║");
    println!("║  Esc      end session           r  retry after the end     ║");
    println!("║  q        quit                                             ║");
    println!("╚════════════════════════════════════════════════════════════╝");

    let session_config = config.session_config();
    let summary = match config.character {
        CharacterKind::Tree => {
            let tree = TreeCharacter::new(config.tree.clone())?;
            run(Session::new(tree, session_config, config.viewport)?).await?
        }
        CharacterKind::Blob => {
            let blob = BlobCharacter::new(config.blob.clone())?;
            run(Session::new(blob, session_config, config.viewport)?).await?
        }
    };

    println!(
        "{} session: {:?} after {} ({} frames, {} cues, {} retries)",
        summary.character,
        summary.reason,
        summary.elapsed,
        summary.stats.frames,
        summary.stats.cues_delivered,
        summary.stats.retries
    );
    Ok(())
}

/// Frame loop until the user quits
async fn run<C: Character>(mut session: Session<C>) -> Result<SessionSummary, Box<dyn std::error::Error>> {
    let viewport = session.viewport();
    let (face_tx, face_rx) = watch::channel(SimulatedFace::centered(viewport));
    let (landmark_tx, mut landmark_rx) = mpsc::channel(64);
    let feed_task = tokio::spawn(feed::run(face_rx, landmark_tx));

    let raw = RawMode::enable()?;
    let mut surface = StatusLine::new();
    let mut sink = TracingSink;
    let mut frames = tokio::time::interval(FRAME_INTERVAL);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last = Instant::now();

    'frames: loop {
        frames.tick().await;

        // Deliveries since the last frame; the latch keeps the newest
        while let Ok(update) = landmark_rx.try_recv() {
            session.deliver(update);
        }

        while event::poll(Duration::ZERO)? {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            let Some(command) = command_for(key) else {
                continue;
            };
            match command {
                Command::Nudge(dx, dy) => face_tx.send_modify(|f| f.nudge(dx, dy, viewport)),
                Command::ToggleFace => face_tx.send_modify(|f| f.present = !f.present),
                Command::ToggleMouth => {
                    face_tx.send_modify(|f| f.mouth = if f.mouth > 0.5 { 0.0 } else { 1.0 })
                }
                Command::Bloom => {
                    session.handle(InputEvent::Click(viewport.center()), &mut sink);
                }
                Command::Escape => {
                    session.handle(InputEvent::Escape, &mut sink);
                }
                Command::Retry => {
                    if let Err(e) = session.retry() {
                        warn!(error = %e, "cannot retry");
                    }
                }
                Command::Quit => break 'frames,
            }
        }

        let now = Instant::now();
        session.tick(now - last, &mut sink);
        last = now;

        let status = status_line(&session, &face_tx.borrow());
        surface.set_status(status);
        session.present(&mut surface);
    }

    feed_task.abort();
    drop(raw);
    info!("leaving session");
    Ok(session.exit())
}

fn status_line<C: Character>(session: &Session<C>, face: &SimulatedFace) -> String {
    let automaton = session.character().automaton();
    let phase = match session.phase() {
        SessionPhase::Active => String::new(),
        SessionPhase::Ended(reason) => format!(" [ended: {reason:?}]"),
    };
    format!(
        "{} {:?} t={:.1}s dwell {:.1}/{:.0}s growth {:.2} {} nose ({:.0},{:.0}){}{}",
        session.character().name(),
        automaton.state(),
        session.now().as_secs_f32(),
        automaton.dwell().as_secs_f32(),
        automaton.duration().as_secs_f32(),
        automaton.growth(),
        if session.engagement().centered { "●" } else { "○" },
        face.nose.x,
        face.nose.y,
        if face.present { "" } else { " (no face)" },
        phase
    )
}
