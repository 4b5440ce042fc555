//! Session lifecycle controller
//!
//! A session owns everything around one character: the frame clock, the
//! landmark latch, the follow-up scheduler and the chat bubble. `tick`
//! runs the staged per-frame loop; `scene` projects the current state.
//!
//! Lifecycle: `Active → Ended(reason)`. An ended session is frozen until
//! `retry` (full reset, new generation) or `exit` (consumes the session).

use std::time::Duration;

use attune_core::{
    AttuneError, AttuneResult, Generation, LandmarkUpdate, Point2D, SessionTime, Size2D,
};
use attune_sense::{evaluate, CoordinateMap, Engagement, LandmarkLatch};
use attune_state::Cue;
use attune_time::{ClockConfig, FrameClock, Scheduler};
use attune_visual::{ChatBubble, EndOverlay, OverlayButton, Scene, Surface};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{Character, CharacterSnapshot, CueSink, FrameContext, RenderContext};

/// Session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// End the session after this long without a face (None disables)
    pub face_lost_timeout: Option<Duration>,
    /// Do not step the character until the landmark source is ready
    pub hold_until_ready: bool,
    /// Capture resolution; None when landmarks arrive in display coordinates
    pub capture: Option<Size2D>,
    pub clock: ClockConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            face_lost_timeout: None,
            hold_until_ready: false,
            capture: None,
            clock: ClockConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Tree sessions wait for the model and never time out
    pub fn tree() -> Self {
        Self {
            hold_until_ready: true,
            ..Self::default()
        }
    }

    /// Blob sessions end after 30 s without a face
    pub fn blob() -> Self {
        Self {
            face_lost_timeout: Some(Duration::from_secs(30)),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> AttuneResult<()> {
        if let Some(capture) = self.capture {
            if !capture.is_valid() {
                return Err(AttuneError::InvalidViewport {
                    width: capture.width,
                    height: capture.height,
                });
            }
        }
        if self.face_lost_timeout == Some(Duration::ZERO) {
            return Err(AttuneError::InvalidDuration {
                state: "face_lost_timeout".to_string(),
            });
        }
        if self.clock.max_step.is_zero() {
            return Err(AttuneError::InvalidDuration {
                state: "clock.max_step".to_string(),
            });
        }
        Ok(())
    }
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// The cycle ran to its end
    Completed,
    /// Escape
    Forced,
    /// No face for the configured timeout
    SignalLost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    Active,
    Ended(EndReason),
}

/// External triggers
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Click(Point2D),
    Escape,
    Resize(Size2D),
}

/// What the host should do after an input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    /// The session was reset and is active again
    Retry,
    /// Leave for the main menu (`Session::exit`)
    Exit,
}

/// Session statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Frames ticked while active, across retries
    pub frames: u64,
    pub engaged_frames: u64,
    /// Frames spent waiting for the landmark source
    pub held_frames: u64,
    pub transitions: u64,
    pub cues_delivered: u64,
    pub followups_scheduled: u64,
    pub followups_delivered: u64,
    pub clicks: u64,
    pub retries: u64,
}

/// Outcome of one tick
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub now: SessionTime,
    /// The character was stepped (false while ended or held)
    pub stepped: bool,
    pub centered: bool,
    pub transitioned: bool,
    /// Cues delivered this frame, follow-ups included
    pub cues: Vec<Cue>,
    /// Set on the frame the session ended
    pub ended: Option<EndReason>,
}

impl FrameReport {
    fn idle(now: SessionTime) -> Self {
        Self {
            now,
            stepped: false,
            centered: false,
            transitioned: false,
            cues: Vec::new(),
            ended: None,
        }
    }
}

/// Observable session state, for comparison against a fresh session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot<S> {
    pub phase: SessionPhase,
    pub now: SessionTime,
    pub frames: u64,
    pub character: CharacterSnapshot<S>,
    pub pending_followups: usize,
    pub bubble: Option<String>,
}

/// Returned by `Session::exit`
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub character: &'static str,
    /// None when the session was left while still active
    pub reason: Option<EndReason>,
    pub elapsed: SessionTime,
    pub generation: Generation,
    pub stats: SessionStats,
}

/// One character's session
pub struct Session<C: Character> {
    character: C,
    config: SessionConfig,
    viewport: Size2D,
    phase: SessionPhase,
    clock: FrameClock,
    latch: LandmarkLatch,
    scheduler: Scheduler<Cue>,
    bubble: ChatBubble,
    /// Last evaluated engagement, kept for rendering
    engagement: Engagement,
    /// Character scene captured when the session ended
    frozen: Option<Scene>,
    stats: SessionStats,
}

impl<C: Character> Session<C> {
    pub fn new(character: C, config: SessionConfig, viewport: Size2D) -> AttuneResult<Self> {
        if !viewport.is_valid() {
            return Err(AttuneError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        config.validate()?;
        character.region().validate()?;

        info!(character = character.name(), "session started");
        Ok(Self {
            clock: FrameClock::new(&config.clock),
            character,
            config,
            viewport,
            phase: SessionPhase::Active,
            latch: LandmarkLatch::new(),
            scheduler: Scheduler::new(),
            bubble: ChatBubble::new(),
            engagement: Engagement::default(),
            frozen: None,
            stats: SessionStats::default(),
        })
    }

    /// Push a landmark delivery. Accepted in any phase; the tracker keeps running.
    pub fn deliver(&mut self, update: LandmarkUpdate) {
        self.latch.deliver(update, self.clock.now());
    }

    /// Route an external trigger
    pub fn handle<K: CueSink + ?Sized>(&mut self, event: InputEvent, sink: &mut K) -> Option<SessionAction> {
        match (event, self.phase) {
            (InputEvent::Resize(size), _) => {
                if size.is_valid() {
                    debug!(width = size.width, height = size.height, "viewport resized");
                    self.viewport = size;
                    if !self.is_active() {
                        self.frozen = Some(self.live_scene());
                    }
                } else {
                    warn!(width = size.width, height = size.height, "ignoring degenerate viewport");
                }
                None
            }
            (InputEvent::Escape, SessionPhase::Active) => {
                self.end(EndReason::Forced);
                None
            }
            (InputEvent::Escape, SessionPhase::Ended(_)) => None,
            (InputEvent::Click(at), SessionPhase::Active) => {
                if self.is_holding() {
                    return None;
                }
                self.stats.clicks += 1;
                if let Some(cue) = self.character.click(at, self.clock.now()) {
                    self.deliver_cue(&cue, sink);
                }
                None
            }
            (InputEvent::Click(at), SessionPhase::Ended(_)) => {
                match EndOverlay::layout(self.viewport).hit_test(at)? {
                    OverlayButton::Retry => self.retry().ok().map(|_| SessionAction::Retry),
                    OverlayButton::MainMenu => Some(SessionAction::Exit),
                }
            }
        }
    }

    /// Advance one frame
    pub fn tick<K: CueSink + ?Sized>(&mut self, dt: Duration, sink: &mut K) -> FrameReport {
        if !self.is_active() {
            return FrameReport::idle(self.clock.now());
        }

        // Stage 1: Advance the clock
        let dt = self.clock.advance(dt);
        let now = self.clock.now();
        self.stats.frames += 1;

        // Stage 2: Latest landmark sample
        let sample = self.latch.sample();

        // Stage 3: Engagement against the character's region
        let region = self.character.region().resolve(self.viewport);
        let mapping = match self.config.capture {
            Some(capture) => CoordinateMap::new(capture, self.viewport),
            None => CoordinateMap::identity(self.viewport),
        };
        self.engagement = evaluate(&sample, &mapping, &region);

        let mut report = FrameReport::idle(now);
        report.centered = self.engagement.centered;

        // Stage 4: Terminal conditions
        if let Some(timeout) = self.config.face_lost_timeout {
            if self.latch.face_missing_for(now) > timeout {
                self.end(EndReason::SignalLost);
                report.ended = Some(EndReason::SignalLost);
                return report;
            }
        }
        if self.is_holding() {
            self.stats.held_frames += 1;
            return report;
        }

        // Stage 5: Step the character
        if self.engagement.centered {
            self.stats.engaged_frames += 1;
        }
        let ctx = FrameContext {
            now,
            dt,
            viewport: self.viewport,
            engagement: self.engagement,
            mouth_openness: self.latch.mouth_openness(),
        };
        let step = self.character.step(&ctx);
        report.stepped = true;
        report.transitioned = step.transitioned;
        if step.transitioned {
            self.stats.transitions += 1;
        }

        // Stage 6: Cues, then due follow-ups
        for fired in step.fired {
            if let Some(followup) = fired.followup {
                self.scheduler.schedule(now + followup.delay, followup.cue);
                self.stats.followups_scheduled += 1;
            }
            self.deliver_cue(&fired.cue, sink);
            report.cues.push(fired.cue);
        }
        for cue in self.scheduler.poll(now) {
            self.stats.followups_delivered += 1;
            self.deliver_cue(&cue, sink);
            report.cues.push(cue);
        }

        // Stage 7: Natural completion
        if step.completed {
            self.end(EndReason::Completed);
            report.ended = Some(EndReason::Completed);
        }

        report
    }

    /// Project the current state. Once ended, the character is drawn as it
    /// was on the final frame, under the end overlay.
    pub fn scene(&mut self) -> Scene {
        match &self.frozen {
            Some(frozen) => {
                let mut scene = frozen.clone();
                EndOverlay::layout(self.viewport).render(&mut scene);
                scene
            }
            None => self.live_scene(),
        }
    }

    fn live_scene(&mut self) -> Scene {
        let mut scene = Scene::new(self.viewport);
        let ctx = RenderContext {
            now: self.clock.now(),
            viewport: self.viewport,
            region: self.character.region().resolve(self.viewport).rect,
            engagement: self.engagement,
        };

        if self.is_holding() {
            self.character.render_loading(&ctx, &mut scene);
            return scene;
        }

        self.character.render(&ctx, &mut scene);
        self.bubble.render(&mut scene, ctx.now);
        scene
    }

    pub fn present<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        let scene = self.scene();
        surface.present(&scene);
    }

    /// End the session now (escape)
    pub fn force_end(&mut self) -> AttuneResult<()> {
        if !self.is_active() {
            return Err(AttuneError::SessionEnded);
        }
        self.end(EndReason::Forced);
        Ok(())
    }

    /// Full reset into a new generation. Only valid once the session has ended.
    pub fn retry(&mut self) -> AttuneResult<()> {
        if self.is_active() {
            warn!(character = self.character.name(), "retry rejected: session still active");
            return Err(AttuneError::SessionActive);
        }

        let generation = self.scheduler.invalidate();
        let seed = self.character.seed().wrapping_add(generation.value());
        self.character.reset(seed);
        self.clock.reset();
        self.latch.restart(SessionTime::ZERO);
        self.bubble.clear();
        self.engagement = Engagement::default();
        self.frozen = None;
        self.phase = SessionPhase::Active;
        self.stats.retries += 1;

        info!(character = self.character.name(), %generation, "session retried");
        Ok(())
    }

    /// Leave the session (main menu)
    pub fn exit(self) -> SessionSummary {
        let reason = match self.phase {
            SessionPhase::Active => None,
            SessionPhase::Ended(reason) => Some(reason),
        };
        info!(character = self.character.name(), ?reason, "session exited");
        SessionSummary {
            character: self.character.name(),
            reason,
            elapsed: self.clock.now(),
            generation: self.scheduler.generation(),
            stats: self.stats,
        }
    }

    fn end(&mut self, reason: EndReason) {
        if !self.is_active() {
            return;
        }
        self.phase = SessionPhase::Ended(reason);
        self.frozen = Some(self.live_scene());
        let generation = self.scheduler.invalidate();
        info!(
            character = self.character.name(),
            ?reason,
            elapsed = %self.clock.now(),
            %generation,
            "session ended"
        );
    }

    fn deliver_cue<K: CueSink + ?Sized>(&mut self, cue: &Cue, sink: &mut K) {
        sink.deliver(cue);
        if let Cue::Chat(message) = cue {
            self.bubble.show(message.as_str(), self.clock.now());
        }
        self.character.apply_cue(cue, self.viewport);
        self.stats.cues_delivered += 1;
    }

    fn is_holding(&self) -> bool {
        self.config.hold_until_ready && !self.latch.is_ready()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == SessionPhase::Active
    }

    pub fn now(&self) -> SessionTime {
        self.clock.now()
    }

    pub fn viewport(&self) -> Size2D {
        self.viewport
    }

    pub fn engagement(&self) -> Engagement {
        self.engagement
    }

    pub fn character(&self) -> &C {
        &self.character
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn generation(&self) -> Generation {
        self.scheduler.generation()
    }

    pub fn pending_followups(&self) -> usize {
        self.scheduler.live_len()
    }

    pub fn bubble(&self) -> &ChatBubble {
        &self.bubble
    }

    pub fn latch(&self) -> &LandmarkLatch {
        &self.latch
    }

    pub fn snapshot(&self) -> SessionSnapshot<C::State> {
        SessionSnapshot {
            phase: self.phase,
            now: self.clock.now(),
            frames: self.clock.frames(),
            character: self.character.snapshot(),
            pending_followups: self.scheduler.live_len(),
            bubble: self.bubble.message().map(str::to_string),
        }
    }
}
