//! Top-level application state.
//!
//! `AppState` owns the particle field, the gesture state machine, the
//! gallery fan, the scene props, the control-panel values and the gesture
//! feed.  The run loop feeds it window input and the session clock once per
//! frame and renders the snapshot it hands back.

use std::sync::mpsc::{self, Sender};
use std::time::{Duration, Instant};

use tinsel_field::{FrameInputs, InstanceBuffers, Mode, ParticleAnimator, ParticleField};
use tinsel_mode::{GalleryFan, GestureLabel, GestureModeMachine, ModeState};

use crate::classifier::{BoxedClassifier, ClassifierHandle, ClassifierSlot, CLASSIFY_PERIOD};
use crate::config::AppConfig;
use crate::controls::{ControlAction, Controls};
use crate::error::{AppError, ClassifierError};
use crate::gesture::{KeyboardClassifier, SimInput};
use crate::scene::{GreetingSign, TopStar};
use crate::visualizer::{Frame, Visualizer};

/// Camera auto-orbit while the tree is assembled, radians per second
/// (one revolution every two minutes).
pub const ORBIT_RATE: f32 = std::f32::consts::TAU / 120.0;

/// Longest frame step fed to the easing maths, so a stall does not snap
/// everything to its target.
const MAX_DT: f32 = 0.1;

// ════════════════════════════════════════════════════════════════════════════
// Gesture feed
// ════════════════════════════════════════════════════════════════════════════

/// Where gesture labels come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeedSource {
    /// Held keys in the visualizer window.
    Keyboard,
    /// A LeapMotion controller.
    #[cfg(feature = "leap")]
    Leap,
}

impl Default for FeedSource {
    #[cfg(feature = "leap")]
    fn default() -> Self { FeedSource::Leap }
    #[cfg(not(feature = "leap"))]
    fn default() -> Self { FeedSource::Keyboard }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeedState {
    Off,
    Starting,
    On,
}

impl FeedState {
    fn label(self) -> &'static str {
        match self {
            FeedState::Off      => "OFF",
            FeedState::Starting => "STARTING",
            FeedState::On       => "ON",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    // ── particles ────────────────────────────────────────────────────────
    field:     ParticleField,
    animator:  ParticleAnimator,
    instances: InstanceBuffers,

    // ── gesture-driven state ─────────────────────────────────────────────
    machine: GestureModeMachine,
    gallery: GalleryFan,

    // ── scene props ──────────────────────────────────────────────────────
    star: TopStar,
    sign: GreetingSign,
    yaw:  f32,

    // ── control panel ────────────────────────────────────────────────────
    controls: Controls,

    // ── gesture feed ─────────────────────────────────────────────────────
    source: FeedSource,
    slot:   ClassifierSlot,
    feed:   Option<ClassifierHandle>,
    /// Present while the keyboard classifier is live.
    sim_tx: Option<Sender<SimInput>>,

    // ── frame clock ──────────────────────────────────────────────────────
    last_frame: Option<Duration>,
    time:       f32,

    pub status: String,
    quit:       bool,
}

impl AppState {
    pub fn new(cfg: &AppConfig, source: FeedSource) -> Result<Self, AppError> {
        let color = cfg.color()?;

        let field = ParticleField::generate(&cfg.field, cfg.seed);
        let animator = ParticleAnimator::with_params(&cfg.field, cfg.animator.clone(), cfg.seed);
        log::debug!("decoration histogram {:?}", field.decoration_histogram());

        let mut machine = GestureModeMachine::new(cfg.timings.mode_timings());
        machine.override_mode(cfg.mode);

        let mut gallery = GalleryFan::new(cfg.timings.gallery_timings());
        gallery.sync_photos(&cfg.photos);

        let mut app = AppState {
            field,
            animator,
            instances: InstanceBuffers::default(),
            machine,
            gallery,
            star: TopStar::new(cfg.field.height),
            sign: GreetingSign::new(cfg.seed),
            yaw: 0.0,
            controls: Controls::new(color, cfg.particle_shape, cfg.particle_size, cfg.photos.clone()),
            source,
            slot: ClassifierSlot::new(),
            feed: None,
            sim_tx: None,
            last_frame: None,
            time: 0.0,
            status: String::new(),
            quit: false,
        };
        if cfg.gesture_feed {
            app.start_feed();
        }
        app.status = app.status_line();
        Ok(app)
    }

    // ── gesture feed lifecycle ───────────────────────────────────────────

    pub fn feed_state(&self) -> FeedState {
        match &self.feed {
            None                     => FeedState::Off,
            Some(h) if h.is_ready()  => FeedState::On,
            Some(_)                  => FeedState::Starting,
        }
    }

    /// Start the configured classifier.  Returns immediately.
    pub fn start_feed(&mut self) {
        match self.source {
            FeedSource::Keyboard => {
                let (tx, rx) = mpsc::channel();
                if self.start_feed_with(move || Ok(Box::new(KeyboardClassifier::new(rx)) as BoxedClassifier)) {
                    self.sim_tx = Some(tx);
                }
            }
            #[cfg(feature = "leap")]
            FeedSource::Leap => {
                self.start_feed_with(|| {
                    Ok(Box::new(crate::gesture::LeapClassifier::open()?) as BoxedClassifier)
                });
            }
        }
    }

    /// Acquire the classifier slot with `init`; false if refused.
    pub(crate) fn start_feed_with<F>(&mut self, init: F) -> bool
    where
        F: FnOnce() -> Result<BoxedClassifier, ClassifierError> + Send + 'static,
    {
        match self.slot.acquire(init, CLASSIFY_PERIOD) {
            Ok(handle) => {
                self.feed = Some(handle);
                true
            }
            Err(e) => {
                log::warn!("gesture feed not started: {e}");
                false
            }
        }
    }

    /// Stop classifying.  Blocks until the worker has exited; the last
    /// committed mode and gallery state stand.
    pub fn stop_feed(&mut self) {
        self.sim_tx = None;
        if let Some(handle) = self.feed.take() {
            handle.release();
        }
    }

    /// Forward the simulated hand pose to the keyboard classifier.
    pub fn sim_hand(&self, pose: Option<GestureLabel>) {
        if let Some(tx) = &self.sim_tx {
            let _ = tx.send(SimInput::Hand(pose));
        }
    }

    /// This frame's label, or `None` when the feed is off.
    fn poll_feed(&mut self) -> Option<Option<GestureLabel>> {
        let handle = self.feed.as_mut()?;
        match handle.poll() {
            Ok(label) => Some(label),
            Err(e) => {
                log::error!("gesture feed stopped: {e}");
                self.stop_feed();
                None
            }
        }
    }

    // ── control panel ────────────────────────────────────────────────────

    pub fn handle_action(&mut self, action: ControlAction) {
        match action {
            ControlAction::ToggleMode => {
                let mode = self.machine.state().mode().toggled();
                self.machine.override_mode(mode);
            }
            ControlAction::ToggleFeed => {
                if self.feed.is_some() {
                    self.stop_feed();
                } else {
                    self.start_feed();
                }
            }
            ControlAction::NextColor => self.controls.next_color(),
            ControlAction::NextShape => self.controls.next_shape(),
            ControlAction::Grow      => self.controls.grow(),
            ControlAction::Shrink    => self.controls.shrink(),
            ControlAction::AddPhoto  => {
                let id = self.controls.add_photo().to_string();
                log::info!("added {id}");
                self.gallery.sync_photos(&self.controls.photos);
            }
            ControlAction::ClearPhotos => {
                let removed = self.controls.clear_photos();
                self.machine.close_gallery();
                self.gallery.sync_photos(&self.controls.photos);
                log::info!("cleared {removed} photo(s)");
            }
            ControlAction::Quit => self.quit = true,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    // ── per-frame tick ───────────────────────────────────────────────────

    /// One frame at session time `now`: poll the feed, run the state
    /// machine if the feed is on, then animate.
    pub fn tick(&mut self, now: Duration) {
        if let Some(label) = self.poll_feed() {
            self.apply_gesture(label, now);
        }
        self.animate(now);
    }

    /// Feed one label to the state machine.
    pub fn apply_gesture(&mut self, label: Option<GestureLabel>, now: Duration) {
        self.machine.tick(label, now);
    }

    /// Advance the gallery, props and particles to `now`.
    pub fn animate(&mut self, now: Duration) {
        let dt = self
            .last_frame
            .map_or(0.0, |last| now.saturating_sub(last).as_secs_f32())
            .min(MAX_DT);
        self.last_frame = Some(now);
        self.time = now.as_secs_f32();

        let state = self.machine.state();
        let mode = state.mode();
        let gallery_open = state.is_gallery_open();

        self.gallery.update(gallery_open, now, self.time, dt);
        self.star.update(mode, self.time, dt);
        self.sign.update(mode, dt);
        if mode == Mode::Tree {
            self.yaw += ORBIT_RATE * dt;
        }

        let inputs = FrameInputs {
            mode,
            user_color: self.controls.color,
            size_scale: self.controls.size,
            time:       self.time,
        };
        self.animator.step(&mut self.field, &inputs, &mut self.instances);

        self.status = self.status_line();
    }

    fn status_line(&self) -> String {
        let state = self.machine.state();
        let gesture = match state.status_text() {
            "" => "-",
            s  => s,
        };
        format!(
            "MODE: {}  GALLERY: {}  GESTURE: {}  FEED: {}  PHOTOS: {}  COLOUR: {}  SHAPE: {}  SIZE: {:.1}",
            state.mode().name(),
            if state.is_gallery_open() { "OPEN" } else { "CLOSED" },
            gesture,
            self.feed_state().label(),
            self.controls.photos.len(),
            self.controls.color,
            self.controls.shape.name(),
            self.controls.size,
        )
    }

    // ── Accessors for the render loop ─────────────────────────────────────

    pub fn mode_state(&self) -> &ModeState     { self.machine.state() }
    pub fn instances(&self)  -> &InstanceBuffers { &self.instances }
    pub fn gallery(&self)    -> &GalleryFan     { &self.gallery }
    pub fn controls(&self)   -> &Controls       { &self.controls }
    pub fn star(&self)       -> &TopStar        { &self.star }
    pub fn sign(&self)       -> &GreetingSign   { &self.sign }
    pub fn yaw(&self)        -> f32             { self.yaw }

    pub fn frame(&self) -> Frame<'_> {
        Frame {
            instances: &self.instances,
            yaw:       self.yaw,
            time:      self.time,
            shape:     self.controls.shape,
            star:      &self.star,
            sign:      &self.sign,
            gallery:   self.gallery.items(),
            status:    &self.status,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run(): the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// This is the entry point called from `main.rs`.  It creates the visualizer
/// and the application state (which starts the gesture feed if configured)
/// and drives the input/tick/render loop at ~60 fps.
pub fn run(cfg: AppConfig, source: FeedSource) -> Result<(), AppError> {
    let mut vis = Visualizer::new(
        "Leap Tinsel: Gesture Particle Tree",
        cfg.window_width,
        cfg.window_height,
    )?;
    let mut app = AppState::new(&cfg, source)?;
    let start = Instant::now();

    while vis.is_open() && !app.should_quit() {
        // 1. Window input → simulated hand pose and control actions
        let input = vis.poll_input();
        app.sim_hand(input.hand);
        for action in input.actions {
            app.handle_action(action);
        }

        // 2. Per-frame logic
        app.tick(start.elapsed());

        // 3. Render
        vis.render(&app.frame())?;
    }

    app.stop_feed();
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
