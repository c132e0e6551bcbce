//! Scene state and the operations that change it: ticks, resizes and user
//! actions.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use rand::{Rng, SeedableRng};
use sunrise_config::{Config, FieldConfig};
use tracing::{debug, info, trace};

use crate::SkyRng;
use crate::canvas::Canvas;
use crate::celestial::CelestialBody;
use crate::clock::{AnimationClock, ClockState, FpsMeter};
use crate::color::Color;
use crate::compositor::{SceneCompositor, Spark};
use crate::error::SkyError;
use crate::field::ProceduralFields;
use crate::lighting::SkyPose;
use crate::viewport::ViewportExtent;

/// A user command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Hold or release the animation.
    TogglePause,
    /// Enter or leave fullscreen.
    ToggleFullscreen,
    /// Next faster frame rate preset.
    FasterFps,
    /// Next slower frame rate preset.
    SlowerFps,
    /// Show or hide the debug overlay.
    ToggleDebug,
    /// Show or hide the moon.
    ToggleMoon,
}

impl Action {
    /// Key binding: space, `f`, `s`/`+`, `-`, `d`, `m`.
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            ' ' => Some(Self::TogglePause),
            'f' => Some(Self::ToggleFullscreen),
            's' | '+' => Some(Self::FasterFps),
            '-' => Some(Self::SlowerFps),
            'd' => Some(Self::ToggleDebug),
            'm' => Some(Self::ToggleMoon),
            _ => None,
        }
    }
}

/// Something only the window owner can do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowRequest {
    ToggleFullscreen,
}

/// Everything the compositor reads.
#[derive(Debug)]
pub struct SceneState {
    pub viewport: ViewportExtent,
    /// Sky color, recomputed at the start of every tick.
    pub background: Color,
    /// Ticks since startup.
    pub frame: u64,
    /// Debug overlay visible.
    pub debug: bool,
    pub moon_enabled: bool,
    pub sun: CelestialBody,
    pub moon: CelestialBody,
    pub fields: ProceduralFields,
    /// Bumped every time `fields` is replaced.
    pub generation: u64,
    /// Tick interval and pause state.
    pub clock: AnimationClock,
    /// Measured tick rate.
    pub fps: FpsMeter,
    /// Seeds this tick's star twinkle.
    pub twinkle_seed: u64,
    /// This tick's meteor streak, if one was rolled.
    pub spark: Option<Spark>,
}

impl SceneState {
    /// Lighting inputs; the moon only counts while it is shown.
    pub fn pose(&self) -> SkyPose {
        SkyPose::new(&self.sun, self.moon_enabled.then_some(&self.moon))
    }
}

/// The running scene.
#[derive(Debug)]
pub struct Scene {
    state: SceneState,
    compositor: SceneCompositor,
    rng: SkyRng,
    field_config: FieldConfig,
    moon_resync_spread: f64,
}

impl Scene {
    /// Build a scene seeded from `config.field.seed`, or the wall clock.
    pub fn new(config: &Config, viewport: ViewportExtent, now: Instant) -> Result<Self, SkyError> {
        let seed = config.field.seed.unwrap_or_else(wall_clock_seed);
        info!("Seeding sky with {seed}");
        Self::with_rng(config, viewport, SkyRng::seed_from_u64(seed), now)
    }

    /// Build a scene around an existing random stream.
    pub fn with_rng(
        config: &Config,
        viewport: ViewportExtent,
        mut rng: SkyRng,
        now: Instant,
    ) -> Result<Self, SkyError> {
        let animation = &config.animation;
        let sun = CelestialBody::new(animation.start_angle_deg, animation.sun_step_deg, viewport);
        let moon_step = animation.sun_step_deg * animation.moon_step_ratio;
        let mut moon = CelestialBody::new(sun.angle(), moon_step, viewport);
        moon.place(
            sun.angle() + resync_offset(&mut rng, animation.moon_resync_spread_deg),
            viewport,
        );

        let fields = ProceduralFields::generate(&mut rng, viewport, &config.field)?;
        let compositor = SceneCompositor::new(&config.lighting);

        let mut state = SceneState {
            viewport,
            background: Color::ZERO,
            frame: 0,
            debug: config.debug.overlay,
            moon_enabled: animation.moon_enabled,
            sun,
            moon,
            fields,
            generation: 0,
            clock: AnimationClock::new(animation, now),
            fps: FpsMeter::new(),
            twinkle_seed: rng.random(),
            spark: None,
        };
        state.background = compositor.lighting().background(&state.pose());

        Ok(Self {
            state,
            compositor,
            rng,
            field_config: config.field.clone(),
            moon_resync_spread: animation.moon_resync_spread_deg,
        })
    }

    pub fn state(&self) -> &SceneState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SceneState {
        &mut self.state
    }

    pub fn compositor(&self) -> &SceneCompositor {
        &self.compositor
    }

    pub fn viewport(&self) -> ViewportExtent {
        self.state.viewport
    }

    /// Advance the simulation one step. Does nothing while paused.
    ///
    /// The sky color is taken from the lighting before the bodies move, so
    /// the drawn background trails the sun by one tick.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.state.clock.is_running() {
            return false;
        }
        let viewport = self.state.viewport;
        self.state.background = self.compositor.lighting().background(&self.state.pose());
        self.state.frame += 1;
        self.state.sun.advance(viewport);
        if self.state.moon_enabled {
            self.state.moon.advance(viewport);
        }
        self.state.twinkle_seed = self.rng.random();
        self.state.spark = self.compositor.roll_spark(&self.state, &mut self.rng);
        self.state.fps.record(now);
        trace!(
            "Tick {}: sun {:.2}° zenith {:.3}",
            self.state.frame,
            self.state.sun.angle(),
            self.state.sun.zenith()
        );
        true
    }

    /// Run the tick if it is due, then schedule the next one from the moment
    /// the tick finished, as reported by `finished`.
    pub fn poll<F>(&mut self, now: Instant, finished: F) -> bool
    where
        F: FnOnce() -> Instant,
    {
        if !self.state.clock.is_due(now) {
            return false;
        }
        let ticked = self.tick(now);
        self.state.clock.schedule_next(finished().max(now));
        ticked
    }

    /// Time until the next tick, `None` while paused.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.state.clock.time_until_due(now)
    }

    /// Draw the current state. Repainting without a tick draws the same frame.
    pub fn render<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        self.compositor.compose(&self.state, canvas);
    }

    /// Adopt a new viewport: rescale the bodies and regenerate every field.
    ///
    /// Returns `Ok(false)` when nothing changed or the viewport is empty
    /// (minimized window).
    pub fn resize(&mut self, viewport: ViewportExtent) -> Result<bool, SkyError> {
        let old = self.state.viewport;
        if viewport.is_empty() || viewport == old {
            return Ok(false);
        }
        let fields = ProceduralFields::generate(&mut self.rng, viewport, &self.field_config)?;

        self.state.sun.rescale(old, viewport);
        self.state.moon.rescale(old, viewport);
        if old.is_empty() {
            let (sun, moon) = (self.state.sun.angle(), self.state.moon.angle());
            self.state.sun.place(sun, viewport);
            self.state.moon.place(moon, viewport);
        }
        self.state.fields = fields;
        self.state.viewport = viewport;
        self.state.generation += 1;
        info!(
            "Resized {}x{} -> {}x{}, sun radius {}",
            old.width,
            old.height,
            viewport.width,
            viewport.height,
            viewport.sun_radius()
        );
        Ok(true)
    }

    /// Apply a user action. Returns a request for the window owner, if any.
    pub fn apply(&mut self, action: Action, now: Instant) -> Option<WindowRequest> {
        match action {
            Action::TogglePause => {
                self.toggle_hold(now);
            }
            Action::ToggleFullscreen => return Some(WindowRequest::ToggleFullscreen),
            Action::FasterFps => {
                let fps = self.state.clock.faster();
                debug!("Frame rate {fps}");
            }
            Action::SlowerFps => {
                let fps = self.state.clock.slower();
                debug!("Frame rate {fps}");
            }
            Action::ToggleDebug => {
                self.state.debug = !self.state.debug;
                debug!("Debug overlay {}", on_off(self.state.debug));
            }
            Action::ToggleMoon => self.set_moon_enabled(!self.state.moon_enabled),
        }
        None
    }

    /// Hold or release the animation. Releasing ticks immediately so any
    /// change made while held shows at once.
    pub fn toggle_hold(&mut self, now: Instant) -> ClockState {
        let state = self.state.clock.toggle_hold();
        debug!("Animation {state:?}");
        if state == ClockState::Running {
            self.tick(now);
            self.state.clock.schedule_next(now);
        }
        state
    }

    /// Show or hide the moon. Showing it puts it back near the sun.
    pub fn set_moon_enabled(&mut self, enabled: bool) {
        if enabled && !self.state.moon_enabled {
            let offset = resync_offset(&mut self.rng, self.moon_resync_spread);
            let angle = self.state.sun.angle() + offset;
            self.state.moon.place(angle, self.state.viewport);
        }
        self.state.moon_enabled = enabled;
        debug!("Moon {}", on_off(enabled));
    }

    /// Jump the sun to `angle` and refresh the sky color.
    pub fn place_sun(&mut self, angle: f64) {
        self.state.sun.place(angle, self.state.viewport);
        self.refresh_background();
    }

    /// Jump the moon to `angle` and refresh the sky color.
    pub fn place_moon(&mut self, angle: f64) {
        self.state.moon.place(angle, self.state.viewport);
        self.refresh_background();
    }

    fn refresh_background(&mut self) {
        self.state.background = self.compositor.lighting().background(&self.state.pose());
    }
}

fn resync_offset<R: Rng + ?Sized>(rng: &mut R, spread: f64) -> f64 {
    if spread > 0.0 {
        rng.random_range(-spread..=spread)
    } else {
        0.0
    }
}

fn wall_clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::celestial::angular_distance;
    use crate::viewport::DEFAULT_VIEWPORT;

    fn scene(config: &Config, now: Instant) -> Scene {
        Scene::with_rng(config, DEFAULT_VIEWPORT, SkyRng::seed_from_u64(42), now).unwrap()
    }

    #[test]
    fn test_key_bindings() {
        assert_eq!(Action::from_key(' '), Some(Action::TogglePause));
        assert_eq!(Action::from_key('f'), Some(Action::ToggleFullscreen));
        assert_eq!(Action::from_key('s'), Some(Action::FasterFps));
        assert_eq!(Action::from_key('+'), Some(Action::FasterFps));
        assert_eq!(Action::from_key('-'), Some(Action::SlowerFps));
        assert_eq!(Action::from_key('d'), Some(Action::ToggleDebug));
        assert_eq!(Action::from_key('m'), Some(Action::ToggleMoon));
        assert_eq!(Action::from_key('q'), None);
    }

    #[test]
    fn test_moon_starts_near_sun() {
        let scene = scene(&Config::default(), Instant::now());
        let state = scene.state();
        assert_eq!(state.sun.angle(), 170.0);
        assert!(angular_distance(state.moon.angle(), state.sun.angle()) <= 10.0);
        assert!(state.moon.step() > state.sun.step());
    }

    #[test]
    fn test_tick_advances_frame_and_bodies() {
        let now = Instant::now();
        let mut scene = scene(&Config::default(), now);
        let moon_before = scene.state().moon.angle();
        assert!(scene.tick(now));
        let state = scene.state();
        assert_eq!(state.frame, 1);
        assert!((state.sun.angle() - 170.05).abs() < 1e-9);
        assert!(angular_distance(state.moon.angle(), moon_before) > 0.05);
        assert_eq!(state.fps.fps(), 1);
    }

    #[test]
    fn test_paused_tick_changes_nothing() {
        let now = Instant::now();
        let mut scene = scene(&Config::default(), now);
        scene.apply(Action::TogglePause, now);
        let before = scene.state().sun.clone();
        assert!(!scene.tick(now));
        let later = now + Duration::from_secs(5);
        assert!(!scene.poll(later, || later));
        assert_eq!(scene.state().sun, before);
        assert_eq!(scene.state().frame, 0);
        assert_eq!(scene.time_until_due(now), None);
    }

    #[test]
    fn test_release_ticks_immediately() {
        let now = Instant::now();
        let mut scene = scene(&Config::default(), now);
        scene.toggle_hold(now);
        assert_eq!(scene.toggle_hold(now), ClockState::Running);
        assert_eq!(scene.state().frame, 1);
        assert_eq!(scene.time_until_due(now), Some(Duration::from_millis(50)));
    }

    #[test]
    fn test_poll_waits_for_schedule() {
        let now = Instant::now();
        let mut scene = scene(&Config::default(), now);
        assert!(!scene.poll(now, || now));
        let later = now + Duration::from_millis(100);
        assert!(scene.poll(later, || later));
        assert!(!scene.poll(later, || later));
        assert_eq!(scene.state().frame, 1);
    }

    #[test]
    fn test_poll_schedules_from_the_finish_instant() {
        let now = Instant::now();
        let mut slow = scene(&Config::default(), now);
        let due = now + Duration::from_millis(50);
        let finished = due + Duration::from_millis(30);
        assert!(slow.poll(due, || finished));
        assert_eq!(slow.time_until_due(finished), Some(Duration::from_millis(50)));
        let early = finished + Duration::from_millis(49);
        assert!(!slow.poll(early, || early));
        let on_time = finished + Duration::from_millis(50);
        assert!(slow.poll(on_time, || on_time));

        // A finish instant before `now` never schedules into the past.
        let mut fast = scene(&Config::default(), now);
        assert!(fast.poll(due, || now));
        assert_eq!(fast.time_until_due(due), Some(Duration::from_millis(50)));
    }

    #[test]
    fn test_tick_rolls_sparks_only_in_deep_night() {
        let mut config = Config::default();
        config.animation.sun_step_deg = 0.0;
        let now = Instant::now();
        let mut scene = scene(&config, now);
        scene.place_sun(90.0);
        let mut sparks = 0;
        let mut seeds = Vec::new();
        for _ in 0..2000 {
            scene.tick(now);
            sparks += usize::from(scene.state().spark.is_some());
            seeds.push(scene.state().twinkle_seed);
        }
        assert!(sparks > 0 && sparks < 100, "got {sparks}");
        seeds.dedup();
        assert!(seeds.len() > 1900);

        scene.place_sun(270.0);
        for _ in 0..500 {
            scene.tick(now);
            assert!(scene.state().spark.is_none());
        }
    }

    #[test]
    fn test_hidden_moon_stays_put() {
        let mut config = Config::default();
        config.animation.moon_enabled = false;
        let now = Instant::now();
        let mut scene = scene(&config, now);
        let moon = scene.state().moon.angle();
        scene.tick(now);
        assert_eq!(scene.state().moon.angle(), moon);
    }

    #[test]
    fn test_moon_resyncs_when_shown() {
        let mut config = Config::default();
        config.animation.moon_enabled = false;
        let now = Instant::now();
        let mut scene = scene(&config, now);
        scene.place_sun(300.0);
        scene.apply(Action::ToggleMoon, now);
        let state = scene.state();
        assert!(state.moon_enabled);
        assert!(angular_distance(state.moon.angle(), 300.0) <= 10.0);
    }

    #[test]
    fn test_actions() {
        let now = Instant::now();
        let mut scene = scene(&Config::default(), now);
        assert_eq!(
            scene.apply(Action::ToggleFullscreen, now),
            Some(WindowRequest::ToggleFullscreen)
        );
        assert_eq!(scene.apply(Action::ToggleDebug, now), None);
        assert!(scene.state().debug);
        scene.apply(Action::FasterFps, now);
        assert_eq!(scene.state().clock.fps(), 30);
        scene.apply(Action::SlowerFps, now);
        scene.apply(Action::SlowerFps, now);
        assert_eq!(scene.state().clock.fps(), 100);
        scene.apply(Action::ToggleMoon, now);
        assert!(!scene.state().moon_enabled);
    }

    #[test]
    fn test_resize_regenerates() {
        let mut scene = scene(&Config::default(), Instant::now());
        assert!(!scene.resize(DEFAULT_VIEWPORT).unwrap());
        assert!(!scene.resize(ViewportExtent::new(0, 0)).unwrap());
        assert_eq!(scene.state().generation, 0);

        assert!(scene.resize(ViewportExtent::new(800, 600)).unwrap());
        let state = scene.state();
        assert_eq!(state.generation, 1);
        assert_eq!(state.viewport, ViewportExtent::new(800, 600));
        assert_eq!(state.fields.stars.len(), 200);
        assert!((state.sun.radius() - 26.0).abs() < 1e-4);
        assert!(state.fields.stars.iter().all(|s| s.position.x < 800.0));
    }

    #[test]
    fn test_daylight_background() {
        let mut scene = scene(&Config::default(), Instant::now());
        let night = scene.state().background;
        scene.place_moon(90.0);
        scene.place_sun(270.0);
        let day = scene.state().background;
        assert!(day.y > night.y);
        assert!((day.y - 1.0).abs() < 1e-6);
    }
}
