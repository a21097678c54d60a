//! Game loop
//!
//! One iteration, strictly in order:
//!
//! ```text
//!   drain events ─► delta ─► clear ─► game update ─► entities update+render
//!        ─► present ─► frame-rate sample (title on rollover)
//! ```
//!
//! [`GameLoop::start`] runs iterations natively until quit; a host with its
//! own frame callback calls [`GameLoop::begin`] once and [`GameLoop::step`]
//! per frame instead. The iteration body is the same either way.

use log::{debug, error, info};

use super::entity::EntityRegistry;
use super::frame_rate::{FrameClock, FrameRateTracker};
use crate::consts::colors;
use crate::error::EngineResult;
use crate::platform::{Color, Event, KeyboardState, Platform};

/// What a game sees during a callback
pub struct Context<'a> {
    pub platform: &'a mut dyn Platform,
    pub entities: &'a mut EntityRegistry,
    pub width: u32,
    pub height: u32,
}

/// Hooks the loop drives
pub trait Game {
    /// Called once before the first iteration. An error aborts startup.
    fn on_create(&mut self, _ctx: &mut Context<'_>) -> EngineResult<()> {
        Ok(())
    }

    /// Called for every non-quit event, with the keyboard snapshot taken
    /// after the drain.
    fn on_event(&mut self, _event: &Event, _keys: &KeyboardState, _ctx: &mut Context<'_>) {}

    /// Called once per iteration between clear and present. `dt` is in ms.
    fn on_update(&mut self, dt: f32, ctx: &mut Context<'_>);

    /// Called once at teardown, before the registry is released.
    fn on_destroy(&mut self, _ctx: &mut Context<'_>) {}
}

/// Owner of timing, the entity registry, the game and the platform
pub struct GameLoop<P: Platform, G: Game> {
    platform: P,
    game: G,
    entities: EntityRegistry,
    name: String,
    width: u32,
    height: u32,
    clear_color: Color,
    show_fps: bool,
    running: bool,
    started: bool,
    torn_down: bool,
    clock: FrameClock,
    frame_rate: FrameRateTracker,
    iterations: u64,
}

impl<P: Platform, G: Game> GameLoop<P, G> {
    /// Bring up the window and renderer. Failure is fatal to startup.
    pub fn create(
        mut platform: P,
        game: G,
        name: &str,
        width: u32,
        height: u32,
        vsync: bool,
        fullscreen: bool,
    ) -> EngineResult<Self> {
        if let Err(e) = platform
            .create_window(name, width, height, fullscreen)
            .and_then(|_| platform.create_renderer(vsync))
        {
            error!("Startup failed: {}", e);
            platform.shutdown();
            return Err(e);
        }
        info!("Created {} ({}x{}, vsync: {}, fullscreen: {})", name, width, height, vsync, fullscreen);

        let now = platform.now_ms();
        Ok(Self {
            platform,
            game,
            entities: EntityRegistry::new(),
            name: name.to_string(),
            width,
            height,
            clear_color: colors::BACKGROUND,
            show_fps: true,
            running: false,
            started: false,
            torn_down: false,
            clock: FrameClock::new(now),
            frame_rate: FrameRateTracker::new(now),
            iterations: 0,
        })
    }

    /// Embed the FPS in the window title on every rollover
    pub fn with_fps_in_title(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }

    // === Lifecycle ===

    /// Run until a quit event, then tear down.
    pub fn start(&mut self) -> EngineResult<()> {
        self.begin()?;
        while self.running {
            self.step();
        }
        info!("Loop stopped after {} iterations", self.iterations);
        self.teardown();
        Ok(())
    }

    /// Arm the loop: reset timing and call the game's create hook.
    pub fn begin(&mut self) -> EngineResult<()> {
        if self.started {
            return Ok(());
        }
        let now = self.platform.now_ms();
        self.clock = FrameClock::new(now);
        self.frame_rate = FrameRateTracker::new(now);

        let mut ctx = Context {
            platform: &mut self.platform,
            entities: &mut self.entities,
            width: self.width,
            height: self.height,
        };
        self.game.on_create(&mut ctx)?;

        self.started = true;
        self.running = true;
        Ok(())
    }

    /// Drive one iteration. Returns whether the loop should keep running.
    pub fn step(&mut self) -> bool {
        if !self.started || self.torn_down {
            return false;
        }

        // === 1. Drain events ===
        let events = self.platform.poll_events();
        let keys = self.platform.keyboard_state();
        for event in &events {
            if *event == Event::Quit {
                info!("Quit requested");
                self.running = false;
                continue;
            }
            let mut ctx = Context {
                platform: &mut self.platform,
                entities: &mut self.entities,
                width: self.width,
                height: self.height,
            };
            self.game.on_event(event, &keys, &mut ctx);
        }

        // === 2. Delta ===
        let dt = self.clock.delta(self.platform.now_ms());

        // === 3-5. Clear, update, present ===
        self.platform.clear(self.clear_color);
        {
            let mut ctx = Context {
                platform: &mut self.platform,
                entities: &mut self.entities,
                width: self.width,
                height: self.height,
            };
            self.game.on_update(dt, &mut ctx);
        }
        self.entities.update_all(dt);
        self.entities.render_all(&mut self.platform);
        self.platform.present();

        // === 6. Frame rate ===
        let fps = self.frame_rate.on_update(self.platform.now_ms());
        if fps != 0 {
            debug!("{} FPS", fps);
            if self.show_fps {
                let title = format!("{} - {} FPS - {:.0}", self.name, fps, dt);
                self.platform.set_window_title(&title);
            }
        }

        self.iterations += 1;
        self.running
    }

    /// Request a stop at the end of the current iteration
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Run the game's destroy hook, release every entity, then the platform.
    /// Runs once; later calls do nothing.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.running = false;

        if self.started {
            let mut ctx = Context {
                platform: &mut self.platform,
                entities: &mut self.entities,
                width: self.width,
                height: self.height,
            };
            self.game.on_destroy(&mut ctx);
        }
        let count = self.entities.len();
        self.entities.release_all(&mut self.platform);
        self.platform.shutdown();
        info!("Teardown complete ({} entities released)", count);
    }

    // === Accessors ===

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn current_fps(&self) -> u32 {
        self.frame_rate.current_fps()
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut G {
        &mut self.game
    }

    pub fn entities(&self) -> &EntityRegistry {
        &self.entities
    }
}

impl<P: Platform, G: Game> Drop for GameLoop<P, G> {
    fn drop(&mut self) {
        self.teardown();
    }
}
