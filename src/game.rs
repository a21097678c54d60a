//! Snake game
//!
//! The MENU/PLAYING/LOSE state machine on top of the loop: translates input
//! into steering and phase changes, feeds frame deltas to the simulation and
//! draws the board.

use glam::{IVec2, Vec2};
use log::{debug, error, info};

use crate::assets::{Font, Texture};
use crate::audio::{AudioManager, SoundEffect};
use crate::consts::{FONT_SIZE, colors};
use crate::engine::{Context, EmitterConfig, Entity, EntityId, Game, ParticleEmitter};
use crate::error::EngineResult;
use crate::platform::{Event, Key, KeyboardState, Platform};
use crate::settings::Settings;
use crate::sim::{self, Direction, GamePhase, GameState, TickOutcome};

/// Offset from the screen corner to the score label (pixels)
const HUD_MARGIN: f32 = 8.0;

/// What the held keys ask for, resolved first-match-wins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Steer(Direction),
    Confirm,
    Cancel,
}

/// Resolve the keyboard snapshot into one command.
///
/// Priority is up, down, left, right, escape; confirm (space or enter) only
/// applies when no steering key is held.
pub fn command_from_keys(keys: &KeyboardState) -> Option<Command> {
    const BINDINGS: [(&[Key], Command); 5] = [
        (&[Key::Up, Key::W], Command::Steer(Direction::Up)),
        (&[Key::Down, Key::S], Command::Steer(Direction::Down)),
        (&[Key::Left, Key::A], Command::Steer(Direction::Left)),
        (&[Key::Right, Key::D], Command::Steer(Direction::Right)),
        (&[Key::Escape], Command::Cancel),
    ];
    for (bound, command) in BINDINGS {
        if keys.any_down(bound) {
            return Some(command);
        }
    }
    if keys.any_down(&[Key::Space, Key::Enter]) {
        return Some(Command::Confirm);
    }
    None
}

/// Drawables owned by the game
#[derive(Debug, Default)]
struct GameAssets {
    snake: Texture,
    apple: Texture,
    menu: Texture,
    font: Font,
    banner: Texture,
    score_label: Texture,
    final_score: Texture,
}

impl GameAssets {
    fn load(platform: &mut dyn Platform, settings: &Settings) -> Self {
        let dir = &settings.asset_dir;
        let font = Font::load(platform, &dir.join("font.ttf"), FONT_SIZE);
        let banner = Texture::from_text(platform, &font, "GAME OVER", colors::BANNER_TEXT);
        Self {
            snake: Texture::load(platform, &dir.join("snake.png")),
            apple: Texture::load(platform, &dir.join("apple.png")),
            menu: Texture::load(platform, &dir.join("menu.png")),
            banner,
            font,
            ..Default::default()
        }
    }

    fn set_score_label(&mut self, platform: &mut dyn Platform, score: u32) {
        self.score_label.release(platform);
        self.score_label = Texture::from_text(platform, &self.font, &format!("Score: {}", score), colors::SCORE_TEXT);
    }

    fn set_final_score(&mut self, platform: &mut dyn Platform, score: u32) {
        self.final_score.release(platform);
        self.final_score = Texture::from_text(platform, &self.font, &format!("Final score: {}", score), colors::BANNER_TEXT);
    }

    fn release(&mut self, platform: &mut dyn Platform) {
        self.snake.release(platform);
        self.apple.release(platform);
        self.menu.release(platform);
        self.banner.release(platform);
        self.score_label.release(platform);
        self.final_score.release(platform);
        self.font.release(platform);
    }
}

/// Grid snake game
pub struct SnakeGame {
    settings: Settings,
    seed: u64,
    state: GameState,
    assets: GameAssets,
    audio: AudioManager,
    sparkle: Option<EntityId>,
}

impl SnakeGame {
    pub fn new(settings: Settings, seed: u64) -> EngineResult<Self> {
        let state = GameState::from_settings(&settings, seed)?;
        let audio = AudioManager::new(!settings.sound);
        Ok(Self {
            settings,
            seed,
            state,
            assets: GameAssets::default(),
            audio,
            sparkle: None,
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    /// Registry handle of the apple sparkle, if particles are enabled
    pub fn sparkle(&self) -> Option<EntityId> {
        self.sparkle
    }

    fn cell_to_px(&self, cell: IVec2) -> Vec2 {
        cell.as_vec2() * self.settings.grid_size as f32
    }

    fn apple_center(&self) -> Vec2 {
        self.cell_to_px(self.state.apple) + Vec2::splat(self.settings.grid_size as f32 / 2.0)
    }

    // === Phase changes ===

    fn start_round(&mut self, ctx: &mut Context<'_>) {
        self.assets.final_score.release(ctx.platform);
        if let Err(e) = self.state.start_round() {
            error!("Could not start round: {}", e);
            self.enter_lose(ctx);
            return;
        }
        info!("Round started");
        self.assets.set_score_label(ctx.platform, 0);
        self.sync_sparkle(ctx, true);
    }

    fn enter_lose(&mut self, ctx: &mut Context<'_>) {
        self.state.phase = GamePhase::Lose;
        info!("Round over, score {}", self.state.score);
        self.audio.play(ctx.platform, SoundEffect::GameOver);
        self.assets.set_final_score(ctx.platform, self.state.score);
        self.sync_sparkle(ctx, false);
    }

    fn enter_menu(&mut self, ctx: &mut Context<'_>) {
        self.state.phase = GamePhase::Menu;
        debug!("Back to menu");
        self.assets.final_score.release(ctx.platform);
        self.sync_sparkle(ctx, false);
    }

    fn on_apple_eaten(&mut self, ctx: &mut Context<'_>) {
        self.assets.set_score_label(ctx.platform, self.state.score);
        self.audio.play(ctx.platform, SoundEffect::AppleEaten);
        self.sync_sparkle(ctx, true);
    }

    /// Move the sparkle onto the apple and switch it on or off
    fn sync_sparkle(&self, ctx: &mut Context<'_>, active: bool) {
        let Some(id) = self.sparkle else { return };
        let center = self.apple_center();
        let Some(entity) = ctx.entities.get_mut(id) else { return };
        entity.pos = center;
        if let Some(emitter) = entity.as_emitter_mut() {
            emitter.set_origin(center);
            if !active {
                emitter.clear();
            }
            emitter.set_active(active);
        }
    }

    // === Drawing ===

    fn draw_board(&self, platform: &mut dyn Platform) {
        let apple = self.cell_to_px(self.state.apple);
        self.assets.apple.render(platform, apple.x, apple.y);
        for cell in &self.state.snake.body {
            let px = self.cell_to_px(*cell);
            self.assets.snake.render(platform, px.x, px.y);
        }
    }

    fn draw(&self, ctx: &mut Context<'_>) {
        let center = Vec2::new(ctx.width as f32, ctx.height as f32) / 2.0;
        match self.state.phase {
            GamePhase::Menu => self.assets.menu.render(ctx.platform, 0.0, 0.0),
            GamePhase::Playing => {
                self.draw_board(ctx.platform);
                self.assets.score_label.render(ctx.platform, HUD_MARGIN, HUD_MARGIN);
            }
            GamePhase::Lose => {
                self.draw_board(ctx.platform);
                let line = self.assets.banner.height().max(FONT_SIZE) as f32;
                self.assets
                    .banner
                    .render_centered(ctx.platform, center - Vec2::new(0.0, line / 2.0));
                self.assets
                    .final_score
                    .render_centered(ctx.platform, center + Vec2::new(0.0, line / 2.0));
            }
        }
    }
}

impl Game for SnakeGame {
    fn on_create(&mut self, ctx: &mut Context<'_>) -> EngineResult<()> {
        self.assets = GameAssets::load(ctx.platform, &self.settings);
        if self.settings.sound {
            self.audio.load_all(ctx.platform, &self.settings.asset_dir);
        }

        let capacity = self.settings.max_particles();
        if capacity > 0 {
            let config = EmitterConfig {
                origin: self.apple_center(),
                lifetime_ms: 600.0,
                speed: 0.05,
                rate: self.settings.quality.sparkle_rate(),
                start_scale: 0.5,
                end_scale: 0.1,
                capacity,
            };
            let texture = Texture::load(ctx.platform, &self.settings.asset_dir.join("particle.png"));
            let mut emitter = ParticleEmitter::new(config, texture, self.seed.wrapping_add(1));
            emitter.set_active(false);
            self.sparkle = Some(ctx.entities.add(Entity::emitter(emitter)));
        }

        info!(
            "Snake ready: {}x{} board, {} moves/s, {} quality, {} particles",
            self.state.board.width,
            self.state.board.height,
            self.settings.moves_per_second,
            self.settings.quality.as_str(),
            capacity
        );
        Ok(())
    }

    fn on_event(&mut self, event: &Event, keys: &KeyboardState, ctx: &mut Context<'_>) {
        let Event::KeyDown(_) = event else {
            if let Event::Resized { width, height } = event {
                debug!("Resized to {}x{}", width, height);
            }
            return;
        };

        let command = command_from_keys(keys);
        match (self.state.phase, command) {
            (GamePhase::Menu, Some(Command::Confirm)) => self.start_round(ctx),
            (GamePhase::Playing, Some(Command::Steer(dir))) => {
                if !self.state.snake.steer(dir) {
                    debug!("Ignored reverse of {:?}", self.state.snake.direction);
                }
            }
            (GamePhase::Playing, Some(Command::Cancel)) => self.enter_menu(ctx),
            (GamePhase::Lose, Some(Command::Confirm)) => self.start_round(ctx),
            (GamePhase::Lose, Some(Command::Cancel)) => self.enter_menu(ctx),
            _ => {}
        }
    }

    fn on_update(&mut self, dt: f32, ctx: &mut Context<'_>) {
        match sim::advance(&mut self.state, dt) {
            Ok(Some(TickOutcome::Ate)) => self.on_apple_eaten(ctx),
            Ok(Some(TickOutcome::Collided)) => self.enter_lose(ctx),
            Ok(Some(TickOutcome::Moved)) | Ok(None) => {}
            Err(e) => {
                error!("Simulation stopped: {}", e);
                self.enter_lose(ctx);
            }
        }
        self.draw(ctx);
    }

    fn on_destroy(&mut self, ctx: &mut Context<'_>) {
        self.assets.release(ctx.platform);
        self.audio.release(ctx.platform);
        info!("Snake released, last score {}", self.state.score);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::GameLoop;
    use crate::platform::Headless;
    use std::collections::VecDeque;

    fn started(settings: Settings) -> GameLoop<Headless, SnakeGame> {
        let game = SnakeGame::new(settings.clone(), 7).unwrap();
        let mut game_loop = GameLoop::create(
            Headless::new().with_frame_time(100),
            game,
            &settings.title,
            settings.width,
            settings.height,
            settings.vsync,
            settings.fullscreen,
        )
        .unwrap();
        game_loop.begin().unwrap();
        game_loop
    }

    /// Deliver a key press for one iteration, then let go of it
    fn press(game_loop: &mut GameLoop<Headless, SnakeGame>, key: Key) {
        game_loop.platform_mut().push_events([Event::KeyDown(key)]);
        game_loop.step();
        game_loop.platform_mut().keys_mut().release(key);
    }

    fn playing() -> GameLoop<Headless, SnakeGame> {
        let mut game_loop = started(Settings::default());
        game_loop.step();
        press(&mut game_loop, Key::Space);
        assert_eq!(game_loop.game().phase(), GamePhase::Playing);
        game_loop
    }

    #[test]
    fn test_command_priority() {
        let keys = KeyboardState::from_keys([Key::Escape, Key::D, Key::S]);
        assert_eq!(command_from_keys(&keys), Some(Command::Steer(Direction::Down)));
        let keys = KeyboardState::from_keys([Key::Escape, Key::Enter]);
        assert_eq!(command_from_keys(&keys), Some(Command::Cancel));
        let keys = KeyboardState::from_keys([Key::Enter]);
        assert_eq!(command_from_keys(&keys), Some(Command::Confirm));
        assert_eq!(command_from_keys(&KeyboardState::new()), None);
    }

    #[test]
    fn test_menu_shows_menu_drawable() {
        let mut game_loop = started(Settings::default());
        game_loop.step();
        assert_eq!(game_loop.game().phase(), GamePhase::Menu);

        let platform = game_loop.platform();
        let menu_dst = platform.last_frame().iter().find_map(|call| match call {
            crate::platform::DrawCall::Quad { texture, dst, .. } => matches!(
                platform.drawable(*texture),
                Some(crate::platform::headless::Drawable::Image(path)) if path.ends_with("menu.png")
            )
            .then_some(*dst),
            _ => None,
        });
        // Full-screen art anchored at the top-left corner
        let dst = menu_dst.expect("menu drawn");
        assert_eq!((dst.x, dst.y), (0.0, 0.0));
    }

    #[test]
    fn test_confirm_starts_round_with_score_label() {
        let game_loop = playing();
        assert!(game_loop.platform().texts_in_last_frame().contains(&"Score: 0".to_string()));
        // The confirming frame already carries one tick
        assert_eq!(game_loop.game().state().snake.head(), IVec2::new(9, 8));
    }

    #[test]
    fn test_reverse_steer_is_ignored() {
        let mut game_loop = playing();
        press(&mut game_loop, Key::Left);
        assert_eq!(game_loop.game().state().snake.direction, Direction::Right);
        press(&mut game_loop, Key::W);
        assert_eq!(game_loop.game().state().snake.direction, Direction::Up);
    }

    #[test]
    fn test_eating_updates_label_and_plays_sound() {
        let mut game_loop = playing();
        let before = game_loop.game().score();
        let played = game_loop.platform().played().len();
        let state = game_loop.game_mut().state_mut();
        state.apple = state.board.step(state.snake.head(), state.snake.direction);

        game_loop.step();
        assert_eq!(game_loop.game().score(), before + 1);
        assert_eq!(game_loop.platform().played().len(), played + 1);
        let label = format!("Score: {}", before + 1);
        assert!(game_loop.platform().texts_in_last_frame().contains(&label));
    }

    #[test]
    fn test_collision_shows_banner_then_cancel_returns_to_menu() {
        let mut game_loop = playing();
        let state = game_loop.game_mut().state_mut();
        state.apple = IVec2::new(10, 10);
        state.snake.direction = Direction::Left;
        state.snake.body = VecDeque::from([IVec2::new(1, 0), IVec2::new(1, 1), IVec2::new(0, 1), IVec2::new(0, 0)]);

        game_loop.step();
        assert_eq!(game_loop.game().phase(), GamePhase::Lose);
        let texts = game_loop.platform().texts_in_last_frame();
        assert!(texts.contains(&"GAME OVER".to_string()));
        assert!(texts.contains(&format!("Final score: {}", game_loop.game().score())));

        press(&mut game_loop, Key::Escape);
        assert_eq!(game_loop.game().phase(), GamePhase::Menu);
    }

    #[test]
    fn test_confirm_after_loss_starts_fresh() {
        let mut game_loop = playing();
        let state = game_loop.game_mut().state_mut();
        state.score = 4;
        state.phase = GamePhase::Lose;

        press(&mut game_loop, Key::Enter);
        assert_eq!(game_loop.game().phase(), GamePhase::Playing);
        assert_eq!(game_loop.game().score(), 0);
    }

    #[test]
    fn test_sparkle_only_active_while_playing() {
        let mut game_loop = started(Settings::default());
        let id = game_loop.game().sparkle().unwrap();
        let active = |gl: &GameLoop<Headless, SnakeGame>| {
            gl.entities().get(id).and_then(Entity::as_emitter).map(ParticleEmitter::is_active)
        };
        game_loop.step();
        assert_eq!(active(&game_loop), Some(false));

        press(&mut game_loop, Key::Space);
        assert_eq!(active(&game_loop), Some(true));

        press(&mut game_loop, Key::Escape);
        assert_eq!(active(&game_loop), Some(false));
    }

    #[test]
    fn test_particles_off_registers_no_emitter() {
        let settings = Settings {
            particles: false,
            ..Settings::default()
        };
        let game_loop = started(settings);
        assert!(game_loop.game().sparkle().is_none());
        assert!(game_loop.entities().is_empty());
    }

    #[test]
    fn test_teardown_releases_everything() {
        let mut game_loop = playing();
        assert!(game_loop.platform().live_resources() > 0);
        game_loop.teardown();
        assert_eq!(game_loop.platform().live_resources(), 0);
    }
}
