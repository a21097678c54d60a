//! Headless platform
//!
//! Records draw calls instead of drawing, replays scripted events and runs on
//! a manual clock. Used by tests and by hosts that drive the loop themselves.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

use glam::Vec2;

use super::{ClipId, Color, Event, Flip, FontId, KeyboardState, Platform, Rect, TextureId};
use crate::error::{EngineError, EngineResult};

/// One recorded drawing command
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Clear(Color),
    Quad {
        texture: TextureId,
        dst: Rect,
        angle: f32,
        alpha: u8,
    },
    Rect {
        rect: Rect,
        color: Color,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
}

/// What a headless drawable was made from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Drawable {
    Image(PathBuf),
    Text(String),
}

#[derive(Debug, Clone)]
struct HeadlessTexture {
    source: Drawable,
    width: u32,
    height: u32,
}

/// Recording backend with a manual clock
#[derive(Debug, Default)]
pub struct Headless {
    clock_ms: u64,
    /// Added to the clock on every `present`
    frame_ms: u64,
    tile_px: u32,
    window: Option<(String, u32, u32)>,
    renderer: bool,
    fail_subsystem: Option<&'static str>,
    missing: HashSet<PathBuf>,
    scripted: VecDeque<Vec<Event>>,
    keys: KeyboardState,
    next_id: u32,
    textures: HashMap<TextureId, HeadlessTexture>,
    fonts: HashMap<FontId, u32>,
    clips: HashMap<ClipId, PathBuf>,
    draws: Vec<DrawCall>,
    last_frame: Vec<DrawCall>,
    frames_presented: u64,
    titles: Vec<String>,
    played: Vec<ClipId>,
    shut_down: bool,
}

impl Headless {
    pub fn new() -> Self {
        Self {
            tile_px: crate::consts::GRID_SIZE,
            next_id: 1,
            ..Default::default()
        }
    }

    /// Advance the clock by `frame_ms` on every present
    pub fn with_frame_time(mut self, frame_ms: u64) -> Self {
        self.frame_ms = frame_ms;
        self
    }

    /// Make bring-up of `subsystem` ("window" or "renderer") fail
    pub fn failing(mut self, subsystem: &'static str) -> Self {
        self.fail_subsystem = Some(subsystem);
        self
    }

    /// Make loads of `path` fail
    pub fn missing(mut self, path: impl Into<PathBuf>) -> Self {
        self.missing.insert(path.into());
        self
    }

    // === Scripting ===

    /// Queue the events returned by one future `poll_events` call
    pub fn push_events(&mut self, events: impl IntoIterator<Item = Event>) {
        self.scripted.push_back(events.into_iter().collect());
    }

    pub fn keys_mut(&mut self) -> &mut KeyboardState {
        &mut self.keys
    }

    // === Inspection ===

    /// Draw calls issued since the last present
    pub fn pending_draws(&self) -> &[DrawCall] {
        &self.draws
    }

    /// Draw calls of the most recently presented frame
    pub fn last_frame(&self) -> &[DrawCall] {
        &self.last_frame
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn played(&self) -> &[ClipId] {
        &self.played
    }

    pub fn drawable(&self, texture: TextureId) -> Option<&Drawable> {
        self.textures.get(&texture).map(|t| &t.source)
    }

    /// Texts of every text drawable drawn in the last frame
    pub fn texts_in_last_frame(&self) -> Vec<String> {
        self.last_frame
            .iter()
            .filter_map(|call| match call {
                DrawCall::Quad { texture, .. } => match self.drawable(*texture) {
                    Some(Drawable::Text(text)) => Some(text.clone()),
                    _ => None,
                },
                _ => None,
            })
            .collect()
    }

    /// Number of live textures, fonts and clips
    pub fn live_resources(&self) -> usize {
        self.textures.len() + self.fonts.len() + self.clips.len()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    fn alloc_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn check_missing(&self, path: &Path) -> EngineResult<()> {
        if self.missing.contains(path) {
            return Err(EngineError::resource(path.display(), "file not found"));
        }
        Ok(())
    }
}

impl Platform for Headless {
    fn create_window(&mut self, title: &str, width: u32, height: u32, _fullscreen: bool) -> EngineResult<()> {
        if self.fail_subsystem == Some("window") {
            return Err(EngineError::init("window", "headless failure requested"));
        }
        self.window = Some((title.to_string(), width, height));
        Ok(())
    }

    fn create_renderer(&mut self, _vsync: bool) -> EngineResult<()> {
        if self.fail_subsystem == Some("renderer") {
            return Err(EngineError::init("renderer", "headless failure requested"));
        }
        if self.window.is_none() {
            return Err(EngineError::init("renderer", "no window"));
        }
        self.renderer = true;
        Ok(())
    }

    fn load_texture(&mut self, path: &Path) -> EngineResult<TextureId> {
        self.check_missing(path)?;
        let id = TextureId(self.alloc_id());
        self.textures.insert(
            id,
            HeadlessTexture {
                source: Drawable::Image(path.to_path_buf()),
                width: self.tile_px,
                height: self.tile_px,
            },
        );
        Ok(id)
    }

    fn load_font(&mut self, path: &Path, size: u32) -> EngineResult<FontId> {
        self.check_missing(path)?;
        let id = FontId(self.alloc_id());
        self.fonts.insert(id, size);
        Ok(id)
    }

    fn render_text(&mut self, font: FontId, text: &str, _color: Color) -> EngineResult<TextureId> {
        let Some(&size) = self.fonts.get(&font) else {
            return Err(EngineError::resource(text, "unknown font"));
        };
        let id = TextureId(self.alloc_id());
        self.textures.insert(
            id,
            HeadlessTexture {
                source: Drawable::Text(text.to_string()),
                width: text.chars().count() as u32 * size / 2,
                height: size,
            },
        );
        Ok(id)
    }

    fn texture_size(&self, texture: TextureId) -> Option<(u32, u32)> {
        self.textures.get(&texture).map(|t| (t.width, t.height))
    }

    fn free_texture(&mut self, texture: TextureId) {
        self.textures.remove(&texture);
    }

    fn free_font(&mut self, font: FontId) {
        self.fonts.remove(&font);
    }

    fn load_audio(&mut self, path: &Path) -> EngineResult<ClipId> {
        self.check_missing(path)?;
        let id = ClipId(self.alloc_id());
        self.clips.insert(id, path.to_path_buf());
        Ok(id)
    }

    fn play_audio(&mut self, clip: ClipId) {
        if self.clips.contains_key(&clip) {
            self.played.push(clip);
        }
    }

    fn free_audio(&mut self, clip: ClipId) {
        self.clips.remove(&clip);
    }

    fn clear(&mut self, color: Color) {
        self.draws.push(DrawCall::Clear(color));
    }

    fn draw_textured_quad(
        &mut self,
        texture: TextureId,
        dst: Rect,
        angle: f32,
        _center: Option<Vec2>,
        _flip: Flip,
        alpha: u8,
    ) {
        if self.textures.contains_key(&texture) {
            self.draws.push(DrawCall::Quad {
                texture,
                dst,
                angle,
                alpha,
            });
        }
    }

    fn draw_filled_rect(&mut self, rect: Rect, color: Color) {
        self.draws.push(DrawCall::Rect { rect, color });
    }

    fn draw_filled_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.draws.push(DrawCall::Circle {
            center,
            radius,
            color,
        });
    }

    fn present(&mut self) {
        self.last_frame = std::mem::take(&mut self.draws);
        self.frames_presented += 1;
        self.clock_ms += self.frame_ms;
    }

    fn set_window_title(&mut self, title: &str) {
        self.titles.push(title.to_string());
    }

    fn poll_events(&mut self) -> Vec<Event> {
        let events = self.scripted.pop_front().unwrap_or_default();
        for event in &events {
            match event {
                Event::KeyDown(key) => self.keys.press(*key),
                Event::KeyUp(key) => self.keys.release(*key),
                _ => {}
            }
        }
        events
    }

    fn keyboard_state(&self) -> KeyboardState {
        self.keys.clone()
    }

    fn now_ms(&self) -> u64 {
        self.clock_ms
    }

    fn shutdown(&mut self) {
        self.renderer = false;
        self.window = None;
        self.shut_down = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Key;

    #[test]
    fn test_bring_up_failure() {
        let mut p = Headless::new().failing("renderer");
        assert!(p.create_window("t", 10, 10, false).is_ok());
        let err = p.create_renderer(false).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_present_rotates_frames_and_clock() {
        let mut p = Headless::new().with_frame_time(16);
        p.clear(Color::rgb(1, 2, 3));
        p.present();
        assert_eq!(p.last_frame(), &[DrawCall::Clear(Color::rgb(1, 2, 3))]);
        assert!(p.pending_draws().is_empty());
        assert_eq!(p.now_ms(), 16);
    }

    #[test]
    fn test_scripted_events_update_keyboard() {
        let mut p = Headless::new();
        p.push_events([Event::KeyDown(Key::W)]);
        p.push_events([Event::KeyUp(Key::W)]);
        assert_eq!(p.poll_events(), vec![Event::KeyDown(Key::W)]);
        assert!(p.keyboard_state().is_down(Key::W));
        p.poll_events();
        assert!(!p.keyboard_state().is_down(Key::W));
        assert!(p.poll_events().is_empty());
    }

    #[test]
    fn test_missing_asset() {
        let mut p = Headless::new().missing("assets/apple.png");
        assert!(p.load_texture(Path::new("assets/apple.png")).is_err());
        assert!(p.load_texture(Path::new("assets/snake.png")).is_ok());
    }
}
