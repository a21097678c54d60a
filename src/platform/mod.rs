//! Platform abstraction layer
//!
//! Everything the game needs from a graphics/audio/windowing library sits
//! behind [`Platform`]:
//! - Window and renderer bring-up
//! - Drawables (images and rendered text), fonts, audio clips
//! - Immediate-mode drawing
//! - Input events and keyboard snapshots
//! - Monotonic time

pub mod headless;
pub mod terminal;

use std::collections::HashSet;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;

pub use headless::{DrawCall, Headless};
pub use terminal::TerminalPlatform;

/// 8-bit RGBA colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// Axis-aligned destination rectangle in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Half-open containment: left/top edges inside, right/bottom outside
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x < self.x + self.w && point.y >= self.y && point.y < self.y + self.h
    }
}

/// Mirroring applied to a textured quad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flip {
    #[default]
    None,
    Horizontal,
    Vertical,
}

/// Backend handle to a drawable (loaded image or rendered text)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// Backend handle to a loaded font
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontId(pub u32);

/// Backend handle to a loaded audio clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClipId(pub u32);

/// Keys the game cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    W,
    A,
    S,
    D,
    Space,
    Enter,
    Escape,
    Other,
}

/// Input/window events drained once per iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Window closed / interrupt requested
    Quit,
    KeyDown(Key),
    KeyUp(Key),
    Resized { width: u32, height: u32 },
}

/// Snapshot of currently held keys
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyboardState {
    held: HashSet<Key>,
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_keys(keys: impl IntoIterator<Item = Key>) -> Self {
        Self {
            held: keys.into_iter().collect(),
        }
    }

    pub fn press(&mut self, key: Key) {
        self.held.insert(key);
    }

    pub fn release(&mut self, key: Key) {
        self.held.remove(&key);
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }

    pub fn is_down(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    /// True if any of `keys` is held
    pub fn any_down(&self, keys: &[Key]) -> bool {
        keys.iter().any(|k| self.is_down(*k))
    }
}

/// The graphics/audio/windowing collaborator.
///
/// Load operations report failure through `Result`; draw and play calls on a
/// handle the backend does not know are silently ignored.
pub trait Platform {
    // === Bring-up ===
    fn create_window(&mut self, title: &str, width: u32, height: u32, fullscreen: bool) -> EngineResult<()>;
    fn create_renderer(&mut self, vsync: bool) -> EngineResult<()>;

    // === Resources ===
    fn load_texture(&mut self, path: &Path) -> EngineResult<TextureId>;
    fn load_font(&mut self, path: &Path, size: u32) -> EngineResult<FontId>;
    fn render_text(&mut self, font: FontId, text: &str, color: Color) -> EngineResult<TextureId>;
    /// Pixel size of a drawable
    fn texture_size(&self, texture: TextureId) -> Option<(u32, u32)>;
    fn free_texture(&mut self, texture: TextureId);
    fn free_font(&mut self, font: FontId);
    fn load_audio(&mut self, path: &Path) -> EngineResult<ClipId>;
    fn play_audio(&mut self, clip: ClipId);
    fn free_audio(&mut self, clip: ClipId);

    // === Drawing ===
    fn clear(&mut self, color: Color);
    fn draw_textured_quad(
        &mut self,
        texture: TextureId,
        dst: Rect,
        angle: f32,
        center: Option<Vec2>,
        flip: Flip,
        alpha: u8,
    );
    fn draw_filled_rect(&mut self, rect: Rect, color: Color);
    fn draw_filled_circle(&mut self, center: Vec2, radius: f32, color: Color);
    fn present(&mut self);
    fn set_window_title(&mut self, title: &str);

    // === Input & time ===
    /// Drain every pending event
    fn poll_events(&mut self) -> Vec<Event>;
    fn keyboard_state(&self) -> KeyboardState;
    fn now_ms(&self) -> u64;

    /// Release the surface and library. Called once, after every resource is freed.
    fn shutdown(&mut self);
}
