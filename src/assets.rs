//! Owned drawables and fonts
//!
//! A failed load leaves an inert handle: drawing it is a no-op. Handles are
//! not `Clone`; whoever holds one must `release` it before the platform shuts
//! down.

use std::path::Path;

use glam::Vec2;

use crate::platform::{Color, Flip, FontId, Platform, Rect, TextureId};

/// A drawable owned by exactly one holder
#[derive(Debug, Default)]
pub struct Texture {
    id: Option<TextureId>,
    width: u32,
    height: u32,
}

impl Texture {
    /// A texture that draws nothing
    pub fn inert() -> Self {
        Self::default()
    }

    fn from_id(platform: &dyn Platform, id: TextureId) -> Self {
        let (width, height) = platform.texture_size(id).unwrap_or((0, 0));
        Self {
            id: Some(id),
            width,
            height,
        }
    }

    /// Load an image; failures are logged and produce an inert texture
    pub fn load(platform: &mut dyn Platform, path: &Path) -> Self {
        match platform.load_texture(path) {
            Ok(id) => Self::from_id(platform, id),
            Err(e) => {
                log::warn!("Could not load texture: {}", e);
                Self::inert()
            }
        }
    }

    /// Render `text` with `font`; failures are logged and produce an inert texture
    pub fn from_text(platform: &mut dyn Platform, font: &Font, text: &str, color: Color) -> Self {
        let Some(font_id) = font.id else {
            log::warn!("No font loaded, cannot render \"{}\"", text);
            return Self::inert();
        };
        match platform.render_text(font_id, text, color) {
            Ok(id) => Self::from_id(platform, id),
            Err(e) => {
                log::warn!("Could not render text: {}", e);
                Self::inert()
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.id.is_some()
    }

    pub fn id(&self) -> Option<TextureId> {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Draw at natural size with its top-left corner at (x, y)
    pub fn render(&self, platform: &mut dyn Platform, x: f32, y: f32) {
        self.render_ex(platform, Vec2::new(x, y), 1.0, 0.0, 255);
    }

    /// Draw with a size multiplier, rotation (degrees) and alpha
    pub fn render_ex(&self, platform: &mut dyn Platform, pos: Vec2, scale: f32, angle: f32, alpha: u8) {
        let Some(id) = self.id else { return };
        let dst = Rect::new(
            pos.x,
            pos.y,
            self.width as f32 * scale,
            self.height as f32 * scale,
        );
        platform.draw_textured_quad(id, dst, angle, None, Flip::None, alpha);
    }

    /// Draw centered on `center`
    pub fn render_centered(&self, platform: &mut dyn Platform, center: Vec2) {
        let half = Vec2::new(self.width as f32, self.height as f32) / 2.0;
        let pos = center - half;
        self.render(platform, pos.x, pos.y);
    }

    /// Free the backend drawable; the texture becomes inert
    pub fn release(&mut self, platform: &mut dyn Platform) {
        if let Some(id) = self.id.take() {
            platform.free_texture(id);
        }
        self.width = 0;
        self.height = 0;
    }
}

/// A loaded font
#[derive(Debug, Default)]
pub struct Font {
    id: Option<FontId>,
}

impl Font {
    /// Load a font; failures are logged and produce an inert font
    pub fn load(platform: &mut dyn Platform, path: &Path, size: u32) -> Self {
        match platform.load_font(path, size) {
            Ok(id) => Self { id: Some(id) },
            Err(e) => {
                log::warn!("Could not load font: {}", e);
                Self { id: None }
            }
        }
    }

    pub fn release(&mut self, platform: &mut dyn Platform) {
        if let Some(id) = self.id.take() {
            platform.free_font(id);
        }
    }
}
