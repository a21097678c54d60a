//! Terminal platform using crossterm
//!
//! Pixels are mapped onto character cells: one board cell is two columns wide
//! and one row tall. Image drawables are glyphs picked by asset name, text
//! drawables are printed strings, audio rings the terminal bell.

use std::collections::{HashMap, HashSet};
use std::io::{BufWriter, Stdout, Write, stdout};
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{self, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{self, Attribute, Print},
    terminal,
};
use glam::Vec2;

use super::{ClipId, Color, Event, Flip, FontId, Key, KeyboardState, Platform, Rect, TextureId};
use crate::error::{EngineError, EngineResult};

/// Frame budget when vsync is requested (~60 Hz)
const VSYNC_FRAME: Duration = Duration::from_millis(16);

/// Alpha below which glyphs are drawn dim
const DIM_ALPHA: u8 = 128;

#[derive(Debug, Clone, Copy, PartialEq)]
struct TermCell {
    ch: char,
    fg: Color,
    bg: Color,
    dim: bool,
}

#[derive(Debug, Clone)]
enum Sprite {
    Glyph { ch: char, color: Color },
    Text { text: String, color: Color },
}

/// Glyph used for a known asset stem
fn glyph_for(stem: &str) -> Option<(char, Color)> {
    match stem {
        "snake" => Some(('█', Color::rgb(40, 160, 40))),
        "apple" => Some(('●', Color::rgb(220, 30, 30))),
        "particle" => Some(('*', Color::rgb(255, 220, 60))),
        _ => None,
    }
}

fn to_term_color(c: Color) -> style::Color {
    style::Color::Rgb { r: c.r, g: c.g, b: c.b }
}

fn map_key(code: KeyCode) -> Key {
    match code {
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Escape,
        KeyCode::Char(' ') => Key::Space,
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'w' => Key::W,
            'a' => Key::A,
            's' => Key::S,
            'd' => Key::D,
            _ => Key::Other,
        },
        _ => Key::Other,
    }
}

fn map_key_event(key: KeyEvent) -> Option<Event> {
    let quit = matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL));
    match key.kind {
        KeyEventKind::Press | KeyEventKind::Repeat if quit => Some(Event::Quit),
        KeyEventKind::Press | KeyEventKind::Repeat => Some(Event::KeyDown(map_key(key.code))),
        KeyEventKind::Release => Some(Event::KeyUp(map_key(key.code))),
    }
}

/// Crossterm-backed collaborator
pub struct TerminalPlatform {
    out: BufWriter<Stdout>,
    started: Instant,
    last_present: Instant,
    /// Pixel size of one terminal column / row
    col_px: f32,
    row_px: f32,
    cols: u16,
    rows: u16,
    cells: Vec<TermCell>,
    sprites: HashMap<TextureId, Sprite>,
    fonts: HashSet<FontId>,
    clips: HashSet<ClipId>,
    next_id: u32,
    keys: KeyboardState,
    vsync: bool,
    bell: bool,
    raw_mode: bool,
}

impl TerminalPlatform {
    /// `grid_px` is the size of one board cell in pixels
    pub fn new(grid_px: u32) -> Self {
        let grid = grid_px.max(2) as f32;
        let now = Instant::now();
        Self {
            out: BufWriter::new(stdout()),
            started: now,
            last_present: now,
            col_px: grid / 2.0,
            row_px: grid,
            cols: 0,
            rows: 0,
            cells: Vec::new(),
            sprites: HashMap::new(),
            fonts: HashSet::new(),
            clips: HashSet::new(),
            next_id: 1,
            keys: KeyboardState::new(),
            vsync: false,
            bell: false,
            raw_mode: false,
        }
    }

    fn alloc_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn cell_center(&self, col: u16, row: u16) -> Vec2 {
        Vec2::new(
            (col as f32 + 0.5) * self.col_px,
            (row as f32 + 0.5) * self.row_px,
        )
    }

    fn cell_at(&self, pos: Vec2) -> Option<(u16, u16)> {
        if pos.x < 0.0 || pos.y < 0.0 {
            return None;
        }
        let col = (pos.x / self.col_px) as u16;
        let row = (pos.y / self.row_px) as u16;
        (col < self.cols && row < self.rows).then_some((col, row))
    }

    fn put(&mut self, col: u16, row: u16, ch: char, fg: Color, bg: Option<Color>, dim: bool) {
        let idx = row as usize * self.cols as usize + col as usize;
        if let Some(cell) = self.cells.get_mut(idx) {
            cell.ch = ch;
            cell.fg = fg;
            if let Some(bg) = bg {
                cell.bg = bg;
            }
            cell.dim = dim;
        }
    }

    /// Cells whose centers fall inside `rect`
    fn covered(&self, rect: Rect) -> Vec<(u16, u16)> {
        let mut out = Vec::new();
        for row in 0..self.rows {
            for col in 0..self.cols {
                if rect.contains(self.cell_center(col, row)) {
                    out.push((col, row));
                }
            }
        }
        out
    }

    fn flush_frame(&mut self) -> std::io::Result<()> {
        let mut fg = None;
        let mut bg = None;
        let mut dim = false;
        for row in 0..self.rows {
            queue!(self.out, cursor::MoveTo(0, row))?;
            for col in 0..self.cols {
                let cell = self.cells[row as usize * self.cols as usize + col as usize];
                if fg != Some(cell.fg) {
                    queue!(self.out, style::SetForegroundColor(to_term_color(cell.fg)))?;
                    fg = Some(cell.fg);
                }
                if bg != Some(cell.bg) {
                    queue!(self.out, style::SetBackgroundColor(to_term_color(cell.bg)))?;
                    bg = Some(cell.bg);
                }
                if cell.dim != dim {
                    let attr = if cell.dim { Attribute::Dim } else { Attribute::NormalIntensity };
                    queue!(self.out, style::SetAttribute(attr))?;
                    dim = cell.dim;
                }
                queue!(self.out, Print(cell.ch))?;
            }
        }
        if self.bell {
            queue!(self.out, Print('\x07'))?;
            self.bell = false;
        }
        queue!(self.out, style::ResetColor)?;
        self.out.flush()
    }

    fn restore(&mut self) -> std::io::Result<()> {
        execute!(self.out, style::ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }
}

impl Platform for TerminalPlatform {
    fn create_window(&mut self, title: &str, width: u32, height: u32, fullscreen: bool) -> EngineResult<()> {
        terminal::enable_raw_mode().map_err(|e| EngineError::init("window", e))?;
        self.raw_mode = true;
        execute!(
            self.out,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::SetTitle(title)
        )
        .map_err(|e| EngineError::init("window", e))?;

        self.cols = (width as f32 / self.col_px) as u16;
        self.rows = (height as f32 / self.row_px) as u16;

        if let Ok((term_cols, term_rows)) = terminal::size() {
            if term_cols < self.cols || term_rows < self.rows {
                log::warn!(
                    "Terminal is {}x{}, game needs {}x{} - output will be clipped",
                    term_cols,
                    term_rows,
                    self.cols,
                    self.rows
                );
            }
        }
        if fullscreen {
            log::debug!("Fullscreen has no meaning in a terminal; ignored");
        }
        log::info!("Terminal surface {}x{} cells", self.cols, self.rows);
        Ok(())
    }

    fn create_renderer(&mut self, vsync: bool) -> EngineResult<()> {
        if self.cols == 0 || self.rows == 0 {
            return Err(EngineError::init("renderer", "window has no cells"));
        }
        self.vsync = vsync;
        let blank = TermCell {
            ch: ' ',
            fg: Color::rgb(255, 255, 255),
            bg: Color::rgb(0, 0, 0),
            dim: false,
        };
        self.cells = vec![blank; self.cols as usize * self.rows as usize];
        Ok(())
    }

    fn load_texture(&mut self, path: &Path) -> EngineResult<TextureId> {
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        let sprite = match glyph_for(stem) {
            Some((ch, color)) => Sprite::Glyph { ch, color },
            None if stem == "menu" => Sprite::Text {
                text: "S N A K E   -   press SPACE to play, Q to quit".to_string(),
                color: Color::rgb(255, 255, 255),
            },
            None => return Err(EngineError::resource(path.display(), "no terminal glyph for asset")),
        };
        let id = TextureId(self.alloc_id());
        self.sprites.insert(id, sprite);
        Ok(id)
    }

    fn load_font(&mut self, _path: &Path, _size: u32) -> EngineResult<FontId> {
        let id = FontId(self.alloc_id());
        self.fonts.insert(id);
        Ok(id)
    }

    fn render_text(&mut self, font: FontId, text: &str, color: Color) -> EngineResult<TextureId> {
        if !self.fonts.contains(&font) {
            return Err(EngineError::resource(text, "unknown font"));
        }
        let id = TextureId(self.alloc_id());
        self.sprites.insert(
            id,
            Sprite::Text {
                text: text.to_string(),
                color,
            },
        );
        Ok(id)
    }

    fn texture_size(&self, texture: TextureId) -> Option<(u32, u32)> {
        match self.sprites.get(&texture)? {
            Sprite::Glyph { .. } => Some((self.row_px as u32, self.row_px as u32)),
            Sprite::Text { text, .. } => Some((
                (text.chars().count() as f32 * self.col_px) as u32,
                self.row_px as u32,
            )),
        }
    }

    fn free_texture(&mut self, texture: TextureId) {
        self.sprites.remove(&texture);
    }

    fn free_font(&mut self, font: FontId) {
        self.fonts.remove(&font);
    }

    fn load_audio(&mut self, _path: &Path) -> EngineResult<ClipId> {
        let id = ClipId(self.alloc_id());
        self.clips.insert(id);
        Ok(id)
    }

    fn play_audio(&mut self, clip: ClipId) {
        if self.clips.contains(&clip) {
            self.bell = true;
        }
    }

    fn free_audio(&mut self, clip: ClipId) {
        self.clips.remove(&clip);
    }

    fn clear(&mut self, color: Color) {
        for cell in &mut self.cells {
            cell.ch = ' ';
            cell.bg = color;
            cell.dim = false;
        }
    }

    fn draw_textured_quad(
        &mut self,
        texture: TextureId,
        dst: Rect,
        _angle: f32,
        _center: Option<Vec2>,
        _flip: Flip,
        alpha: u8,
    ) {
        let Some(sprite) = self.sprites.get(&texture).cloned() else {
            return;
        };
        let dim = alpha < DIM_ALPHA;
        match sprite {
            Sprite::Glyph { ch, color } => {
                let mut cells = self.covered(dst);
                if cells.is_empty() {
                    cells.extend(self.cell_at(dst.center()));
                }
                for (col, row) in cells {
                    self.put(col, row, ch, color, None, dim);
                }
            }
            Sprite::Text { text, color } => {
                let Some((col, row)) = self.cell_at(Vec2::new(dst.x, dst.y)) else {
                    return;
                };
                for (i, ch) in text.chars().enumerate() {
                    let col = col + i as u16;
                    if col >= self.cols {
                        break;
                    }
                    self.put(col, row, ch, color, None, dim);
                }
            }
        }
    }

    fn draw_filled_rect(&mut self, rect: Rect, color: Color) {
        for (col, row) in self.covered(rect) {
            self.put(col, row, ' ', color, Some(color), false);
        }
    }

    fn draw_filled_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        let bounds = Rect::new(center.x - radius, center.y - radius, radius * 2.0, radius * 2.0);
        for (col, row) in self.covered(bounds) {
            if self.cell_center(col, row).distance(center) <= radius {
                self.put(col, row, ' ', color, Some(color), false);
            }
        }
    }

    fn present(&mut self) {
        if let Err(e) = self.flush_frame() {
            log::warn!("Terminal present failed: {}", e);
        }
        if self.vsync {
            let elapsed = self.last_present.elapsed();
            if elapsed < VSYNC_FRAME {
                thread::sleep(VSYNC_FRAME - elapsed);
            }
        }
        self.last_present = Instant::now();
    }

    fn set_window_title(&mut self, title: &str) {
        if let Err(e) = execute!(self.out, terminal::SetTitle(title)) {
            log::debug!("Failed to set terminal title: {}", e);
        }
    }

    fn poll_events(&mut self) -> Vec<Event> {
        // Terminals rarely report key releases, so the snapshot holds the
        // keys pressed during this drain only.
        self.keys.clear();
        let mut events = Vec::new();
        loop {
            match event::poll(Duration::ZERO) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    log::error!("Terminal input failed: {}", e);
                    events.push(Event::Quit);
                    break;
                }
            }
            let mapped = match event::read() {
                Ok(event::Event::Key(key)) => map_key_event(key),
                Ok(event::Event::Resize(w, h)) => Some(Event::Resized {
                    width: (w as f32 * self.col_px) as u32,
                    height: (h as f32 * self.row_px) as u32,
                }),
                Ok(_) => None,
                Err(e) => {
                    log::error!("Terminal input failed: {}", e);
                    Some(Event::Quit)
                }
            };
            if let Some(ev) = mapped {
                match ev {
                    Event::KeyDown(key) => self.keys.press(key),
                    Event::KeyUp(key) => self.keys.release(key),
                    _ => {}
                }
                events.push(ev);
            }
        }
        events
    }

    fn keyboard_state(&self) -> KeyboardState {
        self.keys.clone()
    }

    fn now_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    fn shutdown(&mut self) {
        if !self.raw_mode {
            return;
        }
        self.raw_mode = false;
        self.sprites.clear();
        self.fonts.clear();
        self.clips.clear();
        if let Err(e) = self.restore() {
            log::error!("Failed to restore terminal: {}", e);
        }
    }
}

impl Drop for TerminalPlatform {
    fn drop(&mut self) {
        self.shutdown();
    }
}
