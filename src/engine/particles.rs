//! Fixed-capacity particle pool
//!
//! Particles live inline in a boxed slice allocated once at construction.
//! New particles are written at a circular cursor, overwriting whatever the
//! slot held, so the oldest write is always the first evicted.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::assets::Texture;
use crate::consts::SECOND_MS;
use crate::platform::Platform;

/// One pooled particle
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Lifetime at spawn (ms)
    pub total_life: f32,
    /// Lifetime left (ms); > 0 whenever `active`
    pub remaining_life: f32,
    pub active: bool,
}

impl Particle {
    /// Fraction of life left, 1.0 at spawn
    pub fn life_fraction(&self) -> f32 {
        if self.total_life > 0.0 {
            (self.remaining_life / self.total_life).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Linear fade: 255 at spawn down to 0, truncated
    pub fn alpha(&self) -> u8 {
        (255.0 * self.life_fraction()) as u8
    }
}

/// Emitter parameters
#[derive(Debug, Clone, PartialEq)]
pub struct EmitterConfig {
    pub origin: Vec2,
    /// Particle lifetime (ms)
    pub lifetime_ms: f32,
    /// Distance per ms per unit of velocity
    pub speed: f32,
    /// Target spawn rate (particles per second)
    pub rate: u32,
    /// Size multiplier at spawn
    pub start_scale: f32,
    /// Size multiplier at death
    pub end_scale: f32,
    pub capacity: usize,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            origin: Vec2::ZERO,
            lifetime_ms: 1000.0,
            speed: 0.5,
            rate: 5,
            start_scale: 1.0,
            end_scale: 0.0,
            capacity: 20_000,
        }
    }
}

/// Ring-buffer particle emitter
#[derive(Debug)]
pub struct ParticleEmitter {
    config: EmitterConfig,
    texture: Texture,
    pool: Box<[Particle]>,
    cursor: usize,
    /// Time into the current spawn second (ms)
    second_elapsed: f32,
    created_this_second: u32,
    active: bool,
    rng: Pcg32,
}

impl ParticleEmitter {
    /// # Panics
    ///
    /// Panics if `config.capacity == 0`.
    pub fn new(config: EmitterConfig, texture: Texture, seed: u64) -> Self {
        assert!(config.capacity > 0, "Particle pool capacity must be positive");
        let pool = vec![Particle::default(); config.capacity].into_boxed_slice();
        Self {
            config,
            texture,
            pool,
            cursor: 0,
            second_elapsed: 0.0,
            created_this_second: 0,
            active: true,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn origin(&self) -> Vec2 {
        self.config.origin
    }

    pub fn set_origin(&mut self, origin: Vec2) {
        self.config.origin = origin;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// An inactive emitter ignores update and render
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn capacity(&self) -> usize {
        self.pool.len()
    }

    /// Slot the next spawn will overwrite
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn particles(&self) -> &[Particle] {
        &self.pool
    }

    pub fn active_count(&self) -> usize {
        self.pool.iter().filter(|p| p.active).count()
    }

    /// Deactivate every slot and restart the spawn second
    pub fn clear(&mut self) {
        for p in self.pool.iter_mut() {
            p.active = false;
        }
        self.second_elapsed = 0.0;
        self.created_this_second = 0;
    }

    /// Spawn one particle at the cursor, overwriting the slot unconditionally.
    /// Returns the slot index written.
    pub fn emit(&mut self) -> usize {
        let slot = self.cursor;
        // Unnormalized: each axis independently in [-1, 1]
        let vel = Vec2::new(
            self.rng.random_range(-1.0..=1.0),
            self.rng.random_range(-1.0..=1.0),
        );
        self.pool[slot] = Particle {
            pos: self.config.origin,
            vel,
            total_life: self.config.lifetime_ms,
            remaining_life: self.config.lifetime_ms,
            active: self.config.lifetime_ms > 0.0,
        };
        self.cursor = (self.cursor + 1) % self.pool.len();
        slot
    }

    /// Advance the emitter by `dt` milliseconds: spawn what is due, then
    /// age and move every live particle.
    pub fn update(&mut self, dt: f32) {
        if !self.active {
            return;
        }
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.spawn_due(dt);
        self.integrate(dt);
    }

    /// Each closed second owes exactly `rate` spawns; only the open
    /// remainder is prorated.
    fn spawn_due(&mut self, dt: f32) {
        self.second_elapsed += dt;
        let rate = self.config.rate;

        let mut owed = 0u64;
        if self.second_elapsed >= SECOND_MS {
            let closed = (self.second_elapsed / SECOND_MS).floor();
            owed += u64::from(rate.saturating_sub(self.created_this_second));
            owed = owed.saturating_add((closed as u64 - 1).saturating_mul(u64::from(rate)));
            self.second_elapsed -= closed * SECOND_MS;
            self.created_this_second = 0;
        }

        let due = ((self.second_elapsed * rate as f32 / SECOND_MS) as u32).min(rate);
        if due > self.created_this_second {
            owed += u64::from(due - self.created_this_second);
            self.created_this_second = due;
        }

        // Writing more than a full pool would only overwrite itself
        let burst = owed.min(self.pool.len() as u64) as usize;
        for _ in 0..burst {
            self.emit();
        }
    }

    fn integrate(&mut self, dt: f32) {
        let speed = self.config.speed;
        for p in self.pool.iter_mut().filter(|p| p.active) {
            p.remaining_life -= dt;
            if p.remaining_life <= 0.0 {
                p.active = false;
                continue;
            }
            p.pos += p.vel * speed * dt;
        }
    }

    /// Draw every live particle faded by its remaining life
    pub fn render(&self, platform: &mut dyn Platform) {
        if !self.active {
            return;
        }
        let EmitterConfig {
            start_scale,
            end_scale,
            ..
        } = self.config;
        for p in self.pool.iter().filter(|p| p.active) {
            let life = p.life_fraction();
            let scale = end_scale + (start_scale - end_scale) * life;
            self.texture.render_ex(platform, p.pos, scale, 0.0, p.alpha());
        }
    }

    /// Free the particle texture
    pub fn release(&mut self, platform: &mut dyn Platform) {
        self.texture.release(platform);
    }
}
