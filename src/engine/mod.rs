//! Engine core: loop, timing, entities and particles

pub mod entity;
pub mod frame_rate;
pub mod game_loop;
pub mod particles;

pub use entity::{Behavior, Entity, EntityId, EntityKind, EntityRegistry};
pub use frame_rate::{FrameClock, FrameRateTracker};
pub use game_loop::{Context, Game, GameLoop};
pub use particles::{EmitterConfig, Particle, ParticleEmitter};
