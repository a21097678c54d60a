//! Entity registry
//!
//! Entities are a closed set of variants dispatched by `match`; `Custom`
//! covers anything else through [`Behavior`]. The registry owns every entity
//! and must release them before the platform shuts down.

use glam::Vec2;

use super::particles::ParticleEmitter;
use crate::assets::Texture;
use crate::platform::{Color, Platform, Rect};

/// Stable handle to a registered entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u32);

/// Open-ended entity behaviour
pub trait Behavior {
    fn update(&mut self, _pos: &mut Vec2, _dt: f32) {}
    fn render(&self, pos: Vec2, platform: &mut dyn Platform);
    fn release(&mut self, _platform: &mut dyn Platform) {}
}

/// What an entity is and how it draws
pub enum EntityKind {
    /// A texture drawn at natural size
    Sprite { texture: Texture },
    /// Filled rectangle anchored at its top-left corner
    Rect { size: Vec2, color: Color },
    /// Filled circle centred on the entity position
    Circle { radius: f32, color: Color },
    /// Particle emitter whose origin follows the entity position
    Emitter(ParticleEmitter),
    Custom(Box<dyn Behavior>),
}

/// A positioned entity
pub struct Entity {
    pub pos: Vec2,
    pub kind: EntityKind,
}

impl Entity {
    pub fn sprite(pos: Vec2, texture: Texture) -> Self {
        Self {
            pos,
            kind: EntityKind::Sprite { texture },
        }
    }

    pub fn rect(pos: Vec2, size: Vec2, color: Color) -> Self {
        Self {
            pos,
            kind: EntityKind::Rect { size, color },
        }
    }

    pub fn circle(center: Vec2, radius: f32, color: Color) -> Self {
        Self {
            pos: center,
            kind: EntityKind::Circle { radius, color },
        }
    }

    pub fn emitter(emitter: ParticleEmitter) -> Self {
        Self {
            pos: emitter.origin(),
            kind: EntityKind::Emitter(emitter),
        }
    }

    pub fn custom(pos: Vec2, behavior: impl Behavior + 'static) -> Self {
        Self {
            pos,
            kind: EntityKind::Custom(Box::new(behavior)),
        }
    }

    pub fn as_emitter(&self) -> Option<&ParticleEmitter> {
        match &self.kind {
            EntityKind::Emitter(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_emitter_mut(&mut self) -> Option<&mut ParticleEmitter> {
        match &mut self.kind {
            EntityKind::Emitter(e) => Some(e),
            _ => None,
        }
    }

    pub fn update(&mut self, dt: f32) {
        match &mut self.kind {
            EntityKind::Emitter(emitter) => {
                emitter.set_origin(self.pos);
                emitter.update(dt);
            }
            EntityKind::Custom(behavior) => behavior.update(&mut self.pos, dt),
            EntityKind::Sprite { .. } | EntityKind::Rect { .. } | EntityKind::Circle { .. } => {}
        }
    }

    pub fn render(&self, platform: &mut dyn Platform) {
        match &self.kind {
            EntityKind::Sprite { texture } => texture.render(platform, self.pos.x, self.pos.y),
            EntityKind::Rect { size, color } => {
                platform.draw_filled_rect(Rect::new(self.pos.x, self.pos.y, size.x, size.y), *color)
            }
            EntityKind::Circle { radius, color } => platform.draw_filled_circle(self.pos, *radius, *color),
            EntityKind::Emitter(emitter) => emitter.render(platform),
            EntityKind::Custom(behavior) => behavior.render(self.pos, platform),
        }
    }

    /// Free any backend resources the entity owns
    pub fn release(&mut self, platform: &mut dyn Platform) {
        match &mut self.kind {
            EntityKind::Sprite { texture } => texture.release(platform),
            EntityKind::Emitter(emitter) => emitter.release(platform),
            EntityKind::Custom(behavior) => behavior.release(platform),
            EntityKind::Rect { .. } | EntityKind::Circle { .. } => {}
        }
    }
}

/// Owner of every entity, iterated once per frame in insertion order
#[derive(Default)]
pub struct EntityRegistry {
    entities: Vec<(EntityId, Entity)>,
    next_id: u32,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entity: Entity) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.push((id, entity));
        id
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|(eid, _)| *eid == id).map(|(_, e)| e)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|(eid, _)| *eid == id).map(|(_, e)| e)
    }

    /// Remove one entity, releasing its resources
    pub fn remove(&mut self, id: EntityId, platform: &mut dyn Platform) -> bool {
        let Some(idx) = self.entities.iter().position(|(eid, _)| *eid == id) else {
            return false;
        };
        let (_, mut entity) = self.entities.remove(idx);
        entity.release(platform);
        true
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn update_all(&mut self, dt: f32) {
        for (_, entity) in self.entities.iter_mut() {
            entity.update(dt);
        }
    }

    pub fn render_all(&self, platform: &mut dyn Platform) {
        for (_, entity) in &self.entities {
            entity.render(platform);
        }
    }

    /// Release and drop every entity
    pub fn release_all(&mut self, platform: &mut dyn Platform) {
        for (_, mut entity) in self.entities.drain(..) {
            entity.release(platform);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::particles::EmitterConfig;
    use crate::platform::{DrawCall, Headless};
    use std::path::Path;

    struct Drifter;

    impl Behavior for Drifter {
        fn update(&mut self, pos: &mut Vec2, dt: f32) {
            pos.x += dt;
        }

        fn render(&self, pos: Vec2, platform: &mut dyn Platform) {
            platform.draw_filled_circle(pos, 1.0, Color::rgb(0, 0, 0));
        }
    }

    #[test]
    fn test_render_dispatch_in_insertion_order() {
        let mut p = Headless::new();
        let mut reg = EntityRegistry::new();
        let red = Color::rgb(255, 0, 0);
        reg.add(Entity::rect(Vec2::new(1.0, 2.0), Vec2::new(3.0, 4.0), red));
        reg.add(Entity::circle(Vec2::new(5.0, 5.0), 2.0, red));

        reg.render_all(&mut p);
        assert_eq!(
            p.pending_draws(),
            &[
                DrawCall::Rect {
                    rect: Rect::new(1.0, 2.0, 3.0, 4.0),
                    color: red
                },
                DrawCall::Circle {
                    center: Vec2::new(5.0, 5.0),
                    radius: 2.0,
                    color: red
                },
            ]
        );
    }

    #[test]
    fn test_custom_behavior_moves_entity() {
        let mut reg = EntityRegistry::new();
        let id = reg.add(Entity::custom(Vec2::ZERO, Drifter));
        reg.update_all(16.0);
        assert_eq!(reg.get(id).unwrap().pos, Vec2::new(16.0, 0.0));
    }

    #[test]
    fn test_emitter_follows_entity() {
        let mut reg = EntityRegistry::new();
        let emitter = ParticleEmitter::new(EmitterConfig::default(), Texture::inert(), 3);
        let id = reg.add(Entity::emitter(emitter));

        reg.get_mut(id).unwrap().pos = Vec2::new(50.0, 60.0);
        reg.update_all(16.0);
        let e = reg.get(id).unwrap().as_emitter().unwrap();
        assert_eq!(e.origin(), Vec2::new(50.0, 60.0));
    }

    #[test]
    fn test_release_all_frees_textures() {
        let mut p = Headless::new();
        let mut reg = EntityRegistry::new();
        let tex = Texture::load(&mut p, Path::new("assets/snake.png"));
        reg.add(Entity::sprite(Vec2::ZERO, tex));
        let ptex = Texture::load(&mut p, Path::new("assets/particle.png"));
        reg.add(Entity::emitter(ParticleEmitter::new(EmitterConfig::default(), ptex, 1)));
        assert_eq!(p.live_resources(), 2);

        reg.release_all(&mut p);
        assert!(reg.is_empty());
        assert_eq!(p.live_resources(), 0);
    }

    #[test]
    fn test_remove() {
        let mut p = Headless::new();
        let mut reg = EntityRegistry::new();
        let a = reg.add(Entity::circle(Vec2::ZERO, 1.0, Color::rgb(0, 0, 0)));
        let b = reg.add(Entity::circle(Vec2::ONE, 1.0, Color::rgb(0, 0, 0)));
        assert!(reg.remove(a, &mut p));
        assert!(!reg.remove(a, &mut p));
        assert_eq!(reg.len(), 1);
        assert!(reg.get(b).is_some());
    }
}
