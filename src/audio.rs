//! Audio system
//!
//! Clips are loaded once through the platform; a clip that fails to load stays
//! silent and the game keeps running.

use std::path::Path;

use crate::platform::{ClipId, Platform};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Snake ate the apple
    AppleEaten,
    /// Snake ran into itself
    GameOver,
}

impl SoundEffect {
    pub const ALL: [SoundEffect; 2] = [SoundEffect::AppleEaten, SoundEffect::GameOver];

    /// File name inside the asset directory
    pub fn file_name(&self) -> &'static str {
        match self {
            SoundEffect::AppleEaten => "nice.wav",
            SoundEffect::GameOver => "lose.wav",
        }
    }

    fn index(&self) -> usize {
        match self {
            SoundEffect::AppleEaten => 0,
            SoundEffect::GameOver => 1,
        }
    }
}

/// Audio manager for the game
#[derive(Debug, Default)]
pub struct AudioManager {
    clips: [Option<ClipId>; 2],
    muted: bool,
}

impl AudioManager {
    pub fn new(muted: bool) -> Self {
        Self {
            clips: [None; 2],
            muted,
        }
    }

    /// Load every effect from `asset_dir`; missing clips are logged and stay silent
    pub fn load_all(&mut self, platform: &mut dyn Platform, asset_dir: &Path) {
        for effect in SoundEffect::ALL {
            let path = asset_dir.join(effect.file_name());
            match platform.load_audio(&path) {
                Ok(clip) => self.clips[effect.index()] = Some(clip),
                Err(e) => log::warn!("Failed to load sound effect: {} - {:?} disabled", e, effect),
            }
        }
    }

    /// Play a sound effect
    pub fn play(&self, platform: &mut dyn Platform, effect: SoundEffect) {
        if self.muted {
            return;
        }
        let Some(clip) = self.clips[effect.index()] else { return };
        platform.play_audio(clip);
    }

    /// Free every loaded clip
    pub fn release(&mut self, platform: &mut dyn Platform) {
        for clip in self.clips.iter_mut() {
            if let Some(id) = clip.take() {
                platform.free_audio(id);
            }
        }
    }
}
