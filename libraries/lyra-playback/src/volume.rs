//! Volume control with mute memory
//!
//! The level is kept while muted, so unmuting restores it exactly.

/// Volume controller
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    /// Volume level (0.0-1.0)
    level: f32,

    /// Mute state (preserves volume level)
    muted: bool,
}

impl Volume {
    /// Create new volume controller, clamping `level` to `0.0..=1.0`
    pub fn new(level: f32) -> Self {
        Self {
            level: clamp(level),
            muted: false,
        }
    }

    /// Set volume level; setting a level while muted unmutes
    pub fn set_level(&mut self, level: f32) {
        self.level = clamp(level);
        self.muted = false;
    }

    /// Get current volume level, ignoring mute
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Toggle mute state
    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    /// Check if muted
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Gain to hand the audio output: 0.0 if muted, otherwise the level
    pub fn gain(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.level
        }
    }
}

fn clamp(level: f32) -> f32 {
    if level.is_nan() {
        0.0
    } else {
        level.clamp(0.0, 1.0)
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn create_volume() {
        let vol = Volume::default();
        assert_eq!(vol.level(), 0.5);
        assert!(!vol.is_muted());
    }

    #[test]
    fn set_volume_level_clamps() {
        let mut vol = Volume::new(0.5);
        vol.set_level(1.5);
        assert_eq!(vol.level(), 1.0);
        vol.set_level(-0.2);
        assert_eq!(vol.level(), 0.0);
        vol.set_level(f32::NAN);
        assert_eq!(vol.level(), 0.0);
    }

    #[test]
    fn setting_volume_while_muted_unmutes() {
        let mut vol = Volume::new(0.8);
        vol.toggle_mute();
        assert!(vol.is_muted());
        assert_eq!(vol.gain(), 0.0);

        vol.set_level(0.3);
        assert!(!vol.is_muted());
        assert_eq!(vol.gain(), 0.3);
    }

    proptest! {
        #[test]
        fn mute_then_unmute_restores_exact_level(level in 0.0f32..=1.0) {
            let mut vol = Volume::new(level);
            vol.toggle_mute();
            prop_assert_eq!(vol.gain(), 0.0);
            vol.toggle_mute();
            prop_assert_eq!(vol.gain(), level);
        }

        #[test]
        fn level_stays_in_range(level in proptest::num::f32::ANY) {
            let vol = Volume::new(level);
            prop_assert!((0.0..=1.0).contains(&vol.level()));
        }
    }
}
