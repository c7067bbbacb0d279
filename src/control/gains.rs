// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Tunable gain set and its persistent image.
//!
//! The gains live in a flat word image so a flash sector can hold them verbatim:
//!
//! | Word | Contents |
//! | ---- | -------- |
//! | 0 | validity marker [`PARAM_MAGIC`] |
//! | 1..=3 | distance loop kp, ki, kd |
//! | 4..=6 | angle loop kp, ki, kd |
//! | 7..=9 | left speed loop kp, ki, kd |
//! | 10..=12 | right speed loop kp, ki, kd |
//!
//! An image with a missing marker or a non-finite gain is treated as blank and the built-in
//! defaults are used instead, so the controller only ever sees valid gains.

use core::convert::Infallible;

use crate::control::pid::Gains;

/// Marker stored in word 0 of a valid image.
pub const PARAM_MAGIC: u32 = 0xDEAD_BEEF;

/// Number of 32-bit words in a parameter image.
pub const PARAM_WORDS: usize = 13;

pub type ParamImage = [u32; PARAM_WORDS];

/// Gains for all four loops of the cascade.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GainSet {
    pub distance: Gains,
    pub angle: Gains,
    pub left_speed: Gains,
    pub right_speed: Gains,
}

impl Default for GainSet {
    fn default() -> Self {
        Self {
            distance: Gains::new(2.0, 0.1, 0.5),
            angle: Gains::new(1.5, 0.0, 0.2),
            left_speed: Gains::new(5.0, 2.5, 0.0),
            right_speed: Gains::new(5.0, 2.5, 0.0),
        }
    }
}

impl GainSet {
    fn loops(&self) -> [Gains; 4] {
        [self.distance, self.angle, self.left_speed, self.right_speed]
    }

    /// Serialize into a marked parameter image.
    pub fn to_image(&self) -> ParamImage {
        let mut image = [0u32; PARAM_WORDS];
        image[0] = PARAM_MAGIC;
        for (i, g) in self.loops().iter().enumerate() {
            let base = 1 + i * 3;
            image[base] = g.kp.to_bits();
            image[base + 1] = g.ki.to_bits();
            image[base + 2] = g.kd.to_bits();
        }
        image
    }

    /// Parse an image. Returns `None` if the marker is missing or any gain is not finite.
    pub fn from_image(image: &ParamImage) -> Option<Self> {
        if image[0] != PARAM_MAGIC {
            return None;
        }

        let mut loops = [Gains::default(); 4];
        for (i, g) in loops.iter_mut().enumerate() {
            let base = 1 + i * 3;
            let kp = f32::from_bits(image[base]);
            let ki = f32::from_bits(image[base + 1]);
            let kd = f32::from_bits(image[base + 2]);
            if !(kp.is_finite() && ki.is_finite() && kd.is_finite()) {
                return None;
            }
            *g = Gains::new(kp, ki, kd);
        }

        Some(Self {
            distance: loops[0],
            angle: loops[1],
            left_speed: loops[2],
            right_speed: loops[3],
        })
    }
}

/// Persistent storage for the gain set.
///
/// `load` never fails: a store that finds no valid image returns defaults.
pub trait GainStore {
    type Error;

    fn load(&mut self) -> GainSet;
    fn save(&mut self, gains: &GainSet) -> Result<(), Self::Error>;
}

/// Gain store backed by a RAM copy of the parameter image.
pub struct RamGainStore {
    image: ParamImage,
}

impl RamGainStore {
    /// A store with no valid image; `load` yields defaults until the first `save`.
    pub const fn blank() -> Self {
        Self {
            image: [0xFFFF_FFFF; PARAM_WORDS],
        }
    }

    /// A store seeded from an existing image (e.g. copied out of flash at boot).
    pub const fn from_image(image: ParamImage) -> Self {
        Self { image }
    }

    #[inline]
    pub fn image(&self) -> &ParamImage {
        &self.image
    }
}

impl GainStore for RamGainStore {
    type Error = Infallible;

    fn load(&mut self) -> GainSet {
        match GainSet::from_image(&self.image) {
            Some(gains) => gains,
            None => {
                log_warn!("gain image invalid, using defaults");
                GainSet::default()
            }
        }
    }

    fn save(&mut self, gains: &GainSet) -> Result<(), Self::Error> {
        self.image = gains.to_image();
        Ok(())
    }
}
