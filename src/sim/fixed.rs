//! 16.16-style fixed-point world coordinates.
//!
//! World Z (along the track) and world X (across it) carry 16 fractional
//! bits. The backing store is `i64` so a long session cannot overflow the
//! integer part the way a 32-bit accumulator would.

use std::ops::{Add, AddAssign, Sub};

use serde::{Deserialize, Serialize};

/// Number of fractional bits
pub const FRAC_BITS: u32 = 16;

/// Fixed-point world coordinate with 16 fractional bits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Fx16(i64);

impl Fx16 {
    pub const ZERO: Self = Self(0);

    /// Build from whole world units
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Self(units << FRAC_BITS)
    }

    /// Build from a raw fixed-point value
    #[inline]
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Whole units (floor)
    #[inline]
    pub const fn units(self) -> i64 {
        self.0 >> FRAC_BITS
    }

    #[inline]
    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Longitudinal step for a rider speed: `speed << shift`
    #[inline]
    pub const fn from_speed(speed: i16, shift: u32) -> Self {
        Self((speed as i64) << shift)
    }
}

impl Add for Fx16 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Fx16 {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Fx16 {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}
