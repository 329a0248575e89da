//! Uniform random source consumed by the AI core
//!
//! The core only ever draws 16-bit values and reduces them with modulo, so
//! every decision consumes exactly one draw. That keeps replays stable and
//! lets tests script outcomes with a trivial generator.

use rand::RngCore;
use rand::SeedableRng;
use rand_pcg::Pcg32;

/// Source of uniform 16-bit draws
pub trait RandomSource {
    fn next_u16(&mut self) -> u16;

    /// Uniform value in `0..n` (0 when `n == 0`)
    #[inline]
    fn below(&mut self, n: u16) -> u16 {
        let draw = self.next_u16();
        if n == 0 { 0 } else { draw % n }
    }

    /// Uniform byte
    #[inline]
    fn byte(&mut self) -> u8 {
        (self.next_u16() & 0xFF) as u8
    }

    /// Roll in `0..100`
    #[inline]
    fn percent(&mut self) -> u16 {
        self.below(100)
    }

    /// Uniform offset in `-half..half`
    #[inline]
    fn jitter(&mut self, half: i16) -> i16 {
        let span = (half.max(0) as u16) * 2;
        self.below(span) as i16 - half.max(0)
    }
}

impl<R: RngCore> RandomSource for R {
    #[inline]
    fn next_u16(&mut self) -> u16 {
        (self.next_u32() >> 16) as u16
    }
}

/// Default seeded generator
pub fn seeded(seed: u64) -> Pcg32 {
    Pcg32::seed_from_u64(seed)
}

/// Generator that always returns the same word. Useful for forcing rolls.
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct FixedRng(pub u32);

#[cfg(test)]
impl RngCore for FixedRng {
    fn next_u32(&mut self) -> u32 {
        self.0
    }

    fn next_u64(&mut self) -> u64 {
        u64::from(self.0) << 32 | u64::from(self.0)
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        dst.fill((self.0 >> 24) as u8);
    }
}
