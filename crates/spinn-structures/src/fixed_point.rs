// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Fixed-point words.
//!
//! Values are scaled by `2^n_frac`, truncated toward zero and saturated to
//! the range of an `n_bits` integer. Negative values are stored in two's
//! complement within those `n_bits`; the remaining high bits of the `u32`
//! are zero. Saturation is silent.

use serde::{Deserialize, Serialize};

use crate::error::{SpinnDataError, SpinnDataResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FixedPointFormat {
    n_bits: u32,
    n_frac: i32,
    signed: bool,
}

impl Default for FixedPointFormat {
    fn default() -> Self {
        Self::Q16_15
    }
}

impl FixedPointFormat {
    /// Signed 32-bit word with 15 fractional bits
    pub const Q16_15: FixedPointFormat = FixedPointFormat {
        n_bits: 32,
        n_frac: 15,
        signed: true,
    };

    pub fn new(n_bits: u32, n_frac: i32, signed: bool) -> SpinnDataResult<Self> {
        if n_bits == 0 || n_bits > 32 {
            return Err(SpinnDataError::BadParameters(format!(
                "Fixed-point width must be 1..=32 bits, got {}",
                n_bits
            )));
        }
        if !(-32..=32).contains(&n_frac) {
            return Err(SpinnDataError::BadParameters(format!(
                "Fixed-point fractional bits must be -32..=32, got {}",
                n_frac
            )));
        }
        Ok(FixedPointFormat {
            n_bits,
            n_frac,
            signed,
        })
    }

    pub fn n_bits(&self) -> u32 {
        self.n_bits
    }

    pub fn n_frac(&self) -> i32 {
        self.n_frac
    }

    pub fn signed(&self) -> bool {
        self.signed
    }

    /// Inclusive integer range of the raw representation
    fn int_range(&self) -> (i64, i64) {
        if self.signed {
            let half = 1i64 << (self.n_bits - 1);
            (-half, half - 1)
        } else {
            (0, (1i64 << self.n_bits) - 1)
        }
    }

    pub fn to_fixed(&self, value: f64) -> u32 {
        let (min_int, max_int) = self.int_range();
        let scaled = (value * 2f64.powi(self.n_frac)).trunc();
        let raw = if scaled.is_nan() {
            0
        } else {
            scaled.clamp(min_int as f64, max_int as f64) as i64
        };
        let raw = if raw < 0 { raw + (1i64 << self.n_bits) } else { raw };
        raw as u32
    }

    pub fn from_fixed(&self, bits: u32) -> f64 {
        let mask = if self.n_bits == 32 {
            u32::MAX
        } else {
            (1u32 << self.n_bits) - 1
        };
        let mut raw = i64::from(bits & mask);
        if self.signed && raw & (1i64 << (self.n_bits - 1)) != 0 {
            raw -= 1i64 << self.n_bits;
        }
        raw as f64 * 2f64.powi(-self.n_frac)
    }
}

/// Q16.15 encode
pub fn bitsk(value: f64) -> u32 {
    FixedPointFormat::Q16_15.to_fixed(value)
}

/// Q16.15 decode
pub fn kbits(bits: u32) -> f64 {
    FixedPointFormat::Q16_15.from_fixed(bits)
}
