// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use spinn_structures::FixedPointFormat;

/// Conversion of region values into 32-bit words
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordFormatter {
    /// Truncated toward zero, saturating at `0` and `u32::MAX`
    Unsigned,
    /// Truncated toward zero into a two's complement `i32`
    Signed,
    /// Saturating fixed point
    FixedPoint(FixedPointFormat),
}

impl Default for WordFormatter {
    fn default() -> Self {
        WordFormatter::FixedPoint(FixedPointFormat::Q16_15)
    }
}

impl WordFormatter {
    pub fn format(&self, value: f64) -> u32 {
        match self {
            WordFormatter::Unsigned => value as u32,
            WordFormatter::Signed => value as i32 as u32,
            WordFormatter::FixedPoint(format) => format.to_fixed(value),
        }
    }
}
