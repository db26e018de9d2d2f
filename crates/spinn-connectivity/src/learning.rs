// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/// Identity of one learning rule instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LearningRuleId(pub u32);

#[derive(Debug, Clone, PartialEq)]
pub enum LearningRule {
    /// Prescribed error sensitivity: decoders adapt to an error signal
    /// delivered on the rule's own port
    Pes { id: LearningRuleId, learning_rate: f64 },
    /// Any rule the compiler has no implementation for
    Unsupported(String),
}
