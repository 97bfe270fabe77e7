//! Token usage counters reported by backends.
//!
//! Counters combine by pointwise addition, so the order in which per-call or
//! per-sentence usage is summed never changes the result.

use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

/// Input / output / total token counts for one or more backend calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UsageCounters {
    pub input: u64,
    pub output: u64,
    pub total: u64,
}

impl UsageCounters {
    pub fn new(input: u64, output: u64, total: u64) -> Self {
        Self {
            input,
            output,
            total,
        }
    }

    /// Counters where `total` is derived as `input + output`.
    pub fn from_parts(input: u64, output: u64) -> Self {
        Self::new(input, output, input + output)
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

impl Add for UsageCounters {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            input: self.input + rhs.input,
            output: self.output + rhs.output,
            total: self.total + rhs.total,
        }
    }
}

impl AddAssign for UsageCounters {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for UsageCounters {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl<'a> Sum<&'a UsageCounters> for UsageCounters {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// ---------------------------------------------------------------------------
// Wire shape shared by chat-completions style APIs
// ---------------------------------------------------------------------------

/// `usage` object as returned by chat-completions APIs.  Both the
/// `prompt_tokens` / `completion_tokens` and the `input_tokens` /
/// `output_tokens` spellings are accepted.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ChatUsage {
    #[serde(default, alias = "input_tokens")]
    pub prompt_tokens: Option<u64>,
    #[serde(default, alias = "output_tokens")]
    pub completion_tokens: Option<u64>,
    #[serde(default)]
    pub total_tokens: Option<u64>,
}

impl From<ChatUsage> for UsageCounters {
    fn from(wire: ChatUsage) -> Self {
        let input = wire.prompt_tokens.unwrap_or(0);
        let output = wire.completion_tokens.unwrap_or(0);
        let total = wire.total_tokens.unwrap_or(input + output);
        UsageCounters::new(input, output, total)
    }
}
