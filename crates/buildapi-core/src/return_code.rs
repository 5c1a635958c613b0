// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Call outcomes.

use std::fmt;

/// Outcome of a call.
///
/// Both [`ReturnCode::Success`] and [`ReturnCode::ValidInput`] count as
/// success; callers mapping outcomes to process status treat them alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ReturnCode {
    /// The call ran and succeeded.
    Success = 0,
    /// The call ran and failed; no useful response was produced.
    CompletedUnsuccessfully = 1,
    /// The call failed in a way the caller cannot recover from.
    Unrecoverable = 2,
    /// Validation-only call: the input is valid.
    ValidInput = 3,
    /// The input failed validation.
    InvalidInput = 4,
    /// The call failed but the response describes the failure.
    UnsuccessfulResponseAvailable = 5,
}

impl ReturnCode {
    /// Numeric value of this outcome.
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Whether the call counts as successful (a real success or a valid input check).
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success | Self::ValidInput)
    }

    /// Whether a result with this code carries an encoded output message.
    pub fn carries_output(self) -> bool {
        matches!(
            self,
            Self::Success
                | Self::ValidInput
                | Self::CompletedUnsuccessfully
                | Self::UnsuccessfulResponseAvailable
        )
    }
}

impl fmt::Display for ReturnCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Success => "success",
            Self::CompletedUnsuccessfully => "completed unsuccessfully",
            Self::Unrecoverable => "unrecoverable",
            Self::ValidInput => "valid input",
            Self::InvalidInput => "invalid input",
            Self::UnsuccessfulResponseAvailable => "unsuccessful response available",
        };
        write!(f, "{name} ({})", self.value())
    }
}

/// Result of one routed call, owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchResult {
    /// Outcome of the call.
    pub code: ReturnCode,
    /// Encoded output message, present when `code` carries one.
    pub output: Option<String>,
    /// Human-readable explanation for failures.
    pub message: Option<String>,
}

impl DispatchResult {
    /// Whether the call counts as successful.
    pub fn is_success(&self) -> bool {
        self.code.is_success()
    }
}
