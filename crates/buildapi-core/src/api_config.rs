// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Per-call configuration handed to every implementation.

use std::fmt;

/// How a call should be carried out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CallType {
    /// Run the implementation for real.
    #[default]
    Call,
    /// Check the input and return before any side effect.
    ValidateOnly,
    /// Skip the implementation and answer with a canned success.
    MockSuccess,
    /// Skip the implementation and answer with a canned failure.
    MockFailure,
    /// Skip the implementation and answer as if the input were invalid.
    MockInvalid,
}

impl fmt::Display for CallType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Call => "call",
            Self::ValidateOnly => "validate-only",
            Self::MockSuccess => "mock-success",
            Self::MockFailure => "mock-failure",
            Self::MockInvalid => "mock-invalid",
        };
        f.write_str(name)
    }
}

/// Call configuration propagated from the caller into implementations.
///
/// The router does not own this flag; it only passes it through and reacts to
/// the validation-only and mock call types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApiConfig {
    /// Selected call type.
    pub call_type: CallType,
}

impl ApiConfig {
    /// Config for a call of the given type.
    pub fn new(call_type: CallType) -> Self {
        Self { call_type }
    }

    /// Config for a validation-only call.
    pub fn validate_only() -> Self {
        Self::new(CallType::ValidateOnly)
    }

    /// Whether implementations must stop after validating their input.
    pub fn is_validate_only(&self) -> bool {
        self.call_type == CallType::ValidateOnly
    }

    /// Whether this is any of the mock call types.
    pub fn is_mock_call(&self) -> bool {
        matches!(
            self.call_type,
            CallType::MockSuccess | CallType::MockFailure | CallType::MockInvalid
        )
    }
}
