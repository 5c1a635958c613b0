// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Signature validation: does an implementation accept what the method declares?
//!
//! Both sides are reduced to a [`Shape`]. The method's shape comes from which
//! of its message types are non-Empty; the implementation's shape is fixed by
//! the typed constructor it was built with. The check runs on every call,
//! before the implementation is invoked.
//!
//! Two failure kinds are kept apart:
//!
//! - [`SignatureError::Mismatch`] / [`SignatureError::WrongMessageType`]: the
//!   parameter list plainly disagrees with the declaration.
//! - [`SignatureError::UnsatisfiedContract`]: the method exchanges exactly one
//!   message and the implementation takes no output parameter, so it can
//!   never see the message the method is about. This is the zero-parameter
//!   (or input-only-for-output) implementation failing its own precondition.

use crate::controller::Implementation;
use crate::message::MessageType;
use crate::schema::MethodDescriptor;
use std::fmt;
use thiserror::Error;

/// Which of {input, output} a callable takes, in `(input, output)` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// `(input, output)`
    InputOutput,
    /// `(input)`
    InputOnly,
    /// `(output)`
    OutputOnly,
    /// `()`
    Neither,
}

impl Shape {
    /// Shape for the given sides.
    pub fn from_sides(input: bool, output: bool) -> Self {
        match (input, output) {
            (true, true) => Self::InputOutput,
            (true, false) => Self::InputOnly,
            (false, true) => Self::OutputOnly,
            (false, false) => Self::Neither,
        }
    }

    /// Whether an input message parameter is part of the shape.
    pub fn takes_input(self) -> bool {
        matches!(self, Self::InputOutput | Self::InputOnly)
    }

    /// Whether an output message parameter is part of the shape.
    pub fn takes_output(self) -> bool {
        matches!(self, Self::InputOutput | Self::OutputOnly)
    }

    /// Number of message parameters.
    pub fn arity(self) -> usize {
        usize::from(self.takes_input()) + usize::from(self.takes_output())
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::InputOutput => "(input, output)",
            Self::InputOnly => "(input)",
            Self::OutputOnly => "(output)",
            Self::Neither => "()",
        })
    }
}

/// Direction of a message parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The request message.
    Input,
    /// The response message.
    Output,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Input => "input",
            Self::Output => "output",
        })
    }
}

/// The implementation cannot be called with what the method declares.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// The parameter list disagrees with the declared messages.
    #[error(
        "signature mismatch for {method}: expected {expected} parameters, \
         implementation takes {actual}"
    )]
    Mismatch {
        /// Method name.
        method: String,
        /// Shape the declaration requires.
        expected: Shape,
        /// Shape the implementation declares.
        actual: Shape,
    },
    /// The shape matches but a parameter is typed for a different message.
    #[error(
        "signature mismatch for {method}: {side} parameter takes {actual}, \
         method declares {declared}"
    )]
    WrongMessageType {
        /// Method name.
        method: String,
        /// Which parameter disagrees.
        side: Side,
        /// Declared message type name.
        declared: &'static str,
        /// Message type name the implementation takes.
        actual: &'static str,
    },
    /// The implementation never receives the one message the method exchanges.
    #[error(
        "unsatisfied contract for {method}: declared {expected} \
         but implementation takes {actual}"
    )]
    UnsatisfiedContract {
        /// Method name.
        method: String,
        /// Shape the declaration requires.
        expected: Shape,
        /// Shape the implementation declares.
        actual: Shape,
    },
}

/// Check that `implementation` can be invoked for `method`.
pub fn check(
    method: &MethodDescriptor,
    implementation: &Implementation,
) -> Result<(), SignatureError> {
    let expected = method.shape();
    let actual = implementation.shape();

    if expected != actual {
        let single_message = expected.arity() == 1;
        if single_message && !actual.takes_output() {
            return Err(SignatureError::UnsatisfiedContract {
                method: method.name().to_owned(),
                expected,
                actual,
            });
        }
        return Err(SignatureError::Mismatch {
            method: method.name().to_owned(),
            expected,
            actual,
        });
    }

    check_side(method, Side::Input, method.input_type(), implementation.input_type())?;
    check_side(method, Side::Output, method.output_type(), implementation.output_type())
}

fn check_side(
    method: &MethodDescriptor,
    side: Side,
    declared: MessageType,
    taken: Option<MessageType>,
) -> Result<(), SignatureError> {
    match taken {
        Some(actual) if actual != declared => Err(SignatureError::WrongMessageType {
            method: method.name().to_owned(),
            side,
            declared: declared.full_name(),
            actual: actual.full_name(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn shape_round_trips_through_sides() {
        for shape in [Shape::InputOutput, Shape::InputOnly, Shape::OutputOnly, Shape::Neither] {
            assert_eq!(Shape::from_sides(shape.takes_input(), shape.takes_output()), shape);
        }
        assert_eq!(Shape::InputOutput.arity(), 2);
        assert_eq!(Shape::Neither.arity(), 0);
    }

    #[test]
    fn shapes_render_as_parameter_lists() {
        assert_eq!(Shape::InputOutput.to_string(), "(input, output)");
        assert_eq!(Shape::Neither.to_string(), "()");
    }
}
