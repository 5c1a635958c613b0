// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Canned responses for mock calls.
//!
//! Under a mock call type the implementation body never runs. The attached
//! [`Faux`] decides what the caller sees instead.

use crate::api_config::CallType;
use crate::message::{DynMessage, Message};
use crate::return_code::ReturnCode;
use anyhow::anyhow;
use std::fmt;

type Responder = Box<dyn Fn(&mut dyn DynMessage) -> anyhow::Result<()> + Send + Sync>;

/// Mock-call behaviour attached to an implementation.
#[derive(Default)]
pub struct Faux {
    success: Option<Responder>,
    error: Option<Responder>,
}

impl Faux {
    /// Answer mock calls with the output left at its defaults.
    pub fn all_empty() -> Self {
        Self::default()
    }

    /// Fill the output with `respond` on mock success.
    pub fn success<O, F>(respond: F) -> Self
    where
        O: Message,
        F: Fn(&mut O) + Send + Sync + 'static,
    {
        Self {
            success: Some(responder(respond)),
            error: None,
        }
    }

    /// Also fill the output with `respond` on mock failure.
    pub fn with_error<O, F>(mut self, respond: F) -> Self
    where
        O: Message,
        F: Fn(&mut O) + Send + Sync + 'static,
    {
        self.error = Some(responder(respond));
        self
    }

    /// Produce the mock outcome for `call_type`.
    ///
    /// `output` is `None` when the implementation takes no output message.
    pub fn respond(
        &self,
        call_type: CallType,
        output: Option<&mut dyn DynMessage>,
    ) -> anyhow::Result<ReturnCode> {
        let (responder, code) = match call_type {
            CallType::MockSuccess => (self.success.as_ref(), ReturnCode::Success),
            CallType::MockFailure => {
                (self.error.as_ref(), ReturnCode::UnsuccessfulResponseAvailable)
            }
            CallType::MockInvalid => return Ok(ReturnCode::InvalidInput),
            CallType::Call | CallType::ValidateOnly => {
                return Err(anyhow!("{call_type} is not a mock call"));
            }
        };
        if let (Some(respond), Some(output)) = (responder, output) {
            respond(output)?;
        }
        Ok(code)
    }
}

impl fmt::Debug for Faux {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Faux")
            .field("success", &self.success.is_some())
            .field("error", &self.error.is_some())
            .finish()
    }
}

fn responder<O, F>(respond: F) -> Responder
where
    O: Message,
    F: Fn(&mut O) + Send + Sync + 'static,
{
    Box::new(move |output: &mut dyn DynMessage| -> anyhow::Result<()> {
        let output = output
            .downcast_mut::<O>()
            .ok_or_else(|| anyhow!("mock response expects a {}", O::FULL_NAME))?;
        respond(output);
        Ok(())
    })
}
