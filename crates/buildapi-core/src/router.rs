// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The router: one entry point binding registry, resolver, validator and codec.
//!
//! A [`Router`] is built once from a [`RouterBuilder`] and never mutated
//! afterwards, so concurrent [`Router::route`] calls need no locking. Each call
//! is independent:
//!
//! 1. look the method up in the schema registry;
//! 2. decode the input payload and build an empty output message;
//! 3. resolve the implementation;
//! 4. check the implementation's signature against the declaration;
//! 5. invoke it with the message subset its shape takes (or answer a mock or
//!    validation-only call without running the body);
//! 6. encode the output into a [`DispatchResult`].
//!
//! Steps 1–4 fail the whole call with a [`RouterError`]. Failures reported by
//! the implementation itself come back as a [`ReturnCode`] instead.

use crate::api_config::ApiConfig;
use crate::codec::{self, CodecError};
use crate::controller::{ControllerModule, Implementation, ImplementationTable, ResolveError};
use crate::message::DynMessage;
use crate::return_code::{DispatchResult, ReturnCode};
use crate::schema::{LookupError, RegistrationError, SchemaModule, SchemaRegistry};
use crate::signature::{self, SignatureError};
use thiserror::Error;
use tracing::{debug, debug_span, warn};

/// A call that could not be dispatched.
#[derive(Debug, Error)]
pub enum RouterError {
    /// Unknown service or method.
    #[error(transparent)]
    Lookup(#[from] LookupError),
    /// The method has no implementation.
    #[error(transparent)]
    ImplementationNotFound(#[from] ResolveError),
    /// The implementation's signature does not fit the declaration.
    #[error(transparent)]
    Signature(#[from] SignatureError),
    /// The input could not be decoded or the output encoded.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl RouterError {
    /// Whether this is either kind of signature failure.
    pub fn is_signature_error(&self) -> bool {
        matches!(self, Self::Signature(_))
    }

    /// Whether this is the plain parameter-list mismatch.
    pub fn is_signature_mismatch(&self) -> bool {
        matches!(
            self,
            Self::Signature(
                SignatureError::Mismatch { .. } | SignatureError::WrongMessageType { .. }
            )
        )
    }

    /// Whether this is the distinguished never-receives-its-message failure.
    pub fn is_unsatisfied_contract(&self) -> bool {
        matches!(self, Self::Signature(SignatureError::UnsatisfiedContract { .. }))
    }
}

/// One call, as a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchRequest {
    /// Service name.
    pub service: String,
    /// Method name.
    pub method: String,
    /// JSON-encoded input message.
    pub payload: String,
}

impl DispatchRequest {
    /// A request for `service`/`method` with `payload`.
    pub fn new(
        service: impl Into<String>,
        method: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            service: service.into(),
            method: method.into(),
            payload: payload.into(),
        }
    }
}

/// Registration phase: collects schema and controller modules.
#[derive(Debug, Default)]
pub struct RouterBuilder {
    schema: SchemaRegistry,
    implementations: ImplementationTable,
    pretty_output: bool,
}

impl RouterBuilder {
    /// An empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every service of a compiled schema module.
    pub fn register_schema(
        &mut self,
        module: &dyn SchemaModule,
    ) -> Result<&mut Self, RegistrationError> {
        let added = self.schema.register(module)?;
        debug!(file = module.file_name(), services = added, "registered schema module");
        Ok(self)
    }

    /// Register a controller module.
    pub fn register_controller(
        &mut self,
        module: ControllerModule,
    ) -> Result<&mut Self, RegistrationError> {
        debug!(module = module.name(), "registered controller module");
        self.implementations.register(module)?;
        Ok(self)
    }

    /// The schema registered so far.
    pub fn schema(&self) -> &SchemaRegistry {
        &self.schema
    }

    /// Encode outputs as indented JSON instead of compact JSON.
    pub fn pretty_output(&mut self, pretty: bool) -> &mut Self {
        self.pretty_output = pretty;
        self
    }

    /// Freeze the registrations into a router.
    pub fn build(self) -> Router {
        Router {
            schema: self.schema,
            implementations: self.implementations,
            pretty_output: self.pretty_output,
        }
    }
}

/// Immutable dispatcher from `(service, method, payload)` to an implementation.
#[derive(Debug)]
pub struct Router {
    schema: SchemaRegistry,
    implementations: ImplementationTable,
    pretty_output: bool,
}

impl Router {
    /// Start the registration phase.
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// Every registered `"Service/Method"` pair.
    pub fn list_methods(&self) -> Vec<String> {
        self.schema.method_names()
    }

    /// Dispatch a [`DispatchRequest`].
    pub fn route_request(
        &self,
        request: &DispatchRequest,
        config: &ApiConfig,
    ) -> Result<DispatchResult, RouterError> {
        self.route(&request.service, &request.method, &request.payload, config)
    }

    /// Dispatch one call.
    pub fn route(
        &self,
        service: &str,
        method: &str,
        payload: &str,
        config: &ApiConfig,
    ) -> Result<DispatchResult, RouterError> {
        let span = debug_span!("route", service, method, call_type = %config.call_type);
        let _guard = span.enter();

        let service_desc = self.schema.lookup_service(service)?;
        let method_desc = self.schema.lookup_method(service, method)?;

        let input = codec::decode_input(method_desc, payload)?;
        let mut output = method_desc.output_type().new_instance();
        debug!(input = input.full_name(), output = output.full_name(), "decoded input");

        let implementation = self.implementations.get_implementation(service_desc, method_desc)?;
        if let Err(err) = signature::check(method_desc, implementation) {
            warn!(%err, "rejected implementation signature");
            return Err(err.into());
        }

        let outcome = invoke(implementation, input.as_ref(), output.as_mut(), config);
        let (code, message) = match outcome {
            Ok(outcome) => outcome,
            Err(err) => (ReturnCode::Unrecoverable, Some(format!("{err:#}"))),
        };
        if !code.is_success() {
            warn!(%code, reason = message.as_deref().unwrap_or_default(), "call did not succeed");
        }

        let output = match (code.carries_output(), self.pretty_output) {
            (false, _) => None,
            (true, false) => Some(codec::encode_output(output.as_ref())?),
            (true, true) => Some(codec::encode_output_pretty(output.as_ref())?),
        };
        debug!(%code, "call complete");
        Ok(DispatchResult { code, output, message })
    }
}

/// Mock handling, then validation, then the body.
fn invoke(
    implementation: &Implementation,
    input: &dyn DynMessage,
    output: &mut dyn DynMessage,
    config: &ApiConfig,
) -> anyhow::Result<(ReturnCode, Option<String>)> {
    if config.is_mock_call() {
        let faux = implementation
            .faux()
            .ok_or_else(|| anyhow::anyhow!("mock calls are not supported by this method"))?;
        let output = implementation.shape().takes_output().then_some(output);
        return Ok((faux.respond(config.call_type, output)?, None));
    }

    if let Some(validation) = implementation.validation() {
        if let Err(err) = validation.check(input) {
            debug!(%err, "input failed validation");
            return Ok((ReturnCode::InvalidInput, Some(err.to_string())));
        }
    }

    if config.is_validate_only() {
        return Ok((ReturnCode::ValidInput, None));
    }

    Ok((implementation.call_body(input, output, config)?, None))
}
