// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Build API router.
//!
//! Maps a `"Service/Method"` call plus a JSON payload onto a registered
//! implementation function:
//!
//! - [`schema`] holds what the protocol declares (services, methods, message types).
//! - [`controller`] holds what actually runs (implementations grouped by controller module).
//! - [`signature`] cross-checks the two before anything is invoked.
//! - [`codec`] turns payloads into typed messages and back.
//! - [`router`] binds the pieces into a single [`Router::route`] call.
//!
//! Registration and dispatch are separate phases: a [`RouterBuilder`] collects
//! schema modules and controller modules, then [`RouterBuilder::build`] freezes
//! them into an immutable [`Router`] that is safe to share across threads.

pub mod api_config;
pub mod codec;
pub mod controller;
pub mod faux;
pub mod message;
pub mod return_code;
pub mod router;
pub mod schema;
pub mod signature;
pub mod validate;

pub use api_config::{ApiConfig, CallType};
pub use codec::CodecError;
pub use controller::{
    ControllerModule, HandlerResult, Implementation, ImplementationTable, ResolveError,
};
pub use faux::Faux;
pub use message::{DynMessage, Empty, Message, MessageType};
pub use return_code::{DispatchResult, ReturnCode};
pub use router::{DispatchRequest, Router, RouterBuilder, RouterError};
pub use schema::{
    LookupError, MethodDescriptor, RegistrationError, SchemaModule, SchemaRegistry,
    ServiceDescriptor, StaticSchema,
};
pub use signature::{Shape, SignatureError};
pub use validate::{Validation, ValidationError};
