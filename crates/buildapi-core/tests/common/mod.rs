// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(clippy::unwrap_used)]
//! Synthetic schema shared by the router integration tests.

#![allow(dead_code)]

use buildapi_core::{
    ApiConfig, ControllerModule, Implementation, Message, MessageType, MethodDescriptor, ReturnCode,
    Router, ServiceDescriptor, StaticSchema,
};
use serde::{Deserialize, Serialize};

pub const SERVICE: &str = "TestApiService";
pub const MODULE: &str = "test_api";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestRequestMessage {
    pub id: String,
    pub path: String,
}

impl Message for TestRequestMessage {
    const FULL_NAME: &'static str = "chromite.api.TestRequestMessage";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestResultMessage {
    pub result: String,
}

impl Message for TestResultMessage {
    const FULL_NAME: &'static str = "chromite.api.TestResultMessage";
}

/// `TestApiService` with one method per declared shape.
pub fn schema() -> StaticSchema {
    let request = MessageType::of::<TestRequestMessage>();
    let result = MessageType::of::<TestResultMessage>();
    StaticSchema::new("chromite/api/test_api.proto").with_service(
        ServiceDescriptor::new(SERVICE)
            .with_module(MODULE)
            .with_method(
                MethodDescriptor::new("InputOutputMethod")
                    .with_input(request)
                    .with_output(result),
            )
            .with_method(MethodDescriptor::new("InputMethod").with_input(request))
            .with_method(MethodDescriptor::new("OutputMethod").with_output(result))
            .with_method(MethodDescriptor::new("NoIoMethod")),
    )
}

/// `(input, output)`-shaped implementation asserting the message types it receives.
pub fn input_output_impl() -> Implementation {
    Implementation::input_output(
        |input: &TestRequestMessage, output: &mut TestResultMessage, _: &ApiConfig| {
            output.result = format!("handled {}", input.id);
            Ok(ReturnCode::Success)
        },
    )
}

pub fn input_impl() -> Implementation {
    Implementation::input_only(|_: &TestRequestMessage, _: &ApiConfig| Ok(ReturnCode::Success))
}

pub fn output_impl() -> Implementation {
    Implementation::output_only(|output: &mut TestResultMessage, _: &ApiConfig| {
        output.result = "produced".into();
        Ok(ReturnCode::Success)
    })
}

pub fn no_io_impl() -> Implementation {
    Implementation::neither(|_: &ApiConfig| Ok(ReturnCode::Success))
}

/// Router whose only implementation of `method` is `implementation`.
pub fn router_with(method: &str, implementation: Implementation) -> Router {
    let mut builder = Router::builder();
    builder
        .register_schema(&schema())
        .unwrap()
        .register_controller(ControllerModule::new(MODULE).with_function(method, implementation))
        .unwrap();
    builder.build()
}

/// Router with every method backed by the implementation of its own shape.
pub fn matching_router() -> Router {
    let mut builder = Router::builder();
    builder
        .register_schema(&schema())
        .unwrap()
        .register_controller(
            ControllerModule::new(MODULE)
                .with_function("InputOutputMethod", input_output_impl())
                .with_function("InputMethod", input_impl())
                .with_function("OutputMethod", output_impl())
                .with_function("NoIoMethod", no_io_impl()),
        )
        .unwrap();
    builder.build()
}
