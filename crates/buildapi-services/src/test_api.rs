// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! `chromite.api.TestApiService`: one method per parameter shape, for
//! exercising the router end to end.

use buildapi_core::{
    ControllerModule, Faux, Implementation, Message, MessageType, MethodDescriptor, ReturnCode,
    ServiceDescriptor, StaticSchema, Validation,
};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Controller module backing the service.
pub const MODULE: &str = "test_api";
/// Service name.
pub const SERVICE: &str = "chromite.api.TestApiService";

/// Input of the test methods.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestRequestMessage {
    /// Echoed back in the result.
    pub id: String,
    /// Must name an existing path for `InputMethod`.
    pub path: String,
}

impl Message for TestRequestMessage {
    const FULL_NAME: &'static str = "chromite.api.TestRequestMessage";
}

/// Output of the test methods.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestResultMessage {
    /// What the implementation did.
    pub result: String,
}

impl Message for TestResultMessage {
    const FULL_NAME: &'static str = "chromite.api.TestResultMessage";
}

/// Schema for `chromite/api/test_api.proto`.
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

/// Controller module with an implementation of the matching shape for every method.
pub fn controller() -> ControllerModule {
    ControllerModule::new(MODULE)
        .with_function(
            "InputOutputMethod",
            Implementation::input_output(
                |input: &TestRequestMessage, out: &mut TestResultMessage, _| {
                    out.result = input.id.clone();
                    Ok(ReturnCode::Success)
                },
            )
            .with_validation(Validation::new().require(&["id"]))
            .with_faux(
                Faux::success(|out: &mut TestResultMessage| out.result = "mock success".into())
                    .with_error(|out: &mut TestResultMessage| out.result = "mock failure".into()),
            ),
        )
        .with_function(
            "InputMethod",
            Implementation::input_only(|input: &TestRequestMessage, _| {
                info!(id = %input.id, path = %input.path, "test input received");
                Ok(ReturnCode::Success)
            })
            .with_validation(Validation::new().require(&["id"]).exists(&["path"]))
            .with_faux(Faux::all_empty()),
        )
        .with_function(
            "OutputMethod",
            Implementation::output_only(|out: &mut TestResultMessage, _| {
                out.result = "output".into();
                Ok(ReturnCode::Success)
            })
            .with_faux(Faux::all_empty()),
        )
        .with_function("NoIoMethod", Implementation::neither(|_| Ok(ReturnCode::Success)))
}
