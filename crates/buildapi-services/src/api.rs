// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! `chromite.api.ApiService` and `chromite.api.MethodService`: introspection of
//! the API itself.

use buildapi_core::{
    ControllerModule, Faux, Implementation, Message, MessageType, MethodDescriptor, ReturnCode,
    ServiceDescriptor, StaticSchema,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Controller module backing both services.
pub const MODULE: &str = "api";
/// Version service name.
pub const API_SERVICE: &str = "chromite.api.ApiService";
/// Method listing service name.
pub const METHOD_SERVICE: &str = "chromite.api.MethodService";

/// Major version of the API surface.
pub const VERSION_MAJOR: u32 = 1;
/// Minor version of the API surface.
pub const VERSION_MINOR: u32 = 0;
/// Bug-fix version of the API surface.
pub const VERSION_BUG: u32 = 0;

/// Version of the API surface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionInfo {
    /// Incremented on incompatible changes.
    pub major: u32,
    /// Incremented when methods are added.
    pub minor: u32,
    /// Incremented on fixes.
    pub bug: u32,
}

impl Message for VersionInfo {
    const FULL_NAME: &'static str = "chromite.api.VersionInfo";
}

/// One registered method.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MethodInfo {
    /// `"Service/Method"`.
    pub method: String,
}

/// Every registered method.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MethodGetResponse {
    /// Registered methods, grouped by service.
    pub methods: Vec<MethodInfo>,
}

impl Message for MethodGetResponse {
    const FULL_NAME: &'static str = "chromite.api.MethodGetResponse";
}

/// Schema for `chromite/api/api.proto`.
pub fn schema() -> StaticSchema {
    StaticSchema::new("chromite/api/api.proto")
        .with_service(
            ServiceDescriptor::new(API_SERVICE)
                .with_module(MODULE)
                .with_method(
                    MethodDescriptor::new("GetVersion")
                        .with_output(MessageType::of::<VersionInfo>()),
                ),
        )
        .with_service(
            ServiceDescriptor::new(METHOD_SERVICE).with_module(MODULE).with_method(
                MethodDescriptor::new("Get")
                    .with_output(MessageType::of::<MethodGetResponse>())
                    .with_implementation_name("GetMethods"),
            ),
        )
}

/// Controller module answering both services.
///
/// `methods` is the full method list, fixed once registration is complete.
pub fn controller(methods: Vec<String>) -> ControllerModule {
    let methods: Arc<[String]> = methods.into();
    let listed = Arc::clone(&methods);
    ControllerModule::new(MODULE)
        .with_function(
            "GetVersion",
            Implementation::output_only(|out: &mut VersionInfo, _| {
                fill_version(out);
                Ok(ReturnCode::Success)
            })
            .with_faux(Faux::success(fill_version)),
        )
        .with_function(
            "GetMethods",
            Implementation::output_only(move |out: &mut MethodGetResponse, _| {
                fill_methods(out, &methods);
                Ok(ReturnCode::Success)
            })
            .with_faux(Faux::success(move |out: &mut MethodGetResponse| {
                fill_methods(out, &listed);
            })),
        )
}

fn fill_version(out: &mut VersionInfo) {
    out.major = VERSION_MAJOR;
    out.minor = VERSION_MINOR;
    out.bug = VERSION_BUG;
}

fn fill_methods(out: &mut MethodGetResponse, methods: &[String]) {
    out.methods = methods
        .iter()
        .map(|method| MethodInfo { method: method.clone() })
        .collect();
}
