// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Built-in Build API services.
//!
//! [`register_all`] installs every schema module first and the controller
//! modules second, so the method listing served by `chromite.api.MethodService`
//! sees the complete set.

pub mod api;
pub mod test_api;

use buildapi_core::{RegistrationError, RouterBuilder, SchemaModule};

/// Schema modules of the built-in services, in registration order.
pub fn schemas() -> Vec<Box<dyn SchemaModule>> {
    vec![Box::new(api::schema()), Box::new(test_api::schema())]
}

/// Register every built-in service on `builder`.
pub fn register_all(builder: &mut RouterBuilder) -> Result<(), RegistrationError> {
    for schema in schemas() {
        builder.register_schema(schema.as_ref())?;
    }
    let methods = builder.schema().method_names();
    builder
        .register_controller(api::controller(methods))?
        .register_controller(test_api::controller())?;
    Ok(())
}
