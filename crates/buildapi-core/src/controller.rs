// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Implementations, controller modules, and method resolution.
//!
//! Implementations are registered independently of the schema. A service names
//! its controller module, a method names its function inside that module (its
//! own name unless overridden), and [`ImplementationTable::get_implementation`]
//! joins the two at dispatch time.

use crate::api_config::ApiConfig;
use crate::faux::Faux;
use crate::message::{DynMessage, Message, MessageType};
use crate::return_code::ReturnCode;
use crate::schema::{MethodDescriptor, RegistrationError, ServiceDescriptor};
use crate::signature::Shape;
use crate::validate::Validation;
use anyhow::anyhow;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// What an implementation body returns. `Err` is reported as
/// [`ReturnCode::Unrecoverable`] with the error's message.
pub type HandlerResult = anyhow::Result<ReturnCode>;

type InputArg<'a> = Option<&'a dyn DynMessage>;
type OutputArg<'a> = Option<&'a mut dyn DynMessage>;
type CallFn = dyn Fn(InputArg<'_>, OutputArg<'_>, &ApiConfig) -> HandlerResult + Send + Sync;

/// A callable implementing one method, with its parameter shape made explicit.
pub struct Implementation {
    shape: Shape,
    input_type: Option<MessageType>,
    output_type: Option<MessageType>,
    call: Box<CallFn>,
    validation: Option<Validation>,
    faux: Option<Faux>,
}

impl Implementation {
    /// Implementation taking `(input, output, config)`.
    pub fn input_output<I, O, F>(f: F) -> Self
    where
        I: Message,
        O: Message,
        F: Fn(&I, &mut O, &ApiConfig) -> HandlerResult + Send + Sync + 'static,
    {
        Self::from_parts(
            Shape::InputOutput,
            Some(MessageType::of::<I>()),
            Some(MessageType::of::<O>()),
            Box::new(
                move |input: InputArg<'_>, output: OutputArg<'_>, config: &ApiConfig| {
                    f(input_as::<I>(input)?, output_as::<O>(output)?, config)
                },
            ),
        )
    }

    /// Implementation taking `(input, config)`.
    pub fn input_only<I, F>(f: F) -> Self
    where
        I: Message,
        F: Fn(&I, &ApiConfig) -> HandlerResult + Send + Sync + 'static,
    {
        Self::from_parts(
            Shape::InputOnly,
            Some(MessageType::of::<I>()),
            None,
            Box::new(move |input: InputArg<'_>, _: OutputArg<'_>, config: &ApiConfig| {
                f(input_as::<I>(input)?, config)
            }),
        )
    }

    /// Implementation taking `(output, config)`.
    pub fn output_only<O, F>(f: F) -> Self
    where
        O: Message,
        F: Fn(&mut O, &ApiConfig) -> HandlerResult + Send + Sync + 'static,
    {
        Self::from_parts(
            Shape::OutputOnly,
            None,
            Some(MessageType::of::<O>()),
            Box::new(move |_: InputArg<'_>, output: OutputArg<'_>, config: &ApiConfig| {
                f(output_as::<O>(output)?, config)
            }),
        )
    }

    /// Implementation taking only `(config)`.
    pub fn neither<F>(f: F) -> Self
    where
        F: Fn(&ApiConfig) -> HandlerResult + Send + Sync + 'static,
    {
        Self::from_parts(
            Shape::Neither,
            None,
            None,
            Box::new(move |_: InputArg<'_>, _: OutputArg<'_>, config: &ApiConfig| f(config)),
        )
    }

    fn from_parts(
        shape: Shape,
        input_type: Option<MessageType>,
        output_type: Option<MessageType>,
        call: Box<CallFn>,
    ) -> Self {
        Self {
            shape,
            input_type,
            output_type,
            call,
            validation: None,
            faux: None,
        }
    }

    /// Check `validation` against the input before the body runs.
    pub fn with_validation(mut self, validation: Validation) -> Self {
        self.validation = Some(validation);
        self
    }

    /// Answer mock calls with `faux` instead of an error.
    pub fn with_faux(mut self, faux: Faux) -> Self {
        self.faux = Some(faux);
        self
    }

    /// The parameter shape fixed at construction.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Input message type taken, if the shape has an input.
    pub fn input_type(&self) -> Option<MessageType> {
        self.input_type
    }

    /// Output message type taken, if the shape has an output.
    pub fn output_type(&self) -> Option<MessageType> {
        self.output_type
    }

    /// Attached input validation.
    pub fn validation(&self) -> Option<&Validation> {
        self.validation.as_ref()
    }

    /// Attached mock behaviour.
    pub fn faux(&self) -> Option<&Faux> {
        self.faux.as_ref()
    }

    /// Run the body with exactly the messages its shape takes.
    pub(crate) fn call_body(
        &self,
        input: &dyn DynMessage,
        output: &mut dyn DynMessage,
        config: &ApiConfig,
    ) -> HandlerResult {
        match self.shape {
            Shape::InputOutput => (self.call)(Some(input), Some(output), config),
            Shape::InputOnly => (self.call)(Some(input), None, config),
            Shape::OutputOnly => (self.call)(None, Some(output), config),
            Shape::Neither => (self.call)(None, None, config),
        }
    }
}

impl fmt::Debug for Implementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Implementation")
            .field("shape", &self.shape)
            .field("input_type", &self.input_type)
            .field("output_type", &self.output_type)
            .field("validation", &self.validation)
            .field("faux", &self.faux.is_some())
            .finish_non_exhaustive()
    }
}

fn input_as<'a, I: Message>(input: Option<&'a dyn DynMessage>) -> anyhow::Result<&'a I> {
    input
        .and_then(|m| m.downcast_ref::<I>())
        .ok_or_else(|| anyhow!("input is not a {}", I::FULL_NAME))
}

fn output_as<'a, O: Message>(output: Option<&'a mut dyn DynMessage>) -> anyhow::Result<&'a mut O> {
    output
        .and_then(|m| m.downcast_mut::<O>())
        .ok_or_else(|| anyhow!("output is not a {}", O::FULL_NAME))
}

/// A named group of implementation functions.
#[derive(Debug)]
pub struct ControllerModule {
    name: String,
    functions: BTreeMap<String, Implementation>,
}

impl ControllerModule {
    /// An empty module.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            functions: BTreeMap::new(),
        }
    }

    /// Add a function. A later function with the same name replaces the earlier one.
    pub fn with_function(
        mut self,
        name: impl Into<String>,
        implementation: Implementation,
    ) -> Self {
        self.functions.insert(name.into(), implementation);
        self
    }

    /// Module name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a function by name.
    pub fn function(&self, name: &str) -> Option<&Implementation> {
        self.functions.get(name)
    }}

/// Why no implementation could be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotFoundReason {
    /// The service declares no controller module.
    NoModule,
    /// The declared module was never registered.
    UnknownModule(String),
    /// The module exists but lacks the function.
    UnknownFunction {
        /// Module searched.
        module: String,
        /// Function name looked up.
        function: String,
    },
}

impl fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoModule => f.write_str("service declares no controller module"),
            Self::UnknownModule(module) => {
                write!(f, "controller module {module} is not registered")
            }
            Self::UnknownFunction { module, function } => {
                write!(f, "controller module {module} has no function {function}")
            }
        }
    }
}

/// A declared method has no resolvable implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no implementation for {service}/{method}: {reason}")]
pub struct ResolveError {
    /// Service name.
    pub service: String,
    /// Method name.
    pub method: String,
    /// What was missing.
    pub reason: NotFoundReason,
}

/// Controller modules keyed by name: the method resolver.
#[derive(Debug, Default)]
pub struct ImplementationTable {
    modules: BTreeMap<String, ControllerModule>,
}

impl ImplementationTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a controller module. Module names are unique.
    pub fn register(&mut self, module: ControllerModule) -> Result<(), RegistrationError> {
        if self.modules.contains_key(module.name()) {
            return Err(RegistrationError::DuplicateModule {
                module: module.name().to_owned(),
            });
        }
        self.modules.insert(module.name().to_owned(), module);
        Ok(())
    }

    /// Locate the implementation of `method` on `service`.
    pub fn get_implementation(
        &self,
        service: &ServiceDescriptor,
        method: &MethodDescriptor,
    ) -> Result<&Implementation, ResolveError> {
        let not_found = |reason| ResolveError {
            service: service.name().to_owned(),
            method: method.name().to_owned(),
            reason,
        };
        let module_name = service.module().ok_or_else(|| not_found(NotFoundReason::NoModule))?;
        let module = self
            .modules
            .get(module_name)
            .ok_or_else(|| not_found(NotFoundReason::UnknownModule(module_name.to_owned())))?;
        module.function(method.implementation_name()).ok_or_else(|| {
            not_found(NotFoundReason::UnknownFunction {
                module: module_name.to_owned(),
                function: method.implementation_name().to_owned(),
            })
        })
    }}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::message::Empty;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(default)]
    struct Count {
        n: u32,
    }

    impl Message for Count {
        const FULL_NAME: &'static str = "test.Count";
    }

    fn service() -> ServiceDescriptor {
        ServiceDescriptor::new("svc.Counter")
            .with_module("counter")
            .with_method(MethodDescriptor::new("Bump").with_output(MessageType::of::<Count>()))
            .with_method(MethodDescriptor::new("Reset").with_implementation_name("reset_all"))
    }

    #[test]
    fn constructors_fix_the_shape() {
        let io =
            Implementation::input_output(|_: &Count, _: &mut Count, _| Ok(ReturnCode::Success));
        let i = Implementation::input_only(|_: &Count, _| Ok(ReturnCode::Success));
        let o = Implementation::output_only(|_: &mut Count, _| Ok(ReturnCode::Success));
        let n = Implementation::neither(|_| Ok(ReturnCode::Success));
        assert_eq!(io.shape(), Shape::InputOutput);
        assert_eq!(i.shape(), Shape::InputOnly);
        assert_eq!(o.shape(), Shape::OutputOnly);
        assert_eq!(n.shape(), Shape::Neither);
        assert_eq!(i.input_type(), Some(MessageType::of::<Count>()));
        assert_eq!(i.output_type(), None);
    }

    #[test]
    fn call_body_passes_only_the_declared_messages() {
        let bump = Implementation::output_only(|out: &mut Count, _| {
            out.n += 1;
            Ok(ReturnCode::Success)
        });
        let mut output: Box<dyn DynMessage> = Box::new(Count::default());
        let code = bump
            .call_body(&Empty {}, output.as_mut(), &ApiConfig::default())
            .unwrap();
        assert_eq!(code, ReturnCode::Success);
        assert_eq!(output.downcast_ref::<Count>().unwrap().n, 1);
    }

    #[test]
    fn resolution_follows_module_and_implementation_name() {
        let mut table = ImplementationTable::new();
        table
            .register(
                ControllerModule::new("counter")
                    .with_function("Bump", Implementation::neither(|_| Ok(ReturnCode::Success)))
                    .with_function(
                        "reset_all",
                        Implementation::neither(|_| Ok(ReturnCode::Success)),
                    ),
            )
            .unwrap();
        let svc = service();
        for method in svc.methods() {
            assert!(table.get_implementation(&svc, method).is_ok(), "{}", method.name());
        }
    }

    #[test]
    fn resolution_failures_name_the_missing_piece() {
        let mut table = ImplementationTable::new();
        let svc = service();
        let bump = svc.method("Bump").unwrap();

        let err = table.get_implementation(&svc, bump).unwrap_err();
        assert_eq!(err.reason, NotFoundReason::UnknownModule("counter".into()));

        table.register(ControllerModule::new("counter")).unwrap();
        let err = table.get_implementation(&svc, bump).unwrap_err();
        assert_eq!(
            err.reason,
            NotFoundReason::UnknownFunction {
                module: "counter".into(),
                function: "Bump".into()
            }
        );

        let orphan = ServiceDescriptor::new("svc.Orphan").with_method(MethodDescriptor::new("Run"));
        let err = table.get_implementation(&orphan, &orphan.methods()[0]).unwrap_err();
        assert_eq!(err.reason, NotFoundReason::NoModule);
    }

    #[test]
    fn duplicate_module_is_rejected() {
        let mut table = ImplementationTable::new();
        let module = ControllerModule::new("counter")
            .with_function("Reset", Implementation::neither(|_| Ok(ReturnCode::Success)))
            .with_function("Bump", Implementation::neither(|_| Ok(ReturnCode::Success)));
        table.register(module).unwrap();

        let err = table.register(ControllerModule::new("counter")).unwrap_err();
        assert_eq!(err, RegistrationError::DuplicateModule { module: "counter".into() });
    }
}
