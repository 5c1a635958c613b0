// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Schema registry: the services and methods the protocol declares.
//!
//! Schema modules (one per compiled service-definition file) are ingested
//! whole. A service name can only be registered once, and a module that fails
//! registration leaves the registry untouched.

use crate::message::MessageType;
use crate::signature::Shape;
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

/// Declared shape of one RPC method.
///
/// Both message types are always present; a side with nothing to exchange is
/// the [`Empty`](crate::Empty) sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    name: String,
    input_type: MessageType,
    output_type: MessageType,
    implementation_name: Option<String>,
}

impl MethodDescriptor {
    /// A method exchanging nothing in either direction.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            input_type: MessageType::empty(),
            output_type: MessageType::empty(),
            implementation_name: None,
        }
    }

    /// Set the declared input message type.
    pub fn with_input(mut self, input_type: MessageType) -> Self {
        self.input_type = input_type;
        self
    }

    /// Set the declared output message type.
    pub fn with_output(mut self, output_type: MessageType) -> Self {
        self.output_type = output_type;
        self
    }

    /// Name of the implementing function when it differs from the method name.
    pub fn with_implementation_name(mut self, name: impl Into<String>) -> Self {
        self.implementation_name = Some(name.into());
        self
    }

    /// Method name, unique within its service.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared input message type.
    pub fn input_type(&self) -> MessageType {
        self.input_type
    }

    /// Declared output message type.
    pub fn output_type(&self) -> MessageType {
        self.output_type
    }

    /// Function name the resolver looks up inside the controller module.
    pub fn implementation_name(&self) -> &str {
        self.implementation_name.as_deref().unwrap_or(&self.name)
    }

    /// Which messages an implementation of this method must accept.
    pub fn shape(&self) -> Shape {
        Shape::from_sides(!self.input_type.is_empty(), !self.output_type.is_empty())
    }
}

/// A named group of methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    name: String,
    module: Option<String>,
    methods: Vec<MethodDescriptor>,
}

impl ServiceDescriptor {
    /// A service with no methods and no controller module.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module: None,
            methods: Vec::new(),
        }
    }

    /// Name the controller module that implements this service.
    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    /// Declare a method (declaration order is kept for listings).
    pub fn with_method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    /// Fully-qualified service name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Controller module implementing this service, if declared.
    pub fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    /// Declared methods in declaration order.
    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    /// Look up a method by name.
    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// A compiled service-definition module.
pub trait SchemaModule {
    /// Source file the module was compiled from, used in diagnostics.
    fn file_name(&self) -> &str;

    /// Services declared by the module.
    fn services(&self) -> Vec<ServiceDescriptor>;
}

/// A schema module assembled in code.
#[derive(Debug, Clone, Default)]
pub struct StaticSchema {
    file_name: String,
    services: Vec<ServiceDescriptor>,
}

impl StaticSchema {
    /// An empty module for `file_name`.
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            services: Vec::new(),
        }
    }

    /// Add a service to the module.
    pub fn with_service(mut self, service: ServiceDescriptor) -> Self {
        self.services.push(service);
        self
    }
}

impl SchemaModule for StaticSchema {
    fn file_name(&self) -> &str {
        &self.file_name
    }

    fn services(&self) -> Vec<ServiceDescriptor> {
        self.services.clone()
    }
}

/// The caller referenced a service or method that was never registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// No service with this name.
    #[error("unknown service: {service}")]
    UnknownService {
        /// The requested service name.
        service: String,
    },
    /// The service exists but declares no such method.
    #[error("unknown method: {service}/{method}")]
    UnknownMethod {
        /// The requested service name.
        service: String,
        /// The requested method name.
        method: String,
    },
}

/// Registration was rejected; nothing from the offending module was kept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// The service name is already taken.
    #[error("service {service} from {file} is already registered")]
    DuplicateService {
        /// Offending service name.
        service: String,
        /// Schema file that tried to register it.
        file: String,
    },
    /// A service declares the same method twice.
    #[error("service {service} declares method {method} more than once")]
    DuplicateMethod {
        /// Service name.
        service: String,
        /// Repeated method name.
        method: String,
    },
    /// The controller module name is already taken.
    #[error("controller module {module} is already registered")]
    DuplicateModule {
        /// Offending module name.
        module: String,
    },
}

/// Every known service, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    services: BTreeMap<String, ServiceDescriptor>,
}

impl SchemaRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest every service declared by `module`.
    ///
    /// Returns the number of services added. On error nothing is added.
    pub fn register(&mut self, module: &dyn SchemaModule) -> Result<usize, RegistrationError> {
        let services = module.services();
        let mut incoming = HashSet::new();
        for service in &services {
            if self.services.contains_key(service.name()) || !incoming.insert(service.name()) {
                return Err(RegistrationError::DuplicateService {
                    service: service.name().to_owned(),
                    file: module.file_name().to_owned(),
                });
            }
            let mut seen = HashSet::new();
            if let Some(dup) = service.methods().iter().find(|m| !seen.insert(m.name())) {
                return Err(RegistrationError::DuplicateMethod {
                    service: service.name().to_owned(),
                    method: dup.name().to_owned(),
                });
            }
        }

        let added = services.len();
        for service in services {
            self.services.insert(service.name().to_owned(), service);
        }
        Ok(added)
    }

    /// Look up a service by name.
    pub fn lookup_service(&self, service: &str) -> Result<&ServiceDescriptor, LookupError> {
        self.services
            .get(service)
            .ok_or_else(|| LookupError::UnknownService {
                service: service.to_owned(),
            })
    }

    /// Look up a method within a service.
    pub fn lookup_method(
        &self,
        service: &str,
        method: &str,
    ) -> Result<&MethodDescriptor, LookupError> {
        self.lookup_service(service)?
            .method(method)
            .ok_or_else(|| LookupError::UnknownMethod {
                service: service.to_owned(),
                method: method.to_owned(),
            })
    }

    /// Every `"Service/Method"` pair, by service name then declaration order.
    pub fn method_names(&self) -> Vec<String> {
        self.services
            .values()
            .flat_map(|s| s.methods().iter().map(move |m| format!("{}/{}", s.name(), m.name())))
            .collect()
    }}
