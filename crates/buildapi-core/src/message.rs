// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Message model at the schema-provider boundary.
//!
//! Concrete message types are plain serde structs that implement [`Message`].
//! The router only ever handles them through [`DynMessage`] trait objects and
//! [`MessageType`] handles, so it never needs to know the concrete types.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::fmt;

/// A protocol message with a fully-qualified name.
///
/// Fields left unset hold their `Default` value; implementors usually add
/// `#[serde(default)]` so partial JSON payloads decode.
pub trait Message: Serialize + DeserializeOwned + Default + fmt::Debug + Send + Sync + 'static {
    /// Fully-qualified protocol name (e.g. `"chromite.api.TestRequestMessage"`).
    const FULL_NAME: &'static str;
}

/// Object-safe view of a [`Message`].
pub trait DynMessage: fmt::Debug + Send + Sync {
    /// Fully-qualified protocol name of the concrete type.
    fn full_name(&self) -> &'static str;

    /// Structured JSON view of the message, every field included.
    fn to_json(&self) -> Result<serde_json::Value, serde_json::Error>;

    /// Upcast for downcasting to the concrete type.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete type.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<M: Message> DynMessage for M {
    fn full_name(&self) -> &'static str {
        M::FULL_NAME
    }

    fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl dyn DynMessage + '_ {
    /// Borrow the message as `M` if that is its concrete type.
    pub fn downcast_ref<M: Message>(&self) -> Option<&M> {
        self.as_any().downcast_ref::<M>()
    }

    /// Mutably borrow the message as `M` if that is its concrete type.
    pub fn downcast_mut<M: Message>(&mut self) -> Option<&mut M> {
        self.as_any_mut().downcast_mut::<M>()
    }
}

/// The sentinel message for "nothing exchanged in this direction".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Empty {}

impl Message for Empty {
    const FULL_NAME: &'static str = "google.protobuf.Empty";
}

/// Handle to a message type: name, identity, and how to build instances.
#[derive(Clone, Copy)]
pub struct MessageType {
    full_name: &'static str,
    type_id: TypeId,
    new_fn: fn() -> Box<dyn DynMessage>,
    decode_fn: fn(serde_json::Value) -> Result<Box<dyn DynMessage>, serde_json::Error>,
}

impl MessageType {
    /// Handle for the concrete message type `M`.
    pub fn of<M: Message>() -> Self {
        Self {
            full_name: M::FULL_NAME,
            type_id: TypeId::of::<M>(),
            new_fn: new_boxed::<M>,
            decode_fn: decode_boxed::<M>,
        }
    }

    /// Handle for the [`Empty`] sentinel.
    pub fn empty() -> Self {
        Self::of::<Empty>()
    }

    /// Fully-qualified protocol name.
    pub fn full_name(&self) -> &'static str {
        self.full_name
    }

    /// Whether this is the [`Empty`] sentinel.
    pub fn is_empty(&self) -> bool {
        self.type_id == TypeId::of::<Empty>()
    }

    /// A fresh instance with every field at its default.
    pub fn new_instance(&self) -> Box<dyn DynMessage> {
        (self.new_fn)()
    }

    pub(crate) fn from_json(
        &self,
        value: serde_json::Value,
    ) -> Result<Box<dyn DynMessage>, serde_json::Error> {
        (self.decode_fn)(value)
    }
}

impl PartialEq for MessageType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for MessageType {}

impl fmt::Debug for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MessageType").field(&self.full_name).finish()
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.full_name)
    }
}

fn new_boxed<M: Message>() -> Box<dyn DynMessage> {
    Box::<M>::default()
}

fn decode_boxed<M: Message>(
    value: serde_json::Value,
) -> Result<Box<dyn DynMessage>, serde_json::Error> {
    let message: M = serde_json::from_value(value)?;
    Ok(Box::new(message))
}
