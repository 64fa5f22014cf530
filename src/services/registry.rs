//! Operation registry.
//!
//! Built once at startup from an explicit list of operations and read-only
//! afterwards. Registration order is the discovery order.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::errors::RegistryError;
use crate::domain::models::{Envelope, OperationDescriptor};
use crate::domain::ports::Operation;
use crate::services::envelope;

#[derive(Default)]
pub struct OperationRegistry {
    operations: Vec<Arc<dyn Operation>>,
    index: HashMap<&'static str, usize>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a list, failing on the first duplicate name.
    pub fn from_operations(
        operations: impl IntoIterator<Item = Arc<dyn Operation>>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for operation in operations {
            registry.register(operation)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, operation: Arc<dyn Operation>) -> Result<(), RegistryError> {
        let name = operation.descriptor().name;
        if self.index.contains_key(name) {
            return Err(RegistryError::DuplicateOperation(name.to_string()));
        }
        self.index.insert(name, self.operations.len());
        self.operations.push(operation);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Operation>> {
        self.index.get(name).map(|&i| &self.operations[i])
    }

    /// Descriptors in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &OperationDescriptor> {
        self.operations.iter().map(|op| op.descriptor())
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Invoke an operation by name and return its envelope.
    pub async fn dispatch(&self, name: &str, arguments: Value) -> Result<Envelope, RegistryError> {
        let operation = self
            .get(name)
            .ok_or_else(|| RegistryError::UnknownOperation(name.to_string()))?;
        Ok(operation.invoke(arguments).await)
    }

    /// Invoke an operation by name and render the envelope as text. An
    /// unknown name renders as an error envelope.
    pub async fn dispatch_text(&self, name: &str, arguments: Value) -> (bool, String) {
        let envelope = match self.dispatch(name, arguments).await {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(operation = name, error = %e, "Dispatch failed");
                envelope::registry_failure(&e)
            }
        };
        (envelope.is_success(), envelope::render(&envelope))
    }
}
