use async_trait::async_trait;
use serde_json::Value;

use crate::domain::models::{Envelope, OperationDescriptor};

/// A named, externally callable unit of functionality.
///
/// `invoke` is infallible by contract: every failure is already folded
/// into an error-shaped [`Envelope`].
#[async_trait]
pub trait Operation: Send + Sync {
    fn descriptor(&self) -> &OperationDescriptor;

    async fn invoke(&self, arguments: Value) -> Envelope;
}
