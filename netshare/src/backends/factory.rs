//! Backend factory using the inventory pattern for compile-time registration.
//!
//! Backend implementations register themselves at compile time using
//! `inventory::submit!`. Registry kinds without a submitted factory are known
//! but not compiled in.

use netshare_shared::errors::{NetshareError, NetshareResult};

use super::{Backend, BackendConfig};
use crate::registry::BackendKind;

/// Type alias for backend factory functions.
pub type BackendFactoryFn = fn(&BackendConfig) -> NetshareResult<Box<dyn Backend>>;

/// Registration entry submitted by backend implementations via inventory.
pub struct BackendRegistration {
    pub kind: BackendKind,
    pub factory: BackendFactoryFn,
}

inventory::collect!(BackendRegistration);

/// Create a backend by looking up the registered factory.
///
/// # Returns
/// * `Ok(Box<dyn Backend>)` - Backend built from `config`
/// * `Err(NetshareError::Unsupported)` - Kind is known but not compiled in
pub fn create_backend(kind: BackendKind, config: &BackendConfig) -> NetshareResult<Box<dyn Backend>> {
    for registration in inventory::iter::<BackendRegistration> {
        if registration.kind == kind {
            tracing::debug!(backend = %kind, "Creating backend instance");
            return (registration.factory)(config);
        }
    }

    Err(NetshareError::Unsupported(format!(
        "Backend {} is not available in this build. Available backends: {:?}",
        kind,
        available_backends()
    )))
}

/// Check if a backend kind is registered.
pub fn is_registered(kind: BackendKind) -> bool {
    inventory::iter::<BackendRegistration>().any(|r| r.kind == kind)
}

/// All registered backend kinds, in registry order.
pub fn available_backends() -> Vec<BackendKind> {
    BackendKind::ALL
        .into_iter()
        .filter(|kind| is_registered(*kind))
        .collect()
}
