//! Mount bookkeeping.
//!
//! # Overview
//!
//! - **MountManager**: Thread-safe table of volume name to refcount, hostdir
//!   and options, shared between a volume driver and whoever inspects it
//! - **Managed volumes**: records pre-provisioned through `create` that keep
//!   their options when the refcount drops back to zero

mod manager;

pub use manager::MountManager;
