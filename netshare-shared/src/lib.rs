//! Netshare Core - Shared code for the volume driver and its front ends
//!
//! This crate contains the error taxonomy, the request/response shapes the
//! volume driver speaks, and constants that must agree between the driver
//! library and the command-line front end.

pub mod constants;
pub mod errors;
pub mod protocol;

pub use errors::{NetshareError, NetshareResult};
pub use protocol::{
    Capabilities, CreateRequest, MountRequest, MountResponse, RemoveRequest, UnmountRequest,
    VolumeInfo, VolumeOptions,
};
