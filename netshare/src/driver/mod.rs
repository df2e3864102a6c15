//! Volume driver: the single entry point for mount and unmount requests.

mod volume;

pub use volume::VolumeDriver;
