mod process;

pub use process::{is_process_alive, run, spawn_detached};
