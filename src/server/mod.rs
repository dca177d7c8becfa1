//! Connection supervision: the listening socket and its accept loop.

pub mod listener;

pub use listener::{RunningServer, Server, ServerHandle};
