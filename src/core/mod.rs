//! Cycle runtime, scheduling and the status surface

pub mod http;
pub mod notifier;
pub mod runtime;
pub mod scheduler;

pub use http::*;
pub use notifier::*;
pub use runtime::*;
pub use scheduler::*;
