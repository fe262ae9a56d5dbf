//! Named-callback registry and activation dispatcher.
//!
//! A behavior holds glue code in a structured way: register a control function under a
//! name, then hand the dispatcher an activation batch to invoke each matching behavior
//! once per activation record, together with its persistent per-name statics.

mod batch;
mod registry;
mod statics;

pub use batch::{Batch, Config};
pub use registry::{BehaviorError, ControlFn, Registry, global};
pub use statics::Statics;
