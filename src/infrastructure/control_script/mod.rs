pub mod runtime;

pub use runtime::{ControlScriptError, ControlScriptRuntime, ProcessScriptRuntime};

#[cfg(test)]
pub use runtime::MockControlScriptRuntime;
