pub mod command_executor;

pub use command_executor::{
    CommandExecutionResult, CommandExecutorError, CommandRunner, CommandSpec, ExecutionConfig,
    ProcessCommandRunner, NO_EXIT_CODE,
};

#[cfg(test)]
pub use command_executor::MockCommandRunner;
