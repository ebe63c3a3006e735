pub mod install;
pub mod list;
pub mod register;
pub mod sync;

pub use install::*;
pub use list::*;
pub use register::*;
pub use sync::*;
