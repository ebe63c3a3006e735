pub mod error;
pub mod result;

pub use error::{AddonError, InvalidInput};
pub use result::AddonResult;
