//! Synthetic input: the device seam and the retrying executor.

mod error;
mod executor;
mod input;

pub use error::InputError;
pub use executor::{ActionExecutor, ClickResult};
pub use input::{InputDevice, MouseButton};
