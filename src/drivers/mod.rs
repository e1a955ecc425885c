//! Output drivers, button input, and one-shot hardware initialisation.

pub mod button;
pub mod hw_init;
pub mod outputs;
pub mod pixels;
