//! ES9038Q2M DAC endpoint (ESS Technology)
//!
//! Control is over blocking I²C; the sample stream itself arrives over the
//! serial link and never passes through this driver.

pub mod registers;

mod driver;

pub use driver::{DacError, Es9038q2m, I2C_ADDR};
