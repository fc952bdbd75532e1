//! Endpoint drivers
//!
//! | Driver | Role | Control bus |
//! |--------|------|-------------|
//! | [`SaiInterface`] | interface | memory-mapped |
//! | [`Es9038q2m`] | codec | I²C |
//! | [`DummyCodec`] | codec | none |

pub mod dummy;
pub mod es9038q2m;
pub mod sai;

pub use dummy::{DummyCodec, DUMMY_CODEC_NAME};
pub use es9038q2m::{DacError, Es9038q2m};
pub use sai::{SaiBlockConfig, SaiError, SaiInterface, SaiMode};
