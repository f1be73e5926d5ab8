//! Cayenne Low Power Payload (LPP) encoder.
//!
//! A payload is a plain concatenation of records, each laid out as
//! `channel || type_id || value bytes`. Multi-byte fields are big-endian and
//! carry fixed-point integers (`floor(reading * scale)`), so a decoder only
//! needs the per-type table in [`protocol::sensor`] to read them back.
//!
//! ```
//! use lpp_core::LppEncoder;
//!
//! let mut lpp = LppEncoder::new();
//! lpp.append_temperature(1, 27.2).unwrap();
//! lpp.append_digital_input(1, 1.0).unwrap();
//!
//! assert_eq!(lpp.buffer(), &[0x01, 0x67, 0x01, 0x10, 0x01, 0x00, 0x01]);
//! ```

mod encoder;
mod measurement;
pub mod protocol;

pub use encoder::{LppEncoder, OverflowPolicy};
pub use measurement::{Measurement, Values};
pub use protocol::error::{EncodeError, ProtocolError};
pub use protocol::sensor::{SensorKind, TypeDescriptor};

/// Channel argument accepted by the append operations.
///
/// Wider than the wire byte so that out-of-range channels can be detected
/// instead of silently narrowed at the call site.
pub type Channel = i32;
