use super::sensor::SensorKind;

pub type ParseResult<T> = core::result::Result<T, ProtocolError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("unknown LPP type id {0}")]
    UnknownType(u8),
}

/// Conditions reported by an encoder running with [`crate::OverflowPolicy::Reject`].
///
/// With the default wrap policy none of these are raised; the offending
/// channel or field is truncated to its low-order bytes instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error("channel {channel} does not fit in one byte")]
    ChannelOutOfRange { channel: i32 },
    #[error("{kind} field {field} quantized to {quantized}, outside [{min}, {max}]")]
    ValueOutOfRange {
        kind: SensorKind,
        field: usize,
        quantized: i128,
        min: i64,
        max: i64,
    },
    #[error("{kind} field {field} is not a finite number")]
    NonFiniteValue { kind: SensorKind, field: usize },
}
