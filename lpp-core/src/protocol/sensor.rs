use core::fmt;

use serde::{Deserialize, Serialize};

use super::error::{ParseResult, ProtocolError};
use super::*;

/// Every measurement kind the encoder can emit. The discriminant is the
/// type id written to the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum SensorKind {
    DigitalInput = LPP_DIGITAL_INPUT,
    DigitalOutput = LPP_DIGITAL_OUTPUT,
    AnalogInput = LPP_ANALOG_INPUT,
    AnalogOutput = LPP_ANALOG_OUTPUT,
    Luminosity = LPP_LUMINOSITY,
    Presence = LPP_PRESENCE,
    Temperature = LPP_TEMPERATURE,
    RelativeHumidity = LPP_RELATIVE_HUMIDITY,
    Accelerometer = LPP_ACCELEROMETER,
    BarometricPressure = LPP_BAROMETRIC_PRESSURE,
    Gyrometer = LPP_GYROMETER,
    Gps = LPP_GPS,
}

/// Static layout of one record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub kind: SensorKind,
    pub type_id: u8,
    /// Bytes per field.
    pub width: usize,
    pub signed: bool,
    /// Fixed-point scale of each field, in wire order.
    pub scales: &'static [u32],
}

impl TypeDescriptor {
    pub const fn field_count(&self) -> usize {
        self.scales.len()
    }

    /// Bytes one record of this type occupies, header included.
    pub const fn record_size(&self) -> usize {
        RECORD_HEADER_SIZE + self.field_count() * self.width
    }

    /// Inclusive range of quantized values that survive packing unchanged.
    pub const fn range(&self) -> (i64, i64) {
        let bits = (self.width * 8) as u32;
        if self.signed {
            (-(1 << (bits - 1)), (1 << (bits - 1)) - 1)
        } else {
            (0, (1 << bits) - 1)
        }
    }
}

const fn entry(
    kind: SensorKind,
    width: usize,
    signed: bool,
    scales: &'static [u32],
) -> TypeDescriptor {
    TypeDescriptor {
        kind,
        type_id: kind as u8,
        width,
        signed,
        scales,
    }
}

// Ordered like `SensorKind::ALL`.
static REGISTRY: [TypeDescriptor; 12] = [
    entry(SensorKind::DigitalInput, 1, false, &[1]),
    entry(SensorKind::DigitalOutput, 1, false, &[1]),
    entry(SensorKind::AnalogInput, 2, true, &[100]),
    entry(SensorKind::AnalogOutput, 2, true, &[100]),
    entry(SensorKind::Luminosity, 2, false, &[1]),
    entry(SensorKind::Presence, 1, false, &[1]),
    entry(SensorKind::Temperature, 2, true, &[10]),
    entry(SensorKind::RelativeHumidity, 1, false, &[2]),
    entry(SensorKind::Accelerometer, 2, true, &[1000, 1000, 1000]),
    entry(SensorKind::BarometricPressure, 2, false, &[10]),
    entry(SensorKind::Gyrometer, 2, true, &[100, 100, 100]),
    entry(SensorKind::Gps, 3, true, &[10000, 10000, 100]),
];

impl SensorKind {
    /// All kinds in type id order.
    pub const ALL: [SensorKind; 12] = [
        SensorKind::DigitalInput,
        SensorKind::DigitalOutput,
        SensorKind::AnalogInput,
        SensorKind::AnalogOutput,
        SensorKind::Luminosity,
        SensorKind::Presence,
        SensorKind::Temperature,
        SensorKind::RelativeHumidity,
        SensorKind::Accelerometer,
        SensorKind::BarometricPressure,
        SensorKind::Gyrometer,
        SensorKind::Gps,
    ];

    const fn index(self) -> usize {
        match self {
            SensorKind::DigitalInput => 0,
            SensorKind::DigitalOutput => 1,
            SensorKind::AnalogInput => 2,
            SensorKind::AnalogOutput => 3,
            SensorKind::Luminosity => 4,
            SensorKind::Presence => 5,
            SensorKind::Temperature => 6,
            SensorKind::RelativeHumidity => 7,
            SensorKind::Accelerometer => 8,
            SensorKind::BarometricPressure => 9,
            SensorKind::Gyrometer => 10,
            SensorKind::Gps => 11,
        }
    }

    pub fn descriptor(self) -> &'static TypeDescriptor {
        &REGISTRY[self.index()]
    }

    pub const fn type_id(self) -> u8 {
        self as u8
    }

    pub fn from_type_id(type_id: u8) -> ParseResult<Self> {
        REGISTRY
            .iter()
            .find(|d| d.type_id == type_id)
            .map(|d| d.kind)
            .ok_or(ProtocolError::UnknownType(type_id))
    }

    pub const fn name(self) -> &'static str {
        match self {
            SensorKind::DigitalInput => "digital_input",
            SensorKind::DigitalOutput => "digital_output",
            SensorKind::AnalogInput => "analog_input",
            SensorKind::AnalogOutput => "analog_output",
            SensorKind::Luminosity => "luminosity",
            SensorKind::Presence => "presence",
            SensorKind::Temperature => "temperature",
            SensorKind::RelativeHumidity => "relative_humidity",
            SensorKind::Accelerometer => "accelerometer",
            SensorKind::BarometricPressure => "barometric_pressure",
            SensorKind::Gyrometer => "gyrometer",
            SensorKind::Gps => "gps",
        }
    }
}

impl TryFrom<u8> for SensorKind {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        SensorKind::from_type_id(value)
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_follows_kind_order() {
        for (descriptor, kind) in REGISTRY.iter().zip(SensorKind::ALL) {
            assert_eq!(descriptor.kind, kind);
            assert_eq!(descriptor.type_id, kind as u8);
            assert_eq!(kind.descriptor(), descriptor);
        }
    }

    #[test]
    fn record_sizes() {
        let sizes: Vec<usize> = SensorKind::ALL
            .iter()
            .map(|k| k.descriptor().record_size())
            .collect();
        assert_eq!(sizes, [3, 3, 4, 4, 4, 3, 4, 3, 8, 4, 8, 11]);
    }

    #[test]
    fn ranges_follow_width_and_sign() {
        assert_eq!(SensorKind::DigitalInput.descriptor().range(), (0, 255));
        assert_eq!(SensorKind::Temperature.descriptor().range(), (-32768, 32767));
        assert_eq!(SensorKind::Luminosity.descriptor().range(), (0, 65535));
        assert_eq!(SensorKind::Gps.descriptor().range(), (-8_388_608, 8_388_607));
    }

    #[test]
    fn type_id_lookup() {
        assert_eq!(SensorKind::try_from(103), Ok(SensorKind::Temperature));
        assert_eq!(SensorKind::try_from(136), Ok(SensorKind::Gps));
        assert_eq!(SensorKind::try_from(7), Err(ProtocolError::UnknownType(7)));
    }

    #[test]
    fn serde_names_match_display() {
        for kind in SensorKind::ALL {
            #[derive(Deserialize)]
            struct Wrapper {
                kind: SensorKind,
            }

            let parsed: Wrapper = toml::from_str(&format!("kind = \"{kind}\"")).unwrap();
            assert_eq!(parsed.kind, kind);
        }
    }
}
