use core::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::SensorKind;
use crate::protocol::MAX_FIELDS;

/// A single sensor reading in the units the sensor reports.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Measurement {
    /// Raw digital input state.
    DigitalInput { value: f64 },
    /// Raw digital output state.
    DigitalOutput { value: f64 },
    /// Analog input, 0.01 resolution.
    AnalogInput { value: f64 },
    /// Analog output, 0.01 resolution.
    AnalogOutput { value: f64 },
    /// Illuminance in lux.
    Luminosity { value: f64 },
    /// Presence counter.
    Presence { value: f64 },
    /// Temperature in degrees Celsius.
    Temperature { value: f64 },
    /// Relative humidity as a percentage.
    RelativeHumidity { value: f64 },
    /// Acceleration in g per axis.
    Accelerometer { x: f64, y: f64, z: f64 },
    /// Pressure in hPa.
    BarometricPressure { value: f64 },
    /// Angular rate in degrees per second per axis.
    Gyrometer { x: f64, y: f64, z: f64 },
    /// Position in degrees and altitude in meters.
    Gps {
        latitude: f64,
        longitude: f64,
        altitude: f64,
    },
}

impl Measurement {
    pub fn kind(&self) -> SensorKind {
        match self {
            Measurement::DigitalInput { .. } => SensorKind::DigitalInput,
            Measurement::DigitalOutput { .. } => SensorKind::DigitalOutput,
            Measurement::AnalogInput { .. } => SensorKind::AnalogInput,
            Measurement::AnalogOutput { .. } => SensorKind::AnalogOutput,
            Measurement::Luminosity { .. } => SensorKind::Luminosity,
            Measurement::Presence { .. } => SensorKind::Presence,
            Measurement::Temperature { .. } => SensorKind::Temperature,
            Measurement::RelativeHumidity { .. } => SensorKind::RelativeHumidity,
            Measurement::Accelerometer { .. } => SensorKind::Accelerometer,
            Measurement::BarometricPressure { .. } => SensorKind::BarometricPressure,
            Measurement::Gyrometer { .. } => SensorKind::Gyrometer,
            Measurement::Gps { .. } => SensorKind::Gps,
        }
    }

    /// Field values in wire order.
    pub fn values(&self) -> Values {
        match *self {
            Measurement::DigitalInput { value }
            | Measurement::DigitalOutput { value }
            | Measurement::AnalogInput { value }
            | Measurement::AnalogOutput { value }
            | Measurement::Luminosity { value }
            | Measurement::Presence { value }
            | Measurement::Temperature { value }
            | Measurement::RelativeHumidity { value }
            | Measurement::BarometricPressure { value } => Values::scalar(value),
            Measurement::Accelerometer { x, y, z } | Measurement::Gyrometer { x, y, z } => {
                Values::vector([x, y, z])
            }
            Measurement::Gps {
                latitude,
                longitude,
                altitude,
            } => Values::vector([latitude, longitude, altitude]),
        }
    }

    /// Applies `f` to every field, keeping the kind.
    pub fn map_values(self, mut f: impl FnMut(f64) -> f64) -> Self {
        match self {
            Measurement::DigitalInput { value } => Measurement::DigitalInput { value: f(value) },
            Measurement::DigitalOutput { value } => Measurement::DigitalOutput { value: f(value) },
            Measurement::AnalogInput { value } => Measurement::AnalogInput { value: f(value) },
            Measurement::AnalogOutput { value } => Measurement::AnalogOutput { value: f(value) },
            Measurement::Luminosity { value } => Measurement::Luminosity { value: f(value) },
            Measurement::Presence { value } => Measurement::Presence { value: f(value) },
            Measurement::Temperature { value } => Measurement::Temperature { value: f(value) },
            Measurement::RelativeHumidity { value } => {
                Measurement::RelativeHumidity { value: f(value) }
            }
            Measurement::Accelerometer { x, y, z } => Measurement::Accelerometer {
                x: f(x),
                y: f(y),
                z: f(z),
            },
            Measurement::BarometricPressure { value } => {
                Measurement::BarometricPressure { value: f(value) }
            }
            Measurement::Gyrometer { x, y, z } => Measurement::Gyrometer {
                x: f(x),
                y: f(y),
                z: f(z),
            },
            Measurement::Gps {
                latitude,
                longitude,
                altitude,
            } => Measurement::Gps {
                latitude: f(latitude),
                longitude: f(longitude),
                altitude: f(altitude),
            },
        }
    }
}

/// Inline storage for the fields of one record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Values {
    fields: [f64; MAX_FIELDS],
    len: usize,
}

impl Values {
    fn scalar(value: f64) -> Self {
        Self {
            fields: [value, 0.0, 0.0],
            len: 1,
        }
    }

    fn vector(fields: [f64; MAX_FIELDS]) -> Self {
        Self {
            fields,
            len: MAX_FIELDS,
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.fields[..self.len]
    }
}

impl Deref for Values {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        self.as_slice()
    }
}
