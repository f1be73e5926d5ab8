use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::protocol::field;
use crate::protocol::MAX_FIELDS;
use crate::{Channel, EncodeError, Measurement, SensorKind};

/// What the encoder does with a channel or field that does not fit its byte
/// width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Keep the low-order bytes, as every LPP encoder in the field does.
    #[default]
    Wrap,
    /// Refuse the record and report why.
    Reject,
}

/// Builds one LPP payload out of any number of records.
///
/// The buffer only grows until [`LppEncoder::reset`]. No size limit is
/// enforced; keeping the payload under the link's ceiling is up to the
/// caller.
#[derive(Debug, Clone, Default)]
pub struct LppEncoder {
    buffer: Vec<u8>,
    policy: OverflowPolicy,
}

impl LppEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            policy: OverflowPolicy::default(),
        }
    }

    pub fn with_policy(policy: OverflowPolicy) -> Self {
        Self {
            buffer: Vec::new(),
            policy,
        }
    }

    /// An encoder that rejects out-of-range channels and values.
    pub fn strict() -> Self {
        Self::with_policy(OverflowPolicy::Reject)
    }

    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    /// Drops every record. The allocation is kept for the next payload.
    pub fn reset(&mut self) {
        debug!(size = self.buffer.len(), "Resetting payload");
        self.buffer.clear();
    }

    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn append(
        &mut self,
        channel: Channel,
        measurement: &Measurement,
    ) -> Result<(), EncodeError> {
        self.append_fields(measurement.kind(), channel, &measurement.values())
    }

    pub fn append_digital_input(
        &mut self,
        channel: Channel,
        value: f64,
    ) -> Result<(), EncodeError> {
        self.append_fields(SensorKind::DigitalInput, channel, &[value])
    }

    pub fn append_digital_output(
        &mut self,
        channel: Channel,
        value: f64,
    ) -> Result<(), EncodeError> {
        self.append_fields(SensorKind::DigitalOutput, channel, &[value])
    }

    pub fn append_analog_input(&mut self, channel: Channel, value: f64) -> Result<(), EncodeError> {
        self.append_fields(SensorKind::AnalogInput, channel, &[value])
    }

    pub fn append_analog_output(
        &mut self,
        channel: Channel,
        value: f64,
    ) -> Result<(), EncodeError> {
        self.append_fields(SensorKind::AnalogOutput, channel, &[value])
    }

    /// Illuminance in lux.
    pub fn append_luminosity(&mut self, channel: Channel, lux: f64) -> Result<(), EncodeError> {
        self.append_fields(SensorKind::Luminosity, channel, &[lux])
    }

    pub fn append_presence(&mut self, channel: Channel, value: f64) -> Result<(), EncodeError> {
        self.append_fields(SensorKind::Presence, channel, &[value])
    }

    /// Temperature in °C, 0.1 °C resolution.
    pub fn append_temperature(
        &mut self,
        channel: Channel,
        celsius: f64,
    ) -> Result<(), EncodeError> {
        self.append_fields(SensorKind::Temperature, channel, &[celsius])
    }

    /// Relative humidity in %, 0.5 % resolution.
    pub fn append_relative_humidity(
        &mut self,
        channel: Channel,
        percent: f64,
    ) -> Result<(), EncodeError> {
        self.append_fields(SensorKind::RelativeHumidity, channel, &[percent])
    }

    /// Acceleration in g, 0.001 g resolution per axis.
    pub fn append_accelerometer(
        &mut self,
        channel: Channel,
        x: f64,
        y: f64,
        z: f64,
    ) -> Result<(), EncodeError> {
        self.append_fields(SensorKind::Accelerometer, channel, &[x, y, z])
    }

    /// Pressure in hPa, 0.1 hPa resolution.
    pub fn append_barometric_pressure(
        &mut self,
        channel: Channel,
        hpa: f64,
    ) -> Result<(), EncodeError> {
        self.append_fields(SensorKind::BarometricPressure, channel, &[hpa])
    }

    /// Angular rate in °/s, 0.01 °/s resolution per axis.
    pub fn append_gyrometer(
        &mut self,
        channel: Channel,
        x: f64,
        y: f64,
        z: f64,
    ) -> Result<(), EncodeError> {
        self.append_fields(SensorKind::Gyrometer, channel, &[x, y, z])
    }

    /// Latitude and longitude in degrees (0.0001°), altitude in meters (0.01 m).
    pub fn append_gps(
        &mut self,
        channel: Channel,
        latitude: f64,
        longitude: f64,
        altitude: f64,
    ) -> Result<(), EncodeError> {
        self.append_fields(SensorKind::Gps, channel, &[latitude, longitude, altitude])
    }

    // The whole record is validated before the first byte is written so a
    // rejected append leaves the buffer untouched.
    fn append_fields(
        &mut self,
        kind: SensorKind,
        channel: Channel,
        values: &[f64],
    ) -> Result<(), EncodeError> {
        let descriptor = kind.descriptor();
        debug_assert_eq!(values.len(), descriptor.field_count());

        let channel_byte = self.channel_byte(channel)?;

        let mut quantized = [0_i128; MAX_FIELDS];
        for (index, (&value, &scale)) in values.iter().zip(descriptor.scales).enumerate() {
            quantized[index] = self.quantize_field(kind, index, value, scale)?;
        }
        let quantized = &quantized[..descriptor.field_count()];

        self.buffer.reserve(descriptor.record_size());
        self.buffer.push(channel_byte);
        self.buffer.push(descriptor.type_id);
        for &q in quantized {
            field::pack(&mut self.buffer, q, descriptor.width);
        }

        trace!(
            channel,
            kind = %kind,
            fields = ?quantized,
            size = self.buffer.len(),
            "Appended record"
        );

        Ok(())
    }

    fn channel_byte(&self, channel: Channel) -> Result<u8, EncodeError> {
        match u8::try_from(channel) {
            Ok(byte) => Ok(byte),
            Err(_) if self.policy == OverflowPolicy::Reject => {
                Err(EncodeError::ChannelOutOfRange { channel })
            }
            Err(_) => {
                let byte = channel as u8;
                debug!(channel, wrapped = byte, "Channel truncated to one byte");
                Ok(byte)
            }
        }
    }

    fn quantize_field(
        &self,
        kind: SensorKind,
        index: usize,
        value: f64,
        scale: u32,
    ) -> Result<i128, EncodeError> {
        let (min, max) = kind.descriptor().range();
        let fits = |q: i128| (i128::from(min)..=i128::from(max)).contains(&q);

        match (field::quantize(value, scale), self.policy) {
            (Some(quantized), _) if fits(quantized) => Ok(quantized),
            (Some(quantized), OverflowPolicy::Wrap) => {
                debug!(
                    kind = %kind,
                    field = index,
                    quantized,
                    min,
                    max,
                    "Value truncated to field width"
                );
                Ok(quantized)
            }
            (Some(quantized), OverflowPolicy::Reject) => Err(EncodeError::ValueOutOfRange {
                kind,
                field: index,
                quantized,
                min,
                max,
            }),
            (None, OverflowPolicy::Wrap) => {
                debug!(kind = %kind, field = index, value, "Non-finite value saturated");
                Ok(field::saturate(value, scale))
            }
            (None, OverflowPolicy::Reject) => {
                Err(EncodeError::NonFiniteValue { kind, field: index })
            }
        }
    }
}
