use lpp_core::{Channel, Measurement};
use rand::Rng;
use tracing::warn;

use crate::config::ReadingConfig;

/// Something that can be polled for one round of sensor readings.
pub trait SensorSource {
    fn sample(&mut self) -> Vec<(Channel, Measurement)>;
}

/// Replays the configured readings with random jitter, standing in for real
/// sensor drivers.
pub struct ConfiguredSource<R> {
    readings: Vec<ReadingConfig>,
    rng: R,
}

impl<R: Rng> ConfiguredSource<R> {
    pub fn new(readings: Vec<ReadingConfig>, rng: R) -> Self {
        Self { readings, rng }
    }
}

impl<R: Rng> SensorSource for ConfiguredSource<R> {
    fn sample(&mut self) -> Vec<(Channel, Measurement)> {
        let mut samples = Vec::with_capacity(self.readings.len());

        for reading in &self.readings {
            if !reading.available {
                warn!(
                    channel = reading.channel,
                    kind = %reading.measurement.kind(),
                    "Reading unavailable, skipping"
                );
                continue;
            }

            let jitter = reading.jitter.abs();
            let measurement = if jitter > 0.0 {
                let rng = &mut self.rng;
                reading
                    .measurement
                    .map_values(|v| v + rng.random_range(-jitter..=jitter))
            } else {
                reading.measurement
            };

            samples.push((reading.channel, measurement));
        }

        samples
    }
}
