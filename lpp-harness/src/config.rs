use std::net::SocketAddr;
use std::path::Path;

use lpp_core::{Measurement, OverflowPolicy};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub device: DeviceConfig,
    #[serde(default)]
    pub encoder: EncoderConfig,
    pub uplink: UplinkConfig,
    #[serde(default)]
    pub readings: Vec<ReadingConfig>,
}

#[derive(Debug, Deserialize)]
pub struct DeviceConfig {
    /// Name used in log output
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct EncoderConfig {
    /// What to do with readings that overflow their field
    #[serde(default)]
    pub overflow: OverflowPolicy,
}

#[derive(Debug, Deserialize)]
pub struct UplinkConfig {
    #[serde(flatten)]
    pub transport: TransportConfig,
    /// Largest payload the link accepts, 0 disables the check
    #[serde(default)]
    pub max_payload: usize,
    /// Interval in seconds between uplinks
    pub interval_secs: u64,
    /// Number of uplinks to send, 0 runs until interrupted
    #[serde(default)]
    pub cycles: u64,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransportConfig {
    Stdout,
    Udp { addr: SocketAddr },
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReadingConfig {
    pub channel: i32,
    #[serde(flatten)]
    pub measurement: Measurement,
    /// Uniform noise added to every field, in reading units
    #[serde(default)]
    pub jitter: f64,
    /// Readings that are not available are skipped
    #[serde(default = "available_by_default")]
    pub available: bool,
}

fn available_by_default() -> bool {
    true
}

impl Config {
    pub fn load(path: &Path) -> color_eyre::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        let reading = |channel, measurement, jitter| ReadingConfig {
            channel,
            measurement,
            jitter,
            available: true,
        };

        Self {
            device: DeviceConfig {
                name: "lpp-node".to_string(),
            },
            encoder: EncoderConfig::default(),
            uplink: UplinkConfig {
                transport: TransportConfig::Stdout,
                max_payload: 51,
                interval_secs: 30,
                cycles: 1,
            },
            readings: vec![
                reading(
                    1,
                    Measurement::Accelerometer {
                        x: 0.0,
                        y: 0.0,
                        z: 1.0,
                    },
                    0.01,
                ),
                reading(
                    1,
                    Measurement::Gyrometer {
                        x: 0.0,
                        y: 0.0,
                        z: 0.0,
                    },
                    1.0,
                ),
                reading(1, Measurement::Luminosity { value: 300.0 }, 10.0),
                reading(2, Measurement::Luminosity { value: 120.0 }, 10.0),
                reading(1, Measurement::RelativeHumidity { value: 50.0 }, 2.0),
                reading(1, Measurement::Temperature { value: 21.5 }, 0.5),
                reading(1, Measurement::BarometricPressure { value: 1013.2 }, 0.5),
                reading(
                    1,
                    Measurement::Gps {
                        latitude: 0.0,
                        longitude: 0.0,
                        altitude: 42.0,
                    },
                    0.0,
                ),
                reading(2, Measurement::Temperature { value: 22.0 }, 0.5),
            ],
        }
    }
}
