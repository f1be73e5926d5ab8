mod config;
mod source;
mod uplink;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use lpp_core::{LppEncoder, OverflowPolicy};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::{Config, TransportConfig};
use crate::source::{ConfiguredSource, SensorSource};
use crate::uplink::{StdoutUplink, UdpUplink, Uplink, UplinkError, check_payload, to_hex};

#[derive(Parser)]
#[command(name = "lpp-harness")]
#[command(about = "Encode sensor readings as Cayenne LPP and send them uplink")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "lpp-harness.toml")]
    config: PathBuf,
    /// Number of uplinks to send, 0 runs until Ctrl+C
    #[arg(long)]
    cycles: Option<u64>,
    /// Reject out-of-range channels and values instead of truncating them
    #[arg(long)]
    strict: bool,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "tracing=info,lpp_harness=info,lpp_core=info".to_owned());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE)
        .init();

    let cli = Cli::parse();

    let mut config = if cli.config.exists() {
        info!(path = ?cli.config, "Loading configuration");
        Config::load(&cli.config)?
    } else {
        info!("No configuration file found, using defaults");
        Config::default()
    };

    if let Some(cycles) = cli.cycles {
        config.uplink.cycles = cycles;
    }
    if cli.strict {
        config.encoder.overflow = OverflowPolicy::Reject;
    }

    info!(
        device = %config.device.name,
        readings = config.readings.len(),
        policy = ?config.encoder.overflow,
        max_payload = config.uplink.max_payload,
        interval_secs = config.uplink.interval_secs,
        cycles = config.uplink.cycles,
        "Starting lpp-harness"
    );

    let uplink: Box<dyn Uplink> = match config.uplink.transport {
        TransportConfig::Stdout => {
            info!("Using stdout uplink");
            Box::new(StdoutUplink)
        }
        TransportConfig::Udp { addr } => {
            info!(addr = %addr, "Using UDP uplink");
            Box::new(UdpUplink::connect(addr).await?)
        }
    };

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Received Ctrl+C, shutting down...");
                cancel.cancel();
            }
        });
    }

    let mut source = ConfiguredSource::new(config.readings.clone(), rand::rng());
    let mut encoder = LppEncoder::with_policy(config.encoder.overflow);
    let interval = Duration::from_secs(config.uplink.interval_secs);

    let mut cycle: u64 = 0;
    loop {
        cycle += 1;

        match run_cycle(&mut encoder, &mut source, uplink.as_ref(), config.uplink.max_payload)
            .await
        {
            Ok(report) => {
                info!(
                    cycle,
                    size = report.size,
                    payload = %to_hex(encoder.buffer()),
                    "Uplink sent"
                );
                if let Some(downlink) = report.downlink {
                    info!(
                        cycle,
                        size = downlink.len(),
                        payload = %to_hex(&downlink),
                        "Received downlink"
                    );
                }
            }
            Err(e) => error!(cycle, error = %e, "Uplink failed"),
        }

        if config.uplink.cycles != 0 && cycle >= config.uplink.cycles {
            break;
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    info!(cycles = cycle, "Harness shutdown complete");
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
struct CycleReport {
    /// Bytes sent uplink.
    size: usize,
    downlink: Option<Vec<u8>>,
}

/// Encodes one round of readings into `encoder`, hands the payload to
/// `uplink`, then picks up whatever downlink is already waiting. Readings
/// the encoder refuses are logged and left out.
async fn run_cycle(
    encoder: &mut LppEncoder,
    source: &mut impl SensorSource,
    uplink: &dyn Uplink,
    max_payload: usize,
) -> Result<CycleReport, UplinkError> {
    encoder.reset();

    for (channel, measurement) in source.sample() {
        if let Err(e) = encoder.append(channel, &measurement) {
            warn!(channel, kind = %measurement.kind(), error = %e, "Dropping reading");
        }
    }

    check_payload(encoder.buffer(), max_payload)?;
    uplink.send(encoder.buffer()).await?;

    let downlink = match uplink.poll_downlink().await {
        Ok(downlink) => downlink,
        Err(e) => {
            warn!(error = %e, "Downlink read failed");
            None
        }
    };

    Ok(CycleReport {
        size: encoder.size(),
        downlink,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use lpp_core::{Channel, Measurement};

    use super::*;

    #[derive(Default)]
    struct RecordingUplink {
        sent: Mutex<Vec<Vec<u8>>>,
        downlinks: Mutex<Vec<Vec<u8>>>,
    }

    #[async_trait]
    impl Uplink for RecordingUplink {
        async fn send(&self, payload: &[u8]) -> Result<(), UplinkError> {
            self.sent.lock().unwrap().push(payload.to_vec());
            Ok(())
        }

        async fn poll_downlink(&self) -> Result<Option<Vec<u8>>, UplinkError> {
            Ok(self.downlinks.lock().unwrap().pop())
        }
    }

    fn sent(size: usize) -> CycleReport {
        CycleReport {
            size,
            downlink: None,
        }
    }

    struct FixedSource(Vec<(Channel, Measurement)>);

    impl SensorSource for FixedSource {
        fn sample(&mut self) -> Vec<(Channel, Measurement)> {
            self.0.clone()
        }
    }

    #[tokio::test]
    async fn cycles_reuse_the_encoder() -> Result<(), UplinkError> {
        let uplink = RecordingUplink::default();
        let mut source = FixedSource(vec![
            (1, Measurement::Temperature { value: 27.2 }),
            (1, Measurement::DigitalInput { value: 1.0 }),
        ]);
        let mut encoder = LppEncoder::new();

        assert_eq!(run_cycle(&mut encoder, &mut source, &uplink, 51).await?, sent(7));
        assert_eq!(run_cycle(&mut encoder, &mut source, &uplink, 51).await?, sent(7));

        let sent = uplink.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0], [0x01, 0x67, 0x01, 0x10, 0x01, 0x00, 0x01]);
        assert_eq!(sent[0], sent[1]);
        Ok(())
    }

    #[tokio::test]
    async fn oversize_payload_is_not_sent() {
        let uplink = RecordingUplink::default();
        let gps = Measurement::Gps {
            latitude: 52.3676,
            longitude: 4.9041,
            altitude: 2.0,
        };
        let mut source = FixedSource(vec![(1, gps), (2, gps)]);
        let mut encoder = LppEncoder::new();

        let result = run_cycle(&mut encoder, &mut source, &uplink, 20).await;
        assert!(matches!(
            result,
            Err(UplinkError::PayloadTooLarge { size: 22, max: 20 })
        ));
        assert!(uplink.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn strict_encoder_drops_bad_readings() -> Result<(), UplinkError> {
        let uplink = RecordingUplink::default();
        let mut source = FixedSource(vec![
            (300, Measurement::Temperature { value: 20.0 }),
            (1, Measurement::RelativeHumidity { value: 50.0 }),
        ]);
        let mut encoder = LppEncoder::strict();

        assert_eq!(run_cycle(&mut encoder, &mut source, &uplink, 0).await?, sent(3));
        assert_eq!(uplink.sent.lock().unwrap()[0], [0x01, 0x68, 0x64]);
        Ok(())
    }

    #[tokio::test]
    async fn downlink_is_picked_up_after_send() -> Result<(), UplinkError> {
        let uplink = RecordingUplink::default();
        uplink.downlinks.lock().unwrap().push(vec![0x01, 0xFF]);
        let mut source = FixedSource(vec![(1, Measurement::Presence { value: 1.0 })]);
        let mut encoder = LppEncoder::new();

        let report = run_cycle(&mut encoder, &mut source, &uplink, 51).await?;
        assert_eq!(
            report,
            CycleReport {
                size: 3,
                downlink: Some(vec![0x01, 0xFF]),
            }
        );

        let report = run_cycle(&mut encoder, &mut source, &uplink, 51).await?;
        assert_eq!(report.downlink, None);
        assert_eq!(uplink.sent.lock().unwrap().len(), 2);
        Ok(())
    }
}
