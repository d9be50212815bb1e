//! Simulated sensor producer
//!
//! Usage: cargo run --bin sensor-feed -- <config file>
//!
//! Listens on the configured host:port, waits for a client to send `start`,
//! then streams frames for the configured schema: time of day advances by one
//! tick per frame and every other field carries a random reading.
//!
//! Environment variables:
//! - SENSOR_FEED_TICK_MS: time between frames (default: 1000)
//! - SENSOR_FEED_FRAMES: frames per client (default: until the client disconnects)
//! - SENSORLOG_CONFIG, SENSORLOG_HOST, SENSORLOG_PORT: as for the collector

use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::net::{TcpListener, TcpStream};
use std::time::Duration;

use chrono::Timelike;
use rand::Rng;
use sensorlog::config::{Config, CONFIG_PATH_ENV};
use sensorlog::data::{FieldKind, Schema, Value, HOUR, MINUTE, SECOND};
use sensorlog::data::time::{HOUR_MILLIS, MINUTE_MILLIS, SECOND_MILLIS};
use sensorlog::ingest::wire::write_frame;
use sensorlog::ingest::Frame;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DAY_MILLIS: i64 = 24 * HOUR_MILLIS;

struct FeedSettings {
    tick: Duration,
    frames: Option<u64>,
}

impl FeedSettings {
    fn from_env() -> Self {
        let tick_ms: u64 = std::env::var("SENSOR_FEED_TICK_MS")
            .ok()
            .and_then(|t| t.parse().ok())
            .unwrap_or(1000);
        let frames = std::env::var("SENSOR_FEED_FRAMES")
            .ok()
            .and_then(|f| f.parse().ok());
        Self {
            tick: Duration::from_millis(tick_ms),
            frames,
        }
    }
}

/// Build one frame for `millis` from midnight. `hour` and `minute` must be
/// integer fields, as `Config::validate_schema` enforces.
fn make_frame<R: Rng>(schema: &Schema, millis: i64, rng: &mut R) -> Frame {
    let millis = millis.rem_euclid(DAY_MILLIS);
    let hour = (millis / HOUR_MILLIS) as i32;
    let minute = (millis % HOUR_MILLIS / MINUTE_MILLIS) as i32;
    let second_millis = millis % MINUTE_MILLIS;

    schema
        .fields()
        .iter()
        .map(|field| {
            let value = match (field.name.as_str(), field.kind) {
                (HOUR, _) => Value::Int(hour),
                (MINUTE, _) => Value::Int(minute),
                (SECOND, FieldKind::Int) => Value::Int((second_millis / SECOND_MILLIS) as i32),
                (SECOND, FieldKind::Float) => Value::Float(second_millis as f32 / SECOND_MILLIS as f32),
                (_, FieldKind::Int) => Value::Int(rng.gen_range(0..1000)),
                (_, FieldKind::Float) => {
                    Value::Float((rng.gen_range(-200..400) as f32) / 10.0)
                }
            };
            (field.name.clone(), value)
        })
        .collect()
}

fn serve(stream: TcpStream, schema: &Schema, settings: &FeedSettings) -> io::Result<u64> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut command = String::new();
    reader.read_line(&mut command)?;
    if command.trim() != "start" {
        tracing::warn!("Unexpected command {:?}, closing", command.trim());
        return Ok(0);
    }

    let now = chrono::Local::now().time();
    let mut millis = now.num_seconds_from_midnight() as i64 * SECOND_MILLIS;
    let tick_millis = settings.tick.as_millis() as i64;
    let mut rng = rand::thread_rng();
    let mut writer = BufWriter::new(stream);
    let mut sent = 0;

    while settings.frames.map_or(true, |limit| sent < limit) {
        let frame = make_frame(schema, millis, &mut rng);
        if let Err(e) = write_frame(&mut writer, schema, &frame).and_then(|_| writer.flush()) {
            if matches!(e.kind(), io::ErrorKind::BrokenPipe | io::ErrorKind::ConnectionReset) {
                tracing::info!("Client disconnected");
                break;
            }
            return Err(e);
        }
        sent += 1;
        millis += tick_millis;
        std::thread::sleep(settings.tick);
    }

    Ok(sent)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sensor_feed=info,sensorlog=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = match std::env::args().nth(1) {
        Some(path) => path,
        None => std::env::var(CONFIG_PATH_ENV)
            .map_err(|_| "usage: sensor-feed <config file>")?,
    };

    // The feed only needs the address and schema, so the output directory
    // is not validated here
    let mut config = Config::parse(&std::fs::read_to_string(&config_path)?)?;
    config.apply_env_overrides()?;
    config.validate_schema()?;
    let settings = FeedSettings::from_env();

    let listener = TcpListener::bind((config.host.as_str(), config.port))?;
    tracing::info!("Sensor feed listening on {}", listener.local_addr()?);
    tracing::info!("  Schema: {}", config.schema);
    tracing::info!("  Tick: {:?}", settings.tick);

    for stream in listener.incoming() {
        let stream = stream?;
        let peer = stream.peer_addr()?;
        tracing::info!("Client connected from {}", peer);
        match serve(stream, &config.schema, &settings) {
            Ok(sent) => tracing::info!("Sent {} frames to {}", sent, peer),
            Err(e) => tracing::warn!("Feed to {} failed: {}", peer, e),
        }
    }

    Ok(())
}
