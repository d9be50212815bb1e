//! Sensorlog: bucketed sensor-frame storage with a stateful query API
//!
//! Collects fixed-layout binary frames from a sensor producer over TCP,
//! stores them as text records partitioned into ten time buckets, and
//! answers summary, search and paged read queries over the stored run.
//!
//! # Features
//!
//! - **Schema-driven frames**: `name:kind[:unit]` fields, 32-bit big-endian on the wire
//! - **Time bucketing**: a five-minute record window split into ten append-only files
//! - **Run summary**: record count, first and last timestamp, schema
//! - **Resumable search**: each call returns the next matching time of day
//! - **Paged reads**: a time window buffered once and handed out ten records at a time
//!
//! # Example
//!
//! ```no_run
//! use sensorlog::data::Schema;
//! use sensorlog::ingest::{Ingestor, TcpFrameSource};
//! use sensorlog::query::QueryEngine;
//! use sensorlog::storage::BucketStore;
//!
//! let schema = Schema::parse("hour:integer;minute:integer;second:float;temp:float:celsius").unwrap();
//! let store = BucketStore::open("/var/lib/sensorlog").unwrap();
//!
//! // Collect one run
//! let mut source = TcpFrameSource::connect("localhost:9000", schema.clone()).unwrap();
//! let report = Ingestor::new(store.clone(), schema.clone()).run(&mut source).unwrap();
//!
//! // Query it
//! let mut engine = QueryEngine::new(store, report.bucketer().unwrap(), schema);
//! println!("{}", engine.summary().unwrap().render());
//! let hit = engine.search("temp", "21.5").unwrap();
//! println!("First match at {}", hit);
//! ```

pub mod cli;
pub mod config;
pub mod data;
pub mod ingest;
pub mod query;
pub mod storage;

// Re-export commonly used types
pub use config::{Config, ConfigError};
pub use data::{Record, Schema, TimeIndex, Value};
pub use ingest::{IngestError, IngestReport, Ingestor};
pub use query::{AggregateStats, Page, QueryEngine, QueryError};
pub use storage::{BucketStore, Bucketer, StorageError};
