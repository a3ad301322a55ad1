//! Keyword layer for network-device CLI automation.
//!
//! This crate is the glue between a test harness and a CLI automation
//! driver: it keeps a registry of open device sessions addressable by
//! alias or index, exposes the keywords a test step invokes (`cli`,
//! `push_config`, `generate_config`, ...), renders every interaction as
//! an HTML fragment for the test report and maps driver failures into a
//! small taxonomy a test can branch on.
//!
//! Transport is delegated: anything implementing [`CliDriver`] and
//! [`DriverFactory`] plugs in. The bundled [`replay`] module provides a
//! scripted driver for tests and examples.
//!
//! ```
//! use netharness::{ConnectionProfile, DeviceType, Keywords};
//! use netharness::replay::{ReplayDriver, ReplayFactory};
//!
//! let factory = ReplayFactory::new().with_session(
//!     ReplayDriver::new(DeviceType::CiscoNxos, "switch1#")
//!         .expect_exchange("show hostname", "switch1\n"),
//! );
//! let mut keywords = Keywords::new(factory);
//!
//! tokio_test::block_on(async {
//!     let profile =
//!         ConnectionProfile::new("10.0.0.1", DeviceType::CiscoNxos, "admin", "secret");
//!     keywords.open_connection(&profile, Some("sw1")).await?;
//!
//!     let output = keywords.cli("show hostname", false).await?;
//!     assert_eq!(output, "switch1\n");
//!
//!     keywords.close_connections().await;
//!     Ok::<(), netharness::Error>(())
//! })
//! .unwrap();
//! ```

pub mod driver;
pub mod error;
pub mod keywords;
pub mod logging;
#[cfg(feature = "textfsm")]
pub mod parse;
pub mod registry;
pub mod replay;
pub mod template;

pub use driver::{
    CliDriver, CommitOutcome, ConnectionProfile, DeviceType, DriverFactory, ReadMode,
    TransferDirection, TransferRequest, TransferResult,
};
pub use error::{DriverError, Error, RegistryError, Result};
pub use keywords::Keywords;
pub use logging::{FacadeSink, HtmlLogger, LogSink};
pub use registry::{ConnectionRecord, ConnectionRegistry};
pub use template::generate_config;
