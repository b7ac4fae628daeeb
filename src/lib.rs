// MIT License - Copyright (c) 2026 Peter Wright
// NX-595E web client
//
//! # nx-web-bridge
//!
//! Client for the embedded web server of NX-595E alarm panel modules:
//! read the area and zone status, arm, disarm, toggle chime and bypass
//! zones.
//!
//! The panel hands out a short-lived session token on login and drops it
//! without notice, answering either 403 or the login page with a 200 status.
//! Every request goes through one path that attaches the current session,
//! recognises both kinds of rejection, logs in again and retries once.
//!
//! ## Quick Start
//!
//! ```no_run
//! use nx_web_bridge::{NxAlarm, PanelSettings, SystemTrigger};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = PanelSettings::builder()
//!         .protocol("https")
//!         .host("192.168.1.50")
//!         .user("User 1")
//!         .pin("1234")
//!         .build();
//!
//!     let mut alarm = NxAlarm::new(settings)?;
//!     let status = alarm.fetch_system_status().await?;
//!     if status.ready {
//!         alarm.set_system(SystemTrigger::Arm).await?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod constants;
pub mod devices;
pub mod error;
pub mod panel;
pub mod parse;
pub mod protocol;
pub mod session;
pub mod transport;

// Re-exports for convenience
pub use config::{PanelSettings, PanelSettingsBuilder, SystemTrigger, ZoneFetchMode};
pub use devices::system::SystemStatus;
pub use devices::zone::{zone_status, RawZoneTable, ZoneStatus, ZoneStatusFlags, ZoneView, Zones};
pub use error::{NxError, Result};
pub use panel::NxAlarm;
pub use session::SessionStore;
