// MIT License - Copyright (c) 2026 Peter Wright
// Panel state models

pub mod system;
pub mod zone;

pub use system::SystemStatus;
pub use zone::{zone_status, zone_statuses, RawZoneTable, ZoneRow, ZoneStatus, ZoneStatusFlags, ZoneView, Zones};
