// MIT License - Copyright (c) 2026 Peter Wright
// Alarm facade over the panel web API

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::{PanelSettings, SystemTrigger, ZoneFetchMode};
use crate::constants::{MAX_ZONES, ZONE_CATEGORY_ROWS};
use crate::devices::system::SystemStatus;
use crate::devices::zone::{zone_statuses, RawZoneTable, Zones};
use crate::error::{NxError, Result};
use crate::parse::{self, SequenceReply, ZoneStateReply};
use crate::protocol::Command;
use crate::session::SessionStore;
use crate::transport::PanelTransport;

/// The main public API for one NX-595E panel.
///
/// Holds the settings, the last fetched area status and the last fetched
/// zones. Every operation runs its requests one after another; operations
/// that update state take `&mut self`, which keeps multi-step fetches from
/// interleaving.
///
/// # Example
///
/// ```no_run
/// use nx_web_bridge::{NxAlarm, PanelSettings, SystemTrigger};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let settings = PanelSettings::builder()
///         .host("192.168.1.50")
///         .user("User 1")
///         .pin("1234")
///         .build();
///
///     let mut alarm = NxAlarm::new(settings)?;
///
///     let status = alarm.fetch_system_status().await?;
///     println!("ready={} armed={}", status.ready, status.is_armed());
///
///     let zones = alarm.fetch_zone_status().await?;
///     for zone in zones.iter() {
///         println!("{:?} {:?}", zone.name, zone.status.map(|s| s.flags));
///     }
///
///     alarm.set_system(SystemTrigger::Stay).await?;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct NxAlarm {
    transport: PanelTransport,
    system: Option<SystemStatus>,
    zones: Zones,
    pinned_names: Option<Vec<String>>,
}

impl NxAlarm {
    /// Build a facade with a session store at `settings.session_file`.
    pub fn new(settings: PanelSettings) -> Result<Self> {
        let session = Arc::new(SessionStore::new(&settings.session_file));
        Self::with_session_store(settings, session)
    }

    /// Build a facade sharing an existing session store.
    pub fn with_session_store(settings: PanelSettings, session: Arc<SessionStore>) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            transport: PanelTransport::new(settings, session)?,
            system: None,
            zones: Zones::default(),
            pinned_names: None,
        })
    }

    /// Build a facade from `NX_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(PanelSettings::from_env()?)
    }

    /// Use these zone names instead of the ones stored in the panel.
    ///
    /// Some installations never store names in the panel, or store them
    /// inconsistently; pinned names also skip the `zones.htm` fetch.
    pub fn with_zone_names(mut self, names: Vec<String>) -> Self {
        self.zones.names = names.clone();
        self.pinned_names = Some(names);
        self
    }

    pub fn settings(&self) -> &PanelSettings {
        self.transport.settings()
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        self.transport.session()
    }

    /// Last fetched area status.
    pub fn system(&self) -> Option<&SystemStatus> {
        self.system.as_ref()
    }

    /// Last fetched zones.
    pub fn zones(&self) -> &Zones {
        &self.zones
    }

    /// Log in now instead of waiting for the panel to reject a request.
    pub async fn login(&self) -> Result<String> {
        self.transport.login().await
    }

    async fn run(&self, command: &Command) -> Result<Vec<u8>> {
        self.transport
            .execute(command, self.settings().auth_attempts())
            .await
    }

    // --- Status ---

    /// Fetch the area status. On error the previous status is kept.
    pub async fn fetch_system_status(&mut self) -> Result<&SystemStatus> {
        let body = self.run(&Command::Status).await?;
        let status = parse::system_status(&body)?;
        debug!("Area status seq={} ready={}", status.seq, status.ready);
        Ok(self.system.insert(status))
    }

    /// Fetch zone names and every zone-state row, then decode per-zone status.
    ///
    /// Rows are requested in order and stored at the slot the panel echoes.
    /// A failing row aborts the fetch in [`ZoneFetchMode::Strict`]; in
    /// [`ZoneFetchMode::BestEffort`] it is skipped and the decoded zones are
    /// flagged degraded. A sequence listing fewer rows than there are status
    /// categories is treated the same way. Session storage failures always
    /// abort. On error the previous zones are kept.
    pub async fn fetch_zone_status(&mut self) -> Result<&Zones> {
        let names = match &self.pinned_names {
            Some(names) => names.clone(),
            None => self.fetch_zone_names().await?,
        };

        let sequence = self.fetch_sequence().await?;
        let rows = sequence.zone_rows();
        let mode = self.settings().zone_fetch_mode;
        if rows < ZONE_CATEGORY_ROWS {
            if mode == ZoneFetchMode::Strict {
                return Err(NxError::decode(
                    Command::Sequence.path(),
                    format!("{} zone-state rows, expected {}", rows, ZONE_CATEGORY_ROWS),
                ));
            }
            warn!(
                "Panel lists {} zone-state rows, expected {}; zone status is degraded",
                rows, ZONE_CATEGORY_ROWS
            );
        }
        let mut table = RawZoneTable::with_rows(rows);

        for row in 0..rows {
            let result = self.fetch_zone_state(row).await.and_then(|reply| {
                if table.set(reply.slot, reply.row) {
                    Ok(())
                } else {
                    Err(NxError::decode(
                        Command::ZoneState { row }.path(),
                        format!("echoed slot {} outside {} rows", reply.slot, rows),
                    ))
                }
            });

            match result {
                Ok(()) => {}
                Err(e @ NxError::SessionStorage { .. }) => return Err(e),
                Err(e) if mode == ZoneFetchMode::Strict => return Err(e),
                Err(e) => warn!("Zone-state row {} unavailable: {}", row, e),
            }
        }

        if !table.is_complete() {
            warn!(
                "Zone-state rows {:?} missing, zone status is degraded",
                table.missing_slots()
            );
        }

        let count = if names.is_empty() {
            MAX_ZONES
        } else {
            names.len().min(MAX_ZONES)
        };
        let status = zone_statuses(&table, count);
        debug!("Decoded {} zones from {} rows", status.len(), rows);

        self.zones = Zones { names, status };
        Ok(&self.zones)
    }

    /// Zone display names from `zones.htm`.
    pub async fn fetch_zone_names(&self) -> Result<Vec<String>> {
        let body = self.run(&Command::ZoneNames).await?;
        parse::zone_names(&body)
    }

    /// Zone sequence descriptor from `seq.xml`.
    pub async fn fetch_sequence(&self) -> Result<SequenceReply> {
        let body = self.run(&Command::Sequence).await?;
        parse::sequence(&body)
    }

    /// One raw zone-state row from `zstate.xml`.
    pub async fn fetch_zone_state(&self, row: usize) -> Result<ZoneStateReply> {
        let body = self.run(&Command::ZoneState { row }).await?;
        parse::zone_state(&body)
    }

    // --- Commands ---

    /// Toggle bypass on a zone (0-indexed, as the panel numbers them).
    pub async fn set_bypass(&self, zone: usize) -> Result<()> {
        info!("Toggling bypass on zone {}", zone);
        self.run(&Command::Bypass { zone }).await?;
        Ok(())
    }

    /// Send a keypad trigger (arm, stay, disarm, chime).
    pub async fn set_system(&self, trigger: SystemTrigger) -> Result<()> {
        info!("Sending system trigger {}", trigger.as_str());
        self.run(&Command::KeyFunction { trigger }).await?;
        Ok(())
    }

    /// Send a keypad trigger given as its integer ordinal.
    ///
    /// Unknown values fail with [`NxError::InvalidTrigger`] before anything is
    /// sent.
    pub async fn set_system_code(&self, code: i32) -> Result<()> {
        let trigger = SystemTrigger::try_from(code)?;
        self.set_system(trigger).await
    }
}
