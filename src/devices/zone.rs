// MIT License - Copyright (c) 2026 Peter Wright
// Zone-state rows and the per-zone status decoder

use bitflags::bitflags;

use crate::constants::{zone_rows, MAX_ZONES, ZONES_PER_CHUNK, ZONE_CATEGORY_ROWS, ZONE_CHUNKS};

bitflags! {
    /// Semantic status of one zone.
    ///
    /// The flags are independent: a bypassed zone can also be in alarm and
    /// report a system condition at the same time.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ZoneStatusFlags: u8 {
        /// Row 0 bit clear
        const READY            = 0b0001;
        /// Row 3 or row 4 bit set
        const BYPASS           = 0b0010;
        /// Row 1, 2, 6 or 7 bit set
        const SYSTEM_CONDITION = 0b0100;
        /// Row 5 bit set
        const IN_ALARM         = 0b1000;
    }
}

impl ZoneStatusFlags {
    /// Human-readable names of the set flags.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.contains(Self::READY) { names.push("Ready"); }
        if self.contains(Self::BYPASS) { names.push("Bypassed"); }
        if self.contains(Self::SYSTEM_CONDITION) { names.push("SystemCondition"); }
        if self.contains(Self::IN_ALARM) { names.push("InAlarm"); }
        names
    }
}

/// One zone-state row: four 16-zone bitmask chunks.
pub type ZoneRow = [u32; ZONE_CHUNKS];

/// Zone-state rows indexed by the slot the panel echoed for each of them.
///
/// Rows that were never filled read as zero and are reported by
/// [`RawZoneTable::is_complete`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawZoneTable {
    rows: Vec<Option<ZoneRow>>,
}

impl RawZoneTable {
    /// Table with `rows` unfilled slots.
    pub fn with_rows(rows: usize) -> Self {
        Self {
            rows: vec![None; rows],
        }
    }

    /// Table from fully known rows.
    pub fn from_rows(rows: Vec<ZoneRow>) -> Self {
        Self {
            rows: rows.into_iter().map(Some).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Store a row at `slot`. Returns false when the slot is out of range.
    pub fn set(&mut self, slot: usize, row: ZoneRow) -> bool {
        match self.rows.get_mut(slot) {
            Some(entry) => {
                *entry = Some(row);
                true
            }
            None => false,
        }
    }

    /// Row at `slot`, zero-valued when missing or not yet fetched.
    pub fn row(&self, slot: usize) -> ZoneRow {
        self.rows.get(slot).copied().flatten().unwrap_or_default()
    }

    /// Whether every slot has been filled.
    pub fn is_complete(&self) -> bool {
        self.rows.iter().all(Option::is_some)
    }

    /// Whether the table has a slot for every status category row.
    pub fn covers_categories(&self) -> bool {
        self.rows.len() >= ZONE_CATEGORY_ROWS
    }

    /// Slots that were never filled.
    pub fn missing_slots(&self) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_none())
            .map(|(i, _)| i)
            .collect()
    }

    fn bit(&self, slot: usize, chunk: usize, mask: u32) -> bool {
        self.row(slot)[chunk] & mask != 0
    }
}

/// Decode the status of zone `index` from the raw rows.
///
/// `chunk = index / 16`, `bit = 1 << (index % 16)`. Pure: the result depends
/// only on `index` and `table`. Zones beyond the encodable range decode from
/// zero rows.
pub fn zone_status(index: usize, table: &RawZoneTable) -> ZoneStatusFlags {
    let chunk = index / ZONES_PER_CHUNK;
    if chunk >= ZONE_CHUNKS {
        return ZoneStatusFlags::READY;
    }
    let mask = 1u32 << (index % ZONES_PER_CHUNK);
    let bit = |slot| table.bit(slot, chunk, mask);

    let mut flags = ZoneStatusFlags::empty();
    if bit(zone_rows::IN_ALARM) {
        flags |= ZoneStatusFlags::IN_ALARM;
    }
    if bit(zone_rows::SYSTEM_CONDITION_A)
        || bit(zone_rows::SYSTEM_CONDITION_B)
        || bit(zone_rows::SYSTEM_CONDITION_C)
        || bit(zone_rows::SYSTEM_CONDITION_D)
    {
        flags |= ZoneStatusFlags::SYSTEM_CONDITION;
    }
    if bit(zone_rows::BYPASS_A) || bit(zone_rows::BYPASS_B) {
        flags |= ZoneStatusFlags::BYPASS;
    }
    if !bit(zone_rows::NOT_READY) {
        flags |= ZoneStatusFlags::READY;
    }
    flags
}

/// Decoded status of one zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ZoneStatus {
    pub flags: ZoneStatusFlags,
    /// Set when at least one raw row could not be fetched, so the flags may
    /// read "clear" for a zone whose real state is unknown.
    pub degraded: bool,
}

impl ZoneStatus {
    pub fn is_ready(&self) -> bool { self.flags.contains(ZoneStatusFlags::READY) }
    pub fn is_bypassed(&self) -> bool { self.flags.contains(ZoneStatusFlags::BYPASS) }
    pub fn is_system_condition(&self) -> bool { self.flags.contains(ZoneStatusFlags::SYSTEM_CONDITION) }
    pub fn is_in_alarm(&self) -> bool { self.flags.contains(ZoneStatusFlags::IN_ALARM) }
}

/// Decode `count` zones (capped at the encodable maximum).
///
/// Every zone depends on every row, so a single unfilled row, or a table
/// shorter than the category rows, marks all decoded zones degraded.
pub fn zone_statuses(table: &RawZoneTable, count: usize) -> Vec<ZoneStatus> {
    let degraded = !table.covers_categories() || !table.is_complete();
    (0..count.min(MAX_ZONES))
        .map(|i| ZoneStatus {
            flags: zone_status(i, table),
            degraded,
        })
        .collect()
}

/// Zone names and statuses from the latest fetch.
///
/// The two sequences come from different endpoints and may differ in length;
/// look zones up through [`Zones::zone`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Zones {
    pub names: Vec<String>,
    pub status: Vec<ZoneStatus>,
}

/// One zone as seen through [`Zones::zone`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneView<'a> {
    pub index: usize,
    pub name: Option<&'a str>,
    pub status: Option<&'a ZoneStatus>,
}

impl Zones {
    /// Zone at `index`; missing names or statuses come back as `None`.
    pub fn zone(&self, index: usize) -> ZoneView<'_> {
        ZoneView {
            index,
            name: self.names.get(index).map(String::as_str),
            status: self.status.get(index),
        }
    }

    /// Number of zones known through either names or statuses.
    pub fn len(&self) -> usize {
        self.names.len().max(self.status.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = ZoneView<'_>> + '_ {
        (0..self.len()).map(move |i| self.zone(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with(slot: usize, chunk: usize, value: u32) -> RawZoneTable {
        let mut rows = vec![[0u32; ZONE_CHUNKS]; 8];
        rows[slot][chunk] = value;
        RawZoneTable::from_rows(rows)
    }

    #[test]
    fn test_alarm_bit_zone_3() {
        let table = table_with(zone_rows::IN_ALARM, 0, 1 << 3);
        let flags = zone_status(3, &table);
        assert_eq!(flags, ZoneStatusFlags::READY | ZoneStatusFlags::IN_ALARM);
        let status = ZoneStatus { flags, degraded: false };
        assert!(status.is_ready());
        assert!(!status.is_bypassed());
        assert!(!status.is_system_condition());
        assert!(status.is_in_alarm());
    }

    #[test]
    fn test_all_zero_is_ready() {
        let table = RawZoneTable::from_rows(vec![[0; ZONE_CHUNKS]; 8]);
        for i in 0..MAX_ZONES {
            assert_eq!(zone_status(i, &table), ZoneStatusFlags::READY);
        }
    }

    #[test]
    fn test_not_ready_inverts() {
        let table = table_with(zone_rows::NOT_READY, 1, 1 << 2);
        // zone 18 = chunk 1, bit 2
        assert!(!zone_status(18, &table).contains(ZoneStatusFlags::READY));
        assert!(zone_status(2, &table).contains(ZoneStatusFlags::READY));
        assert!(zone_status(19, &table).contains(ZoneStatusFlags::READY));
    }

    #[test]
    fn test_system_condition_rows() {
        for slot in [1, 2, 6, 7] {
            let table = table_with(slot, 0, 1);
            let flags = zone_status(0, &table);
            assert!(flags.contains(ZoneStatusFlags::SYSTEM_CONDITION), "row {slot}");
            assert!(!flags.contains(ZoneStatusFlags::BYPASS));
        }
    }

    #[test]
    fn test_bypass_rows() {
        for slot in [3, 4] {
            let table = table_with(slot, 3, 1 << 15);
            assert!(zone_status(63, &table).contains(ZoneStatusFlags::BYPASS), "row {slot}");
            assert!(!zone_status(47, &table).contains(ZoneStatusFlags::BYPASS));
        }
    }

    #[test]
    fn test_flags_are_independent() {
        let mut rows = vec![[0u32; ZONE_CHUNKS]; 8];
        rows[zone_rows::NOT_READY][0] = 1 << 4;
        rows[zone_rows::BYPASS_B][0] = 1 << 4;
        rows[zone_rows::IN_ALARM][0] = 1 << 4;
        rows[zone_rows::SYSTEM_CONDITION_D][0] = 1 << 4;
        let table = RawZoneTable::from_rows(rows);
        assert_eq!(
            zone_status(4, &table),
            ZoneStatusFlags::BYPASS | ZoneStatusFlags::IN_ALARM | ZoneStatusFlags::SYSTEM_CONDITION
        );
    }

    #[test]
    fn test_decoder_is_pure() {
        let mut rows = vec![[0u32; ZONE_CHUNKS]; 8];
        rows[0] = [0xA5A5, 0x0F0F, 0, 0xFFFF];
        rows[3] = [0x1234, 0, 0x8000, 0];
        rows[5] = [0x0001, 0x4000, 0, 0x00F0];
        let table = RawZoneTable::from_rows(rows);
        for i in 0..MAX_ZONES {
            assert_eq!(zone_status(i, &table), zone_status(i, &table));
        }
    }

    #[test]
    fn test_short_table_reads_zero() {
        // Only the first two rows known; alarm row absent.
        let table = RawZoneTable::from_rows(vec![[1, 0, 0, 0], [0, 0, 0, 0]]);
        assert_eq!(zone_status(0, &table), ZoneStatusFlags::empty());
        assert_eq!(zone_status(1, &table), ZoneStatusFlags::READY);
    }

    #[test]
    fn test_out_of_range_zone() {
        let table = table_with(zone_rows::IN_ALARM, 3, 0xFFFF);
        assert_eq!(zone_status(MAX_ZONES, &table), ZoneStatusFlags::READY);
    }

    #[test]
    fn test_table_slots() {
        let mut table = RawZoneTable::with_rows(3);
        assert!(!table.is_complete());
        assert!(table.set(2, [1, 2, 3, 4]));
        assert!(!table.set(3, [1, 1, 1, 1]));
        assert_eq!(table.row(2), [1, 2, 3, 4]);
        assert_eq!(table.row(0), [0, 0, 0, 0]);
        assert_eq!(table.missing_slots(), vec![0, 1]);
        table.set(0, [0; 4]);
        table.set(1, [0; 4]);
        assert!(table.is_complete());
    }

    #[test]
    fn test_zone_statuses_marks_degraded() {
        let mut table = RawZoneTable::with_rows(8);
        for slot in 0..7 {
            table.set(slot, [0; 4]);
        }
        let statuses = zone_statuses(&table, 5);
        assert_eq!(statuses.len(), 5);
        assert!(statuses.iter().all(|s| s.degraded));

        table.set(7, [0; 4]);
        let statuses = zone_statuses(&table, 100);
        assert_eq!(statuses.len(), MAX_ZONES);
        assert!(statuses.iter().all(|s| !s.degraded && s.is_ready()));

        let statuses = zone_statuses(&RawZoneTable::default(), 2);
        assert!(statuses.iter().all(|s| s.degraded));
    }

    #[test]
    fn test_short_table_is_degraded() {
        let table = RawZoneTable::from_rows(vec![[0; 4]]);
        assert!(table.is_complete());
        assert!(!table.covers_categories());

        let statuses = zone_statuses(&table, 3);
        assert_eq!(statuses.len(), 3);
        assert!(statuses.iter().all(|s| s.degraded));

        let full = RawZoneTable::from_rows(vec![[0; 4]; ZONE_CATEGORY_ROWS]);
        assert!(full.covers_categories());
        assert!(zone_statuses(&full, 3).iter().all(|s| !s.degraded));
    }

    #[test]
    fn test_zone_view_out_of_range() {
        let zones = Zones {
            names: vec!["Front Door".to_string(), "Garage".to_string()],
            status: vec![ZoneStatus::default()],
        };
        assert_eq!(zones.len(), 2);
        let z = zones.zone(1);
        assert_eq!(z.name, Some("Garage"));
        assert!(z.status.is_none());
        let z = zones.zone(9);
        assert!(z.name.is_none() && z.status.is_none());
        assert_eq!(zones.iter().count(), 2);
    }

    #[test]
    fn test_flag_names() {
        let flags = ZoneStatusFlags::READY | ZoneStatusFlags::IN_ALARM;
        assert_eq!(flags.names(), vec!["Ready", "InAlarm"]);
        assert!(ZoneStatusFlags::empty().names().is_empty());
    }
}
