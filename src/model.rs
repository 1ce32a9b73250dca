use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::grid;

/// Visual priority of a booked slot. `Zero` is the default/unset state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Max,
    High,
    Normal,
    Low,
    #[default]
    Zero,
    Absence,
}

/// A mechanic column on the board. `order` drives display order, ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mechanic {
    pub id: Ulid,
    pub name: String,
    pub order: i32,
}

/// One booked slot. At most one exists per (date, mechanic, time) triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appointment {
    pub id: Ulid,
    pub mechanic_id: Ulid,
    pub date: NaiveDate,
    /// Canonical grid label, e.g. `"09:30"`.
    pub time: &'static str,
    pub client_name: String,
    pub service_description: String,
    pub priority: Priority,
}

/// The payload shared by every slot of one range-save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotPayload {
    pub client_name: String,
    pub service_description: String,
    pub priority: Priority,
}

/// Composite natural key for an appointment: (date, mechanic, time).
///
/// The time component is stored as the slot's grid index, so a key can only be
/// built for labels the grid knows about — the same codec backs both projection
/// lookups and range-save write sets, which keeps the two consistent by
/// construction. Distinct triples never collide: each component occupies its
/// own field and the grid index maps one-to-one onto labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotKey {
    pub date: NaiveDate,
    pub mechanic_id: Ulid,
    slot: u8,
}

impl SlotKey {
    /// Encode a (date, mechanic, time label) triple. `None` when `time` is not
    /// a grid label.
    pub fn new(date: NaiveDate, mechanic_id: Ulid, time: &str) -> Option<Self> {
        let slot = grid::slot_index(time)?;
        Some(Self {
            date,
            mechanic_id,
            slot: slot as u8,
        })
    }

    /// Decode the time component back to its canonical grid label.
    pub fn time(&self) -> &'static str {
        // A SlotKey can only be constructed from a valid grid index.
        grid::slot_label(self.slot as usize).unwrap()
    }
}

impl Appointment {
    pub fn key(&self) -> SlotKey {
        // `time` on a constructed Appointment is always a canonical grid label.
        SlotKey::new(self.date, self.mechanic_id, self.time).unwrap()
    }
}
