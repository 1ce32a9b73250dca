//! Persistence boundary: the remote relational store the board synchronizes
//! with, reduced to the row shapes and operations the projection needs.
//!
//! Appointments are upserted against their natural key
//! `(mechanic_id, date, time)` — the same triple `model::SlotKey` encodes — so
//! a conflicting write overwrites rather than duplicates. Dates travel as
//! `YYYY-MM-DD` strings and times as `HH:MM` grid labels.

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::model::{Appointment, Mechanic, Priority, SlotKey};

/// Opaque persistence failure (network, database, constraint). The store logs
/// these and degrades to a stale-but-usable projection; nothing is fatal.
#[derive(Debug, Clone)]
pub struct BackendError(pub String);

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "backend error: {}", self.0)
    }
}

impl std::error::Error for BackendError {}

/// `mechanics` table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MechanicRow {
    pub id: Ulid,
    pub name: String,
    pub order: i32,
}

/// `appointments` table row as returned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentRow {
    pub id: Ulid,
    pub mechanic_id: Ulid,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`, one of the grid labels
    pub time: String,
    pub client_name: String,
    pub service_description: String,
    pub priority: Priority,
}

/// An appointment write. Carries no id: the conflict target is the natural key
/// and the server assigns ids for fresh rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentUpsert {
    pub mechanic_id: Ulid,
    pub date: String,
    pub time: String,
    pub client_name: String,
    pub service_description: String,
    pub priority: Priority,
}

impl From<MechanicRow> for Mechanic {
    fn from(row: MechanicRow) -> Self {
        Mechanic {
            id: row.id,
            name: row.name,
            order: row.order,
        }
    }
}

impl From<&Mechanic> for MechanicRow {
    fn from(m: &Mechanic) -> Self {
        MechanicRow {
            id: m.id,
            name: m.name.clone(),
            order: m.order,
        }
    }
}

impl TryFrom<AppointmentRow> for Appointment {
    type Error = String;

    /// Fails for rows whose date does not parse or whose time label is not in
    /// the grid — such rows cannot form a `SlotKey`.
    fn try_from(row: AppointmentRow) -> Result<Self, String> {
        let date: NaiveDate = row
            .date
            .parse()
            .map_err(|_| format!("bad date {:?}", row.date))?;
        let key = SlotKey::new(date, row.mechanic_id, &row.time)
            .ok_or_else(|| format!("time {:?} is not a grid slot", row.time))?;
        Ok(Appointment {
            id: row.id,
            mechanic_id: row.mechanic_id,
            date,
            time: key.time(),
            client_name: row.client_name,
            service_description: row.service_description,
            priority: row.priority,
        })
    }
}

/// Request/response API of the remote store, one method per operation the
/// board issues. Implementations decide durability; the in-memory projection
/// never assumes more than these calls resolving.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn list_mechanics(&self) -> Result<Vec<MechanicRow>, BackendError>;

    async fn list_appointments(&self) -> Result<Vec<AppointmentRow>, BackendError>;

    /// Insert a mechanic, returning the created row with its server-assigned id.
    async fn insert_mechanic(&self, name: String, order: i32) -> Result<MechanicRow, BackendError>;

    /// Bulk upsert mechanics by id (used by reorder).
    async fn upsert_mechanics(&self, rows: Vec<MechanicRow>) -> Result<(), BackendError>;

    /// Delete a mechanic by id. The remote store is assumed to cascade-delete
    /// that mechanic's appointments.
    async fn delete_mechanic(&self, id: Ulid) -> Result<(), BackendError>;

    /// Batch upsert with conflict target `(mechanic_id, date, time)`; returns
    /// the saved rows, ids included.
    async fn upsert_appointments(
        &self,
        rows: Vec<AppointmentUpsert>,
    ) -> Result<Vec<AppointmentRow>, BackendError>;

    async fn delete_appointment(&self, id: Ulid) -> Result<(), BackendError>;
}

type NaturalKey = (Ulid, String, String);

/// Reference in-process backend. Assigns Ulids on insert, enforces the
/// natural-key unique constraint with genuine upsert semantics, and cascades
/// mechanic deletion the way the remote schema is assumed to.
#[derive(Default)]
pub struct MemoryBackend {
    mechanics: DashMap<Ulid, MechanicRow>,
    appointments: DashMap<NaturalKey, AppointmentRow>,
    /// id → natural key, for delete-by-id without a scan.
    by_id: DashMap<Ulid, NaturalKey>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn appointment_rows(&self) -> usize {
        self.appointments.len()
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn list_mechanics(&self) -> Result<Vec<MechanicRow>, BackendError> {
        Ok(self.mechanics.iter().map(|e| e.value().clone()).collect())
    }

    async fn list_appointments(&self) -> Result<Vec<AppointmentRow>, BackendError> {
        Ok(self.appointments.iter().map(|e| e.value().clone()).collect())
    }

    async fn insert_mechanic(&self, name: String, order: i32) -> Result<MechanicRow, BackendError> {
        let row = MechanicRow {
            id: Ulid::new(),
            name,
            order,
        };
        self.mechanics.insert(row.id, row.clone());
        Ok(row)
    }

    async fn upsert_mechanics(&self, rows: Vec<MechanicRow>) -> Result<(), BackendError> {
        for row in rows {
            self.mechanics.insert(row.id, row);
        }
        Ok(())
    }

    async fn delete_mechanic(&self, id: Ulid) -> Result<(), BackendError> {
        if self.mechanics.remove(&id).is_none() {
            return Err(BackendError(format!("mechanic {id} not found")));
        }
        // Cascade: drop the mechanic's appointment rows.
        let doomed: Vec<NaturalKey> = self
            .appointments
            .iter()
            .filter(|e| e.value().mechanic_id == id)
            .map(|e| e.key().clone())
            .collect();
        for key in doomed {
            if let Some((_, row)) = self.appointments.remove(&key) {
                self.by_id.remove(&row.id);
            }
        }
        Ok(())
    }

    async fn upsert_appointments(
        &self,
        rows: Vec<AppointmentUpsert>,
    ) -> Result<Vec<AppointmentRow>, BackendError> {
        let mut saved = Vec::with_capacity(rows.len());
        for up in rows {
            let key: NaturalKey = (up.mechanic_id, up.date.clone(), up.time.clone());
            // Conflicting rows keep their id; fresh rows get a new one.
            let id = self
                .appointments
                .get(&key)
                .map(|e| e.value().id)
                .unwrap_or_else(Ulid::new);
            let row = AppointmentRow {
                id,
                mechanic_id: up.mechanic_id,
                date: up.date,
                time: up.time,
                client_name: up.client_name,
                service_description: up.service_description,
                priority: up.priority,
            };
            self.by_id.insert(id, key.clone());
            self.appointments.insert(key, row.clone());
            saved.push(row);
        }
        Ok(saved)
    }

    async fn delete_appointment(&self, id: Ulid) -> Result<(), BackendError> {
        let Some((_, key)) = self.by_id.remove(&id) else {
            return Err(BackendError(format!("appointment {id} not found")));
        };
        self.appointments.remove(&key);
        Ok(())
    }
}
