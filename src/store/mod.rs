//! The appointment store: the authoritative in-memory projection of the
//! board, synchronized with the persistence boundary on every mutation.
//!
//! The projection is a cache over the remote source of truth. Mutations go
//! backend-first (validate → persist → apply), except reorder, which is
//! optimistic and heals divergence with a full [`Store::load`] instead of
//! rolling back. There is no cross-operation locking: concurrent writes to the
//! same slot are resolved by the backend's natural-key upsert (last writer
//! wins) and the projection applies results in resolution order.

mod error;
mod mutations;
mod queries;

pub use error::StoreError;

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::RwLock;
use tracing::{error, warn};

use crate::backend::Backend;
use crate::model::{Appointment, Mechanic, SlotKey};

pub struct Store {
    backend: Arc<dyn Backend>,
    /// Mechanic columns in display order (`order` ascending).
    mechanics: RwLock<Vec<Mechanic>>,
    /// Appointments keyed by their natural key.
    appointments: DashMap<SlotKey, Appointment>,
}

impl Store {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            mechanics: RwLock::new(Vec::new()),
            appointments: DashMap::new(),
        }
    }

    /// Fetch both tables and rebuild the projection wholesale (not a merge).
    ///
    /// On a backend failure nothing is touched: the prior projection stays
    /// usable and the error is logged and returned.
    pub async fn load(&self) -> Result<(), StoreError> {
        let (mechanics, appointments) = tokio::join!(
            self.backend.list_mechanics(),
            self.backend.list_appointments()
        );
        let mechanic_rows = mechanics.inspect_err(|e| error!("load: {e}"))?;
        let appointment_rows = appointments.inspect_err(|e| error!("load: {e}"))?;

        let mut mechanics: Vec<Mechanic> =
            mechanic_rows.into_iter().map(Mechanic::from).collect();
        mechanics.sort_by_key(|m| m.order);
        *self.mechanics.write().await = mechanics;

        self.appointments.clear();
        for row in appointment_rows {
            match Appointment::try_from(row) {
                Ok(appointment) => {
                    self.appointments.insert(appointment.key(), appointment);
                }
                // Off-grid rows can't form a slot key; they stay remote-only.
                Err(e) => warn!("load: skipping appointment row: {e}"),
            }
        }
        Ok(())
    }
}
