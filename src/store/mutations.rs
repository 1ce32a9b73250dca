use std::iter;

use chrono::NaiveDate;
use tracing::{error, warn};
use ulid::Ulid;

use crate::backend::MechanicRow;
use crate::model::{Appointment, Mechanic, SlotPayload};
use crate::range;

use super::{Store, StoreError};

impl Store {
    /// Create a mechanic with the next display order (max existing + 1, or 1
    /// on an empty board) and append the created record to the projection.
    pub async fn add_mechanic(&self, name: &str) -> Result<Mechanic, StoreError> {
        let next_order = {
            let mechanics = self.mechanics.read().await;
            mechanics.iter().map(|m| m.order).max().unwrap_or(0) + 1
        };

        let row = self
            .backend
            .insert_mechanic(name.to_string(), next_order)
            .await
            .inspect_err(|e| error!("add_mechanic: {e}"))?;

        let mechanic = Mechanic::from(row);
        self.mechanics.write().await.push(mechanic.clone());
        Ok(mechanic)
    }

    /// Delete a mechanic and evict every projected appointment that references
    /// it, mirroring the remote cascade. Callers confirm with the user before
    /// invoking; the store does not.
    pub async fn remove_mechanic(&self, id: Ulid) -> Result<(), StoreError> {
        self.backend
            .delete_mechanic(id)
            .await
            .inspect_err(|e| error!("remove_mechanic: {e}"))?;

        self.mechanics.write().await.retain(|m| m.id != id);
        self.appointments.retain(|_, a| a.mechanic_id != id);
        Ok(())
    }

    /// Apply a new column order optimistically, then persist it as a bulk
    /// upsert of `(id, name, order = position + 1)`.
    ///
    /// Never blocks the caller on the outcome: a persistence failure is not
    /// rolled back, it is healed by a full [`Store::load`] resync.
    pub async fn reorder_mechanics(&self, new_order: Vec<Mechanic>) {
        let reordered: Vec<Mechanic> = new_order
            .into_iter()
            .enumerate()
            .map(|(position, m)| Mechanic {
                order: position as i32 + 1,
                ..m
            })
            .collect();
        *self.mechanics.write().await = reordered.clone();

        let rows: Vec<MechanicRow> = reordered.iter().map(MechanicRow::from).collect();
        if let Err(e) = self.backend.upsert_mechanics(rows).await {
            warn!("reorder_mechanics: {e}; resyncing from backend");
            if let Err(e) = self.load().await {
                error!("reorder_mechanics: resync failed: {e}");
            }
        }
    }

    /// Book `start..=end` (lunch slots skipped) for the primary mechanic and
    /// each additional mechanic, one independent batch upsert per mechanic
    /// with an identical payload.
    ///
    /// Existing rows in the range are overwritten unconditionally — this is
    /// also the edit path. A failed batch is logged and does not roll back
    /// other mechanics' batches; an unresolvable or inverted range expands to
    /// nothing and no backend call is made. Returns the appointments actually
    /// written, already merged into the projection.
    pub async fn save_appointment_range(
        &self,
        date: NaiveDate,
        start_time: &str,
        end_time: &str,
        mechanic_id: Ulid,
        payload: &SlotPayload,
        additional_mechanics: &[Ulid],
    ) -> Vec<Appointment> {
        let mut written = Vec::new();

        for mechanic in iter::once(mechanic_id).chain(additional_mechanics.iter().copied()) {
            let rows = range::build_upserts(date, start_time, end_time, mechanic, payload);
            if rows.is_empty() {
                continue;
            }

            match self.backend.upsert_appointments(rows).await {
                Ok(saved) => {
                    for row in saved {
                        match Appointment::try_from(row) {
                            Ok(appointment) => {
                                self.appointments
                                    .insert(appointment.key(), appointment.clone());
                                written.push(appointment);
                            }
                            Err(e) => warn!("save_appointment_range: skipping saved row: {e}"),
                        }
                    }
                }
                Err(e) => error!("save_appointment_range: mechanic {mechanic}: {e}"),
            }
        }

        written
    }

    /// Delete an appointment by id and evict its projection entry. Lookup is
    /// by identity, not slot key — callers often only hold the id.
    pub async fn delete_appointment(&self, id: Ulid) -> Result<(), StoreError> {
        self.backend
            .delete_appointment(id)
            .await
            .inspect_err(|e| error!("delete_appointment: {e}"))?;

        let key = self
            .appointments
            .iter()
            .find(|entry| entry.value().id == id)
            .map(|entry| *entry.key());
        if let Some(key) = key {
            self.appointments.remove(&key);
        }
        Ok(())
    }
}
