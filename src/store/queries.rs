use chrono::NaiveDate;
use ulid::Ulid;

use crate::grid;
use crate::model::{Appointment, Mechanic, SlotKey};

use super::Store;

impl Store {
    /// Pure slot lookup. `None` for a free slot or a time label outside the
    /// grid. Never touches the persistence boundary.
    pub fn get_appointment(
        &self,
        date: NaiveDate,
        time: &str,
        mechanic_id: Ulid,
    ) -> Option<Appointment> {
        let key = SlotKey::new(date, mechanic_id, time)?;
        self.appointments.get(&key).map(|e| e.value().clone())
    }

    /// Snapshot of the mechanic columns in display order.
    pub async fn mechanics(&self) -> Vec<Mechanic> {
        self.mechanics.read().await.clone()
    }

    /// All appointments on `date`, ordered by slot then mechanic — the day
    /// grid's read path.
    pub fn appointments_for_day(&self, date: NaiveDate) -> Vec<Appointment> {
        let mut day: Vec<Appointment> = self
            .appointments
            .iter()
            .filter(|e| e.value().date == date)
            .map(|e| e.value().clone())
            .collect();
        day.sort_by_key(|a| (grid::slot_index(a.time), a.mechanic_id));
        day
    }

    /// Booked-slot count for `date` (day header summary).
    pub fn appointment_count(&self, date: NaiveDate) -> usize {
        self.appointments
            .iter()
            .filter(|e| e.value().date == date)
            .count()
    }
}
