//! Range scheduling: expand a "book from start to end" intent into the
//! per-slot write set.
//!
//! Pure functions — the store applies the resulting batch. Policy, per the
//! board's rules: the end slot is itself booked (inclusive bound), lunch slots
//! inside the range are silently dropped, and an unresolvable or inverted
//! range expands to nothing (callers validated against the same grid the UI
//! offers, so there is nothing useful to report).

use chrono::NaiveDate;
use ulid::Ulid;

use crate::backend::AppointmentUpsert;
use crate::grid;
use crate::model::SlotPayload;

/// Slot labels from `start` to `end` inclusive, minus the lunch subset.
/// Empty when either label is off-grid or `start` sorts after `end`.
pub fn expand_range(start: &str, end: &str) -> Vec<&'static str> {
    let (Some(start_index), Some(end_index)) = (grid::slot_index(start), grid::slot_index(end))
    else {
        return Vec::new();
    };
    if start_index > end_index {
        return Vec::new();
    }

    (start_index..=end_index)
        .filter_map(grid::slot_label)
        .filter(|label| !grid::is_lunch(label))
        .collect()
}

/// One upsert row per surviving slot; every row shares the payload, only the
/// time differs. An empty result means the range-save is a no-op and no
/// backend call should be made.
pub fn build_upserts(
    date: NaiveDate,
    start: &str,
    end: &str,
    mechanic_id: Ulid,
    payload: &SlotPayload,
) -> Vec<AppointmentUpsert> {
    expand_range(start, end)
        .into_iter()
        .map(|time| AppointmentUpsert {
            mechanic_id,
            date: date.format("%Y-%m-%d").to_string(),
            time: time.to_string(),
            client_name: payload.client_name.clone(),
            service_description: payload.service_description.clone(),
            priority: payload.priority,
        })
        .collect()
}
