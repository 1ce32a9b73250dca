//! The bookable business day: a fixed ordered sequence of half-hour slots
//! plus the lunch subset that can never be booked.
//!
//! Both tables are process-lifetime constants. Every slot lookup in the crate
//! goes through `slot_index`, so a time label that is not in the sequence can
//! never reach the persistence boundary.

/// Ordered half-hour slot labels for one business day.
pub const TIME_SLOTS: [&str; 21] = [
    "07:30", "08:00", "08:30", "09:00", "09:30", "10:00", "10:30", "11:00", "11:30", "12:00",
    "12:30", "13:00", "13:30", "14:00", "14:30", "15:00", "15:30", "16:00", "16:30", "17:00",
    "17:30",
];

/// Slots excluded from booking (lunch break).
pub const LUNCH_SLOTS: [&str; 2] = ["11:30", "12:00"];

/// Position of `label` in the slot sequence, or `None` for labels outside it.
pub fn slot_index(label: &str) -> Option<usize> {
    TIME_SLOTS.iter().position(|s| *s == label)
}

/// Canonical label at `index`, or `None` past the end of the day.
pub fn slot_label(index: usize) -> Option<&'static str> {
    TIME_SLOTS.get(index).copied()
}

/// Whether `label` falls in the lunch break.
pub fn is_lunch(label: &str) -> bool {
    LUNCH_SLOTS.contains(&label)
}
