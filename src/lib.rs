//! slotboard — scheduling board engine for a vehicle-repair shop.
//!
//! A calendar of half-hour slots per mechanic per day. The crate owns the
//! slot-range appointment engine: the fixed time grid ([`grid`]), the
//! composite natural key ([`model::SlotKey`]), the authoritative in-memory
//! projection synchronized with a remote relational store ([`store::Store`]
//! over [`backend::Backend`]), range expansion ([`range`]), and the heuristic
//! chat scheduler ([`chat`]). Presentation — grids, drag-and-drop, theming —
//! lives outside; it only needs the mechanic list, a date range, and the
//! operations exposed here.

pub mod backend;
pub mod chat;
pub mod grid;
pub mod model;
pub mod range;
pub mod store;

pub use backend::{Backend, BackendError, MemoryBackend};
pub use model::{Appointment, Mechanic, Priority, SlotKey, SlotPayload};
pub use store::{Store, StoreError};
