//! Shared data structures for equipment health monitoring
//!
//! - `VibrationReading`: one time-stamped sensor sample (aggregator input)
//! - `EquipmentSummary`: one derived record per equipment (aggregator output)
//! - `FieldSet` / `EquipmentReading` / `ReadingForm`: raw form input checked by
//!   the validators before readings are trusted

mod reading;
mod summary;
mod measurement;
pub mod timestamp;

pub use reading::*;
pub use summary::*;
pub use measurement::*;
