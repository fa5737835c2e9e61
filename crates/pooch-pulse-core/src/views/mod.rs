//! Read-side projections over reports and profiles.
//!
//! Pure functions: nothing here mutates state or touches storage.

mod calendar;
mod knowledge;
mod summary;
mod trend;

pub use calendar::*;
pub use knowledge::*;
pub use summary::*;
pub use trend::*;
