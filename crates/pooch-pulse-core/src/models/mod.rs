//! Domain models for PoochPulse.

mod dog;
mod report;
mod score;
mod status;

pub use dog::*;
pub use report::*;
pub use score::*;
pub use status::*;
