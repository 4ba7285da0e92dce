//! Nullable infrastructure for deterministic runs.
//!
//! The host reads time only through [`Clock`]. Production wiring uses
//! [`SystemClock`]; tests and scripted simulations use [`NullClock`], which
//! only moves when told to.

pub mod clock;

pub use clock::{Clock, NullClock, SystemClock};
