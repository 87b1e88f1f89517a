// src/process/mod.rs

//! OS process enumeration and the orphan sweep.
//!
//! Killing the broker's entrypoint script does not reliably take down the
//! Erlang VM (`erl`, `beam.smp`, `epmd`, `erlsrv`) it started, so every stop
//! is followed by a sweep over all processes whose executable lives under
//! the portable Erlang directory.
//!
//! - [`table`] defines [`ProcessTable`] and the OS-backed implementation.
//! - [`sweep`] runs the sweep against any table and reports what happened.

pub mod sweep;
pub mod table;

pub use sweep::{SweepFailure, SweepReport, is_under, sweep_orphans};
pub use table::{OsProcessTable, Pid, ProcessEntry, ProcessTable};
