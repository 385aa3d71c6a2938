//! Filesystem utilities for gflow.
//!
//! Atomic writes keep the recovery marker from ever being observed half-written.

pub mod atomic;

pub use atomic::atomic_write_file;
