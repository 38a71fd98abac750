//! Crate-level tests for `tprof-syntax`.

mod behaviour;
