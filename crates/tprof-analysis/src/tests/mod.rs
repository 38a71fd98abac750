//! Crate-level tests for `tprof-analysis`.

mod behaviour;
