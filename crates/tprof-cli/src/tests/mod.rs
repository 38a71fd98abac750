//! Crate-level tests for `tprof-cli`.

mod support;
