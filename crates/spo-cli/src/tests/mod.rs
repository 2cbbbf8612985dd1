// crates/spo-cli/src/tests/mod.rs
// ============================================================================
// Module: CLI Unit Tests
// Description: Unit test modules for the SPO CLI binary.
// Purpose: Group CLI test modules and shared HTTP fixtures under one roof.
// Dependencies: spo-cli modules under test
// ============================================================================

//! ## Overview
//! Groups the CLI unit test modules and the shared HTTP test fixtures.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod i18n;
mod support;
