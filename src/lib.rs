//! SUT: Spindle Uncertainty Toolkit
//!
//! A Unix-style toolkit for building measurement uncertainty budgets for
//! spindle-error analysis runs and tracking their freshness across reports.

pub mod cli;
pub mod core;
pub mod storage;
