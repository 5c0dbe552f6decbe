//! Scenario suites

pub mod hooks;
pub mod mount;
pub mod props;

use crate::runner::TestSuite;

/// Every suite, in run order
pub fn all_suites() -> Vec<TestSuite> {
    vec![mount::suite(), props::suite(), hooks::suite()]
}
