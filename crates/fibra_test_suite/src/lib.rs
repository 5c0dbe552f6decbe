//! Fibra Scenario Suite
//!
//! End-to-end scenarios run against the in-memory document host. Each case
//! gets a fresh container and renderer; see [`scenarios::all_suites`].

pub mod config;
pub mod harness;
pub mod runner;
pub mod scenarios;

pub use config::SuiteConfig;
pub use harness::{TestContext, TestHarness, TestResult};
pub use runner::{RunResult, TestCase, TestRunner, TestSuite};
