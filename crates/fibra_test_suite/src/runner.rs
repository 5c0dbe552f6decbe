//! Scenario runner
//!
//! Collects suites, applies the name filter, runs every case through the
//! harness and reports the outcome.

use std::time::{Duration, Instant};

use anyhow::Result;

use crate::harness::{TestContext, TestHarness, TestResult};

type ScenarioFn = Box<dyn FnOnce(&mut TestContext) -> Result<()>>;

/// A single scenario
pub struct TestCase {
    pub name: String,
    pub category: String,
    pub test_fn: ScenarioFn,
}

impl TestCase {
    pub fn new<F>(name: &str, category: &str, test_fn: F) -> Self
    where
        F: FnOnce(&mut TestContext) -> Result<()> + 'static,
    {
        Self {
            name: name.to_string(),
            category: category.to_string(),
            test_fn: Box::new(test_fn),
        }
    }
}

/// Result of running one scenario
pub struct TestRun {
    pub name: String,
    pub category: String,
    pub result: TestResult,
    pub duration: Duration,
}

impl TestRun {
    pub fn is_passed(&self) -> bool {
        self.result.is_passed()
    }
}

/// Named group of scenarios
pub struct TestSuite {
    pub name: String,
    pub cases: Vec<TestCase>,
}

impl TestSuite {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            cases: Vec::new(),
        }
    }

    pub fn add<F>(&mut self, name: &str, test_fn: F) -> &mut Self
    where
        F: FnOnce(&mut TestContext) -> Result<()> + 'static,
    {
        self.cases.push(TestCase::new(name, &self.name, test_fn));
        self
    }
}

pub struct TestRunner {
    harness: TestHarness,
    suites: Vec<TestSuite>,
    /// Substring matched against case name or category (None = run all)
    filter: Option<String>,
}

impl TestRunner {
    pub fn new() -> Self {
        Self::with_harness(TestHarness::default())
    }

    pub fn with_harness(harness: TestHarness) -> Self {
        Self {
            harness,
            suites: Vec::new(),
            filter: None,
        }
    }

    pub fn add_suite(&mut self, suite: TestSuite) -> &mut Self {
        self.suites.push(suite);
        self
    }

    pub fn filter(&mut self, pattern: &str) -> &mut Self {
        self.filter = Some(pattern.to_string());
        self
    }

    /// Run all queued suites
    pub fn run(&mut self) -> RunResult {
        let start = Instant::now();
        let mut results = Vec::new();

        for suite in self.suites.drain(..) {
            tracing::info!("Running suite: {}", suite.name);

            for case in suite.cases {
                if let Some(ref pattern) = self.filter {
                    if !case.name.contains(pattern) && !case.category.contains(pattern) {
                        continue;
                    }
                }

                let full_name = format!("{}::{}", case.category, case.name);
                tracing::debug!("Running scenario: {}", full_name);

                let test_start = Instant::now();
                let result = self.harness.run_test(&full_name, case.test_fn);
                let duration = test_start.elapsed();

                match &result {
                    TestResult::Passed => tracing::info!("  ✓ {} ({:?})", case.name, duration),
                    TestResult::Failed { reason } => {
                        tracing::error!("  ✗ {} ({:?}): {}", case.name, duration, reason)
                    }
                    TestResult::Skipped { reason } => {
                        tracing::warn!("  - {} skipped: {}", case.name, reason)
                    }
                }

                results.push(TestRun {
                    name: case.name,
                    category: case.category,
                    result,
                    duration,
                });
            }
        }

        RunResult::new(results, start.elapsed())
    }
}

impl Default for TestRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Results from a run
pub struct RunResult {
    pub results: Vec<TestRun>,
    pub duration: Duration,
}

impl RunResult {
    pub fn new(results: Vec<TestRun>, duration: Duration) -> Self {
        Self { results, duration }
    }

    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.is_passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.result, TestResult::Failed { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.result, TestResult::Skipped { .. }))
            .count()
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// True when nothing failed; skipped scenarios do not count against a run
    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }

    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════╗");
        println!("║         SCENARIO RESULTS SUMMARY         ║");
        println!("╠══════════════════════════════════════════╣");
        println!("║  Passed:  {:>5}                          ║", self.passed());
        println!("║  Failed:  {:>5}                          ║", self.failed());
        println!("║  Skipped: {:>5}                          ║", self.skipped());
        println!("║  Total:   {:>5}                          ║", self.total());
        println!("║  Time:    {:>8.2?}                      ║", self.duration);
        println!("╚══════════════════════════════════════════╝");

        if self.failed() > 0 {
            println!("\nFailed scenarios:");
            for run in &self.results {
                if let TestResult::Failed { reason } = &run.result {
                    println!("  ✗ {}::{}: {}", run.category, run.name, reason);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;

    fn suite() -> TestSuite {
        let mut suite = TestSuite::new("sample");
        suite
            .add("passes", |_| Ok(()))
            .add("fails", |_| bail!("nope"))
            .add("also_passes", |_| Ok(()));
        suite
    }

    #[test]
    fn test_run_counts() {
        let mut runner = TestRunner::new();
        runner.add_suite(suite());
        let result = runner.run();

        assert_eq!(result.total(), 3);
        assert_eq!(result.passed(), 2);
        assert_eq!(result.failed(), 1);
        assert!(!result.all_passed());
        assert!(result.results.iter().all(|run| run.category == "sample"));
    }

    #[test]
    fn test_filter_matches_name() {
        let mut runner = TestRunner::new();
        runner.add_suite(suite()).filter("passes");
        let result = runner.run();

        assert_eq!(result.total(), 2);
        assert!(result.all_passed());
    }
}
