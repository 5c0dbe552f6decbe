//! Scenario harness
//!
//! Each scenario gets a fresh document, container and renderer, and reports
//! failure by returning an error or panicking.

use std::panic::{self, AssertUnwindSafe};

use anyhow::{bail, Context, Result};
use fibra_core::{Element, RendererConfig};
use fibra_dom::{Document, NodeId};
use fibra_reconciler::{RenderStats, Renderer};

/// Outcome of a single scenario
#[derive(Clone, Debug, PartialEq)]
pub enum TestResult {
    Passed,
    Failed { reason: String },
    Skipped { reason: String },
}

impl TestResult {
    pub fn is_passed(&self) -> bool {
        matches!(self, TestResult::Passed)
    }
}

/// Context handed to each scenario
pub struct TestContext {
    doc: Document,
    root: NodeId,
    renderer: Renderer<Document>,
}

impl TestContext {
    pub fn new(config: RendererConfig) -> Result<Self> {
        let doc = Document::new();
        let root = doc.create_container();
        let renderer = Renderer::with_config(doc.clone(), config)
            .context("invalid renderer configuration")?;
        Ok(Self {
            doc,
            root,
            renderer,
        })
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn renderer(&self) -> &Renderer<Document> {
        &self.renderer
    }

    pub fn stats(&self) -> RenderStats {
        self.renderer.stats()
    }

    /// Render into the scenario's container
    pub fn render(&self, element: impl Into<Element>) {
        self.renderer.render(element, Some(&self.root));
    }

    pub fn html(&self) -> String {
        self.doc.to_html(self.root)
    }

    /// Find the first element with `tag` under the container
    pub fn find(&self, tag: &str) -> Result<NodeId> {
        self.doc
            .find_by_tag(self.root, tag)
            .with_context(|| format!("no <{}> in {}", tag, self.html()))
    }

    /// Click the first element with `tag`
    pub fn click(&self, tag: &str) -> Result<()> {
        let node = self.find(tag)?;
        if self.doc.click(node) == 0 {
            bail!("<{}> has no click listener", tag);
        }
        Ok(())
    }

    pub fn expect_html(&self, expected: &str) -> Result<()> {
        let actual = self.html();
        if actual != expected {
            bail!("expected html {:?}, got {:?}", expected, actual);
        }
        Ok(())
    }

    pub fn expect_text(&self, expected: &str) -> Result<()> {
        let actual = self.doc.text_content(self.root);
        if actual != expected {
            bail!("expected text {:?}, got {:?}", expected, actual);
        }
        Ok(())
    }

    pub fn expect(&self, condition: bool, message: &str) -> Result<()> {
        if !condition {
            bail!("{}", message);
        }
        Ok(())
    }
}

/// Runs scenarios in isolation
pub struct TestHarness {
    config: RendererConfig,
}

impl TestHarness {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Run one scenario, converting errors and panics into a failed result
    pub fn run_test<F>(&self, name: &str, test_fn: F) -> TestResult
    where
        F: FnOnce(&mut TestContext) -> Result<()>,
    {
        let mut ctx = match TestContext::new(self.config.clone()) {
            Ok(ctx) => ctx,
            Err(e) => {
                return TestResult::Skipped {
                    reason: format!("{:#}", e),
                }
            }
        };

        match panic::catch_unwind(AssertUnwindSafe(|| test_fn(&mut ctx))) {
            Ok(Ok(())) => TestResult::Passed,
            Ok(Err(e)) => {
                tracing::debug!("{} failed: {:#}", name, e);
                TestResult::Failed {
                    reason: format!("{:#}", e),
                }
            }
            Err(payload) => {
                let reason = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "panicked".to_string());
                TestResult::Failed {
                    reason: format!("panic: {}", reason),
                }
            }
        }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new(RendererConfig::testing())
    }
}
