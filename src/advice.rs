//! Static recommendation blocks keyed by predicted risk class

use crate::types::prediction::RiskClass;
use anyhow::{Context, Result};
use serde::Deserialize;

const BUILTIN_ADVICE: &str = include_str!("../assets/advice.json");

/// One recommendation inside a section, e.g. "Cross-Matching: ...".
#[derive(Debug, Clone, Deserialize)]
pub struct AdvicePoint {
    pub topic: String,
    pub text: String,
}

/// Numbered section of an advisory block.
#[derive(Debug, Clone, Deserialize)]
pub struct AdviceSection {
    pub heading: String,
    pub points: Vec<AdvicePoint>,
}

/// Advisory block shown under "Recommendations".
#[derive(Debug, Clone, Deserialize)]
pub struct Advisory {
    pub title: String,
    pub summary: String,
    pub sections: Vec<AdviceSection>,
    pub closing: String,
}

/// The two advisory blocks. Which one is shown depends on the risk class only.
#[derive(Debug, Clone, Deserialize)]
pub struct AdvisoryCatalog {
    high: Advisory,
    low: Advisory,
}

impl AdvisoryCatalog {
    /// Catalog compiled into the binary from `assets/advice.json`.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_ADVICE).context("Built-in advisory catalog is invalid")
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let catalog: Self =
            serde_json::from_str(json).context("Failed to parse advisory catalog")?;
        for (name, advisory) in [("high", &catalog.high), ("low", &catalog.low)] {
            if advisory.sections.is_empty() {
                anyhow::bail!("{} risk advisory has no sections", name);
            }
        }
        Ok(catalog)
    }

    pub fn for_class(&self, risk_class: RiskClass) -> &Advisory {
        match risk_class {
            RiskClass::High => &self.high,
            RiskClass::Low => &self.low,
        }
    }
}
