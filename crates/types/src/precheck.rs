//! Host precheck result shapes

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrecheckStatus {
    Passed,
    Warning,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrecheckItem {
    pub name: String,
    pub status: PrecheckStatus,
    pub message: String,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrecheckResult {
    pub items: Vec<PrecheckItem>,
    pub overall_status: PrecheckStatus,
    pub summary: String,
}

impl PrecheckResult {
    /// Rolls up item statuses under `failed > warning > passed`.
    #[must_use]
    pub fn from_items(items: Vec<PrecheckItem>) -> Self {
        let overall_status = items
            .iter()
            .map(|i| i.status)
            .max()
            .unwrap_or(PrecheckStatus::Passed);
        let summary = match overall_status {
            PrecheckStatus::Passed => format!("all {} checks passed", items.len()),
            PrecheckStatus::Warning => format!(
                "{} of {} checks raised a warning",
                items
                    .iter()
                    .filter(|i| i.status == PrecheckStatus::Warning)
                    .count(),
                items.len()
            ),
            PrecheckStatus::Failed => format!(
                "{} of {} checks failed",
                items
                    .iter()
                    .filter(|i| i.status == PrecheckStatus::Failed)
                    .count(),
                items.len()
            ),
        };
        Self {
            items,
            overall_status,
            summary,
        }
    }
}
