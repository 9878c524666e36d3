//! `arbor repair`

use anyhow::Result;
use arbor_core::effects::{NodeStoreEffects, ReportEffects};
use arbor_maintenance::{RepairRequest, TreeMaintenance};
use arbor_tree::RepairSummary;

/// Repair the forest and print a one-line summary after the per-node report.
pub async fn run<S: NodeStoreEffects>(
    maintenance: &TreeMaintenance<S>,
    request: RepairRequest,
    reporter: &dyn ReportEffects,
) -> Result<RepairSummary> {
    let outcome = maintenance.repair_tree(request, reporter).await?;
    let summary = outcome.summary;

    reporter.print(&format!(
        "Scanned {} nodes, {} selected, {} changed",
        summary.scanned, summary.selected, summary.changed
    ));
    if summary.changed == 0 {
        reporter.success("Forest is consistent");
    } else if summary.committed {
        reporter.success(&format!("Committed {} corrected nodes", summary.changed));
    } else {
        reporter.print(&format!(
            "Dry run: rerun with {} to persist",
            reporter.bold("--commit")
        ));
    }

    Ok(summary)
}
