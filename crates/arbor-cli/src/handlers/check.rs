//! `arbor check`

use anyhow::{bail, Result};
use arbor_core::effects::{NodeStoreEffects, ReportEffects};
use arbor_maintenance::TreeMaintenance;

/// Print every invariant violation; fails when there is at least one.
pub async fn run<S: NodeStoreEffects>(
    maintenance: &TreeMaintenance<S>,
    reporter: &dyn ReportEffects,
) -> Result<()> {
    let violations = maintenance.check().await?;
    if violations.is_empty() {
        reporter.success("All forest invariants hold");
        return Ok(());
    }

    for violation in &violations {
        reporter.error(&violation.to_string());
    }
    bail!(
        "{} invariant violation(s); run `arbor repair` to inspect",
        violations.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_effects::{MemoryLeaseCache, MemoryNodeStore};
    use arbor_lock::{LockKey, MutexSettings, TreeMutex};
    use arbor_testkit::{scenario_a, scenario_a_expected, RecordingReporter};
    use std::sync::Arc;

    fn maintenance(nodes: Vec<arbor_core::TreeNode>) -> TreeMaintenance<MemoryNodeStore> {
        TreeMaintenance::new(
            Arc::new(MemoryNodeStore::with_nodes(nodes)),
            TreeMutex::new(
                Arc::new(MemoryLeaseCache::new()),
                LockKey::for_resource("page-tree"),
                MutexSettings::default(),
            ),
        )
    }

    #[tokio::test]
    async fn test_clean_forest_passes() {
        let reporter = RecordingReporter::new();
        run(&maintenance(scenario_a_expected()), &reporter)
            .await
            .unwrap();
        assert_eq!(reporter.successes(), vec!["All forest invariants hold".to_string()]);
    }

    #[tokio::test]
    async fn test_corrupt_forest_fails() {
        let reporter = RecordingReporter::new();
        let err = run(&maintenance(scenario_a()), &reporter).await.unwrap_err();

        assert!(!reporter.errors().is_empty());
        assert!(err.to_string().contains("invariant violation"));
    }
}
