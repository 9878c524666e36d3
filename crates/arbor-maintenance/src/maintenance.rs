//! Repair orchestration and locked structural moves

use crate::error::MaintenanceError;
use arbor_core::effects::{LeaseCacheEffects, NodeStoreEffects, ReportEffects, TreeMutationEffects};
use arbor_core::{ArborConfig, NodeId};
use arbor_lock::TreeMutex;
use arbor_tree::{
    repair_forest, verify_forest, RepairOptions, RepairPlan, RepairSummary, Violation,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// What a repair run should cover and whether it writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairRequest {
    /// Restrict the report and commit to the tree containing this node
    pub node_id: Option<NodeId>,
    /// Persist corrected records; otherwise a dry run
    pub commit: bool,
}

impl RepairRequest {
    /// Dry run over every tree
    pub fn all() -> Self {
        Self::default()
    }

    /// Dry run over the tree containing `node`
    pub fn for_node(node: NodeId) -> Self {
        Self {
            node_id: Some(node),
            commit: false,
        }
    }

    /// Request from a raw id where 0 means "every tree"
    pub fn from_raw(node_id: u64, commit: bool) -> Self {
        Self {
            node_id: (node_id != 0).then_some(NodeId(node_id)),
            commit,
        }
    }

    /// Persist the corrected records
    pub fn committing(mut self) -> Self {
        self.commit = true;
        self
    }
}

/// Result of `TreeMaintenance::repair_tree`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairOutcome {
    /// Per-node diffs for the selected trees
    pub plan: RepairPlan,
    /// Counts, including whether anything was committed
    pub summary: RepairSummary,
}

/// Maintenance operations over one stored forest.
///
/// Every instance that should exclude the others must share the same lease
/// cache and lock key, typically by being built from the same config.
pub struct TreeMaintenance<S> {
    store: Arc<S>,
    mutex: TreeMutex,
    options: RepairOptions,
}

impl<S> TreeMaintenance<S> {
    /// Create over `store`, serialized by `mutex`
    pub fn new(store: Arc<S>, mutex: TreeMutex) -> Self {
        Self {
            store,
            mutex,
            options: RepairOptions::default(),
        }
    }

    /// Create from config: lock settings and the repair depth limit
    pub fn from_config(
        store: Arc<S>,
        cache: Arc<dyn LeaseCacheEffects>,
        config: &ArborConfig,
    ) -> Self {
        let options = RepairOptions {
            max_depth: config.repair.max_depth,
        };
        Self::new(store, TreeMutex::from_config(cache, &config.lock)).with_options(options)
    }

    /// Override repair engine options
    pub fn with_options(mut self, options: RepairOptions) -> Self {
        self.options = options;
        self
    }

    /// Underlying store
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Tree mutex guarding structural writes
    pub fn mutex(&self) -> &TreeMutex {
        &self.mutex
    }
}

impl<S: NodeStoreEffects> TreeMaintenance<S> {
    /// Repair the forest, report diffs and optionally persist them.
    ///
    /// The whole forest is always loaded and repaired; `node_id` only
    /// narrows what is reported and persisted. Nothing is written unless
    /// the full repair succeeds, and then only changed records, in one
    /// atomic store write. Runs under the tree mutex.
    pub async fn repair_tree(
        &self,
        request: RepairRequest,
        reporter: &dyn ReportEffects,
    ) -> Result<RepairOutcome, MaintenanceError> {
        self.mutex
            .run(|| self.repair_locked(request, reporter))
            .await
    }

    async fn repair_locked(
        &self,
        request: RepairRequest,
        reporter: &dyn ReportEffects,
    ) -> Result<RepairOutcome, MaintenanceError> {
        let mut targets = Vec::new();
        if let Some(node) = request.node_id {
            if self.store.get_node(node).await?.is_none() {
                return Err(MaintenanceError::NodeNotFound { node });
            }
            targets.push(node);
        }

        let nodes = self.store.list_nodes_ordered().await?;
        tracing::info!(
            nodes = nodes.len(),
            target = ?request.node_id,
            commit = request.commit,
            "repairing forest"
        );

        let forest = repair_forest(&nodes, self.options)?;
        let selection = forest.select_trees(&targets)?;
        let plan = RepairPlan::build(&forest, &selection);
        plan.report(reporter);

        let changed = plan.changed_nodes();
        if !request.commit {
            tracing::info!(changed = changed.len(), "dry run, nothing persisted");
        } else if changed.is_empty() {
            tracing::info!("forest already consistent, nothing to persist");
        } else {
            self.store.persist_atomic(&changed).await?;
            tracing::info!(persisted = changed.len(), "corrected nodes committed");
        }

        let summary = plan.summary(request.commit);
        Ok(RepairOutcome { plan, summary })
    }

    /// Check every forest invariant without repairing or locking.
    pub async fn check(&self) -> Result<Vec<Violation>, MaintenanceError> {
        let nodes = self.store.list_nodes_ordered().await?;
        let violations = verify_forest(&nodes);
        if violations.is_empty() {
            tracing::debug!(nodes = nodes.len(), "forest is consistent");
        } else {
            tracing::warn!(
                nodes = nodes.len(),
                violations = violations.len(),
                "forest invariants violated"
            );
        }
        Ok(violations)
    }
}

impl<S: TreeMutationEffects> TreeMaintenance<S> {
    /// Move `node` under `target` (or make it a root) under the tree mutex.
    pub async fn move_node(
        &self,
        node: NodeId,
        target: Option<NodeId>,
    ) -> Result<(), MaintenanceError> {
        move_node_locked(self.store.as_ref(), &self.mutex, node, target).await
    }
}

/// Run the store's move primitive while holding `mutex`.
pub async fn move_node_locked<S>(
    store: &S,
    mutex: &TreeMutex,
    node: NodeId,
    target: Option<NodeId>,
) -> Result<(), MaintenanceError>
where
    S: TreeMutationEffects + ?Sized,
{
    mutex
        .run(|| async move {
            store.move_node(node, target).await?;
            tracing::debug!(%node, ?target, "node moved");
            Ok::<(), MaintenanceError>(())
        })
        .await
}
