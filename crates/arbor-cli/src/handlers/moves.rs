//! `arbor move`

use anyhow::{Context, Result};
use arbor_core::effects::TreeMutationEffects;
use arbor_core::NodeId;
use arbor_maintenance::TreeMaintenance;

pub async fn run<S: TreeMutationEffects>(
    maintenance: &TreeMaintenance<S>,
    node: NodeId,
    target: Option<NodeId>,
) -> Result<()> {
    maintenance
        .move_node(node, target)
        .await
        .with_context(|| match target {
            Some(target) => format!("failed to move node {node} under {target}"),
            None => format!("failed to make node {node} a root"),
        })?;

    match target {
        Some(target) => tracing::info!(%node, %target, "node moved"),
        None => tracing::info!(%node, "node is now a root"),
    }
    Ok(())
}
