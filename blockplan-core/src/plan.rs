//! The output envelope handed to the external applier.

use crate::actions::Action;
use crate::errors::PlanError;
use crate::planner::PartitionPlanner;
use serde::Serialize;

/// Serializes as a mapping with the single key `storage`, holding the
/// concatenated action lists of every planner in argument order.
#[derive(Debug, Serialize)]
pub struct StoragePlan {
    storage: Vec<Action>,
}

impl StoragePlan {
    pub fn actions(&self) -> &[Action] {
        &self.storage
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

pub fn render_storage(planners: &[&PartitionPlanner]) -> Result<StoragePlan, PlanError> {
    let mut storage = Vec::new();
    for planner in planners {
        storage.extend(planner.get_actions()?);
    }
    Ok(StoragePlan { storage })
}
