use serde::{Deserialize, Serialize};

/// One row of `ui_change_rules`
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ChangeRuleRow {
    pub change_id: i32,
    pub element_id: i32,
    pub parent_value: Option<String>,
    pub action_id: i32,
    pub action_type: String,
}

/// Action the client runs when `element_id` takes the value `parent_value`
///
/// Every field is always emitted, `parentValue` as `null` when unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRule {
    pub change_id: i32,
    pub element_id: i32,
    pub parent_value: Option<String>,
    pub action_id: i32,
    pub action_type: String,
}
