use serde::{Deserialize, Serialize};

use crate::model::{ChangeRule, OptionGroup, UiElement};

/// The single document a client renders a form from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiDocument {
    pub ui_data_table: Vec<UiElement>,
    pub options_data_table: Vec<OptionGroup>,
    pub ui_changed_table: Vec<ChangeRule>,
}
