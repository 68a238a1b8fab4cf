use serde::{Deserialize, Serialize};

/// One row of `options_data`
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct OptionRow {
    pub option_id: i32,
    pub option_key: String,
    pub value: String,
    pub label: String,
    #[sqlx(default)]
    pub product: Option<String>,
    /// Value of the option this one cascades from (a district's city)
    #[sqlx(default)]
    pub parent_value: Option<String>,
}

impl OptionRow {
    pub fn new(
        option_id: i32,
        option_key: impl Into<String>,
        value: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            option_id,
            option_key: option_key.into(),
            value: value.into(),
            label: label.into(),
            product: None,
            parent_value: None,
        }
    }

    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product = Some(product.into());
        self
    }

    pub fn with_parent_value(mut self, parent_value: impl Into<String>) -> Self {
        self.parent_value = Some(parent_value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionEntry {
    pub value: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_value: Option<String>,
}

/// Named, ordered list of selectable options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionGroup {
    pub key: String,
    pub options: Vec<OptionEntry>,
}

impl OptionGroup {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            options: Vec::new(),
        }
    }
}
