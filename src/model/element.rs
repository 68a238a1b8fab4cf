use serde::{Deserialize, Serialize};

/// One row of `ui_elements` as stored
///
/// Deployments differ in which optional columns they carry, so those
/// decode to `None` when the column is missing from the result set.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ElementRow {
    pub element_id: i32,
    pub seq_id: i32,
    pub element_type: String,
    pub label: Option<String>,
    #[sqlx(default)]
    pub parent_id: Option<i32>,
    #[sqlx(default)]
    pub parent_label: Option<String>,
    pub initial_value: Option<String>,
    pub options_key: Option<String>,
    pub properties: Option<serde_json::Value>,
    #[sqlx(default)]
    pub trigger_event: Option<String>,
    #[sqlx(default)]
    pub product: Option<String>,
}

impl ElementRow {
    /// A row with only the required columns set
    pub fn new(element_id: i32, seq_id: i32, element_type: impl Into<String>) -> Self {
        Self {
            element_id,
            seq_id,
            element_type: element_type.into(),
            label: None,
            parent_id: None,
            parent_label: None,
            initial_value: None,
            options_key: None,
            properties: None,
            trigger_event: None,
            product: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_parent(mut self, parent_id: i32) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_initial_value(mut self, value: impl Into<String>) -> Self {
        self.initial_value = Some(value.into());
        self
    }

    pub fn with_options_key(mut self, key: impl Into<String>) -> Self {
        self.options_key = Some(key.into());
        self
    }

    pub fn with_properties(mut self, properties: serde_json::Value) -> Self {
        self.properties = Some(properties);
        self
    }

    pub fn with_trigger_event(mut self, event: impl Into<String>) -> Self {
        self.trigger_event = Some(event.into());
        self
    }

    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product = Some(product.into());
        self
    }

    /// True when this row is visible for the given product filter
    pub fn matches_product(&self, product: &str) -> bool {
        matches!(self.product.as_deref(), Some(p) if p == product || p == WILDCARD_PRODUCT)
    }
}

/// Stored product value that matches every filter
pub const WILDCARD_PRODUCT: &str = "*";

/// Initial value of a form field: a boolean for the truth tokens, text otherwise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InitialValue {
    Bool(bool),
    Text(String),
}

/// A renderable form node; unset optional fields are left out of the JSON entirely
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiElement {
    pub element_id: i32,
    pub seq_id: i32,
    pub element_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_value: Option<InitialValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_event: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
}
