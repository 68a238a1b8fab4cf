use crate::error::StoreError;
use crate::model::{ChangeRuleRow, ElementRow, OptionRow, ProcessRecord};

/// Read-only access to the three UI definition row sets
#[async_trait::async_trait]
pub trait UiRowSource: Send + Sync {
    /// Elements whose product is `product` or the wildcard, by `seq_id` ascending
    async fn fetch_elements(&self, product: &str) -> Result<Vec<ElementRow>, StoreError>;
    /// All option rows by `option_id` ascending
    async fn fetch_options(&self) -> Result<Vec<OptionRow>, StoreError>;
    /// All change rules by `change_id` ascending
    async fn fetch_change_rules(&self) -> Result<Vec<ChangeRuleRow>, StoreError>;
}

#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert one record as a single statement
    async fn insert_record(&self, record: &ProcessRecord) -> Result<(), StoreError>;
}

/// Writes UI definitions, skipping rows whose id already exists
#[async_trait::async_trait]
pub trait UiDefinitionWriter: Send + Sync {
    async fn write_ui_definitions(
        &self,
        elements: &[ElementRow],
        options: &[OptionRow],
        change_rules: &[ChangeRuleRow],
    ) -> Result<(), StoreError>;
}

#[async_trait::async_trait]
pub trait HealthStore: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;
}

pub trait Store: UiRowSource + RecordStore + UiDefinitionWriter + HealthStore + Send + Sync {}
