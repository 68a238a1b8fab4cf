use tokio::sync::RwLock;

use crate::error::{RowSet, StoreError};
use crate::model::{
    ChangeRuleRow, ElementRow, OptionRow, ProcessRecord, PROCESS_RECORD_COLUMNS,
    UNIQUE_RECORD_COLUMNS,
};
use crate::store::traits::{HealthStore, RecordStore, Store, UiDefinitionWriter, UiRowSource};

/// In-process store with the same read and write contract as Postgres
#[derive(Debug, Default)]
pub struct MemoryStore {
    elements: RwLock<Vec<ElementRow>>,
    options: RwLock<Vec<OptionRow>>,
    change_rules: RwLock<Vec<ChangeRuleRow>>,
    records: RwLock<Vec<ProcessRecord>>,
    /// Row set whose reads fail, for exercising error paths
    failing: RwLock<Option<RowSet>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(
        elements: Vec<ElementRow>,
        options: Vec<OptionRow>,
        change_rules: Vec<ChangeRuleRow>,
    ) -> Self {
        Self {
            elements: RwLock::new(elements),
            options: RwLock::new(options),
            change_rules: RwLock::new(change_rules),
            ..Self::default()
        }
    }

    /// Make every read of `row_set` fail until cleared with `None`
    pub async fn fail_reads(&self, row_set: Option<RowSet>) {
        *self.failing.write().await = row_set;
    }

    pub async fn records(&self) -> Vec<ProcessRecord> {
        self.records.read().await.clone()
    }

    async fn check_read(&self, row_set: RowSet) -> Result<(), StoreError> {
        if *self.failing.read().await == Some(row_set) {
            return Err(StoreError::Read {
                row_set,
                source: sqlx::Error::Protocol("connection reset by peer".to_string()),
            });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl UiRowSource for MemoryStore {
    async fn fetch_elements(&self, product: &str) -> Result<Vec<ElementRow>, StoreError> {
        self.check_read(RowSet::Elements).await?;

        let mut rows: Vec<ElementRow> = self
            .elements
            .read()
            .await
            .iter()
            .filter(|row| row.matches_product(product))
            .cloned()
            .collect();
        rows.sort_by_key(|row| (row.seq_id, row.element_id));
        Ok(rows)
    }

    async fn fetch_options(&self) -> Result<Vec<OptionRow>, StoreError> {
        self.check_read(RowSet::Options).await?;

        let mut rows = self.options.read().await.clone();
        rows.sort_by_key(|row| row.option_id);
        Ok(rows)
    }

    async fn fetch_change_rules(&self) -> Result<Vec<ChangeRuleRow>, StoreError> {
        self.check_read(RowSet::ChangeRules).await?;

        let mut rows = self.change_rules.read().await.clone();
        rows.sort_by_key(|row| row.change_id);
        Ok(rows)
    }
}

#[async_trait::async_trait]
impl RecordStore for MemoryStore {
    async fn insert_record(&self, record: &ProcessRecord) -> Result<(), StoreError> {
        // Held across the checks and the push so two inserts cannot both pass
        let mut records = self.records.write().await;

        if let Some(column) = PROCESS_RECORD_COLUMNS
            .iter()
            .find(|c| !c.nullable && record.get(c.name).is_none())
        {
            return Err(StoreError::Constraint {
                code: "23502".to_string(),
                message: format!(
                    "null value in column \"{}\" of relation \"process_records\" violates not-null constraint",
                    column.name
                ),
            });
        }

        for column in UNIQUE_RECORD_COLUMNS {
            let value = record.get(column);
            if value.is_some() && records.iter().any(|r| r.get(column) == value) {
                return Err(StoreError::Constraint {
                    code: "23505".to_string(),
                    message: format!(
                        "duplicate key value violates unique constraint \"process_records_{}_key\"",
                        column
                    ),
                });
            }
        }

        records.push(record.clone());
        Ok(())
    }
}

#[async_trait::async_trait]
impl UiDefinitionWriter for MemoryStore {
    async fn write_ui_definitions(
        &self,
        elements: &[ElementRow],
        options: &[OptionRow],
        change_rules: &[ChangeRuleRow],
    ) -> Result<(), StoreError> {
        let mut stored = self.elements.write().await;
        for row in elements {
            if !stored.iter().any(|r| r.element_id == row.element_id) {
                stored.push(row.clone());
            }
        }

        let mut stored = self.options.write().await;
        for row in options {
            if !stored.iter().any(|r| r.option_id == row.option_id) {
                stored.push(row.clone());
            }
        }

        let mut stored = self.change_rules.write().await;
        for row in change_rules {
            if !stored.iter().any(|r| r.change_id == row.change_id) {
                stored.push(row.clone());
            }
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl HealthStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

impl Store for MemoryStore {}
