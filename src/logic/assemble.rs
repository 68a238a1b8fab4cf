use std::future::Future;
use std::time::Duration;

use crate::error::{RowSet, StoreError};
use crate::logic::{ChangeRuleProjector, ElementProjector, OptionAggregator, ProjectionOptions};
use crate::model::{ChangeRuleRow, ElementRow, OptionRow, UiDocument};
use crate::store::traits::UiRowSource;

/// Reads the three row sets for a request and composes the UI document
#[derive(Debug, Clone)]
pub struct ResponseAssembler {
    projector: ElementProjector,
    read_timeout: Duration,
}

impl ResponseAssembler {
    pub fn new(options: ProjectionOptions, read_timeout: Duration) -> Self {
        Self {
            projector: ElementProjector::new(options),
            read_timeout,
        }
    }

    /// All three reads run concurrently. The first one to fail or time out
    /// drops the others and no partial document is produced.
    pub async fn assemble<S: UiRowSource + ?Sized>(
        &self,
        source: &S,
        product: &str,
    ) -> Result<UiDocument, StoreError> {
        let (elements, options, change_rules) = tokio::try_join!(
            bounded(RowSet::Elements, self.read_timeout, source.fetch_elements(product)),
            bounded(RowSet::Options, self.read_timeout, source.fetch_options()),
            bounded(RowSet::ChangeRules, self.read_timeout, source.fetch_change_rules()),
        )?;

        log::debug!(
            "Read {} elements, {} options, {} change rules for product '{}'",
            elements.len(),
            options.len(),
            change_rules.len(),
            product
        );

        Ok(self.build(elements, options, change_rules))
    }

    /// Pure projection of already-read rows
    pub fn build(
        &self,
        elements: Vec<ElementRow>,
        options: Vec<OptionRow>,
        change_rules: Vec<ChangeRuleRow>,
    ) -> UiDocument {
        UiDocument {
            ui_data_table: self.projector.project_all(elements),
            options_data_table: OptionAggregator::aggregate(options),
            ui_changed_table: ChangeRuleProjector::project_all(change_rules),
        }
    }
}

async fn bounded<T, F>(row_set: RowSet, after: Duration, read: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(after, read).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout { row_set, after }),
    }
}
