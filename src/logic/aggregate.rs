use std::collections::HashMap;

use crate::model::{OptionEntry, OptionGroup, OptionRow};

/// Groups option rows by `option_key`
///
/// Groups come out in the order their key is first seen and entries keep
/// source row order within a group.
pub struct OptionAggregator;

impl OptionAggregator {
    pub fn aggregate(rows: Vec<OptionRow>) -> Vec<OptionGroup> {
        let mut groups: Vec<OptionGroup> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for row in rows {
            let slot = match index.get(&row.option_key) {
                Some(&slot) => slot,
                None => {
                    groups.push(OptionGroup::new(row.option_key.clone()));
                    index.insert(row.option_key.clone(), groups.len() - 1);
                    groups.len() - 1
                }
            };

            groups[slot].options.push(OptionEntry {
                value: row.value,
                label: row.label,
                product: row.product,
                parent_value: row.parent_value,
            });
        }

        groups
    }
}
