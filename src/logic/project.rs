use crate::config::{ParentReference, TruthTokens};
use crate::model::{ChangeRule, ChangeRuleRow, ElementRow, InitialValue, UiElement};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectionOptions {
    pub truth_tokens: TruthTokens,
    pub parent_reference: ParentReference,
}

/// Maps stored element rows onto sparse UI elements
#[derive(Debug, Clone, Copy, Default)]
pub struct ElementProjector {
    options: ProjectionOptions,
}

impl ElementProjector {
    pub fn new(options: ProjectionOptions) -> Self {
        Self { options }
    }

    pub fn project(&self, row: ElementRow) -> UiElement {
        let (parent_id, parent_label) = match self.options.parent_reference {
            ParentReference::Id => (row.parent_id, None),
            ParentReference::Label => (None, row.parent_label),
            ParentReference::Both => (row.parent_id, row.parent_label),
        };

        UiElement {
            element_id: row.element_id,
            seq_id: row.seq_id,
            element_type: row.element_type,
            label: row.label.filter(|l| !l.is_empty()),
            parent_id,
            parent_label,
            initial_value: row
                .initial_value
                .filter(|v| !v.is_empty())
                .map(|v| self.initial_value(v)),
            options_key: row.options_key.filter(|k| !k.is_empty()),
            properties: row.properties,
            trigger_event: row.trigger_event,
            product: row.product,
        }
    }

    pub fn project_all(&self, rows: Vec<ElementRow>) -> Vec<UiElement> {
        rows.into_iter().map(|row| self.project(row)).collect()
    }

    fn initial_value(&self, raw: String) -> InitialValue {
        let upper = matches!(self.options.truth_tokens, TruthTokens::Upper | TruthTokens::Both);
        let lower = matches!(self.options.truth_tokens, TruthTokens::Lower | TruthTokens::Both);

        match raw.as_str() {
            "TRUE" if upper => InitialValue::Bool(true),
            "FALSE" if upper => InitialValue::Bool(false),
            "true" if lower => InitialValue::Bool(true),
            "false" if lower => InitialValue::Bool(false),
            _ => InitialValue::Text(raw),
        }
    }
}

pub struct ChangeRuleProjector;

impl ChangeRuleProjector {
    pub fn project(row: ChangeRuleRow) -> ChangeRule {
        ChangeRule {
            change_id: row.change_id,
            element_id: row.element_id,
            parent_value: row.parent_value,
            action_id: row.action_id,
            action_type: row.action_type,
        }
    }

    pub fn project_all(rows: Vec<ChangeRuleRow>) -> Vec<ChangeRule> {
        rows.into_iter().map(Self::project).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn project(row: ElementRow) -> serde_json::Value {
        serde_json::to_value(ElementProjector::default().project(row)).unwrap()
    }

    #[test]
    fn test_truth_token_becomes_boolean_and_absent_fields_are_omitted() {
        let out = project(ElementRow::new(1, 1, "text").with_initial_value("TRUE"));
        assert_eq!(
            out,
            json!({"elementId": 1, "seqId": 1, "elementType": "text", "initialValue": true})
        );
        assert!(out.get("label").is_none());
    }

    #[test]
    fn test_false_token_and_passthrough() {
        let out = project(ElementRow::new(2, 5, "checkbox").with_initial_value("FALSE"));
        assert_eq!(out["initialValue"], json!(false));

        let out = project(ElementRow::new(3, 6, "select").with_initial_value("TPE"));
        assert_eq!(out["initialValue"], json!("TPE"));

        // Mixed case is never a truth token
        let out = project(ElementRow::new(4, 7, "text").with_initial_value("True"));
        assert_eq!(out["initialValue"], json!("True"));
    }

    #[test]
    fn test_missing_or_empty_initial_value_is_omitted() {
        let out = project(ElementRow::new(1, 1, "text"));
        assert!(out.get("initialValue").is_none());

        let out = project(ElementRow::new(1, 1, "text").with_initial_value(""));
        assert!(out.get("initialValue").is_none());
    }

    #[test]
    fn test_empty_label_is_omitted() {
        let out = project(ElementRow::new(1, 1, "text").with_label(""));
        assert!(out.get("label").is_none());

        let out = project(ElementRow::new(1, 1, "text").with_label("Name"));
        assert_eq!(out["label"], json!("Name"));
    }

    #[test]
    fn test_empty_options_key_is_omitted() {
        let out = project(ElementRow::new(1, 1, "select").with_options_key(""));
        assert!(out.get("optionsKey").is_none());

        let out = project(ElementRow::new(1, 1, "select").with_options_key("city"));
        assert_eq!(out["optionsKey"], json!("city"));
    }

    #[test]
    fn test_truth_token_casing_follows_options() {
        let upper_only = ElementProjector::new(ProjectionOptions {
            truth_tokens: TruthTokens::Upper,
            ..Default::default()
        });
        let lower_only = ElementProjector::new(ProjectionOptions {
            truth_tokens: TruthTokens::Lower,
            ..Default::default()
        });

        let row = ElementRow::new(1, 1, "checkbox").with_initial_value("true");
        assert_eq!(
            upper_only.project(row.clone()).initial_value,
            Some(InitialValue::Text("true".to_string()))
        );
        assert_eq!(
            lower_only.project(row.clone()).initial_value,
            Some(InitialValue::Bool(true))
        );
        assert_eq!(
            ElementProjector::default().project(row).initial_value,
            Some(InitialValue::Bool(true))
        );

        let row = ElementRow::new(1, 1, "checkbox").with_initial_value("FALSE");
        assert_eq!(
            lower_only.project(row).initial_value,
            Some(InitialValue::Text("FALSE".to_string()))
        );
    }

    #[test]
    fn test_every_optional_field_is_independent() {
        let mut row = ElementRow::new(9, 3, "select")
            .with_parent(4)
            .with_options_key("city")
            .with_properties(json!({"hint": "Pick one", "required": true}))
            .with_trigger_event("onChange")
            .with_product("*");
        row.parent_label = Some("Address".to_string());

        let out = project(row);
        assert_eq!(
            out,
            json!({
                "elementId": 9,
                "seqId": 3,
                "elementType": "select",
                "parentId": 4,
                "parentLabel": "Address",
                "optionsKey": "city",
                "properties": {"hint": "Pick one", "required": true},
                "triggerEvent": "onChange",
                "product": "*"
            })
        );
    }

    #[test]
    fn test_parent_reference_selects_link_field() {
        let mut row = ElementRow::new(2, 2, "text").with_parent(1);
        row.parent_label = Some("Section".to_string());

        let by_id = ElementProjector::new(ProjectionOptions {
            parent_reference: ParentReference::Id,
            ..Default::default()
        })
        .project(row.clone());
        assert_eq!(by_id.parent_id, Some(1));
        assert_eq!(by_id.parent_label, None);

        let by_label = ElementProjector::new(ProjectionOptions {
            parent_reference: ParentReference::Label,
            ..Default::default()
        })
        .project(row);
        assert_eq!(by_label.parent_id, None);
        assert_eq!(by_label.parent_label.as_deref(), Some("Section"));
    }

    #[test]
    fn test_change_rule_keeps_all_fields() {
        let rule = ChangeRuleProjector::project(ChangeRuleRow {
            change_id: 1,
            element_id: 3,
            parent_value: None,
            action_id: 4,
            action_type: "hide".to_string(),
        });
        assert_eq!(
            serde_json::to_value(rule).unwrap(),
            json!({
                "changeId": 1,
                "elementId": 3,
                "parentValue": null,
                "actionId": 4,
                "actionType": "hide"
            })
        );
    }
}
