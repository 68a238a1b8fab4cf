use anyhow::{Context, Result};
use serde_json::json;

use crate::model::{ChangeRuleRow, ElementRow, OptionRow};
use crate::store::traits::UiDefinitionWriter;

/// Load a small demo form: customer fields, a city select with a cascading
/// district select, and a sample checkbox that shows or hides its quantity.
pub async fn load_seed_data<S: UiDefinitionWriter + ?Sized>(store: &S) -> Result<()> {
    store
        .write_ui_definitions(&demo_elements(), &demo_options(), &demo_change_rules())
        .await
        .context("Failed to write seed UI definitions")?;
    Ok(())
}

pub fn demo_elements() -> Vec<ElementRow> {
    vec![
        ElementRow::new(1, 10, "text")
            .with_label("Customer name")
            .with_properties(json!({"hint": "Company or person", "required": true}))
            .with_product("*"),
        ElementRow::new(2, 20, "checkbox")
            .with_label("Urgent order")
            .with_initial_value("FALSE")
            .with_product("*"),
        ElementRow::new(3, 30, "select")
            .with_label("City")
            .with_options_key("city")
            .with_initial_value("TPE")
            .with_trigger_event("onChange")
            .with_product("*"),
        ElementRow::new(7, 35, "select")
            .with_label("Finish")
            .with_options_key("finish")
            .with_product("widgetA"),
        ElementRow::new(4, 40, "select")
            .with_label("District")
            .with_options_key("district")
            .with_parent(3)
            .with_product("*"),
        ElementRow::new(5, 50, "checkbox")
            .with_label("Include sample")
            .with_initial_value("TRUE")
            .with_trigger_event("onChange")
            .with_product("general"),
        ElementRow::new(6, 60, "text")
            .with_label("Sample quantity")
            .with_parent(5)
            .with_properties(json!({"keyboard": "number", "min": 1}))
            .with_product("general"),
    ]
}

pub fn demo_options() -> Vec<OptionRow> {
    vec![
        OptionRow::new(1, "city", "TPE", "Taipei"),
        OptionRow::new(2, "city", "KHH", "Kaohsiung"),
        OptionRow::new(3, "district", "XY", "Xinyi").with_parent_value("TPE"),
        OptionRow::new(4, "district", "DA", "Da'an").with_parent_value("TPE"),
        OptionRow::new(5, "district", "LY", "Lingya").with_parent_value("KHH"),
        OptionRow::new(6, "finish", "matte", "Matte").with_product("widgetA"),
        OptionRow::new(7, "finish", "gloss", "Gloss").with_product("widgetA"),
    ]
}

pub fn demo_change_rules() -> Vec<ChangeRuleRow> {
    let rule = |change_id, element_id, parent_value: Option<&str>, action_id, action_type: &str| {
        ChangeRuleRow {
            change_id,
            element_id,
            parent_value: parent_value.map(str::to_string),
            action_id,
            action_type: action_type.to_string(),
        }
    };

    vec![
        rule(1, 5, Some("TRUE"), 6, "show"),
        rule(2, 5, Some("FALSE"), 6, "hide"),
        rule(3, 3, None, 4, "reload"),
    ]
}
