use serde_json::{Map, Value};

/// Storage type of a process-record column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    Numeric,
    Boolean,
    Date,
    Timestamp,
    Json,
}

impl ColumnKind {
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnKind::Text => "text",
            ColumnKind::Integer => "integer",
            ColumnKind::Numeric => "numeric",
            ColumnKind::Boolean => "boolean",
            ColumnKind::Date => "date",
            ColumnKind::Timestamp => "timestamptz",
            ColumnKind::Json => "jsonb",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub nullable: bool,
}

const fn col(name: &'static str, kind: ColumnKind) -> ColumnDef {
    ColumnDef {
        name,
        kind,
        nullable: true,
    }
}

const fn required(name: &'static str, kind: ColumnKind) -> ColumnDef {
    ColumnDef {
        name,
        kind,
        nullable: false,
    }
}

use ColumnKind::{Boolean, Date, Integer, Json, Numeric, Text, Timestamp};

/// Columns of `process_records`, in insert order
pub const PROCESS_RECORD_COLUMNS: &[ColumnDef] = &[
    required("uid", Text),
    required("qo_no", Text),
    col("qo_date", Date),
    col("revision", Integer),
    col("status", Text),
    col("priority", Text),
    col("product", Text),
    col("customer_code", Text),
    col("customer_name", Text),
    col("customer_tax_id", Text),
    col("contact_person", Text),
    col("contact_phone", Text),
    col("contact_email", Text),
    col("contact_fax", Text),
    col("billing_address", Text),
    col("shipping_address", Text),
    col("sales_rep", Text),
    col("sales_department", Text),
    col("project_name", Text),
    col("project_code", Text),
    col("item_no", Text),
    col("item_name", Text),
    col("item_spec", Text),
    col("material", Text),
    col("material_grade", Text),
    col("thickness", Numeric),
    col("width", Numeric),
    col("length", Numeric),
    col("height", Numeric),
    col("weight", Numeric),
    col("color", Text),
    col("finish", Text),
    col("surface_treatment", Text),
    col("coating", Text),
    col("print_method", Text),
    col("print_colors", Integer),
    col("die_cut", Boolean),
    col("lamination", Boolean),
    col("embossing", Boolean),
    col("hot_stamping", Boolean),
    col("window_patch", Boolean),
    col("gluing", Text),
    col("binding", Text),
    col("folding", Text),
    col("packing_method", Text),
    col("pieces_per_carton", Integer),
    col("carton_size", Text),
    col("pallet_type", Text),
    col("quantity", Integer),
    col("unit", Text),
    col("moq", Integer),
    col("unit_price", Numeric),
    col("currency", Text),
    col("exchange_rate", Numeric),
    col("material_cost", Numeric),
    col("process_cost", Numeric),
    col("tooling_cost", Numeric),
    col("freight_cost", Numeric),
    col("other_cost", Numeric),
    col("subtotal", Numeric),
    col("discount_rate", Numeric),
    col("discount_amount", Numeric),
    col("tax_rate", Numeric),
    col("tax_amount", Numeric),
    col("total_amount", Numeric),
    col("payment_terms", Text),
    col("trade_terms", Text),
    col("delivery_date", Date),
    col("delivery_method", Text),
    col("lead_time_days", Integer),
    col("valid_until", Date),
    col("sample_required", Boolean),
    col("sample_qty", Integer),
    col("sample_date", Date),
    col("inspection_level", Text),
    col("certification", Text),
    col("attachments", Json),
    col("form_payload", Json),
    col("remark", Text),
    col("internal_note", Text),
    col("approved_by", Text),
    col("approved_at", Timestamp),
    col("created_by", Text),
    col("created_at", Timestamp),
    col("updated_at", Timestamp),
];

pub const UNIQUE_RECORD_COLUMNS: &[&str] = &["uid", "qo_no"];

/// A process record laid out positionally against [`PROCESS_RECORD_COLUMNS`]
///
/// Values are kept as text and cast by the store, so a value of the wrong
/// shape is rejected there with the store's own error code.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessRecord {
    values: Vec<Option<String>>,
    ignored: Vec<String>,
}

impl ProcessRecord {
    pub fn from_json(input: &Map<String, Value>) -> Self {
        let values = PROCESS_RECORD_COLUMNS
            .iter()
            .map(|column| input.get(column.name).and_then(|v| render(column.kind, v)))
            .collect();

        let ignored = input
            .keys()
            .filter(|key| column_index(key).is_none())
            .cloned()
            .collect();

        Self { values, ignored }
    }

    /// One entry per column, `None` binds as SQL NULL
    pub fn values(&self) -> &[Option<String>] {
        &self.values
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        column_index(column).and_then(|i| self.values[i].as_deref())
    }

    /// Input keys that are not record columns
    pub fn ignored_keys(&self) -> &[String] {
        &self.ignored
    }

    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }
}

pub fn column_index(name: &str) -> Option<usize> {
    PROCESS_RECORD_COLUMNS.iter().position(|c| c.name == name)
}

fn render(kind: ColumnKind, value: &Value) -> Option<String> {
    match (kind, value) {
        (_, Value::Null) => None,
        (ColumnKind::Json, v) => Some(v.to_string()),
        (_, Value::String(s)) => Some(s.clone()),
        (_, Value::Bool(b)) => Some(b.to_string()),
        (_, Value::Number(n)) => Some(n.to_string()),
        (_, v) => Some(v.to_string()),
    }
}
