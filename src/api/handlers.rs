use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::Json,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::StoreError;
use crate::logic::ResponseAssembler;
use crate::model::{ProcessRecord, UiDocument};
use crate::store::traits::Store;

/// Everything a handler needs, shared across requests
#[derive(Debug)]
pub struct AppState<S> {
    pub store: Arc<S>,
    pub assembler: ResponseAssembler,
    pub default_product: String,
}

pub type SharedState<S> = Arc<AppState<S>>;

impl<S> AppState<S> {
    pub fn new(store: Arc<S>, config: &AppConfig) -> Self {
        Self {
            store,
            assembler: ResponseAssembler::new(config.projection_options(), config.query_timeout()),
            default_product: config.ui.default_product.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub timestamp: String,
}

/// Query parameters of `GET /api/ui-data`
///
/// Read from raw pairs so a repeated `product` takes its first value
/// instead of failing the request.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct UiDataQuery {
    pub product: Option<String>,
}

impl UiDataQuery {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        Self {
            product: pairs
                .into_iter()
                .find(|(key, _)| key == "product")
                .map(|(_, value)| value),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AddRecordResponse {
    pub message: String,
    pub qo_no: Value,
    pub uid: Value,
}

/// Error body for record inserts; `code` is the store's error code when it sent one
#[derive(Debug, Serialize)]
pub struct InsertErrorResponse {
    pub error: String,
    pub details: String,
    pub code: Option<String>,
}

pub const INVALID_INPUT_CODE: &str = "INVALID_INPUT";

type InsertError = (StatusCode, Json<InsertErrorResponse>);

fn insert_error(status: StatusCode, details: String, code: Option<String>) -> InsertError {
    (
        status,
        Json(InsertErrorResponse {
            error: "Failed to add record".to_string(),
            details,
            code,
        }),
    )
}

/// GET /health
pub async fn health_check<S: Store>(
    State(state): State<SharedState<S>>,
) -> (StatusCode, Json<HealthResponse>) {
    let (status, health, database) = match state.store.ping().await {
        Ok(()) => (StatusCode::OK, "healthy", "reachable"),
        Err(e) => {
            log::warn!("Health check could not reach the database: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "degraded", "unreachable")
        }
    };

    (
        status,
        Json(HealthResponse {
            status: health.to_string(),
            database: database.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }),
    )
}

/// GET /api/ui-data?product=<product>
/// Form elements for the product, every option group and every change rule
pub async fn get_ui_data<S: Store>(
    State(state): State<SharedState<S>>,
    pairs: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<UiDocument>, (StatusCode, Json<ErrorResponse>)> {
    let query = match pairs {
        Ok(Query(pairs)) => UiDataQuery::from_pairs(pairs),
        Err(rejection) => {
            log::warn!("Ignoring unreadable query string: {}", rejection.body_text());
            UiDataQuery::default()
        }
    };
    let product = query
        .product
        .unwrap_or_else(|| state.default_product.clone());

    match state.assembler.assemble(&*state.store, &product).await {
        Ok(document) => Ok(Json(document)),
        Err(e) => {
            match &e {
                StoreError::Timeout { .. } => log::warn!("UI data for product '{}': {}", product, e),
                _ => log::error!("Failed to load UI data for product '{}': {}", product, e),
            }
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(&e.to_string())),
            ))
        }
    }
}

/// POST /api/add-record
/// Insert one process record; columns missing from the body are stored as NULL
pub async fn add_record<S: Store>(
    State(state): State<SharedState<S>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<AddRecordResponse>), InsertError> {
    let body = match payload {
        Ok(Json(Value::Object(body))) => body,
        Ok(Json(_)) => {
            return Err(insert_error(
                StatusCode::BAD_REQUEST,
                "Request body must be a JSON object".to_string(),
                Some(INVALID_INPUT_CODE.to_string()),
            ));
        }
        Err(rejection) => {
            return Err(insert_error(
                StatusCode::BAD_REQUEST,
                rejection.body_text(),
                Some(INVALID_INPUT_CODE.to_string()),
            ));
        }
    };

    let record = ProcessRecord::from_json(&body);
    if !record.ignored_keys().is_empty() {
        log::debug!("Ignoring unknown record fields: {:?}", record.ignored_keys());
    }

    match state.store.insert_record(&record).await {
        Ok(()) => {
            log::info!(
                "Added record uid={} qo_no={}",
                record.get("uid").unwrap_or("-"),
                record.get("qo_no").unwrap_or("-")
            );
            Ok((
                StatusCode::CREATED,
                Json(AddRecordResponse {
                    message: "Record added successfully".to_string(),
                    qo_no: body.get("qo_no").cloned().unwrap_or(Value::Null),
                    uid: body.get("uid").cloned().unwrap_or(Value::Null),
                }),
            ))
        }
        Err(StoreError::Constraint { code, message }) => {
            log::error!("Record rejected by the database ({}): {}", code, message);
            Err(insert_error(StatusCode::BAD_REQUEST, message, Some(code)))
        }
        Err(e) => {
            log::error!("Failed to add record: {}", e);
            Err(insert_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                e.to_string(),
                None,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::routes::create_router;
    use crate::error::RowSet;
    use crate::model::{ChangeRuleRow, ElementRow, OptionRow, PROCESS_RECORD_COLUMNS};
    use crate::store::MemoryStore;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::json;
    use tower::ServiceExt;

    fn app(store: Arc<MemoryStore>) -> axum::Router {
        let state = Arc::new(AppState::new(store, &AppConfig::default()));
        create_router().with_state(state)
    }

    fn sample_store() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::with_rows(
            vec![
                ElementRow::new(1, 1, "text").with_initial_value("TRUE").with_product("general"),
                ElementRow::new(2, 2, "text").with_product("widgetA"),
                ElementRow::new(3, 3, "select").with_options_key("city").with_product("*"),
            ],
            vec![OptionRow::new(1, "city", "TPE", "Taipei")],
            vec![ChangeRuleRow {
                change_id: 7,
                element_id: 3,
                parent_value: None,
                action_id: 2,
                action_type: "show".to_string(),
            }],
        ))
    }

    async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(uri: &str, body: String) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_ui_data_defaults_to_general_product() {
        let (status, body) = send(
            app(sample_store()),
            Request::get("/api/ui-data").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let ids: Vec<_> = body["uiDataTable"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["elementId"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(body["uiDataTable"][0]["initialValue"], json!(true));
        assert_eq!(body["optionsDataTable"][0]["key"], json!("city"));
        assert_eq!(body["uiChangedTable"][0]["changeId"], json!(7));
    }

    #[tokio::test]
    async fn test_ui_data_filters_by_product_param() {
        let (status, body) = send(
            app(sample_store()),
            Request::get("/api/ui-data?product=widgetA").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let ids: Vec<_> = body["uiDataTable"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["elementId"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[tokio::test]
    async fn test_ui_data_repeated_product_uses_first_value() {
        let (status, body) = send(
            app(sample_store()),
            Request::get("/api/ui-data?product=widgetA&product=general")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let ids: Vec<_> = body["uiDataTable"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["elementId"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[tokio::test]
    async fn test_ui_data_unmatched_product_returns_wildcard_rows() {
        let (status, body) = send(
            app(sample_store()),
            Request::get("/api/ui-data?product=%3Bdrop&other=1").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["uiDataTable"].as_array().unwrap().len(), 1);
        assert_eq!(body["uiDataTable"][0]["elementId"], json!(3));
    }

    #[test]
    fn test_query_pairs_ignore_other_keys() {
        let query = UiDataQuery::from_pairs(vec![
            ("lang".to_string(), "en".to_string()),
            ("product".to_string(), "widgetA".to_string()),
            ("product".to_string(), "widgetB".to_string()),
        ]);
        assert_eq!(query.product.as_deref(), Some("widgetA"));
        assert_eq!(UiDataQuery::from_pairs(Vec::new()), UiDataQuery::default());
    }

    #[tokio::test]
    async fn test_ui_data_read_failure_is_500_without_partial_data() {
        let store = sample_store();
        store.fail_reads(Some(RowSet::ChangeRules)).await;

        let (status, body) = send(
            app(store),
            Request::get("/api/ui-data").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("change rules"));
        assert!(body.get("uiDataTable").is_none());
        assert!(body.get("optionsDataTable").is_none());
    }

    #[tokio::test]
    async fn test_add_record_with_missing_columns_is_created() {
        let store = Arc::new(MemoryStore::new());
        let mut record = serde_json::Map::new();
        // Every column except the last ten
        for column in &PROCESS_RECORD_COLUMNS[..PROCESS_RECORD_COLUMNS.len() - 10] {
            record.insert(column.name.to_string(), json!("x"));
        }
        record.insert("uid".to_string(), json!("u-100"));
        record.insert("qo_no".to_string(), json!("QO-100"));

        let (status, body) = send(
            app(store.clone()),
            post_json("/api/add-record", Value::Object(record).to_string()),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["uid"], json!("u-100"));
        assert_eq!(body["qo_no"], json!("QO-100"));

        let stored = store.records().await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].null_count(), 10);
    }

    #[tokio::test]
    async fn test_add_record_duplicate_is_400_with_store_code() {
        let store = Arc::new(MemoryStore::new());
        let body = json!({"uid": "u-1", "qo_no": "QO-1"}).to_string();

        let (status, _) = send(app(store.clone()), post_json("/api/add-record", body.clone())).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, response) = send(app(store), post_json("/api/add-record", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["code"], json!("23505"));
        assert!(response["details"].as_str().unwrap().contains("duplicate key"));
        assert_eq!(response["error"], json!("Failed to add record"));
    }

    #[tokio::test]
    async fn test_add_record_rejects_non_object_body() {
        let (status, body) = send(
            app(Arc::new(MemoryStore::new())),
            post_json("/api/add-record", "[1, 2, 3]".to_string()),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], json!(INVALID_INPUT_CODE));

        let (status, body) = send(
            app(Arc::new(MemoryStore::new())),
            post_json("/api/add-record", "{not json".to_string()),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], json!(INVALID_INPUT_CODE));
    }

    #[tokio::test]
    async fn test_health_reports_database() {
        let (status, body) = send(
            app(Arc::new(MemoryStore::new())),
            Request::get("/health").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], json!("healthy"));
        assert_eq!(body["database"], json!("reachable"));
    }
}
