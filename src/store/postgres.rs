use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::PgPool;

use crate::config::{is_identifier, DatabaseConfig};
use crate::error::{RowSet, StoreError};
use crate::model::{
    ChangeRuleRow, ColumnKind, ElementRow, OptionRow, ProcessRecord, PROCESS_RECORD_COLUMNS,
    UNIQUE_RECORD_COLUMNS, WILDCARD_PRODUCT,
};
use crate::store::traits::{HealthStore, RecordStore, Store, UiDefinitionWriter, UiRowSource};

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
    schema: String,
    insert_record_sql: String,
}

impl PostgresStore {
    /// Create a pool for `config` and verify the database answers before returning
    pub async fn connect(config: &DatabaseConfig, schema: &str) -> Result<Self> {
        let options = connect_options(config)?;
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect_with(options)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        let store = Self::from_pool(pool, schema)?;
        store
            .ping()
            .await
            .context("PostgreSQL did not answer the connectivity check")?;

        Ok(store)
    }

    pub fn from_pool(pool: PgPool, schema: &str) -> Result<Self> {
        if !is_identifier(schema) {
            anyhow::bail!("Invalid schema name '{}'", schema);
        }
        let insert_record_sql = insert_record_statement(&format!("{}.process_records", schema));

        Ok(Self {
            pool,
            schema: schema.to_string(),
            insert_record_sql,
        })
    }

    /// Create the schema and tables if they do not exist yet
    pub async fn migrate(&self) -> Result<()> {
        for statement in migration_statements(&self.schema) {
            sqlx::query(&statement)
                .execute(&self.pool)
                .await
                .with_context(|| format!("Failed to run migration: {}", first_line(&statement)))?;
        }
        Ok(())
    }

    fn table(&self, name: &str) -> String {
        format!("{}.{}", self.schema, name)
    }
}

fn connect_options(config: &DatabaseConfig) -> Result<PgConnectOptions> {
    if let Some(url) = &config.connection_string {
        return PgConnectOptions::from_str(url).context("Invalid database connection string");
    }

    let mut options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .database(&config.name)
        // Require mode encrypts without verifying the server certificate
        .ssl_mode(if config.ssl {
            PgSslMode::Require
        } else {
            PgSslMode::Disable
        });
    if let Some(password) = &config.password {
        options = options.password(password);
    }
    Ok(options)
}

fn first_line(statement: &str) -> &str {
    statement.trim().lines().next().unwrap_or_default()
}

/// One positional insert over every record column, each value cast from text
pub fn insert_record_statement(table: &str) -> String {
    let columns: Vec<&str> = PROCESS_RECORD_COLUMNS.iter().map(|c| c.name).collect();
    let placeholders: Vec<String> = PROCESS_RECORD_COLUMNS
        .iter()
        .enumerate()
        .map(|(i, column)| match column.kind {
            ColumnKind::Text => format!("${}::text", i + 1),
            kind => format!("${}::text::{}", i + 1, kind.sql_type()),
        })
        .collect();

    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        columns.join(", "),
        placeholders.join(", ")
    )
}

fn process_records_ddl(table: &str) -> String {
    let columns: Vec<String> = PROCESS_RECORD_COLUMNS
        .iter()
        .map(|column| {
            let mut def = format!("    {} {}", column.name, column.kind.sql_type());
            if !column.nullable {
                def.push_str(" NOT NULL");
            }
            if column.name == UNIQUE_RECORD_COLUMNS[0] {
                def.push_str(" PRIMARY KEY");
            } else if UNIQUE_RECORD_COLUMNS.contains(&column.name) {
                def.push_str(" UNIQUE");
            }
            def
        })
        .collect();

    format!("CREATE TABLE IF NOT EXISTS {} (\n{}\n)", table, columns.join(",\n"))
}

fn migration_statements(schema: &str) -> Vec<String> {
    vec![
        format!("CREATE SCHEMA IF NOT EXISTS {}", schema),
        format!(
            r#"CREATE TABLE IF NOT EXISTS {}.ui_elements (
                element_id integer PRIMARY KEY,
                seq_id integer NOT NULL,
                element_type text NOT NULL,
                label text,
                parent_id integer,
                parent_label text,
                initial_value text,
                options_key text,
                properties jsonb,
                trigger_event text,
                product text NOT NULL DEFAULT 'general'
            )"#,
            schema
        ),
        format!(
            "CREATE INDEX IF NOT EXISTS ui_elements_product_seq_idx ON {}.ui_elements (product, seq_id)",
            schema
        ),
        format!(
            r#"CREATE TABLE IF NOT EXISTS {}.options_data (
                option_id integer PRIMARY KEY,
                option_key text NOT NULL,
                value text NOT NULL,
                label text NOT NULL,
                product text,
                parent_value text
            )"#,
            schema
        ),
        format!(
            r#"CREATE TABLE IF NOT EXISTS {}.ui_change_rules (
                change_id integer PRIMARY KEY,
                element_id integer NOT NULL,
                parent_value text,
                action_id integer NOT NULL,
                action_type text NOT NULL
            )"#,
            schema
        ),
        process_records_ddl(&format!("{}.process_records", schema)),
    ]
}

#[async_trait::async_trait]
impl UiRowSource for PostgresStore {
    async fn fetch_elements(&self, product: &str) -> Result<Vec<ElementRow>, StoreError> {
        let sql = format!(
            "SELECT * FROM {} WHERE product = $1 OR product = $2 ORDER BY seq_id ASC, element_id ASC",
            self.table("ui_elements")
        );
        sqlx::query_as::<_, ElementRow>(&sql)
            .bind(product)
            .bind(WILDCARD_PRODUCT)
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::read(RowSet::Elements))
    }

    async fn fetch_options(&self) -> Result<Vec<OptionRow>, StoreError> {
        let sql = format!("SELECT * FROM {} ORDER BY option_id ASC", self.table("options_data"));
        sqlx::query_as::<_, OptionRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::read(RowSet::Options))
    }

    async fn fetch_change_rules(&self) -> Result<Vec<ChangeRuleRow>, StoreError> {
        let sql = format!(
            "SELECT change_id, element_id, parent_value, action_id, action_type FROM {} ORDER BY change_id ASC",
            self.table("ui_change_rules")
        );
        sqlx::query_as::<_, ChangeRuleRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::read(RowSet::ChangeRules))
    }
}

#[async_trait::async_trait]
impl RecordStore for PostgresStore {
    async fn insert_record(&self, record: &ProcessRecord) -> Result<(), StoreError> {
        let mut query = sqlx::query(&self.insert_record_sql);
        for value in record.values() {
            query = query.bind(value.as_deref());
        }

        query
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_write)?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl UiDefinitionWriter for PostgresStore {
    async fn write_ui_definitions(
        &self,
        elements: &[ElementRow],
        options: &[OptionRow],
        change_rules: &[ChangeRuleRow],
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(StoreError::from_write)?;

        let sql = format!(
            r#"INSERT INTO {} (element_id, seq_id, element_type, label, parent_id, parent_label,
                initial_value, options_key, properties, trigger_event, product)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, COALESCE($11, 'general'))
            ON CONFLICT (element_id) DO NOTHING"#,
            self.table("ui_elements")
        );
        for row in elements {
            sqlx::query(&sql)
                .bind(row.element_id)
                .bind(row.seq_id)
                .bind(&row.element_type)
                .bind(&row.label)
                .bind(row.parent_id)
                .bind(&row.parent_label)
                .bind(&row.initial_value)
                .bind(&row.options_key)
                .bind(&row.properties)
                .bind(&row.trigger_event)
                .bind(&row.product)
                .execute(&mut *tx)
                .await
                .map_err(StoreError::from_write)?;
        }

        let sql = format!(
            r#"INSERT INTO {} (option_id, option_key, value, label, product, parent_value)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (option_id) DO NOTHING"#,
            self.table("options_data")
        );
        for row in options {
            sqlx::query(&sql)
                .bind(row.option_id)
                .bind(&row.option_key)
                .bind(&row.value)
                .bind(&row.label)
                .bind(&row.product)
                .bind(&row.parent_value)
                .execute(&mut *tx)
                .await
                .map_err(StoreError::from_write)?;
        }

        let sql = format!(
            r#"INSERT INTO {} (change_id, element_id, parent_value, action_id, action_type)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (change_id) DO NOTHING"#,
            self.table("ui_change_rules")
        );
        for row in change_rules {
            sqlx::query(&sql)
                .bind(row.change_id)
                .bind(row.element_id)
                .bind(&row.parent_value)
                .bind(row.action_id)
                .bind(&row.action_type)
                .execute(&mut *tx)
                .await
                .map_err(StoreError::from_write)?;
        }

        tx.commit().await.map_err(StoreError::from_write)?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl HealthStore for PostgresStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(StoreError::Unavailable)?;
        Ok(())
    }
}

impl Store for PostgresStore {}
