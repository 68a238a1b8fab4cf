use std::fmt;
use std::time::Duration;

/// The three independently read row sets behind a UI document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSet {
    Elements,
    Options,
    ChangeRules,
}

impl fmt::Display for RowSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RowSet::Elements => "ui elements",
            RowSet::Options => "options data",
            RowSet::ChangeRules => "change rules",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read {row_set}: {source}")]
    Read {
        row_set: RowSet,
        #[source]
        source: sqlx::Error,
    },

    #[error("reading {row_set} timed out after {}ms", .after.as_millis())]
    Timeout { row_set: RowSet, after: Duration },

    /// The store rejected a write; `code` is its SQLSTATE
    #[error("{message}")]
    Constraint { code: String, message: String },

    #[error("database unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StoreError {
    pub fn read(row_set: RowSet) -> impl FnOnce(sqlx::Error) -> StoreError {
        move |source| StoreError::Read { row_set, source }
    }

    /// Classify a failed write, keeping the store's error code when the
    /// rejection was caused by the submitted values
    pub fn from_write(err: sqlx::Error) -> StoreError {
        match err {
            sqlx::Error::Database(db) => {
                let code = db.code().map(|code| code.into_owned());
                match code {
                    Some(code) if rejects_input(&code) => StoreError::Constraint {
                        code,
                        message: db.message().to_string(),
                    },
                    Some(code) if is_unavailable(&code) => {
                        StoreError::Unavailable(sqlx::Error::Database(db))
                    }
                    Some(code) => StoreError::Other(anyhow::anyhow!("{} ({})", db.message(), code)),
                    None => StoreError::Other(anyhow::anyhow!(db.message().to_string())),
                }
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) | sqlx::Error::Tls(_) => {
                StoreError::Unavailable(err)
            }
            other => StoreError::Other(other.into()),
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            StoreError::Constraint { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// SQLSTATE classes 22 (data exception) and 23 (integrity constraint violation)
fn rejects_input(code: &str) -> bool {
    code.starts_with("22") || code.starts_with("23")
}

/// Connection exception, insufficient resources, operator intervention
fn is_unavailable(code: &str) -> bool {
    ["08", "53", "57"].iter().any(|class| code.starts_with(class))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_row_set() {
        let err = StoreError::Timeout {
            row_set: RowSet::Options,
            after: Duration::from_millis(250),
        };
        assert_eq!(err.to_string(), "reading options data timed out after 250ms");

        let err = StoreError::read(RowSet::ChangeRules)(sqlx::Error::RowNotFound);
        assert!(err.to_string().starts_with("failed to read change rules"));
        assert_eq!(err.code(), None);
    }

    #[test]
    fn test_constraint_keeps_code() {
        let err = StoreError::Constraint {
            code: "23505".to_string(),
            message: "duplicate key value violates unique constraint".to_string(),
        };
        assert_eq!(err.code(), Some("23505"));
        assert_eq!(err.to_string(), "duplicate key value violates unique constraint");
    }

    #[derive(Debug, thiserror::Error)]
    #[error("{message}")]
    struct PgError {
        code: &'static str,
        message: &'static str,
    }

    impl sqlx::error::DatabaseError for PgError {
        fn message(&self) -> &str {
            self.message
        }

        fn code(&self) -> Option<std::borrow::Cow<'_, str>> {
            Some(self.code.into())
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            sqlx::error::ErrorKind::Other
        }
    }

    fn write_error(code: &'static str, message: &'static str) -> StoreError {
        StoreError::from_write(sqlx::Error::Database(Box::new(PgError { code, message })))
    }

    #[test]
    fn test_value_rejections_keep_their_code() {
        let err = write_error("23505", "duplicate key value violates unique constraint");
        assert_eq!(err.code(), Some("23505"));

        let err = write_error("22P02", "invalid input syntax for type integer: \"abc\"");
        assert_eq!(err.code(), Some("22P02"));
        assert!(matches!(err, StoreError::Constraint { .. }));
    }

    #[test]
    fn test_server_side_database_faults_are_not_constraints() {
        let err = write_error("42P01", "relation \"testapi.process_records\" does not exist");
        assert!(matches!(err, StoreError::Other(_)));
        assert_eq!(err.code(), None);
        assert!(err.to_string().contains("42P01"));

        for code in ["53300", "57P01", "08006"] {
            let err = write_error(code, "server went away");
            assert!(matches!(err, StoreError::Unavailable(_)), "{}", code);
            assert_eq!(err.code(), None);
        }
    }

    #[test]
    fn test_non_database_write_errors_have_no_code() {
        let err = StoreError::from_write(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert_eq!(err.code(), None);
    }
}
