//! Conversions from storage and provider errors into domain errors.

use calnotify_domain::CalNotifyError;
use rusqlite::ffi::ErrorCode;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub CalNotifyError);

impl From<InfraError> for CalNotifyError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<CalNotifyError> for InfraError {
    fn from(value: CalNotifyError) -> Self {
        Self(value)
    }
}

impl From<rusqlite::Error> for InfraError {
    fn from(value: rusqlite::Error) -> Self {
        use rusqlite::Error as SqlError;

        let mapped = match value {
            SqlError::SqliteFailure(err, message) => match err.code {
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => {
                    CalNotifyError::Database("event database is busy".into())
                }
                ErrorCode::CannotOpen => CalNotifyError::Database(format!(
                    "cannot open event database: {}",
                    message.unwrap_or_default()
                )),
                code => CalNotifyError::Database(format!(
                    "sqlite {code:?}: {}",
                    message.unwrap_or_default()
                )),
            },
            SqlError::QueryReturnedNoRows => CalNotifyError::NotFound("no matching event".into()),
            SqlError::FromSqlConversionFailure(column, _, cause) => {
                CalNotifyError::Database(format!("stored event row is malformed (column {column}): {cause}"))
            }
            SqlError::InvalidColumnType(column, name, _) => CalNotifyError::Database(format!(
                "stored event row is malformed (column {column} `{name}`)"
            )),
            other => CalNotifyError::Database(other.to_string()),
        };
        Self(mapped)
    }
}

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        Self(CalNotifyError::Database(format!("no database connection available: {value}")))
    }
}

impl From<reqwest::Error> for InfraError {
    fn from(value: reqwest::Error) -> Self {
        let mapped = if value.is_timeout() {
            CalNotifyError::Network("provider request timed out".into())
        } else if value.is_connect() {
            CalNotifyError::Network("could not reach provider".into())
        } else if value.is_builder() {
            CalNotifyError::Internal(format!("invalid provider request: {value}"))
        } else {
            CalNotifyError::Network(format!("provider request failed: {value}"))
        };
        Self(mapped)
    }
}

/// Map any convertible infrastructure error straight to the domain error.
pub(crate) fn into_domain<E>(err: E) -> CalNotifyError
where
    InfraError: From<E>,
{
    InfraError::from(err).into()
}

#[cfg(test)]
mod tests {
    use rusqlite::ffi::Error as FfiError;
    use rusqlite::types::Type;
    use rusqlite::Error as SqlError;

    use super::*;

    #[test]
    fn sqlite_locked_maps_to_busy_database() {
        let err = SqlError::SqliteFailure(
            FfiError { code: ErrorCode::DatabaseLocked, extended_code: 6 },
            Some("database table is locked".into()),
        );

        match into_domain(err) {
            CalNotifyError::Database(msg) => assert_eq!(msg, "event database is busy"),
            other => panic!("expected database error, got {:?}", other),
        }
    }

    #[test]
    fn no_rows_maps_to_not_found() {
        let mapped = into_domain(SqlError::QueryReturnedNoRows);
        assert!(matches!(mapped, CalNotifyError::NotFound(_)));
    }

    #[test]
    fn bad_stored_date_reports_malformed_row() {
        let cause = "2024-13-40".parse::<chrono::NaiveDate>().unwrap_err();
        let err = SqlError::FromSqlConversionFailure(3, Type::Text, Box::new(cause));

        match into_domain(err) {
            CalNotifyError::Database(msg) => assert!(msg.contains("malformed (column 3)")),
            other => panic!("expected database error, got {:?}", other),
        }
    }

    #[test]
    fn domain_error_passes_through() {
        let original = CalNotifyError::InvalidInput("title is required".into());
        let back: CalNotifyError = InfraError::from(original).into();
        assert!(matches!(back, CalNotifyError::InvalidInput(msg) if msg == "title is required"));
    }
}
