//! Conversions from external infrastructure errors into domain errors.

use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;
use slotwise_domain::SlotwiseError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub SlotwiseError);

impl From<InfraError> for SlotwiseError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<SlotwiseError> for InfraError {
    fn from(value: SlotwiseError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoSlotwiseError {
    fn into_slotwise(self) -> SlotwiseError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → SlotwiseError */
/* -------------------------------------------------------------------------- */

impl IntoSlotwiseError for SqlError {
    fn into_slotwise(self) -> SlotwiseError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match err.code {
                    ErrorCode::DatabaseBusy => {
                        SlotwiseError::StoreUnavailable("database is busy".into())
                    }
                    ErrorCode::DatabaseLocked => {
                        SlotwiseError::StoreUnavailable("database is locked".into())
                    }
                    ErrorCode::ConstraintViolation => {
                        SlotwiseError::Database(format!("constraint violation: {message}"))
                    }
                    _ => SlotwiseError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => {
                SlotwiseError::NotFound("no rows returned by query".into())
            }
            RE::FromSqlConversionFailure(_, _, cause) => {
                SlotwiseError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                SlotwiseError::Database(format!("invalid column type: {ty}"))
            }
            RE::Utf8Error(_) => {
                SlotwiseError::Database("invalid UTF-8 returned from sqlite".into())
            }
            RE::InvalidQuery => SlotwiseError::Database("invalid SQL query".into()),
            other => SlotwiseError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_slotwise())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → SlotwiseError */
/* -------------------------------------------------------------------------- */

impl IntoSlotwiseError for r2d2::Error {
    fn into_slotwise(self) -> SlotwiseError {
        // A pool that cannot hand out connections means the commit layer is
        // down for this request, not that the data is bad.
        SlotwiseError::StoreUnavailable(format!("connection pool error: {self}"))
    }
}

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(value.into_slotwise())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → SlotwiseError */
/* -------------------------------------------------------------------------- */

impl IntoSlotwiseError for HttpError {
    fn into_slotwise(self) -> SlotwiseError {
        if self.is_timeout() || self.is_connect() {
            SlotwiseError::Unreachable(self.to_string())
        } else {
            SlotwiseError::Network(self.to_string())
        }
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_slotwise())
    }
}
