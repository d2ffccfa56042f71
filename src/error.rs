use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReportError>;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Data access error: {0}")]
    DataAccess(#[from] sqlx::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl ReportError {
    pub fn election_not_found(id: i64) -> Self {
        ReportError::NotFound { entity: "Election", id }
    }

    #[cfg(test)]
    pub fn is_not_found(&self) -> bool {
        matches!(self, ReportError::NotFound { .. })
    }
}

// Wrap a row decoding failure (bad timestamp, unknown status string) as a data access error.
pub fn decode_error<E>(err: E) -> ReportError
where
    E: std::error::Error + Send + Sync + 'static,
{
    ReportError::DataAccess(sqlx::Error::Decode(Box::new(err)))
}

#[derive(Error, Debug)]
#[error("Unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}
