use smartassist_database::DatabaseError;

use crate::error::FieldErrors;

#[derive(Debug)]
pub enum ServiceError {
    NotFound(String),
    Validation(FieldErrors),
    Database(DatabaseError),
}

impl ServiceError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}

impl From<ServiceError> for crate::ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(message) => crate::ApiError::not_found(message),
            ServiceError::Validation(errors) => crate::ApiError::validation(errors),
            ServiceError::Database(db_err) => crate::ApiError::from(db_err),
        }
    }
}

impl From<DatabaseError> for ServiceError {
    fn from(err: DatabaseError) -> Self {
        if err.is_not_found() {
            return Self::NotFound(err.to_string());
        }
        Self::Database(err)
    }
}

impl From<FieldErrors> for ServiceError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}
