use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("invalid user ID")]
    InvalidUserId,

    #[error("first name is required")]
    FirstNameRequired,

    #[error("last name is required")]
    LastNameRequired,

    #[error("email is required")]
    EmailRequired,

    #[error("email already exists")]
    DuplicateEmail,

    #[error("user not found")]
    UserNotFound,

    /// Any failure reported by the persistence layer, including constraint violations.
    #[error("storage failure: {0}")]
    Storage(#[from] sqlx::Error),
}

pub type UserResult<T> = Result<T, UserError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_api_wording() {
        assert_eq!(UserError::InvalidUserId.to_string(), "invalid user ID");
        assert_eq!(UserError::DuplicateEmail.to_string(), "email already exists");
        assert_eq!(UserError::UserNotFound.to_string(), "user not found");
    }

    #[test]
    fn storage_wraps_sqlx_error() {
        let err: UserError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, UserError::Storage(_)));
        assert!(err.to_string().starts_with("storage failure"));
    }
}
