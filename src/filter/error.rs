use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid pagination: {0}")]
    InvalidPagination(String),

    #[error("Invalid filter value: {0}")]
    InvalidValue(String),

    #[error("{query} query references {placeholders} placeholders but binds {params} parameters")]
    ParameterMismatch {
        query: &'static str,
        placeholders: usize,
        params: usize,
    },
}
