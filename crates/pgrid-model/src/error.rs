use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("column field must not be empty")]
    EmptyField,
    #[error("duplicate column field `{0}`")]
    DuplicateField(String),
    #[error("unknown column field `{0}`")]
    UnknownField(String),
    #[error("unknown filter operator `{0}`")]
    UnknownOperator(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
