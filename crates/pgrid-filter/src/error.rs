use pgrid_model::FilterOperator;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("unknown column `{0}`")]
    UnknownColumn(String),
    #[error("column `{0}` is not filterable")]
    NotFilterable(String),
    #[error("grid has no filterable columns")]
    NoFilterableColumns,
    #[error("filter item {0} does not exist")]
    UnknownItem(u64),
    #[error("operator `{operator}` is not available for column `{field}`")]
    OperatorNotAllowed {
        field: String,
        operator: FilterOperator,
    },
    #[error("operator `{0}` takes no value")]
    ValueNotAccepted(FilterOperator),
}

pub type Result<T> = std::result::Result<T, FilterError>;
