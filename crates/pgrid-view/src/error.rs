use pgrid_export::ExportError;
use pgrid_filter::FilterError;
use pgrid_model::ModelError;
use pgrid_state::PersistenceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("unknown column `{0}`")]
    UnknownColumn(String),

    #[error("column `{0}` cannot be hidden")]
    NotHideable(String),

    #[error("extension `{extension}` refers to unknown column `{field}`")]
    UnknownExtensionField {
        extension: &'static str,
        field: String,
    },

    #[error("custom filter `{0}` is not declared")]
    UnknownCustomFilter(String),

    #[error("`{0}` is not one of the custom filter's options")]
    InvalidCustomFilterValue(String),

    #[error("grid has no date range filter")]
    NoDateRange,

    #[error("date range starts after it ends")]
    InvertedDateRange,

    #[error("exports are not available for this grid")]
    ExportsDisabled,
}

pub type Result<T> = std::result::Result<T, ViewError>;
