//! Row-source contract.
//!
//! Every grid is fed by a REST endpoint that answers with either a bare row
//! array or a `{count, list}` envelope. The grid only cares about the rows and
//! the total count; transport is the host's business.

use serde::{Deserialize, Serialize};

use crate::value::Row;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestOptions {
    #[serde(default)]
    pub method: HttpMethod,
}

/// `{endpoint, options: {method}}` descriptor handed to the request layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSource {
    pub endpoint: String,
    #[serde(default)]
    pub options: RequestOptions,
}

impl DataSource {
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            options: RequestOptions::default(),
        }
    }

    pub fn with_method(endpoint: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            endpoint: endpoint.into(),
            options: RequestOptions { method },
        }
    }
}

/// Response body of a row source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowsPayload {
    Paged { count: usize, list: Vec<Row> },
    List(Vec<Row>),
}

/// Rows plus the total the backend reports.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowPage {
    pub rows: Vec<Row>,
    pub total: usize,
}

impl RowsPayload {
    pub fn into_page(self) -> RowPage {
        match self {
            Self::Paged { count, list } => RowPage {
                rows: list,
                total: count,
            },
            Self::List(rows) => RowPage {
                total: rows.len(),
                rows,
            },
        }
    }
}
