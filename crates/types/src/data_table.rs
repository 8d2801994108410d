//! Data table rows, whose cells are keyed by column handle.

use crate::Handle;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DataTableCellDataDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Handle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DataTableRowDataDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Cells keyed by column; written by column name when any column has one.
    #[serde(default, with = "crate::handle_map")]
    pub cells: BTreeMap<Handle, DataTableCellDataDto>,
}

impl DataTableRowDataDto {
    pub fn cell(&self, column: &Handle) -> Option<&DataTableCellDataDto> {
        self.cells.get(column)
    }
}
