pub mod codec;
pub mod data_table;
pub mod error;
pub mod field;
pub mod handle;
pub mod handle_format;
pub mod handle_map;
pub mod incident;
pub mod json;
pub mod method_name;
pub mod session;

#[cfg(test)]
mod tests;

pub use data_table::*;
pub use error::HandleError;
pub use field::*;
pub use handle::Handle;
pub use handle_format::{HandleFormat, HANDLE_FORMAT_HEADER};
pub use handle_map::{KeyStyle, MapOptions};
pub use incident::*;
pub use json::JsonCodec;
pub use method_name::{method_name_map, MethodName};
pub use session::*;
