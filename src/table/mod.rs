mod crs;
mod table;
mod value;

pub use crs::Crs;
pub use table::{GeoTable, Record};
pub(crate) use table::TableBuilder;
pub use value::Value;
