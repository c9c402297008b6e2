//! Grid representation of a backup: typed cells, the fixed tab layout, and
//! the codecs between records and rows.

pub mod schema;

mod cell;
mod decode;
mod encode;

pub use cell::{Cell, Grid};
pub use decode::{decode_workbook, from_rows, rows_to_object};
pub use encode::{encode_workbook, object_to_rows, to_rows};
