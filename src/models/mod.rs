pub mod cell;
pub mod rows;
pub mod series;

pub use cell::Cell;
pub use rows::{FactRow, MetaRow, QualityFlag};
pub use series::SeriesId;
