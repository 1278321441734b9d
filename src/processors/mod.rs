pub mod converter;
pub mod inspector;
pub mod meta_resolver;
pub mod row_generator;
pub mod value_splitter;

pub use converter::{Converter, LoadReport};
pub use inspector::{DirectoryInspector, InputSummary};
pub use meta_resolver::MetaLookup;
pub use row_generator::{FactRows, GenerationStats, MetaRows, RowGenerator};
pub use value_splitter::{split_series, CellKind, SplitSeries};
