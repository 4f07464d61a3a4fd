pub mod assembly;
pub mod bounds;
pub mod error;
pub mod grid;
pub mod merger;
pub mod outliers;
pub mod partitions;
pub mod structure_box;
pub mod table;
pub mod word;

pub use assembly::{RowRole, TableAssembler};
pub use bounds::Bounds;
pub use error::AssemblyError;
pub use grid::Grid;
pub use merger::{CellMerger, MergeFlags, MergeKind, SpanCategory};
pub use outliers::{OutlierValue, Outliers};
pub use partitions::Partitions;
pub use structure_box::{Prediction, StructureBox, StructureKind};
pub use table::{AssembledTable, ColumnLabels, TableInput};
pub use word::{Word, WordPosition};
