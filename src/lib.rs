pub mod document;
pub mod utils;

pub use document::{
    AssembledTable, AssemblyError, Bounds, CellMerger, ColumnLabels, Grid, MergeFlags, MergeKind,
    OutlierValue, Outliers, Partitions, Prediction, RowRole, SpanCategory, StructureBox,
    StructureKind, TableAssembler, TableInput, Word, WordPosition,
};
pub use utils::{AssemblyConfig, ConfidenceThresholds, ConfigError, IntervalHistogram, LeftFillStrategy};
