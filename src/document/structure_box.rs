use serde::{Deserialize, Serialize};

use crate::document::bounds::Bounds;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureKind {
    Table = 0,
    Column = 1,
    Row = 2,
    ColumnHeader = 3,
    ProjectedRow = 4,
    SpanningCell = 5,
    NoObject = 6,
}

impl StructureKind {
    pub fn from_id(id: usize) -> Option<Self> {
        match id {
            0 => Some(Self::Table),
            1 => Some(Self::Column),
            2 => Some(Self::Row),
            3 => Some(Self::ColumnHeader),
            4 => Some(Self::ProjectedRow),
            5 => Some(Self::SpanningCell),
            6 => Some(Self::NoObject),
            _ => None,
        }
    }

    pub fn id(self) -> usize {
        self as usize
    }
}

/// A raw detector output, before label decoding and confidence filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub confidence: f64,
    pub label: usize,
    pub bbox: Bounds,
}

/// A decoded structural element (row, column, header, span, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureBox {
    pub confidence: f64,
    pub kind: StructureKind,
    pub bounds: Bounds,
}

impl StructureBox {
    pub fn new(confidence: f64, kind: StructureKind, bounds: Bounds) -> Self {
        Self {
            confidence,
            kind,
            bounds,
        }
    }

    /// Boxes created by the assembler itself (gap rows, recovered rows,
    /// header rows) carry full confidence.
    pub fn synthetic(kind: StructureKind, bounds: Bounds) -> Self {
        Self::new(1.0, kind, bounds)
    }

    pub fn from_prediction(prediction: &Prediction) -> Option<Self> {
        StructureKind::from_id(prediction.label)
            .map(|kind| Self::new(prediction.confidence, kind, prediction.bbox))
    }
}
