use crate::models::ItemId;

/// Grid cells an item occupies, derived from its effective aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub columns: usize,
    pub rows: usize,
}

impl Span {
    pub const UNIT: Span = Span {
        columns: 1,
        rows: 1,
    };
}

/// Where one item lands in the grid. Offsets are zero-based unit rows/columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub id: ItemId,
    pub row_start: usize,
    pub row_span: usize,
    pub col_start: usize,
    pub col_span: usize,
}

impl Placement {
    /// CSS `grid-area` shorthand using one-based grid lines.
    pub fn grid_area(&self) -> String {
        format!(
            "{} / {} / span {} / span {}",
            self.row_start + 1,
            self.col_start + 1,
            self.row_span,
            self.col_span
        )
    }

    pub fn col_end(&self) -> usize {
        self.col_start + self.col_span
    }
}

/// A packed row. Indices refer to the item slice the layout was computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridRow {
    pub row_index: usize,
    /// First unit row this packed row occupies.
    pub unit_offset: usize,
    pub height_units: usize,
    pub used_columns: usize,
    /// Start index in the items slice (inclusive)
    pub start_index: usize,
    /// End index in the items slice (exclusive)
    pub end_index: usize,
}

impl GridRow {
    pub fn len(&self) -> usize {
        self.end_index - self.start_index
    }

    pub fn is_empty(&self) -> bool {
        self.start_index == self.end_index
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    pub column_count: usize,
    /// One entry per unit row, in pixels.
    pub row_heights: Vec<f32>,
    /// Aligned with the input items by index.
    pub placements: Vec<Placement>,
    pub rows: Vec<GridRow>,
}

impl GridLayout {
    pub fn empty(column_count: usize) -> Self {
        Self {
            column_count,
            row_heights: Vec::new(),
            placements: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn unit_rows(&self) -> usize {
        self.row_heights.len()
    }

    /// Total height of the grid including `row_gap` between unit rows.
    pub fn total_height(&self, row_gap: f32) -> f32 {
        if self.row_heights.is_empty() {
            return 0.0;
        }
        let heights_sum: f32 = self.row_heights.iter().sum();
        let gaps_sum = (self.row_heights.len() - 1) as f32 * row_gap;
        heights_sum + gaps_sum
    }

    pub fn placement_for(&self, id: &ItemId) -> Option<&Placement> {
        self.placements.iter().find(|p| &p.id == id)
    }
}
