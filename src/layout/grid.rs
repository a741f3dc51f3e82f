use crate::models::{AspectRatioStore, GalleryItem, GridLayout, GridRow, Placement, Span};

/// Aspect ratio thresholds that widen or heighten a tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpanRules {
    /// Ratios at or above this take two columns (default: 1.3)
    pub wide_ratio: f64,
    /// Ratios at or below this take two unit rows (default: 0.75)
    pub tall_ratio: f64,
}

impl Default for SpanRules {
    fn default() -> Self {
        Self {
            wide_ratio: 1.3,
            tall_ratio: 0.75,
        }
    }
}

impl SpanRules {
    pub fn span_for(&self, ratio: f64, column_count: usize) -> Span {
        let columns = if ratio >= self.wide_ratio { 2 } else { 1 };
        let rows = if ratio <= self.tall_ratio { 2 } else { 1 };
        Span {
            columns: columns.min(column_count.max(1)),
            rows,
        }
    }
}

/// Greedy, order-preserving grid packer.
///
/// Items are placed left-to-right into the current row while they fit; an item that
/// does not fit closes the row and starts the next one. Nothing is reordered and there
/// is no lookahead, so any ratio change may shift every later row and the whole grid
/// is always recomputed.
#[derive(Debug, Clone)]
pub struct GridLayoutEngine {
    /// Height of one unit row in pixels (default: 150)
    pub base_row_unit: f32,
    pub rules: SpanRules,
}

impl Default for GridLayoutEngine {
    fn default() -> Self {
        Self {
            base_row_unit: 150.0,
            rules: SpanRules::default(),
        }
    }
}

impl GridLayoutEngine {
    pub fn new(base_row_unit: f32, rules: SpanRules) -> Self {
        Self {
            base_row_unit: base_row_unit.max(1.0),
            rules,
        }
    }

    /// Measured ratio, then the designer fallback, then square.
    pub fn effective_ratio(item: &GalleryItem, ratios: &AspectRatioStore) -> f64 {
        ratios
            .ratio_for(&item.id)
            .or_else(|| item.fallback_ratio())
            .unwrap_or(1.0)
    }

    pub fn span_for(
        &self,
        item: &GalleryItem,
        ratios: &AspectRatioStore,
        column_count: usize,
    ) -> Span {
        self.rules
            .span_for(Self::effective_ratio(item, ratios), column_count)
    }

    /// Packs `items` into `column_count` columns.
    ///
    /// # Algorithm
    /// 1. Derive each item's span from its effective ratio, clamped to the column count.
    /// 2. Close the current row when the span overflows the remaining columns.
    /// 3. A row is as tall as its tallest member; `row_start` is the unit-row offset.
    ///
    /// # Returns
    /// A layout with one placement per item (aligned by index) and one pixel height per
    /// unit row. A zero column count is treated as one.
    pub fn compute(
        &self,
        column_count: usize,
        items: &[GalleryItem],
        ratios: &AspectRatioStore,
    ) -> GridLayout {
        let column_count = column_count.max(1);
        if items.is_empty() {
            return GridLayout::empty(column_count);
        }

        let mut rows: Vec<GridRow> = Vec::new();
        let mut placements = Vec::with_capacity(items.len());
        let mut unit_offset = 0usize;
        let mut row_start_index = 0usize;
        let mut used_columns = 0usize;
        let mut row_height = 0usize;

        for (index, item) in items.iter().enumerate() {
            let span = self.span_for(item, ratios, column_count);

            // An empty row always accepts the item, even if it were somehow too wide.
            if used_columns > 0 && used_columns + span.columns > column_count {
                rows.push(GridRow {
                    row_index: rows.len(),
                    unit_offset,
                    height_units: row_height,
                    used_columns,
                    start_index: row_start_index,
                    end_index: index,
                });
                unit_offset += row_height;
                row_start_index = index;
                used_columns = 0;
                row_height = 0;
            }

            placements.push(Placement {
                id: item.id.clone(),
                row_start: unit_offset,
                row_span: span.rows,
                col_start: used_columns,
                col_span: span.columns,
            });
            used_columns += span.columns;
            row_height = row_height.max(span.rows);
        }

        rows.push(GridRow {
            row_index: rows.len(),
            unit_offset,
            height_units: row_height,
            used_columns,
            start_index: row_start_index,
            end_index: items.len(),
        });

        let unit_rows = unit_offset + row_height;
        GridLayout {
            column_count,
            row_heights: vec![self.base_row_unit; unit_rows],
            placements,
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemId;
    use proptest::prelude::*;

    fn make_item(id: &str, ratio: Option<f64>) -> GalleryItem {
        let item = GalleryItem::new(id, id, format!("/images/{}.jpg", id));
        match ratio {
            Some(r) => item.with_aspect_ratio(r),
            None => item,
        }
    }

    fn squares(n: usize) -> Vec<GalleryItem> {
        (0..n).map(|i| make_item(&format!("sq{}", i), None)).collect()
    }

    fn assert_invariants(layout: &GridLayout, items: &[GalleryItem]) {
        assert_eq!(layout.placements.len(), items.len());
        for (placement, item) in layout.placements.iter().zip(items) {
            assert_eq!(placement.id, item.id);
            assert!(placement.col_end() <= layout.column_count);
            assert!(placement.row_start + placement.row_span <= layout.unit_rows());
        }

        let mut covered = 0;
        for row in &layout.rows {
            assert_eq!(row.start_index, covered, "rows must be contiguous");
            covered = row.end_index;
            assert!(!row.is_empty());

            let members = &layout.placements[row.start_index..row.end_index];
            let used: usize = members.iter().map(|p| p.col_span).sum();
            assert_eq!(used, row.used_columns);
            assert!(used <= layout.column_count, "row over capacity");

            let mut next_col = 0;
            for p in members {
                assert_eq!(p.col_start, next_col, "columns overlap or gap");
                assert_eq!(p.row_start, row.unit_offset);
                next_col = p.col_end();
            }
            let tallest = members.iter().map(|p| p.row_span).max().unwrap();
            assert_eq!(row.height_units, tallest);
        }
        assert_eq!(covered, items.len());
    }

    #[test]
    fn test_empty_items() {
        let engine = GridLayoutEngine::default();
        let layout = engine.compute(3, &[], &AspectRatioStore::new());
        assert!(layout.placements.is_empty());
        assert!(layout.rows.is_empty());
        assert!(layout.row_heights.is_empty());
        assert_eq!(layout.total_height(24.0), 0.0);
    }

    #[test]
    fn test_three_squares_two_columns() {
        let engine = GridLayoutEngine::default();
        let items = squares(3);
        let layout = engine.compute(2, &items, &AspectRatioStore::new());

        assert_eq!(layout.rows.len(), 2);
        assert_eq!((layout.rows[0].start_index, layout.rows[0].end_index), (0, 2));
        assert_eq!((layout.rows[1].start_index, layout.rows[1].end_index), (2, 3));

        let third = &layout.placements[2];
        assert_eq!(third.col_start, 0);
        assert_eq!(third.row_start, 1);
        assert_eq!(third.grid_area(), "2 / 1 / span 1 / span 1");
        assert_eq!(layout.row_heights, vec![150.0, 150.0]);
    }

    #[test]
    fn test_wide_item_fills_row() {
        let engine = GridLayoutEngine::default();
        let items = vec![make_item("wide", Some(2.0)), make_item("sq", None)];
        let layout = engine.compute(2, &items, &AspectRatioStore::new());

        assert_eq!(layout.rows.len(), 2);
        assert_eq!(layout.rows[0].len(), 1);
        assert_eq!(layout.placements[0].col_span, 2);
        assert_eq!(layout.placements[1].row_start, 1);
        assert_eq!(layout.placements[1].col_start, 0);
    }

    #[test]
    fn test_tall_item_doubles_row_height() {
        let engine = GridLayoutEngine::default();
        let items = vec![make_item("tall", None), make_item("a", None), make_item("b", None)];
        let mut ratios = AspectRatioStore::new();
        ratios.record_measurement(&ItemId::new("tall"), 500.0, 1000.0);

        let layout = engine.compute(3, &items, &ratios);

        assert_eq!(layout.rows.len(), 1);
        assert_eq!(layout.rows[0].height_units, 2);
        assert_eq!(layout.placements[0].row_span, 2);
        assert_eq!(layout.placements[1].col_start, 1);
        assert_eq!(layout.placements[2].col_start, 2);
        assert_eq!(layout.row_heights, vec![150.0, 150.0]);
        assert_eq!(layout.total_height(10.0), 310.0);
    }

    #[test]
    fn test_row_start_counts_unit_rows() {
        let engine = GridLayoutEngine::default();
        // Tall row (2 units) followed by a square on the next row
        let items = vec![make_item("tall", Some(0.5)), make_item("wide", Some(2.0))];
        let layout = engine.compute(2, &items, &AspectRatioStore::new());

        assert_eq!(layout.rows.len(), 2);
        assert_eq!(layout.placements[1].row_start, 2);
        assert_eq!(layout.unit_rows(), 3);
    }

    #[test]
    fn test_single_column_clamps_wide_items() {
        let engine = GridLayoutEngine::default();
        let items = vec![make_item("wide", Some(3.0)), make_item("sq", None)];
        let layout = engine.compute(1, &items, &AspectRatioStore::new());

        assert!(layout.placements.iter().all(|p| p.col_span == 1));
        assert_eq!(layout.rows.len(), 2);
        assert_invariants(&layout, &items);
    }

    #[test]
    fn test_zero_columns_treated_as_one() {
        let engine = GridLayoutEngine::default();
        let items = squares(2);
        let layout = engine.compute(0, &items, &AspectRatioStore::new());
        assert_eq!(layout.column_count, 1);
        assert_invariants(&layout, &items);
    }

    #[test]
    fn test_measured_ratio_overrides_fallback() {
        let engine = GridLayoutEngine::default();
        let items = vec![make_item("clip", Some(6.0 / 19.0))];
        let store = AspectRatioStore::new();
        assert_eq!(engine.span_for(&items[0], &store, 2).rows, 2);

        let mut store = AspectRatioStore::new();
        store.record_measurement(&ItemId::new("clip"), 1920.0, 1080.0);
        let span = engine.span_for(&items[0], &store, 2);
        assert_eq!(span, Span { columns: 2, rows: 1 });
    }

    #[test]
    fn test_threshold_boundaries() {
        let rules = SpanRules::default();
        assert_eq!(rules.span_for(1.3, 4), Span { columns: 2, rows: 1 });
        assert_eq!(rules.span_for(1.29, 4), Span::UNIT);
        assert_eq!(rules.span_for(0.75, 4), Span { columns: 1, rows: 2 });
        assert_eq!(rules.span_for(0.76, 4), Span::UNIT);
    }

    #[test]
    fn test_order_is_preserved() {
        let engine = GridLayoutEngine::default();
        // A later square would fit next to the first square, but never jumps ahead.
        let items = vec![
            make_item("a", None),
            make_item("wide", Some(2.0)),
            make_item("b", None),
        ];
        let layout = engine.compute(2, &items, &AspectRatioStore::new());

        assert_eq!(layout.rows.len(), 3);
        assert_eq!(layout.rows[0].used_columns, 1);
        assert_invariants(&layout, &items);
    }

    #[test]
    fn test_invariants_across_mixed_inputs() {
        let engine = GridLayoutEngine::default();
        let pattern = [1.0, 2.0, 0.5, 1.5, 0.3, 1.0, 16.0 / 9.0, 0.75, 1.3, 1.0];
        let items: Vec<GalleryItem> = (0..40)
            .map(|i| make_item(&format!("m{}", i), Some(pattern[(i * 7) % pattern.len()])))
            .collect();

        for columns in 1..=4 {
            let layout = engine.compute(columns, &items, &AspectRatioStore::new());
            assert_invariants(&layout, &items);
        }
    }

    #[test]
    fn test_deterministic() {
        let engine = GridLayoutEngine::default();
        let items: Vec<GalleryItem> = (0..12)
            .map(|i| make_item(&format!("d{}", i), Some(0.4 + i as f64 * 0.2)))
            .collect();
        let mut ratios = AspectRatioStore::new();
        ratios.record_measurement(&ItemId::new("d3"), 400.0, 100.0);

        let first = engine.compute(3, &items, &ratios);
        let second = engine.compute(3, &items, &ratios);
        assert_eq!(first, second);
    }

    #[test]
    fn test_measurement_reflows_later_rows() {
        let engine = GridLayoutEngine::default();
        let items = squares(4);
        let mut ratios = AspectRatioStore::new();
        let before = engine.compute(2, &items, &ratios);
        assert_eq!(before.rows.len(), 2);

        ratios.record_measurement(&ItemId::new("sq1"), 1600.0, 900.0);
        let after = engine.compute(2, &items, &ratios);

        assert_eq!(after.rows.len(), 3);
        assert_eq!(after.placements[1].row_start, 1);
        assert_eq!(after.placements[3].row_start, 2);
        assert_invariants(&after, &items);
    }

    /// Designer fallbacks, including values the engine must ignore.
    fn fallback_strategy() -> impl Strategy<Value = Option<f64>> {
        prop_oneof![
            4 => (0.05f64..8.0).prop_map(Some),
            1 => Just(None),
            1 => prop_oneof![
                Just(f64::NAN),
                Just(0.0),
                Just(-1.5),
                Just(f64::INFINITY),
            ]
            .prop_map(Some),
        ]
    }

    type Inputs = Vec<(Option<f64>, Option<(f64, f64)>)>;

    fn inputs_strategy() -> impl Strategy<Value = Inputs> {
        prop::collection::vec(
            (
                fallback_strategy(),
                proptest::option::of((0.0f64..4000.0, 0.0f64..4000.0)),
            ),
            0..40,
        )
    }

    fn build(inputs: &Inputs) -> (Vec<GalleryItem>, AspectRatioStore) {
        let mut store = AspectRatioStore::new();
        let items = inputs
            .iter()
            .enumerate()
            .map(|(i, (fallback, measured))| {
                let item = make_item(&format!("p{}", i), *fallback);
                if let Some((width, height)) = measured {
                    store.record_measurement(&item.id, *width, *height);
                }
                item
            })
            .collect();
        (items, store)
    }

    proptest! {
        #[test]
        fn test_layout_invariants_hold_for_any_input(
            inputs in inputs_strategy(),
            columns in 0usize..=4,
        ) {
            let (items, store) = build(&inputs);
            let engine = GridLayoutEngine::default();
            let layout = engine.compute(columns, &items, &store);

            prop_assert_eq!(layout.column_count, columns.max(1));
            assert_invariants(&layout, &items);
            for (placement, item) in layout.placements.iter().zip(&items) {
                let span = engine.span_for(item, &store, layout.column_count);
                prop_assert_eq!(placement.col_span, span.columns);
                prop_assert_eq!(placement.row_span, span.rows);
            }
            prop_assert_eq!(&layout, &engine.compute(columns, &items, &store));
        }

        #[test]
        fn test_rows_close_only_on_overflow(
            inputs in inputs_strategy(),
            columns in 1usize..=4,
        ) {
            let (items, store) = build(&inputs);
            let layout = GridLayoutEngine::default().compute(columns, &items, &store);

            // Greedy: the first item of each row would not have fit in the previous one
            for pair in layout.rows.windows(2) {
                let opener = &layout.placements[pair[1].start_index];
                prop_assert!(pair[0].used_columns + opener.col_span > columns);
            }
        }
    }
}
