//! Grid packing shared by the inferred event region and the entity regions.

use crate::geom::{Point, Size, point, size};

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub id: String,
    pub row: usize,
    pub col: usize,
    pub size: Size,
}

/// Top-left positions relative to the packed block, plus the block size.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Packed {
    pub positions: Vec<(String, Point)>,
    pub size: Size,
}

/// Assigns grid cells to linearized components.
///
/// Each component takes consecutive cells of one row, placed in the first row (scanning from
/// the top) with enough free cells; rows are added as needed. Components longer than a row are
/// split into row-sized chunks.
pub fn first_fit(components: &[Vec<String>], columns: usize) -> Vec<(String, usize, usize)> {
    let columns = columns.max(1);
    let mut fill: Vec<usize> = Vec::new();
    let mut out: Vec<(String, usize, usize)> = Vec::new();

    for component in components {
        for chunk in component.chunks(columns) {
            let row = match fill.iter().position(|used| columns - used >= chunk.len()) {
                Some(row) => row,
                None => {
                    fill.push(0);
                    fill.len() - 1
                }
            };
            let start = fill[row];
            for (i, id) in chunk.iter().enumerate() {
                out.push((id.clone(), row, start + i));
            }
            fill[row] += chunk.len();
        }
    }
    out
}

/// Number of items that fit in one row of `available` width, at least one.
pub fn greedy_columns<I>(widths: I, gap: f64, available: f64) -> usize
where
    I: IntoIterator<Item = f64>,
{
    let mut running = 0.0;
    let mut count = 0usize;
    for w in widths {
        let next = if count == 0 { w } else { running + gap + w };
        if count > 0 && next > available {
            break;
        }
        running = next;
        count += 1;
    }
    count.max(1)
}

/// Row-major cells for `n` items in `columns` columns.
pub fn row_major(n: usize, columns: usize) -> impl Iterator<Item = (usize, usize)> {
    let columns = columns.max(1);
    (0..n).map(move |i| (i / columns, i % columns))
}

/// Places cells with each column as wide as its widest cell and each row as tall as its
/// tallest cell.
pub fn grid(cells: &[Cell], gap: f64) -> Packed {
    if cells.is_empty() {
        return Packed::default();
    }
    let cols = cells.iter().map(|c| c.col + 1).max().unwrap_or(0);
    let rows = cells.iter().map(|c| c.row + 1).max().unwrap_or(0);
    let mut col_w = vec![0.0_f64; cols];
    let mut row_h = vec![0.0_f64; rows];
    for c in cells {
        col_w[c.col] = col_w[c.col].max(c.size.width);
        row_h[c.row] = row_h[c.row].max(c.size.height);
    }

    let offsets = |extents: &[f64]| -> Vec<f64> {
        let mut acc = 0.0;
        extents
            .iter()
            .map(|e| {
                let at = acc;
                acc += e + gap;
                at
            })
            .collect()
    };
    let col_x = offsets(&col_w);
    let row_y = offsets(&row_h);

    let total = |extents: &[f64]| extents.iter().sum::<f64>() + gap * (extents.len() as f64 - 1.0);
    Packed {
        positions: cells
            .iter()
            .map(|c| (c.id.clone(), point(col_x[c.col], row_y[c.row])))
            .collect(),
        size: size(total(&col_w), total(&row_h)),
    }
}
