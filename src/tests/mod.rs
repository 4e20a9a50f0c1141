//! Test suite - one file per subsystem, plus system-level scenarios driven through a bare `World`.

mod brush;
mod heights;
mod picking;
mod rng;
mod settings;
mod systems;

use crate::heights::HeightGrid;

/// Grid from a row-major literal, e.g. `grid(&[&[0, 1], &[2, 3]])`.
pub(crate) fn grid(rows: &[&[i32]]) -> HeightGrid {
    HeightGrid::from_rows(&rows.iter().map(|r| r.to_vec()).collect::<Vec<_>>())
}

/// `rows x cols` grid with every cell at `h`.
pub(crate) fn flat(rows: usize, cols: usize, h: i32) -> HeightGrid {
    let mut g = HeightGrid::new(rows, cols);
    for y in 0..rows as i32 {
        for x in 0..cols as i32 {
            g.set(x, y, h);
        }
    }
    g
}
