//! Word card placement on the stage.
//!
//! The usable region (stage minus half a card on every side) is split into a
//! grid matching its aspect ratio. Cards take random cells and are jittered by
//! up to a quarter cell, so they never leave their cell and rarely touch.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::engine::models::{StageSize, WordPosition};

pub const CARD_WIDTH: f64 = 192.0;
pub const CARD_HEIGHT: f64 = 144.0;
pub const MAX_ROTATION_DEG: f64 = 10.0;
/// Jitter as a fraction of the cell size, each way.
const JITTER: f64 = 0.25;

/// Grid dimensions (rows, cols) with at least `count` cells for a region of
/// the given aspect ratio (width / height).
pub fn grid_dimensions(count: usize, aspect: f64) -> (usize, usize) {
    if count == 0 {
        return (0, 0);
    }
    let aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 };
    let mut cols = ((count as f64 * aspect).sqrt().round() as usize).clamp(1, count);
    let mut rows = ((count as f64 / cols as f64).ceil() as usize).max(1);
    while rows * cols < count {
        if cols as f64 / rows as f64 <= aspect {
            cols += 1;
        } else {
            rows += 1;
        }
    }
    (rows, cols)
}

/// One axis of the usable region: (start, length). Collapses onto the centre
/// line when the stage is smaller than a card.
fn usable_axis(stage: f64, card: f64) -> (f64, f64) {
    let half = card / 2.0;
    if stage >= card {
        (half, stage - card)
    } else {
        (stage.max(0.0) / 2.0, 0.0)
    }
}

/// `count` positions with unset `word_id`; callers pair them with words by index.
pub fn generate_positions(count: usize, stage: StageSize, rng: &mut StdRng) -> Vec<WordPosition> {
    if count == 0 {
        return Vec::new();
    }
    let (left, width) = usable_axis(stage.width, CARD_WIDTH);
    let (top, height) = usable_axis(stage.height, CARD_HEIGHT);
    let aspect = if height > 0.0 { width / height } else { 1.0 };
    let (rows, cols) = grid_dimensions(count, aspect);
    let cell_w = width / cols as f64;
    let cell_h = height / rows as f64;

    let mut cells: Vec<usize> = (0..rows * cols).collect();
    cells.shuffle(rng);

    cells
        .into_iter()
        .take(count)
        .map(|cell| {
            let (row, col) = (cell / cols, cell % cols);
            let jx = rng.gen_range(-JITTER..=JITTER) * cell_w;
            let jy = rng.gen_range(-JITTER..=JITTER) * cell_h;
            WordPosition {
                word_id: String::new(),
                x: left + (col as f64 + 0.5) * cell_w + jx,
                y: top + (row as f64 + 0.5) * cell_h + jy,
                rotation: rng.gen_range(-MAX_ROTATION_DEG..=MAX_ROTATION_DEG),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_grid_has_capacity() {
        for count in 1..=20 {
            for aspect in [0.2, 0.5, 1.0, 608.0 / 256.0, 4.0, 10.0] {
                let (rows, cols) = grid_dimensions(count, aspect);
                assert!(rows * cols >= count, "count={} aspect={}", count, aspect);
            }
        }
        assert_eq!(grid_dimensions(0, 2.0), (0, 0));
        // Wide regions get more columns than rows.
        let (rows, cols) = grid_dimensions(6, 608.0 / 256.0);
        assert!(cols > rows);
    }

    #[test]
    fn test_five_cards_inside_default_stage() {
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let positions = generate_positions(5, StageSize { width: 800.0, height: 400.0 }, &mut rng);
            assert_eq!(positions.len(), 5);
            for p in &positions {
                assert!((96.0..=704.0).contains(&p.x), "x={} seed={}", p.x, seed);
                assert!((72.0..=328.0).contains(&p.y), "y={} seed={}", p.y, seed);
                assert!((-10.0..=10.0).contains(&p.rotation));
                assert!(p.word_id.is_empty());
            }
        }
    }

    #[test]
    fn test_cards_use_distinct_cells() {
        let stage = StageSize::default();
        let mut rng = StdRng::seed_from_u64(11);
        let positions = generate_positions(8, stage, &mut rng);
        let (rows, cols) = grid_dimensions(8, 608.0 / 256.0);
        let cell_w = 608.0 / cols as f64;
        let cell_h = 256.0 / rows as f64;
        let mut cells: Vec<(usize, usize)> = positions
            .iter()
            .map(|p| (((p.y - 72.0) / cell_h) as usize, ((p.x - 96.0) / cell_w) as usize))
            .collect();
        cells.sort();
        cells.dedup();
        assert_eq!(cells.len(), 8);
    }

    #[test]
    fn test_tiny_stage_collapses_to_centre() {
        let mut rng = StdRng::seed_from_u64(1);
        let positions = generate_positions(3, StageSize { width: 100.0, height: 50.0 }, &mut rng);
        for p in positions {
            assert_eq!(p.x, 50.0);
            assert_eq!(p.y, 25.0);
        }
        assert!(generate_positions(0, StageSize::default(), &mut rng).is_empty());
    }
}
