//! Scanline run-merge: covers every foreground pixel of a mask with
//! axis-aligned rectangles, merging column-aligned runs across rows.

use rectcast_types::{Mask, Rect};

/// Converts a mask into an ordered rectangle cover.
///
/// Rows are processed top to bottom, columns left to right. Consecutive
/// foreground columns form a run; a run whose start column and width exactly
/// match the rectangle open at that column extends it downward by one row,
/// anything else closes the stale entry and opens a fresh one-row rectangle.
/// The active-column array holds at most one open rectangle index per column,
/// so the pass is O(H*W) time with O(W) auxiliary state.
///
/// Output order is creation order, not spatial order. Rectangles are
/// committed to the list when opened and mutated in place on extension, so no
/// flush step is needed at the end of the mask.
///
/// A run that merely overlaps an open rectangle never partially merges; the
/// cover is deterministic but not globally minimal. The welder upstream is
/// what keeps fragmentation in check.
pub fn extract(mask: &Mask) -> Vec<Rect> {
    let width = mask.width() as usize;
    let height = mask.height();

    let mut rects: Vec<Rect> = Vec::new();
    let mut active: Vec<Option<usize>> = vec![None; width];

    for y in 0..height {
        let mut x = 0usize;
        while x < width {
            if !mask.get(x as u32, y) {
                active[x] = None;
                x += 1;
                continue;
            }

            let start_x = x;
            while x < width && mask.get(x as u32, y) {
                // Interior columns of the run cannot anchor a rectangle.
                if x > start_x {
                    active[x] = None;
                }
                x += 1;
            }
            let run_width = (x - start_x) as u32;

            let mut merged = false;
            if let Some(idx) = active[start_x] {
                let open = &mut rects[idx];
                if open.x == start_x as u32 && open.width == run_width {
                    open.height += 1;
                    merged = true;
                } else {
                    active[start_x] = None;
                }
            }

            if !merged {
                active[start_x] = Some(rects.len());
                rects.push(Rect::new(start_x as u32, y, run_width, 1));
            }
        }
    }

    rects
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_from_rows(rows: &[&str]) -> Mask {
        let height = rows.len() as u32;
        let width = rows.first().map(|r| r.len()).unwrap_or(0) as u32;
        let mut mask = Mask::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                mask.set(x as u32, y as u32, ch == '#');
            }
        }
        mask
    }

    fn covers(rects: &[Rect], x: u32, y: u32) -> bool {
        rects.iter().any(|r| {
            x >= r.x && x < r.x + r.width && y >= r.y && y < r.y + r.height
        })
    }

    fn assert_exact_cover(mask: &Mask, rects: &[Rect]) {
        for y in 0..mask.height() {
            for x in 0..mask.width() {
                assert_eq!(
                    covers(rects, x, y),
                    mask.get(x, y),
                    "coverage mismatch at ({x}, {y})"
                );
            }
        }
    }

    #[test]
    fn all_background_yields_no_rectangles() {
        let mask = Mask::new(16, 9);
        assert!(extract(&mask).is_empty());
    }

    #[test]
    fn single_pixel_at_origin() {
        let mut mask = Mask::new(8, 8);
        mask.set(0, 0, true);
        assert_eq!(extract(&mask), vec![Rect::new(0, 0, 1, 1)]);
    }

    #[test]
    fn stacked_identical_runs_merge_vertically() {
        let mask = mask_from_rows(&[
            "...#####..",
            "...#####..",
        ]);
        assert_eq!(extract(&mask), vec![Rect::new(3, 0, 5, 2)]);
    }

    #[test]
    fn full_mask_is_one_rectangle() {
        let mask = mask_from_rows(&["####", "####", "####"]);
        assert_eq!(extract(&mask), vec![Rect::new(0, 0, 4, 3)]);
    }

    #[test]
    fn overlapping_but_unequal_runs_do_not_merge() {
        let mask = mask_from_rows(&[
            ".####.",
            ".###..",
        ]);
        let rects = extract(&mask);
        assert_eq!(rects, vec![Rect::new(1, 0, 4, 1), Rect::new(1, 1, 3, 1)]);
        assert_exact_cover(&mask, &rects);
    }

    #[test]
    fn shifted_run_starts_a_new_rectangle() {
        let mask = mask_from_rows(&[
            "###...",
            "...###",
        ]);
        let rects = extract(&mask);
        assert_eq!(rects, vec![Rect::new(0, 0, 3, 1), Rect::new(3, 1, 3, 1)]);
    }

    #[test]
    fn gap_row_breaks_the_merge_chain() {
        let mask = mask_from_rows(&[
            "##",
            "..",
            "##",
        ]);
        let rects = extract(&mask);
        assert_eq!(rects, vec![Rect::new(0, 0, 2, 1), Rect::new(0, 2, 2, 1)]);
    }

    #[test]
    fn two_separate_columns_stay_separate() {
        let mask = mask_from_rows(&[
            "#.#",
            "#.#",
            "#.#",
        ]);
        let rects = extract(&mask);
        assert_eq!(rects, vec![Rect::new(0, 0, 1, 3), Rect::new(2, 0, 1, 3)]);
    }

    #[test]
    fn run_growing_into_previous_interior_reopens() {
        // Row 0 has one wide run; row 1 splits it. Neither fragment may
        // extend the wide rectangle.
        let mask = mask_from_rows(&[
            "#####",
            "##.##",
        ]);
        let rects = extract(&mask);
        assert_eq!(
            rects,
            vec![
                Rect::new(0, 0, 5, 1),
                Rect::new(0, 1, 2, 1),
                Rect::new(3, 1, 2, 1),
            ]
        );
        assert_exact_cover(&mask, &rects);
    }

    #[test]
    fn random_masks_are_exactly_covered_without_degenerate_rects() {
        let mut state = 0x2545f491_4f6c_dd1du64;
        let mut next = move || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state
        };
        for round in 0..50 {
            let width = 1 + (next() % 24) as u32;
            let height = 1 + (next() % 24) as u32;
            let mut mask = Mask::new(width, height);
            for y in 0..height {
                for x in 0..width {
                    mask.set(x, y, next() % 3 == 0);
                }
            }
            let rects = extract(&mask);
            for rect in &rects {
                assert!(rect.width >= 1 && rect.height >= 1, "round {round}");
                assert!(!rect.is_sentinel());
            }
            assert_exact_cover(&mask, &rects);
        }
    }
}
