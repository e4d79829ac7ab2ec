//! Material purchase suggestions for an estimate

use renocost_types::{round2, CostBreakdown, MaterialQuantity};

use crate::model::TilingRates;

/// Paint can sizes in litres, largest first
pub const PAINT_CAN_SIZES: [u32; 3] = [10, 4, 1];

/// Split a paint volume into cans, largest first.
///
/// Any remainder smaller than the smallest can costs one more small can.
/// Returns `(can_size_litres, count)` pairs with non-zero counts.
pub fn paint_cans(litres: f64) -> Vec<(u32, u64)> {
    let mut cans: Vec<(u32, u64)> = Vec::new();
    if litres <= 0.0 {
        return cans;
    }

    let mut needed = litres;
    for size in PAINT_CAN_SIZES {
        let count = (needed / size as f64).floor() as u64;
        if count > 0 {
            cans.push((size, count));
            needed = round2(needed - count as f64 * size as f64).max(0.0);
        }
    }

    if needed > 0.0 {
        match cans.iter_mut().find(|(size, _)| *size == 1) {
            Some((_, count)) => *count += 1,
            None => cans.push((1, 1)),
        }
    }

    cans
}

/// Number of tile boxes needed to cover an area
pub fn tile_boxes(area_m2: f64, box_coverage_m2: f64) -> u64 {
    if area_m2 <= 0.0 || box_coverage_m2 <= 0.0 {
        return 0;
    }
    ((area_m2 / box_coverage_m2) - 1e-9).ceil().max(1.0) as u64
}

/// Human-readable purchase suggestion for a heuristic breakdown
pub fn purchase_suggestion(breakdown: &CostBreakdown, tiling: &TilingRates) -> String {
    match breakdown.quantity {
        MaterialQuantity::PaintLitres(litres) => {
            if litres <= 0.0 {
                return "No paint required for 0 area.".to_string();
            }
            let parts: Vec<String> = paint_cans(litres)
                .into_iter()
                .map(|(size, count)| format!("{}×{}L", count, size))
                .collect();
            format!(
                "Purchase suggestion (paint): {}  (approx. {} L required)",
                parts.join(", "),
                litres
            )
        }
        MaterialQuantity::TileArea(area) => {
            if area <= 0.0 {
                return "No tiles required for 0 area.".to_string();
            }
            let boxes = tile_boxes(area, tiling.box_coverage_m2);
            format!(
                "Purchase suggestion (tiles): {} boxes (covering ~{} m²) for required {} m²",
                boxes,
                round2(boxes as f64 * tiling.box_coverage_m2),
                area
            )
        }
        MaterialQuantity::PlumbingPoints(points) => format!(
            "Purchase suggestion (plumbing): Basic parts for {} connection point(s).",
            points
        ),
        MaterialQuantity::GenericArea(area) => format!(
            "Material suggestion: Approx. material for {} m² (use local supplier rates).",
            area
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paint_cans_exact() {
        assert_eq!(paint_cans(110.0), vec![(10, 11)]);
    }

    #[test]
    fn test_paint_cans_with_remainder() {
        // 7.5 L: one 4 L can, three 1 L cans, plus one more for the half litre
        assert_eq!(paint_cans(7.5), vec![(4, 1), (1, 4)]);
    }

    #[test]
    fn test_paint_cans_small_volume() {
        assert_eq!(paint_cans(0.4), vec![(1, 1)]);
        assert!(paint_cans(0.0).is_empty());
    }

    #[test]
    fn test_paint_cans_huge_volume() {
        // 2e10 m² of wall
        let cans = paint_cans(4.4e9);
        assert_eq!(cans[0], (10, 440_000_000));
        assert!(cans.iter().all(|(_, count)| *count > 0));
    }

    #[test]
    fn test_tile_boxes_round_up() {
        assert_eq!(tile_boxes(10.5, 1.2), 9);
        assert_eq!(tile_boxes(12.0, 1.2), 10);
        assert_eq!(tile_boxes(0.0, 1.2), 0);
    }

    #[test]
    fn test_suggestion_text() {
        let breakdown = CostBreakdown {
            material: 0.0,
            labour: 1100.0,
            total: 1100.0,
            quantity: MaterialQuantity::PlumbingPoints(2),
        };
        let text = purchase_suggestion(&breakdown, &TilingRates::default());
        assert!(text.contains("2 connection point(s)"));
    }
}
