//! Fallback pricing heuristic
//!
//! Placeholder formulas, linear in area (painting, tiling, other) or in
//! connection points (plumbing). Used whenever no trained model is available
//! for a service.

use renocost_types::{round2, CostBreakdown, Features, MaterialQuantity, ServiceType};

use crate::model::{GenericRates, HeuristicRates, PaintingRates, PlumbingRates, TilingRates};

/// Litres of paint and their cost for a wall area
pub fn paint_estimate(area_m2: f64, rates: &PaintingRates) -> (f64, f64) {
    if area_m2 <= 0.0 || rates.coverage_m2_per_litre <= 0.0 {
        return (0.0, 0.0);
    }
    let litres = (area_m2 / rates.coverage_m2_per_litre) * rates.coats as f64 * (1.0 + rates.wastage);
    (round2(litres), round2(litres * rates.price_per_litre))
}

/// Tile area including wastage and its cost for a floor area
pub fn tiles_estimate(area_m2: f64, rates: &TilingRates) -> (f64, f64) {
    if area_m2 <= 0.0 {
        return (0.0, 0.0);
    }
    let qty = area_m2 * (1.0 + rates.wastage);
    (round2(qty), round2(qty * rates.price_per_m2))
}

/// Callout plus per-point charge; at least one point is always billed
pub fn plumbing_estimate(points: u32, rates: &PlumbingRates) -> f64 {
    let points = points.max(1);
    round2(rates.callout + points as f64 * rates.per_point)
}

/// Labour by area
pub fn area_labour(area_m2: f64, rate_per_m2: f64) -> f64 {
    if area_m2 <= 0.0 {
        return 0.0;
    }
    round2(area_m2 * rate_per_m2)
}

fn generic_estimate(area_m2: f64, rates: &GenericRates) -> (f64, f64) {
    if area_m2 <= 0.0 {
        return (0.0, 0.0);
    }
    (
        round2(area_m2 * rates.material_per_m2),
        area_labour(area_m2, rates.labour_per_m2),
    )
}

/// Price a job with the heuristic rates
pub fn heuristic_breakdown(
    service: ServiceType,
    features: &Features,
    rates: &HeuristicRates,
) -> CostBreakdown {
    let area = features.area();

    let (material, labour, quantity) = match service {
        ServiceType::Painting => {
            let (litres, material) = paint_estimate(area, &rates.painting);
            let labour = area_labour(area, rates.painting.labour_per_m2);
            (material, labour, MaterialQuantity::PaintLitres(litres))
        }
        ServiceType::Tiling => {
            let (qty, material) = tiles_estimate(area, &rates.tiling);
            let labour = area_labour(area, rates.tiling.labour_per_m2);
            (material, labour, MaterialQuantity::TileArea(qty))
        }
        ServiceType::Plumbing => {
            let points = features.points().max(1);
            let total = plumbing_estimate(points, &rates.plumbing);
            (0.0, total, MaterialQuantity::PlumbingPoints(points))
        }
        ServiceType::Other => {
            let (material, labour) = generic_estimate(area, &rates.other);
            (material, labour, MaterialQuantity::GenericArea(area.max(0.0)))
        }
    };

    let material = material.max(0.0);
    let labour = labour.max(0.0);

    CostBreakdown {
        material,
        labour,
        total: round2(material + labour),
        quantity,
    }
}
