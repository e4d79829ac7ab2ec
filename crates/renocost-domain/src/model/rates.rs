//! Unit rates used by the fallback pricing heuristic
//!
//! These are placeholder rates, not surveyed market prices. They can be
//! overridden per installation through the configuration file.

use serde::{Deserialize, Serialize};

/// Paint job rates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaintingRates {
    /// Wall area covered by one litre, m²
    #[serde(default = "default_paint_coverage")]
    pub coverage_m2_per_litre: f64,
    #[serde(default = "default_paint_coats")]
    pub coats: u32,
    /// Fraction added for spill and touch-up, e.g. 0.1
    #[serde(default = "default_paint_wastage")]
    pub wastage: f64,
    #[serde(default = "default_paint_price")]
    pub price_per_litre: f64,
    #[serde(default = "default_paint_labour")]
    pub labour_per_m2: f64,
}

fn default_paint_coverage() -> f64 {
    10.0
}

fn default_paint_coats() -> u32 {
    2
}

fn default_paint_wastage() -> f64 {
    0.1
}

fn default_paint_price() -> f64 {
    250.0
}

fn default_paint_labour() -> f64 {
    30.0
}

impl Default for PaintingRates {
    fn default() -> Self {
        Self {
            coverage_m2_per_litre: default_paint_coverage(),
            coats: default_paint_coats(),
            wastage: default_paint_wastage(),
            price_per_litre: default_paint_price(),
            labour_per_m2: default_paint_labour(),
        }
    }
}

/// Floor tiling rates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TilingRates {
    #[serde(default = "default_tile_wastage")]
    pub wastage: f64,
    #[serde(default = "default_tile_price")]
    pub price_per_m2: f64,
    #[serde(default = "default_tile_labour")]
    pub labour_per_m2: f64,
    /// Floor area covered by one box of tiles, m²
    #[serde(default = "default_tile_box")]
    pub box_coverage_m2: f64,
}

fn default_tile_wastage() -> f64 {
    0.05
}

fn default_tile_price() -> f64 {
    600.0
}

fn default_tile_labour() -> f64 {
    50.0
}

fn default_tile_box() -> f64 {
    1.2
}

impl Default for TilingRates {
    fn default() -> Self {
        Self {
            wastage: default_tile_wastage(),
            price_per_m2: default_tile_price(),
            labour_per_m2: default_tile_labour(),
            box_coverage_m2: default_tile_box(),
        }
    }
}

/// Plumbing rates; parts are folded into the per-point charge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlumbingRates {
    #[serde(default = "default_plumbing_callout")]
    pub callout: f64,
    #[serde(default = "default_plumbing_point")]
    pub per_point: f64,
}

fn default_plumbing_callout() -> f64 {
    500.0
}

fn default_plumbing_point() -> f64 {
    300.0
}

impl Default for PlumbingRates {
    fn default() -> Self {
        Self {
            callout: default_plumbing_callout(),
            per_point: default_plumbing_point(),
        }
    }
}

/// Rates for any other area-driven job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericRates {
    #[serde(default = "default_generic_material")]
    pub material_per_m2: f64,
    #[serde(default = "default_generic_labour")]
    pub labour_per_m2: f64,
}

fn default_generic_material() -> f64 {
    150.0
}

fn default_generic_labour() -> f64 {
    80.0
}

impl Default for GenericRates {
    fn default() -> Self {
        Self {
            material_per_m2: default_generic_material(),
            labour_per_m2: default_generic_labour(),
        }
    }
}

/// All heuristic rates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeuristicRates {
    #[serde(default)]
    pub painting: PaintingRates,
    #[serde(default)]
    pub tiling: TilingRates,
    #[serde(default)]
    pub plumbing: PlumbingRates,
    #[serde(default)]
    pub other: GenericRates,
}
