//! Domain model types

pub mod rates;

pub use rates::{GenericRates, HeuristicRates, PaintingRates, PlumbingRates, TilingRates};
