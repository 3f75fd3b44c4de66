// src/lib.rs

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

pub mod cycle;
pub mod rainflow;
pub mod reversal;
pub mod stats;

#[cfg(feature = "cli")]
pub mod app_logic;
#[cfg(feature = "cli")]
pub mod config;
#[cfg(feature = "cli")]
pub mod timeseries;

pub use cycle::Cycle;
pub use rainflow::{rainflow, Cycles, Dropflow};
pub use reversal::Sample;

// When the "wasm" feature is enabled, use wasm_bindgen to expose functions to the host environment.
#[cfg(feature = "wasm")]
#[wasm_bindgen]
pub fn run_rainflow(stress: &[f64]) -> Vec<f64> {
    // Five numbers per cycle: range, mean, count, start index, end index.
    rainflow::rainflow(stress)
        .into_iter()
        .flat_map(|c| [c.range, c.mean, c.count, c.start as f64, c.end as f64])
        .collect()
}
