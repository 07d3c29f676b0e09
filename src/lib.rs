//! Fully dynamic graph connectivity from linear sketches.
//!
//! [`SketchConnectivity`] answers "how many connected components?" under edge
//! insertions and deletions while storing only l0-sampling sketches per
//! vertex, never the edge list. Answers are correct with high probability.

pub mod config;
pub mod dsu;
pub mod dynamic_connectivity;
pub mod error;
pub mod l0_sampling;

pub use config::SketchConfig;
pub use dynamic_connectivity::{DynamicConnectivity, SketchConnectivity};
pub use error::{Error, Result};
