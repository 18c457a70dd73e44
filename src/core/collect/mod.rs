//! Output collection and post-processing
//!
//! The harvester sizes arrays from the fort.15 recording table and pulls
//! each finished member's output files into its slab; interpolation maps
//! nodal fields onto station locations for quantity-of-interest campaigns.

pub mod harvest;
pub mod interpolate;

pub use harvest::Harvester;
pub use interpolate::interpolate_to_stations;
