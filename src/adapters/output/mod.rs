//! ADCIRC output file parsers
//!
//! Both supported shapes share one layout: a free-text header, a
//! description line, then records of a `time step` line followed by one
//! `id value` line per location. Time-series files carry many records;
//! extremum files (`maxele.63` and friends) carry exactly one.

pub mod timeseries;

pub use timeseries::{parse_scalar_field, parse_timeseries, TimeseriesFile};
