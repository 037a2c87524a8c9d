/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Geometry produced by a [`FlightPathCalculator`](crate::calculator::FlightPathCalculator).
//!
//! Geometry is process-local: it is never part of a sync message or bootstrap snapshot. Every replica
//! computes its own.

/// A great- or small-circle path segment.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FlightPathVector {
    pub start_lat: f64,
    pub start_lon: f64,
    pub end_lat: f64,
    pub end_lon: f64,
    /// Length of the vector, in metres.
    pub distance: f64,
    /// Radius of the circle the vector lies on, in great-arc radians. `π / 2` for a great circle.
    pub radius: f64,
}

/// Geometry of a single leg.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct LegCalculations {
    /// Initial desired track, in degrees.
    pub initial_dtk: Option<f64>,
    /// Length of the leg, in metres.
    pub distance: f64,
    /// Distance from the start of the plan to the end of this leg, in metres.
    pub cumulative_distance: f64,
    pub end_lat: Option<f64>,
    pub end_lon: Option<f64>,
    pub flight_path: Vec<FlightPathVector>,
}

/// Geometry of a whole plan, as returned by one calculation.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FlightPath {
    /// The global leg index the calculation started from.
    pub start_leg: u32,
    /// One entry per leg of the plan, in global leg order.
    pub legs: Vec<LegCalculations>,
}
