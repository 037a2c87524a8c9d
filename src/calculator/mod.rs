/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! [Trait definition](FlightPathCalculator) for the pluggable flight path calculator, and the worker
//! thread that runs it.
//!
//! Flight path calculation is the only operation in the planner that does not complete immediately.
//! Plans submit calculation requests to a background worker through a [`CalculatorHandle`]. The
//! worker's results come back to the planner, which applies each result only if it answers the most
//! recent request made by the plan in that slot. A result that has been overtaken by a newer request
//! is discarded.
//!
//! Results are not applied automatically: call [`FlightPlanner::poll`](crate::planner::FlightPlanner::poll)
//! or [`FlightPlanner::await_calculations`](crate::planner::FlightPlanner::await_calculations) to take
//! them in.

use crate::types::{flight_path::FlightPath, leg::LegDefinition};

pub(crate) mod worker;

pub(crate) use worker::{start_calculation_worker, CalculationJob, CalculationResult, CalculatorHandle};

pub trait FlightPathCalculator: Send + 'static {
    /// Compute geometry for `legs`, the legs of a plan in global order, recalculating from the leg at
    /// global index `start_leg` onwards. `active_lateral_leg` is the leg the aircraft is currently
    /// flying.
    ///
    /// The returned [`FlightPath`] must have one entry in `legs` per input leg.
    fn calculate_flight_path(
        &mut self,
        legs: &[LegDefinition],
        active_lateral_leg: u32,
        start_leg: u32,
    ) -> FlightPath;
}
