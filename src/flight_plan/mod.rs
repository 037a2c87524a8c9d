/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The [flight plan](FlightPlan) document and the types it is made of.
//!
//! A flight plan is an ordered list of segments, each an ordered list of legs. Legs are addressed
//! either by segment index and position within the segment, or by "global" index, their position in
//! the concatenation of every segment's legs.
//!
//! Plans owned by a [`FlightPlanner`](crate::planner::FlightPlanner) report every mutation back to it
//! through their hooks, so that the planner can keep the other replicas of the plan up to date.

pub(crate) mod hooks;

pub mod naming;

pub mod plan;

pub mod snapshot;

pub use naming::{default_leg_name, icao_ident, LegNamer};
pub use plan::FlightPlan;
pub use snapshot::FlightPlanSnapshot;

#[derive(Debug, PartialEq, Eq)]
pub enum FlightPlanError {
    SegmentNotFound {
        segment_index: u32,
    },
    LegNotFound {
        segment_index: u32,
        segment_leg_index: u32,
    },
}
