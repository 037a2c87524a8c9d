/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

use borsh::{BorshDeserialize, BorshSerialize};

use super::leg::LegDefinition;

/// The phase of flight a segment belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, BorshDeserialize, BorshSerialize)]
pub enum SegmentType {
    Origin,
    Departure,
    #[default]
    Enroute,
    Arrival,
    Approach,
    Destination,
    MissedApproach,
    RandomDirectTo,
}

/// A contiguous run of legs in a flight plan.
#[derive(Clone, Debug, PartialEq, BorshDeserialize, BorshSerialize)]
pub struct FlightPlanSegment {
    /// Position of this segment in the plan's segment list.
    pub segment_index: u32,
    /// Global index of this segment's first leg.
    pub offset: u32,
    pub legs: Vec<LegDefinition>,
    pub segment_type: SegmentType,
    pub airway: Option<String>,
}

impl FlightPlanSegment {
    pub fn new(segment_index: u32, segment_type: SegmentType, airway: Option<String>) -> Self {
        Self {
            segment_index,
            offset: 0,
            legs: Vec::new(),
            segment_type,
            airway,
        }
    }

    /// Whether the global leg index `global_leg_index` falls inside this segment.
    pub fn contains_global_leg(&self, global_leg_index: u32) -> bool {
        self.offset <= global_leg_index && global_leg_index < self.offset + self.legs.len() as u32
    }
}
