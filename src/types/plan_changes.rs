//! Descriptors of the changes a flight plan reports through its hooks.

use borsh::{BorshDeserialize, BorshSerialize};

/// How a leg or segment changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, BorshDeserialize, BorshSerialize)]
pub enum PlanChangeType {
    Added,
    Inserted,
    Removed,
    Changed,
}

/// Which of a plan's three active-leg pointers changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, BorshDeserialize, BorshSerialize)]
pub enum ActiveLegType {
    Lateral,
    Vertical,
    Calculating,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, BorshDeserialize, BorshSerialize)]
pub enum OriginDestChangeType {
    OriginAdded,
    OriginRemoved,
    DestinationAdded,
    DestinationRemoved,
}

/// A move of one of a plan's active-leg pointers.
///
/// `segment_index` and `segment_leg_index` locate the new active leg, the `previous_*` fields the old
/// one. They are `None` when the plan had no legs at the time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub struct ActiveLegChange {
    pub leg_type: ActiveLegType,
    /// The new global leg index of the pointer.
    pub index: u32,
    pub segment_index: Option<u32>,
    pub segment_leg_index: Option<u32>,
    pub previous_segment_index: Option<u32>,
    pub previous_segment_leg_index: Option<u32>,
}
