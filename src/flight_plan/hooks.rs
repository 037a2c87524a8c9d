/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The change hooks a [`FlightPlanner`](crate::planner::FlightPlanner) installs on each plan it owns.
//!
//! A plan does not know about the bus. Every mutation method reports what it did as a [`PlanChange`]
//! into the plan's hooks, which forward it, tagged with the slot index the plan is bound to, to the
//! owning planner. The planner later drains these and decides whether to republish them.

use std::sync::mpsc::Sender;

use crate::types::{
    data_types::{PlanIndex, UserDatum},
    leg::LegDefinition,
    plan_changes::{ActiveLegChange, OriginDestChangeType, PlanChangeType},
    procedure::{DirectToData, ProcedureDetails},
    segment::FlightPlanSegment,
};

/// A mutation a flight plan applied to itself.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum PlanChange {
    Leg {
        segment_index: u32,
        segment_leg_index: u32,
        change_type: PlanChangeType,
        leg: LegDefinition,
    },
    Segment {
        segment_index: u32,
        change_type: PlanChangeType,
        segment: Option<FlightPlanSegment>,
        /// Set on a removal that left the slot empty rather than moving later segments forward.
        leaves_gap: bool,
    },
    ActiveLeg(ActiveLegChange),
    Calculated {
        start_leg: Option<u32>,
    },
    OriginDest {
        change_type: OriginDestChangeType,
        airport: Option<String>,
    },
    ProcedureDetails(ProcedureDetails),
    UserDataSet {
        key: String,
        datum: UserDatum,
    },
    UserDataDelete {
        key: String,
    },
    DirectToData(DirectToData),
}

/// A [`PlanChange`] together with the slot it happened in and whether it should be republished.
#[derive(Clone, Debug)]
pub(crate) struct PlanMutation {
    pub(crate) plan_index: PlanIndex,
    pub(crate) change: PlanChange,
    pub(crate) notify: bool,
}

/// Where a plan reports its mutations. Unbound hooks swallow everything.
#[derive(Clone, Default)]
pub(crate) struct PlanHooks {
    binding: Option<(PlanIndex, Sender<PlanMutation>)>,
}

impl PlanHooks {
    pub(crate) fn bound(plan_index: PlanIndex, outbox: Sender<PlanMutation>) -> Self {
        Self {
            binding: Some((plan_index, outbox)),
        }
    }

    pub(crate) fn unbound() -> Self {
        Self { binding: None }
    }

    pub(crate) fn plan_index(&self) -> Option<PlanIndex> {
        self.binding.as_ref().map(|(plan_index, _)| *plan_index)
    }

    pub(crate) fn fire(&self, change: PlanChange, notify: bool) {
        if let Some((plan_index, outbox)) = &self.binding {
            // The receiving end lives in the planner, which outlives every plan it binds.
            let _ = outbox.send(PlanMutation {
                plan_index: *plan_index,
                change,
                notify,
            });
        }
    }
}
