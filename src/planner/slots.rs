//! The sparse, index-addressed table of plan slots.

use std::collections::{btree_map::Entry, BTreeMap, BTreeSet};

use crate::flight_plan::FlightPlan;
use crate::types::data_types::PlanIndex;

/// Why a slot had no plan when a message for it arrived.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MissingSlot {
    /// The slot held a plan once, which has since been deleted. Late messages for it are stale.
    Deleted,
    /// The slot has never held a plan here. Either the message overtook the one creating the plan, or
    /// the creation was never seen.
    NeverCreated,
}

/// Slots `0..len()`, of which only the populated ones are stored. The last slot is always populated,
/// so removing the highest plan shrinks the table down to the next populated slot.
#[derive(Default)]
pub(crate) struct PlanSlots {
    plans: BTreeMap<PlanIndex, FlightPlan>,
    ever_populated: BTreeSet<PlanIndex>,
}

impl PlanSlots {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// The logical length of the table: one past the highest populated slot.
    pub(crate) fn len(&self) -> usize {
        self.plans
            .keys()
            .next_back()
            .map_or(0, |plan_index| plan_index.as_usize() + 1)
    }

    pub(crate) fn contains(&self, plan_index: PlanIndex) -> bool {
        self.plans.contains_key(&plan_index)
    }

    pub(crate) fn get(&self, plan_index: PlanIndex) -> Option<&FlightPlan> {
        self.plans.get(&plan_index)
    }

    pub(crate) fn get_mut(&mut self, plan_index: PlanIndex) -> Option<&mut FlightPlan> {
        self.plans.get_mut(&plan_index)
    }

    /// Put `plan` into slot `plan_index`. Returns the plan it replaced.
    pub(crate) fn insert(&mut self, plan_index: PlanIndex, plan: FlightPlan) -> Option<FlightPlan> {
        self.ever_populated.insert(plan_index);
        self.plans.insert(plan_index, plan)
    }

    /// Get the plan in slot `plan_index`, filling the slot with `create` first if it is empty. Also
    /// returns whether `create` was used.
    pub(crate) fn get_or_insert_with(
        &mut self,
        plan_index: PlanIndex,
        create: impl FnOnce() -> FlightPlan,
    ) -> (&mut FlightPlan, bool) {
        match self.plans.entry(plan_index) {
            Entry::Occupied(entry) => (entry.into_mut(), false),
            Entry::Vacant(entry) => {
                self.ever_populated.insert(plan_index);
                (entry.insert(create()), true)
            }
        }
    }

    /// Empty slot `plan_index`.
    pub(crate) fn remove(&mut self, plan_index: PlanIndex) -> Option<FlightPlan> {
        self.plans.remove(&plan_index)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (PlanIndex, &FlightPlan)> {
        self.plans.iter().map(|(plan_index, plan)| (*plan_index, plan))
    }

    pub(crate) fn indices(&self) -> Vec<PlanIndex> {
        self.iter().map(|(plan_index, _)| plan_index).collect()
    }

    pub(crate) fn missing_reason(&self, plan_index: PlanIndex) -> MissingSlot {
        if self.ever_populated.contains(&plan_index) {
            MissingSlot::Deleted
        } else {
            MissingSlot::NeverCreated
        }
    }
}
