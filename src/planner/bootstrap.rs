//! Bootstrapping a replica that has just joined: requesting the whole plan set from the replicas
//! already on the bus, and answering such requests.
//!
//! A joining replica publishes a [plan set request](SyncMessage::PlanSetRequest). Every replica that
//! receives it answers with a [response](PlanSetResponse) carrying a snapshot of each of its populated slots and
//! its active slot index. The joining replica loads every snapshot it receives.
//!
//! Responses are not deduplicated. A replica that hears several responses loads each of them in turn,
//! so the last one applied decides its plan set.

use std::time::SystemTime;

use super::FlightPlanner;
use crate::bus::{messages::*, EventBus};
use crate::events::*;
use crate::flight_plan::{hooks::PlanHooks, FlightPlan, FlightPlanSnapshot};
use crate::types::data_types::{PlanIndex, ReplicaId};

impl<B: EventBus> FlightPlanner<B> {
    /// Ask the other replicas on the bus for their plan sets. Their responses are loaded as they come in
    /// through [`poll`](FlightPlanner::poll).
    pub fn request_sync(&mut self) {
        self.flush_plan_changes();
        self.publisher.publish(SyncMessage::PlanSetRequest);
    }

    pub(crate) fn on_plan_set_request(&mut self, origin: ReplicaId) {
        self.event_handlers
            .fire_handlers(Event::ReceiveSyncRequest(ReceiveSyncRequestEvent {
                timestamp: SystemTime::now(),
                origin,
            }));

        let plans: Vec<(PlanIndex, FlightPlanSnapshot)> = self
            .slots
            .iter()
            .map(|(plan_index, plan)| (plan_index, plan.snapshot()))
            .collect();
        let populated = plans.len();
        let active_plan_index = self.active_plan_index;

        self.send_event(
            Some(
                PlanSetResponse {
                    plans,
                    active_plan_index,
                }
                .into(),
            ),
            Event::SendSyncResponse(SendSyncResponseEvent {
                timestamp: SystemTime::now(),
                plans: populated,
                active_plan_index,
            }),
        );
    }

    pub(crate) fn on_plan_set_response(&mut self, origin: ReplicaId, response: PlanSetResponse) {
        let mut plans_loaded = 0;
        for (plan_index, snapshot) in response.plans {
            self.load_plan(plan_index, snapshot);
            plans_loaded += 1;
        }

        let active_plan_index = response.active_plan_index;
        if self.point_active_plan(active_plan_index) {
            self.event_handlers
                .fire_handlers(Event::ActivePlanChanged(ActivePlanChangedEvent {
                    timestamp: SystemTime::now(),
                    plan_index: active_plan_index,
                }));
        }

        self.event_handlers
            .fire_handlers(Event::PlanSetSynced(PlanSetSyncedEvent {
                timestamp: SystemTime::now(),
                origin,
                plans_loaded,
                active_plan_index: self.active_plan_index,
            }));
    }

    /// Replace whatever is in slot `plan_index` with the plan `snapshot` describes, then start computing
    /// its geometry, which snapshots do not carry.
    fn load_plan(&mut self, plan_index: PlanIndex, snapshot: FlightPlanSnapshot) {
        let mut plan =
            FlightPlan::from_snapshot(plan_index, snapshot, self.calculator.clone(), self.leg_namer);
        plan.bind_hooks(PlanHooks::bound(plan_index, self.plan_outbox.clone()));
        self.install_plan(plan_index, plan);
        log::debug!("{}: plan {} materialized from a snapshot", FPL_LOADED, plan_index);

        self.event_handlers
            .fire_handlers(Event::PlanLoaded(PlanLoadedEvent {
                timestamp: SystemTime::now(),
                plan_index,
            }));

        if let Some(plan) = self.slots.get_mut(plan_index) {
            plan.calculate(Some(0), false);
        }
    }
}
