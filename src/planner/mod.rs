/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The [flight planner](FlightPlanner): the replica manager that keeps one process's copy of every
//! flight plan consistent with every other process's.
//!
//! ## Replication model
//!
//! Each process owns one `FlightPlanner`, holding a sparse table of plan slots and an active-slot
//! pointer. Planners are connected by an [`EventBus`], and there is no primary: every replica may
//! mutate any plan. A mutation is applied locally first, then republished as a sync message that peers
//! apply with republication suppressed. This makes each mutation take effect exactly once on every
//! replica, with no broadcast storm.
//!
//! The bus hands every message back to its sender as well. A planner recognizes its own messages by the
//! [origin](crate::bus::messages::SyncEnvelope::origin) stamped on them and drops them.
//!
//! Remote messages may arrive in any order relative to each other. A message for a slot that has no
//! plan is dropped, and logged differently depending on whether the slot's plan was deleted (a stale
//! message) or was never seen (a message that overtook the creation of its plan).
//!
//! Two replicas editing the same plan concurrently is not detected: each replica ends up with the
//! effect of whichever message it applied last.
//!
//! ## Driving the planner
//!
//! The planner does no work on its own. Call [`poll`](FlightPlanner::poll) regularly to take in
//! messages from the bus and finished flight path calculations. Mutations made directly on a plan
//! borrowed from the planner are republished on the next call into the planner.

mod bootstrap;

mod relay;

mod remote_apply;

pub(crate) mod slots;

use std::fmt::{self, Display, Formatter};
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant, SystemTime};

use crate::bus::{
    messages::{PlanCopiedMessage, PlanIndexMessage, SyncMessage},
    sending::SyncPublisher,
    EventBus,
};
use crate::calculator::{CalculationResult, CalculatorHandle};
use crate::event_bus::EventHandlers;
use crate::events::*;
use crate::flight_plan::{
    hooks::{PlanHooks, PlanMutation},
    FlightPlan, LegNamer,
};
use crate::types::data_types::{PlanIndex, ReplicaId};

use slots::{MissingSlot, PlanSlots};

#[derive(Debug, PartialEq, Eq)]
pub enum FlightPlannerError {
    PlanNotFound { plan_index: PlanIndex },
}

impl Display for FlightPlannerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            FlightPlannerError::PlanNotFound { plan_index } => {
                write!(f, "flight plan slot {} is empty", plan_index)
            }
        }
    }
}

impl std::error::Error for FlightPlannerError {}

/// The replica manager. Create one with [`FlightPlannerSpec`](crate::replica::FlightPlannerSpec).
pub struct FlightPlanner<B: EventBus> {
    publisher: SyncPublisher<B>,
    slots: PlanSlots,
    active_plan_index: PlanIndex,
    leg_namer: LegNamer,
    plan_outbox: Sender<PlanMutation>,
    plan_changes: Receiver<PlanMutation>,
    calculator: CalculatorHandle,
    calculation_results: Receiver<CalculationResult>,
    calculation_worker: Option<JoinHandle<()>>,
    calculation_worker_shutdown: Sender<()>,
    event_handlers: EventHandlers,
}

/// Make a fresh, empty plan bound to slot `plan_index`.
fn fresh_plan(
    plan_index: PlanIndex,
    calculator: &CalculatorHandle,
    leg_namer: LegNamer,
    plan_outbox: &Sender<PlanMutation>,
) -> FlightPlan {
    let mut plan = FlightPlan::with_calculator(plan_index, calculator.clone(), leg_namer);
    plan.bind_hooks(PlanHooks::bound(plan_index, plan_outbox.clone()));
    plan
}

impl<B: EventBus> FlightPlanner<B> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        me: ReplicaId,
        bus: B,
        leg_namer: LegNamer,
        plan_outbox: Sender<PlanMutation>,
        plan_changes: Receiver<PlanMutation>,
        calculator: CalculatorHandle,
        calculation_results: Receiver<CalculationResult>,
        calculation_worker: JoinHandle<()>,
        calculation_worker_shutdown: Sender<()>,
        event_handlers: EventHandlers,
    ) -> Self {
        Self {
            publisher: SyncPublisher::new(me, bus),
            slots: PlanSlots::new(),
            active_plan_index: PlanIndex::new(0),
            leg_namer,
            plan_outbox,
            plan_changes,
            calculator,
            calculation_results,
            calculation_worker: Some(calculation_worker),
            calculation_worker_shutdown,
            event_handlers,
        }
    }

    /// The identifier this planner stamps on the messages it publishes.
    pub fn replica_id(&self) -> ReplicaId {
        self.publisher.me()
    }

    /// Take in everything that has happened since the last call: republish mutations made directly on
    /// borrowed plans, apply every message waiting on the bus, and apply finished flight path
    /// calculations.
    pub fn poll(&mut self) {
        self.flush_plan_changes();
        while let Some(envelope) = self.publisher.recv() {
            self.on_sync_envelope(envelope);
        }
        self.take_in_calculations();
    }

    /// Block until every requested flight path calculation has finished and been applied, or until
    /// `timeout` elapses. Returns whether all calculations settled.
    ///
    /// Does not take in messages from the bus.
    pub fn await_calculations(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.take_in_calculations();
            if self.calculator.in_flight() == 0 {
                self.take_in_calculations();
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(Duration::from_millis(1));
        }
    }

    /* ↓↓↓ Queries ↓↓↓ */

    pub fn has_flight_plan(&self, plan_index: PlanIndex) -> bool {
        self.slots.contains(plan_index)
    }

    pub fn get_flight_plan(&self, plan_index: PlanIndex) -> Result<&FlightPlan, FlightPlannerError> {
        self.slots
            .get(plan_index)
            .ok_or(FlightPlannerError::PlanNotFound { plan_index })
    }

    /// Borrow a plan for mutation. Mutations made with `notify = true` are republished on the next call
    /// into the planner.
    pub fn get_flight_plan_mut(
        &mut self,
        plan_index: PlanIndex,
    ) -> Result<&mut FlightPlan, FlightPlannerError> {
        self.flush_plan_changes();
        self.slots
            .get_mut(plan_index)
            .ok_or(FlightPlannerError::PlanNotFound { plan_index })
    }

    /// Run `mutate` against the plan in slot `plan_index` and republish what it did straight away.
    pub fn with_flight_plan<R>(
        &mut self,
        plan_index: PlanIndex,
        mutate: impl FnOnce(&mut FlightPlan) -> R,
    ) -> Result<R, FlightPlannerError> {
        self.flush_plan_changes();
        let plan = self
            .slots
            .get_mut(plan_index)
            .ok_or(FlightPlannerError::PlanNotFound { plan_index })?;
        let result = mutate(plan);
        self.flush_plan_changes();
        Ok(result)
    }

    pub fn active_plan_index(&self) -> PlanIndex {
        self.active_plan_index
    }

    pub fn has_active_flight_plan(&self) -> bool {
        self.has_flight_plan(self.active_plan_index)
    }

    pub fn get_active_flight_plan(&self) -> Result<&FlightPlan, FlightPlannerError> {
        self.get_flight_plan(self.active_plan_index)
    }

    /// The logical length of the slot table: one past the highest populated slot.
    pub fn plan_slot_count(&self) -> usize {
        self.slots.len()
    }

    /// The indices of every populated slot, in ascending order.
    pub fn flight_plan_indices(&self) -> Vec<PlanIndex> {
        self.slots.indices()
    }

    /* ↓↓↓ Lifecycle ↓↓↓ */

    /// Get the plan in slot `plan_index`, creating an empty one there first if the slot is empty.
    ///
    /// Only a plan that did not exist before is announced to the other replicas.
    pub fn create_flight_plan(&mut self, plan_index: PlanIndex) -> &mut FlightPlan {
        self.flush_plan_changes();
        let (plan, created) = self.slots.get_or_insert_with(plan_index, || {
            fresh_plan(plan_index, &self.calculator, self.leg_namer, &self.plan_outbox)
        });
        if created {
            self.publisher
                .publish(SyncMessage::Created(PlanIndexMessage { plan_index }));
            self.event_handlers
                .fire_handlers(Event::PlanCreated(PlanCreatedEvent {
                    timestamp: SystemTime::now(),
                    plan_index,
                }));
        }
        plan
    }

    /// Empty slot `plan_index`. Does nothing if the slot is already empty.
    pub fn delete_flight_plan(&mut self, plan_index: PlanIndex) {
        self.flush_plan_changes();
        if self.remove_plan(plan_index) {
            self.send_event(
                Some(SyncMessage::Deleted(PlanIndexMessage { plan_index })),
                Event::PlanDeleted(PlanDeletedEvent {
                    timestamp: SystemTime::now(),
                    plan_index,
                }),
            );
        }
    }

    /// Replace the plan in slot `target` with a copy of the plan in slot `source`. Does nothing if
    /// `source` is empty.
    pub fn copy_flight_plan(&mut self, source: PlanIndex, target: PlanIndex) {
        self.flush_plan_changes();
        if self.copy_plan(source, target) {
            self.send_event(
                Some(
                    PlanCopiedMessage {
                        plan_index: source,
                        target_plan_index: target,
                    }
                    .into(),
                ),
                Event::PlanCopied(PlanCopiedEvent {
                    timestamp: SystemTime::now(),
                    plan_index: source,
                    target_plan_index: target,
                }),
            );
        }
    }

    /// Point the active slot at `plan_index`. Refused, returning false, if the slot is empty.
    pub fn set_active_plan_index(&mut self, plan_index: PlanIndex) -> bool {
        self.flush_plan_changes();
        if !self.point_active_plan(plan_index) {
            return false;
        }
        self.send_event(
            Some(SyncMessage::IndexChanged(PlanIndexMessage { plan_index })),
            Event::ActivePlanChanged(ActivePlanChangedEvent {
                timestamp: SystemTime::now(),
                plan_index,
            }),
        );
        true
    }

    /* ↓↓↓ Slot table primitives shared by the local and remote forms ↓↓↓ */

    /// Put an empty plan in slot `plan_index` if it is empty. Returns whether a plan was created.
    fn create_plan(&mut self, plan_index: PlanIndex) -> bool {
        let (_, created) = self.slots.get_or_insert_with(plan_index, || {
            fresh_plan(plan_index, &self.calculator, self.leg_namer, &self.plan_outbox)
        });
        created
    }

    fn remove_plan(&mut self, plan_index: PlanIndex) -> bool {
        match self.slots.remove(plan_index) {
            Some(mut plan) => {
                plan.clear_hooks();
                true
            }
            None => false,
        }
    }

    fn copy_plan(&mut self, source: PlanIndex, target: PlanIndex) -> bool {
        let mut copy = match self.slots.get(source) {
            Some(plan) => plan.copy(target),
            None => return false,
        };
        copy.bind_hooks(PlanHooks::bound(target, self.plan_outbox.clone()));
        self.install_plan(target, copy);
        true
    }

    /// Put `plan` into slot `plan_index`, detaching whatever plan it replaces.
    fn install_plan(&mut self, plan_index: PlanIndex, plan: FlightPlan) {
        if let Some(mut replaced) = self.slots.insert(plan_index, plan) {
            replaced.clear_hooks();
        }
    }

    fn point_active_plan(&mut self, plan_index: PlanIndex) -> bool {
        if self.slots.contains(plan_index) {
            self.active_plan_index = plan_index;
            true
        } else {
            log::debug!(
                "refusing to point the active plan at empty slot {}",
                plan_index
            );
            false
        }
    }

    /// Look up the plan a remote message is about, logging why if there is none.
    fn plan_for_message(&mut self, plan_index: PlanIndex, topic: &str) -> Option<&mut FlightPlan> {
        if !self.slots.contains(plan_index) {
            self.log_missing_plan(plan_index, topic);
            return None;
        }
        self.slots.get_mut(plan_index)
    }

    fn log_missing_plan(&self, plan_index: PlanIndex, topic: &str) {
        match self.slots.missing_reason(plan_index) {
            MissingSlot::Deleted => log::debug!(
                "dropping stale {} for deleted plan {}",
                topic,
                plan_index
            ),
            MissingSlot::NeverCreated => log::warn!(
                "dropping {} for plan {}, which has never been created here",
                topic,
                plan_index
            ),
        }
    }

    /// Publish `sync` to the other replicas if given, then fire `event` locally.
    fn send_event(&mut self, sync: Option<SyncMessage>, event: Event) {
        if let Some(sync) = sync {
            self.publisher.publish(sync);
        }
        self.event_handlers.fire_handlers(event);
    }

    /* ↓↓↓ Calculations ↓↓↓ */

    fn take_in_calculations(&mut self) {
        while let Ok(result) = self.calculation_results.try_recv() {
            self.on_calculation_result(result);
        }
    }

    fn on_calculation_result(&mut self, result: CalculationResult) {
        let plan_index = result.plan_index;
        let settled = match self.slots.get_mut(plan_index) {
            Some(plan) => plan.apply_calculation(result.generation, result.flight_path),
            None => {
                log::debug!(
                    "discarding calculation {} for plan {}, whose slot is now empty",
                    result.generation,
                    plan_index
                );
                return;
            }
        };

        match settled {
            None => log::debug!(
                "discarding calculation {} for plan {}, superseded by a newer request",
                result.generation,
                plan_index
            ),
            // The plan's hook republishes the result.
            Some(settled) if settled.notify => self.flush_plan_changes(),
            Some(settled) => {
                self.flush_plan_changes();
                self.event_handlers
                    .fire_handlers(Event::Calculated(CalculatedEvent {
                        timestamp: SystemTime::now(),
                        plan_index,
                        start_leg: settled.requested_start_leg,
                    }));
            }
        }
    }
}

impl<B: EventBus> Drop for FlightPlanner<B> {
    fn drop(&mut self) {
        let _ = self.calculation_worker_shutdown.send(());
        if let Some(calculation_worker) = self.calculation_worker.take() {
            let _ = calculation_worker.join();
        }
    }
}
