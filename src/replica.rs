/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Methods to build and start a [flight planner](FlightPlanner).
//!
//! Every process that needs flight plans runs one planner. The planners of all processes share an
//! [event bus](crate::bus::EventBus), over which they keep their copies of each plan slot identical. In
//! our terminology, each of these processes is a 'replica', uniquely identified on the bus by a
//! [replica ID](crate::types::data_types::ReplicaId).
//!
//! The key components of this module are:
//! - The builder-pattern interface to construct a [specification of the planner](FlightPlannerSpec) with:
//!   1. `FlightPlannerSpec::builder` to construct a `FlightPlannerSpecBuilder`,
//!   2. The setters of the `FlightPlannerSpecBuilder`, and
//!   3. The `FlightPlannerSpecBuilder::build` method to construct a [FlightPlannerSpec],
//! - The function to [start](FlightPlannerSpec::start) a [FlightPlanner] given its specification.
//!
//! ## Starting a planner
//!
//! Here is an example that demonstrates how to build and start a planner using the builder pattern:
//!
//! ```ignore
//! let mut planner =
//!     FlightPlannerSpec::builder()
//!     .bus(bus)
//!     .calculator(calculator)
//!     .configuration(configuration)
//!     .on_leg_change(leg_change_handler)
//!     .build()
//!     .start();
//!
//! planner.request_sync();
//! ```
//!
//! ### Required setters
//!
//! The required setters are for providing the trait implementations required to run a planner:
//! - `.bus(...)`
//! - `.calculator(...)`
//! - `.configuration(...)`
//!
//! ### Optional setters
//!
//! The optional setters are for registering user-defined event handlers for events from [crate::events]:
//! - `.on_plan_loaded(...)`
//! - `.on_plan_created(...)`
//! - `.on_plan_deleted(...)`
//! - `.on_plan_copied(...)`
//! - `.on_active_plan_changed(...)`
//! - `.on_leg_change(...)`
//! - `.on_segment_change(...)`
//! - `.on_active_leg_change(...)`
//! - `.on_calculated(...)`
//! - `.on_origin_dest_change(...)`
//! - `.on_procedure_details_change(...)`
//! - `.on_user_data_set(...)`
//! - `.on_user_data_delete(...)`
//! - `.on_direct_to_data_change(...)`
//! - `.on_receive_sync_request(...)`
//! - `.on_send_sync_response(...)`
//! - `.on_plan_set_synced(...)`
//!
//! Handlers run synchronously on the thread that drives the planner, in the call that caused the event.
//!
//! The planner's [configuration](Configuration) can also be defined using the builder pattern, for example:
//!
//! ```ignore
//! let configuration =
//!     Configuration::builder()
//!     .me(ReplicaId::new(1))
//!     .log_events(true)
//!     .build()
//! ```

use std::sync::mpsc;

use typed_builder::TypedBuilder;

use crate::bus::EventBus;
use crate::calculator::{start_calculation_worker, FlightPathCalculator};
use crate::event_bus::*;
use crate::events::*;
use crate::flight_plan::{default_leg_name, LegNamer};
use crate::planner::FlightPlanner;
use crate::types::data_types::ReplicaId;

/// Stores the user-defined parameters required to start the planner, that is:
/// 1. The replica's [ID](ReplicaId), stamped on every message it publishes.
/// 2. The leg namer, which names every leg inserted into a plan.
/// 3. The "Log Events" flag, if set to "true" then logs should be printed.
///
/// ## Replica ID
///
/// A planner drops every message on the bus that carries its own ID, so no two planners sharing a bus
/// may have the same ID. If none is given, a random one is drawn.
///
/// ## Log Events
///
/// The planner logs using the [log](https://docs.rs/log/latest/log/) crate. To get these messages
/// printed onto a terminal or to a file, set up a [logging
/// implementation](https://docs.rs/log/latest/log/#available-logging-implementations).
#[derive(TypedBuilder)]
#[builder(builder_method(doc =
    "
    Create a builder for building a [Configuration]. On the builder call the following methods to construct a valid [Configuration].

    Required:
    - `.log_events(...)`

    Optional:
    - `.me(...)`
    - `.leg_namer(...)`
"
))]
pub struct Configuration {
    #[builder(default = ReplicaId::random(), setter(doc = "Set the replica's ID on the bus. Optional, defaults to a random ID."))]
    pub me: ReplicaId,
    #[builder(default = default_leg_name as LegNamer, setter(doc = "Set the function that names legs as they are inserted. Optional, defaults to [default_leg_name](crate::flight_plan::default_leg_name)."))]
    pub leg_namer: LegNamer,
    #[builder(setter(doc = "Enable logging? Required."))]
    pub log_events: bool,
}

/// Stores all necessary parameters and trait implementations required to run the [FlightPlanner].
#[derive(TypedBuilder)]
#[builder(builder_method(doc =
    "
    Create a builder for building a [FlightPlannerSpec]. On the builder call the following methods to construct a valid [FlightPlannerSpec].

    Required:
    - `.bus(...)`
    - `.calculator(...)`
    - `.configuration(...)`

    Optional:
    - `.on_plan_loaded(...)`
    - `.on_plan_created(...)`
    - `.on_plan_deleted(...)`
    - `.on_plan_copied(...)`
    - `.on_active_plan_changed(...)`
    - `.on_leg_change(...)`
    - `.on_segment_change(...)`
    - `.on_active_leg_change(...)`
    - `.on_calculated(...)`
    - `.on_origin_dest_change(...)`
    - `.on_procedure_details_change(...)`
    - `.on_user_data_set(...)`
    - `.on_user_data_delete(...)`
    - `.on_direct_to_data_change(...)`
    - `.on_receive_sync_request(...)`
    - `.on_send_sync_response(...)`
    - `.on_plan_set_synced(...)`
"
))]
pub struct FlightPlannerSpec<B: EventBus, C: FlightPathCalculator> {
    // Required parameters
    #[builder(setter(doc = "Set the event bus shared with the other replicas. The argument must implement the [EventBus](crate::bus::EventBus) trait. Required."))]
    bus: B,
    #[builder(setter(doc = "Set the flight path calculator. The argument must implement the [FlightPathCalculator](crate::calculator::FlightPathCalculator) trait. Required."))]
    calculator: C,
    #[builder(setter(doc = "Set the [configuration](Configuration), which contains the necessary parameters to run a planner. Required."))]
    configuration: Configuration,
    // Optional parameters
    #[builder(default, setter(transform = |handler: impl Fn(&PlanLoadedEvent) + Send + 'static| Some(Box::new(handler) as HandlerPtr<PlanLoadedEvent>),
    doc = "Register a handler closure to be invoked after a plan is loaded into a slot from another replica's plan set. Optional."))]
    on_plan_loaded: Option<HandlerPtr<PlanLoadedEvent>>,
    #[builder(default, setter(transform = |handler: impl Fn(&PlanCreatedEvent) + Send + 'static| Some(Box::new(handler) as HandlerPtr<PlanCreatedEvent>),
    doc = "Register a handler closure to be invoked after an empty plan is created in a slot. Optional."))]
    on_plan_created: Option<HandlerPtr<PlanCreatedEvent>>,
    #[builder(default, setter(transform = |handler: impl Fn(&PlanDeletedEvent) + Send + 'static| Some(Box::new(handler) as HandlerPtr<PlanDeletedEvent>),
    doc = "Register a handler closure to be invoked after a plan is deleted from its slot. Optional."))]
    on_plan_deleted: Option<HandlerPtr<PlanDeletedEvent>>,
    #[builder(default, setter(transform = |handler: impl Fn(&PlanCopiedEvent) + Send + 'static| Some(Box::new(handler) as HandlerPtr<PlanCopiedEvent>),
    doc = "Register a handler closure to be invoked after a plan is copied into another slot. Optional."))]
    on_plan_copied: Option<HandlerPtr<PlanCopiedEvent>>,
    #[builder(default, setter(transform = |handler: impl Fn(&ActivePlanChangedEvent) + Send + 'static| Some(Box::new(handler) as HandlerPtr<ActivePlanChangedEvent>),
    doc = "Register a handler closure to be invoked after the active plan slot changes. Optional."))]
    on_active_plan_changed: Option<HandlerPtr<ActivePlanChangedEvent>>,
    #[builder(default, setter(transform = |handler: impl Fn(&LegChangeEvent) + Send + 'static| Some(Box::new(handler) as HandlerPtr<LegChangeEvent>),
    doc = "Register a handler closure to be invoked after a leg is added to, removed from, or changed in a plan. Optional."))]
    on_leg_change: Option<HandlerPtr<LegChangeEvent>>,
    #[builder(default, setter(transform = |handler: impl Fn(&SegmentChangeEvent) + Send + 'static| Some(Box::new(handler) as HandlerPtr<SegmentChangeEvent>),
    doc = "Register a handler closure to be invoked after a segment is added to, removed from, or changed in a plan. Optional."))]
    on_segment_change: Option<HandlerPtr<SegmentChangeEvent>>,
    #[builder(default, setter(transform = |handler: impl Fn(&ActiveLegChangeEvent) + Send + 'static| Some(Box::new(handler) as HandlerPtr<ActiveLegChangeEvent>),
    doc = "Register a handler closure to be invoked after one of a plan's active leg indices changes. Optional."))]
    on_active_leg_change: Option<HandlerPtr<ActiveLegChangeEvent>>,
    #[builder(default, setter(transform = |handler: impl Fn(&CalculatedEvent) + Send + 'static| Some(Box::new(handler) as HandlerPtr<CalculatedEvent>),
    doc = "Register a handler closure to be invoked after a plan's flight path has been recalculated. Optional."))]
    on_calculated: Option<HandlerPtr<CalculatedEvent>>,
    #[builder(default, setter(transform = |handler: impl Fn(&OriginDestChangeEvent) + Send + 'static| Some(Box::new(handler) as HandlerPtr<OriginDestChangeEvent>),
    doc = "Register a handler closure to be invoked after a plan's origin or destination airport is set or removed. Optional."))]
    on_origin_dest_change: Option<HandlerPtr<OriginDestChangeEvent>>,
    #[builder(default, setter(transform = |handler: impl Fn(&ProcedureDetailsChangeEvent) + Send + 'static| Some(Box::new(handler) as HandlerPtr<ProcedureDetailsChangeEvent>),
    doc = "Register a handler closure to be invoked after a plan's procedure details change. Optional."))]
    on_procedure_details_change: Option<HandlerPtr<ProcedureDetailsChangeEvent>>,
    #[builder(default, setter(transform = |handler: impl Fn(&UserDataSetEvent) + Send + 'static| Some(Box::new(handler) as HandlerPtr<UserDataSetEvent>),
    doc = "Register a handler closure to be invoked after a key is set in a plan's user data. Optional."))]
    on_user_data_set: Option<HandlerPtr<UserDataSetEvent>>,
    #[builder(default, setter(transform = |handler: impl Fn(&UserDataDeleteEvent) + Send + 'static| Some(Box::new(handler) as HandlerPtr<UserDataDeleteEvent>),
    doc = "Register a handler closure to be invoked after a key is deleted from a plan's user data. Optional."))]
    on_user_data_delete: Option<HandlerPtr<UserDataDeleteEvent>>,
    #[builder(default, setter(transform = |handler: impl Fn(&DirectToDataChangeEvent) + Send + 'static| Some(Box::new(handler) as HandlerPtr<DirectToDataChangeEvent>),
    doc = "Register a handler closure to be invoked after a plan's direct-to data changes. Optional."))]
    on_direct_to_data_change: Option<HandlerPtr<DirectToDataChangeEvent>>,
    #[builder(default, setter(transform = |handler: impl Fn(&ReceiveSyncRequestEvent) + Send + 'static| Some(Box::new(handler) as HandlerPtr<ReceiveSyncRequestEvent>),
    doc = "Register a handler closure to be invoked after the planner receives a plan set request from another replica. Optional."))]
    on_receive_sync_request: Option<HandlerPtr<ReceiveSyncRequestEvent>>,
    #[builder(default, setter(transform = |handler: impl Fn(&SendSyncResponseEvent) + Send + 'static| Some(Box::new(handler) as HandlerPtr<SendSyncResponseEvent>),
    doc = "Register a handler closure to be invoked after the planner answers a plan set request. Optional."))]
    on_send_sync_response: Option<HandlerPtr<SendSyncResponseEvent>>,
    #[builder(default, setter(transform = |handler: impl Fn(&PlanSetSyncedEvent) + Send + 'static| Some(Box::new(handler) as HandlerPtr<PlanSetSyncedEvent>),
    doc = "Register a handler closure to be invoked after the planner finishes loading a plan set received from another replica. Optional."))]
    on_plan_set_synced: Option<HandlerPtr<PlanSetSyncedEvent>>,
}

impl<B: EventBus, C: FlightPathCalculator> FlightPlannerSpec<B, C> {
    /// Starts the calculation worker thread and returns the planner, which owns it. The planner starts
    /// with an empty slot table: call [`request_sync`](FlightPlanner::request_sync) to fetch the plans
    /// of replicas already on the bus.
    pub fn start(self) -> FlightPlanner<B> {
        let log_events = self.configuration.log_events;

        let (calculation_worker_shutdown, calculation_worker_shutdown_receiver) = mpsc::channel();
        let (calculation_worker, calculator, calculation_results) =
            start_calculation_worker(self.calculator, calculation_worker_shutdown_receiver);

        let (plan_outbox, plan_changes) = mpsc::channel();

        let event_handlers = EventHandlers {
            plan_loaded_handlers: handlers_for(log_events, self.on_plan_loaded),
            plan_created_handlers: handlers_for(log_events, self.on_plan_created),
            plan_deleted_handlers: handlers_for(log_events, self.on_plan_deleted),
            plan_copied_handlers: handlers_for(log_events, self.on_plan_copied),
            active_plan_changed_handlers: handlers_for(log_events, self.on_active_plan_changed),
            leg_change_handlers: handlers_for(log_events, self.on_leg_change),
            segment_change_handlers: handlers_for(log_events, self.on_segment_change),
            active_leg_change_handlers: handlers_for(log_events, self.on_active_leg_change),
            calculated_handlers: handlers_for(log_events, self.on_calculated),
            origin_dest_change_handlers: handlers_for(log_events, self.on_origin_dest_change),
            procedure_details_change_handlers: handlers_for(log_events, self.on_procedure_details_change),
            user_data_set_handlers: handlers_for(log_events, self.on_user_data_set),
            user_data_delete_handlers: handlers_for(log_events, self.on_user_data_delete),
            direct_to_data_change_handlers: handlers_for(log_events, self.on_direct_to_data_change),
            receive_sync_request_handlers: handlers_for(log_events, self.on_receive_sync_request),
            send_sync_response_handlers: handlers_for(log_events, self.on_send_sync_response),
            plan_set_synced_handlers: handlers_for(log_events, self.on_plan_set_synced),
        };

        FlightPlanner::new(
            self.configuration.me,
            self.bus,
            self.configuration.leg_namer,
            plan_outbox,
            plan_changes,
            calculator,
            calculation_results,
            calculation_worker,
            calculation_worker_shutdown,
            event_handlers,
        )
    }
}
