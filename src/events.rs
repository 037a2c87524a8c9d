//! Definitions of the flight planner's local events, for event handling and logging.
//!
//! Events are emitted within the process only, synchronously, in the order the mutations they describe
//! were applied. Each replica emits its own events for mutations it applies, whether they originated
//! locally or arrived from another replica.
//!
//! Note: an event for a given action indicates that the action has been completed.

use std::time::SystemTime;

use crate::types::{
    data_types::{PlanIndex, ReplicaId, UserDatum},
    leg::LegDefinition,
    plan_changes::{ActiveLegChange, OriginDestChangeType, PlanChangeType},
    procedure::{DirectToData, ProcedureDetails},
    segment::FlightPlanSegment,
};

pub enum Event {
    // Events that change the slot table or the active slot.
    PlanLoaded(PlanLoadedEvent),
    PlanCreated(PlanCreatedEvent),
    PlanDeleted(PlanDeletedEvent),
    PlanCopied(PlanCopiedEvent),
    ActivePlanChanged(ActivePlanChangedEvent),
    // Events that change a plan.
    LegChange(LegChangeEvent),
    SegmentChange(SegmentChangeEvent),
    ActiveLegChange(ActiveLegChangeEvent),
    Calculated(CalculatedEvent),
    OriginDestChange(OriginDestChangeEvent),
    ProcedureDetailsChange(ProcedureDetailsChangeEvent),
    UserDataSet(UserDataSetEvent),
    UserDataDelete(UserDataDeleteEvent),
    DirectToDataChange(DirectToDataChangeEvent),
    // Bootstrap events.
    ReceiveSyncRequest(ReceiveSyncRequestEvent),
    SendSyncResponse(SendSyncResponseEvent),
    PlanSetSynced(PlanSetSyncedEvent),
}

/// A plan was materialized in a slot from a bootstrap response.
pub struct PlanLoadedEvent {
    pub timestamp: SystemTime,
    pub plan_index: PlanIndex,
}

pub struct PlanCreatedEvent {
    pub timestamp: SystemTime,
    pub plan_index: PlanIndex,
}

pub struct PlanDeletedEvent {
    pub timestamp: SystemTime,
    pub plan_index: PlanIndex,
}

pub struct PlanCopiedEvent {
    pub timestamp: SystemTime,
    pub plan_index: PlanIndex,
    pub target_plan_index: PlanIndex,
}

pub struct ActivePlanChangedEvent {
    pub timestamp: SystemTime,
    pub plan_index: PlanIndex,
}

pub struct LegChangeEvent {
    pub timestamp: SystemTime,
    pub plan_index: PlanIndex,
    pub segment_index: u32,
    pub segment_leg_index: u32,
    pub change_type: PlanChangeType,
    pub leg: LegDefinition,
}

pub struct SegmentChangeEvent {
    pub timestamp: SystemTime,
    pub plan_index: PlanIndex,
    pub segment_index: u32,
    pub change_type: PlanChangeType,
    pub segment: Option<FlightPlanSegment>,
}

pub struct ActiveLegChangeEvent {
    pub timestamp: SystemTime,
    pub plan_index: PlanIndex,
    pub change: ActiveLegChange,
}

pub struct CalculatedEvent {
    pub timestamp: SystemTime,
    pub plan_index: PlanIndex,
    pub start_leg: Option<u32>,
}

pub struct OriginDestChangeEvent {
    pub timestamp: SystemTime,
    pub plan_index: PlanIndex,
    pub change_type: OriginDestChangeType,
    pub airport: Option<String>,
}

pub struct ProcedureDetailsChangeEvent {
    pub timestamp: SystemTime,
    pub plan_index: PlanIndex,
    pub details: ProcedureDetails,
}

pub struct UserDataSetEvent {
    pub timestamp: SystemTime,
    pub plan_index: PlanIndex,
    pub key: String,
    pub datum: UserDatum,
}

pub struct UserDataDeleteEvent {
    pub timestamp: SystemTime,
    pub plan_index: PlanIndex,
    pub key: String,
}

pub struct DirectToDataChangeEvent {
    pub timestamp: SystemTime,
    pub plan_index: PlanIndex,
    pub direct_to_data: DirectToData,
}

pub struct ReceiveSyncRequestEvent {
    pub timestamp: SystemTime,
    pub origin: ReplicaId,
}

pub struct SendSyncResponseEvent {
    pub timestamp: SystemTime,
    /// Number of populated slots in the response.
    pub plans: usize,
    pub active_plan_index: PlanIndex,
}

/// A bootstrap response was applied.
pub struct PlanSetSyncedEvent {
    pub timestamp: SystemTime,
    pub origin: ReplicaId,
    pub plans_loaded: usize,
    pub active_plan_index: PlanIndex,
}
