/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Messages that planners exchange over the [`EventBus`](super::EventBus).
//!
//! Every message is sent wrapped in a [`SyncEnvelope`] that names the replica that sent it. Every
//! message type has a topic name. On transports organised by topic, the message travels on the
//! topic's sync twin, the topic name with [`SYNC_TOPIC_PREFIX`] in front.

use std::io;

use borsh::{BorshDeserialize, BorshSerialize};

use crate::flight_plan::FlightPlanSnapshot;
use crate::types::{
    data_types::{PlanIndex, ReplicaId, UserDatum},
    leg::LegDefinition,
    plan_changes::{ActiveLegChange, OriginDestChangeType, PlanChangeType},
    procedure::{DirectToData, ProcedureDetails},
    segment::FlightPlanSegment,
};

/// Prefix that turns a local topic name into the name of the topic's cross-process twin.
pub const SYNC_TOPIC_PREFIX: &str = "fplsync_";

pub const FPL_REQUEST: &str = "fplRequest";
pub const FPL_RESPONSE: &str = "fplResponse";
pub const FPL_CREATED: &str = "fplCreated";
pub const FPL_DELETED: &str = "fplDeleted";
pub const FPL_ACTIVE_LEG_CHANGE: &str = "fplActiveLegChange";
pub const FPL_LEG_CHANGE: &str = "fplLegChange";
pub const FPL_SEGMENT_CHANGE: &str = "fplSegmentChange";
pub const FPL_CALCULATED: &str = "fplCalculated";
pub const FPL_ORIGIN_DEST_CHANGED: &str = "fplOriginDestChanged";
pub const FPL_PROC_DETAILS_CHANGED: &str = "fplProcDetailsChanged";
pub const FPL_INDEX_CHANGED: &str = "fplIndexChanged";
pub const FPL_COPIED: &str = "fplCopied";
pub const FPL_USER_DATA_SET: &str = "fplUserDataSet";
pub const FPL_USER_DATA_DELETE: &str = "fplUserDataDelete";
pub const FPL_DIRECT_TO_DATA_CHANGED: &str = "fplDirectToDataChanged";

/// Local-only topic announcing a plan materialized from a bootstrap response. Never sent over the bus.
pub const FPL_LOADED: &str = "fplLoaded";

/// A [`SyncMessage`] stamped with the identifier of the replica that sent it.
#[derive(Clone, Debug, PartialEq, BorshSerialize, BorshDeserialize)]
pub struct SyncEnvelope {
    pub origin: ReplicaId,
    pub message: SyncMessage,
}

impl SyncEnvelope {
    pub fn new(origin: ReplicaId, message: SyncMessage) -> Self {
        Self { origin, message }
    }

    /// Serialize this envelope for a transport that carries bytes.
    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        self.try_to_vec()
    }

    /// Deserialize an envelope serialized by [`to_bytes`](Self::to_bytes).
    pub fn from_bytes(bytes: &[u8]) -> io::Result<Self> {
        Self::try_from_slice(bytes)
    }
}

#[derive(Clone, Debug, PartialEq, BorshSerialize, BorshDeserialize)]
pub enum SyncMessage {
    PlanSetRequest,
    PlanSetResponse(PlanSetResponse),
    Created(PlanIndexMessage),
    Deleted(PlanIndexMessage),
    ActiveLegChange(ActiveLegChangeMessage),
    LegChange(LegChangeMessage),
    SegmentChange(SegmentChangeMessage),
    Calculated(CalculatedMessage),
    OriginDestChanged(OriginDestMessage),
    ProcedureDetailsChanged(ProcedureDetailsMessage),
    IndexChanged(PlanIndexMessage),
    Copied(PlanCopiedMessage),
    UserDataSet(UserDataSetMessage),
    UserDataDelete(UserDataDeleteMessage),
    DirectToDataChanged(DirectToDataMessage),
}

impl SyncMessage {
    /// The local topic this message belongs to.
    pub fn topic(&self) -> &'static str {
        match self {
            SyncMessage::PlanSetRequest => FPL_REQUEST,
            SyncMessage::PlanSetResponse(_) => FPL_RESPONSE,
            SyncMessage::Created(_) => FPL_CREATED,
            SyncMessage::Deleted(_) => FPL_DELETED,
            SyncMessage::ActiveLegChange(_) => FPL_ACTIVE_LEG_CHANGE,
            SyncMessage::LegChange(_) => FPL_LEG_CHANGE,
            SyncMessage::SegmentChange(_) => FPL_SEGMENT_CHANGE,
            SyncMessage::Calculated(_) => FPL_CALCULATED,
            SyncMessage::OriginDestChanged(_) => FPL_ORIGIN_DEST_CHANGED,
            SyncMessage::ProcedureDetailsChanged(_) => FPL_PROC_DETAILS_CHANGED,
            SyncMessage::IndexChanged(_) => FPL_INDEX_CHANGED,
            SyncMessage::Copied(_) => FPL_COPIED,
            SyncMessage::UserDataSet(_) => FPL_USER_DATA_SET,
            SyncMessage::UserDataDelete(_) => FPL_USER_DATA_DELETE,
            SyncMessage::DirectToDataChanged(_) => FPL_DIRECT_TO_DATA_CHANGED,
        }
    }

    /// The cross-process topic this message travels on, e.g. `fplsync_fplCreated`.
    pub fn sync_topic(&self) -> String {
        format!("{}{}", SYNC_TOPIC_PREFIX, self.topic())
    }

    /// The slot this message is about. `None` for the bootstrap messages, which are about every slot.
    pub fn plan_index(&self) -> Option<PlanIndex> {
        match self {
            SyncMessage::PlanSetRequest | SyncMessage::PlanSetResponse(_) => None,
            SyncMessage::Created(msg) | SyncMessage::Deleted(msg) | SyncMessage::IndexChanged(msg) => {
                Some(msg.plan_index)
            }
            SyncMessage::ActiveLegChange(msg) => Some(msg.plan_index),
            SyncMessage::LegChange(msg) => Some(msg.plan_index),
            SyncMessage::SegmentChange(msg) => Some(msg.plan_index),
            SyncMessage::Calculated(msg) => Some(msg.plan_index),
            SyncMessage::OriginDestChanged(msg) => Some(msg.plan_index),
            SyncMessage::ProcedureDetailsChanged(msg) => Some(msg.plan_index),
            SyncMessage::Copied(msg) => Some(msg.plan_index),
            SyncMessage::UserDataSet(msg) => Some(msg.plan_index),
            SyncMessage::UserDataDelete(msg) => Some(msg.plan_index),
            SyncMessage::DirectToDataChanged(msg) => Some(msg.plan_index),
        }
    }
}

/// Every populated slot of the responding replica, plus its active slot.
#[derive(Clone, Debug, PartialEq, BorshSerialize, BorshDeserialize)]
pub struct PlanSetResponse {
    /// Snapshots of the populated slots, in ascending slot order.
    pub plans: Vec<(PlanIndex, FlightPlanSnapshot)>,
    pub active_plan_index: PlanIndex,
}

/// Payload of the messages that only name a slot: created, deleted, and index changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct PlanIndexMessage {
    pub plan_index: PlanIndex,
}

#[derive(Clone, Debug, PartialEq, BorshSerialize, BorshDeserialize)]
pub struct LegChangeMessage {
    pub plan_index: PlanIndex,
    pub segment_index: u32,
    pub segment_leg_index: u32,
    pub change_type: PlanChangeType,
    pub leg: LegDefinition,
}

#[derive(Clone, Debug, PartialEq, BorshSerialize, BorshDeserialize)]
pub struct SegmentChangeMessage {
    pub plan_index: PlanIndex,
    pub segment_index: u32,
    pub change_type: PlanChangeType,
    pub segment: Option<FlightPlanSegment>,
    /// On a removal, whether the segment's position was left empty instead of closed up.
    pub leaves_gap: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct ActiveLegChangeMessage {
    pub plan_index: PlanIndex,
    pub change: ActiveLegChange,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct CalculatedMessage {
    pub plan_index: PlanIndex,
    /// Global index of the leg the calculation started from. `None` means the active calculating leg.
    pub start_leg: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct OriginDestMessage {
    pub plan_index: PlanIndex,
    pub change_type: OriginDestChangeType,
    pub airport: Option<String>,
}

#[derive(Clone, Debug, PartialEq, BorshSerialize, BorshDeserialize)]
pub struct ProcedureDetailsMessage {
    pub plan_index: PlanIndex,
    pub details: ProcedureDetails,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct PlanCopiedMessage {
    /// The slot copied from.
    pub plan_index: PlanIndex,
    pub target_plan_index: PlanIndex,
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct UserDataSetMessage {
    pub plan_index: PlanIndex,
    pub key: String,
    pub datum: UserDatum,
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct UserDataDeleteMessage {
    pub plan_index: PlanIndex,
    pub key: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct DirectToDataMessage {
    pub plan_index: PlanIndex,
    pub direct_to_data: DirectToData,
}

impl From<PlanSetResponse> for SyncMessage {
    fn from(value: PlanSetResponse) -> Self {
        SyncMessage::PlanSetResponse(value)
    }
}

impl From<ActiveLegChangeMessage> for SyncMessage {
    fn from(value: ActiveLegChangeMessage) -> Self {
        SyncMessage::ActiveLegChange(value)
    }
}

impl From<LegChangeMessage> for SyncMessage {
    fn from(value: LegChangeMessage) -> Self {
        SyncMessage::LegChange(value)
    }
}

impl From<SegmentChangeMessage> for SyncMessage {
    fn from(value: SegmentChangeMessage) -> Self {
        SyncMessage::SegmentChange(value)
    }
}

impl From<CalculatedMessage> for SyncMessage {
    fn from(value: CalculatedMessage) -> Self {
        SyncMessage::Calculated(value)
    }
}

impl From<OriginDestMessage> for SyncMessage {
    fn from(value: OriginDestMessage) -> Self {
        SyncMessage::OriginDestChanged(value)
    }
}

impl From<ProcedureDetailsMessage> for SyncMessage {
    fn from(value: ProcedureDetailsMessage) -> Self {
        SyncMessage::ProcedureDetailsChanged(value)
    }
}

impl From<PlanCopiedMessage> for SyncMessage {
    fn from(value: PlanCopiedMessage) -> Self {
        SyncMessage::Copied(value)
    }
}

impl From<UserDataSetMessage> for SyncMessage {
    fn from(value: UserDataSetMessage) -> Self {
        SyncMessage::UserDataSet(value)
    }
}

impl From<UserDataDeleteMessage> for SyncMessage {
    fn from(value: UserDataDeleteMessage) -> Self {
        SyncMessage::UserDataDelete(value)
    }
}

impl From<DirectToDataMessage> for SyncMessage {
    fn from(value: DirectToDataMessage) -> Self {
        SyncMessage::DirectToDataChanged(value)
    }
}
