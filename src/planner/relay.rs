//! Outbound half of replication: turning the mutations plans report through their hooks into sync
//! messages and local events.

use std::time::SystemTime;

use super::FlightPlanner;
use crate::bus::{messages::*, EventBus};
use crate::events::*;
use crate::flight_plan::hooks::PlanChange;
use crate::types::data_types::PlanIndex;

impl<B: EventBus> FlightPlanner<B> {
    /// Drain the mutations plans have reported since the last flush, republishing and announcing
    /// those made with `notify = true`, in the order they were made.
    ///
    /// Mutations made with `notify = false` are dropped here. Those are either deliberately silent, or
    /// the application of a remote message, which announces itself locally.
    pub(crate) fn flush_plan_changes(&mut self) {
        while let Ok(mutation) = self.plan_changes.try_recv() {
            if !mutation.notify {
                continue;
            }
            let message = sync_message_for(mutation.plan_index, mutation.change);
            match local_event_for(&message) {
                Some(event) => self.send_event(Some(message), event),
                None => self.publisher.publish(message),
            }
        }
    }
}

/// The sync message that replicates `change` to slot `plan_index` on other replicas.
pub(super) fn sync_message_for(plan_index: PlanIndex, change: PlanChange) -> SyncMessage {
    match change {
        PlanChange::Leg {
            segment_index,
            segment_leg_index,
            change_type,
            leg,
        } => LegChangeMessage {
            plan_index,
            segment_index,
            segment_leg_index,
            change_type,
            leg,
        }
        .into(),
        PlanChange::Segment {
            segment_index,
            change_type,
            segment,
            leaves_gap,
        } => SegmentChangeMessage {
            plan_index,
            segment_index,
            change_type,
            segment,
            leaves_gap,
        }
        .into(),
        PlanChange::ActiveLeg(change) => ActiveLegChangeMessage { plan_index, change }.into(),
        PlanChange::Calculated { start_leg } => CalculatedMessage {
            plan_index,
            start_leg,
        }
        .into(),
        PlanChange::OriginDest {
            change_type,
            airport,
        } => OriginDestMessage {
            plan_index,
            change_type,
            airport,
        }
        .into(),
        PlanChange::ProcedureDetails(details) => ProcedureDetailsMessage {
            plan_index,
            details,
        }
        .into(),
        PlanChange::UserDataSet { key, datum } => UserDataSetMessage {
            plan_index,
            key,
            datum,
        }
        .into(),
        PlanChange::UserDataDelete { key } => UserDataDeleteMessage { plan_index, key }.into(),
        PlanChange::DirectToData(direct_to_data) => DirectToDataMessage {
            plan_index,
            direct_to_data,
        }
        .into(),
    }
}

/// The local event announcing that the mutation carried by `message` has been applied here. `None`
/// for the bootstrap messages, which are announced by events of their own.
pub(super) fn local_event_for(message: &SyncMessage) -> Option<Event> {
    let timestamp = SystemTime::now();
    let event = match message {
        SyncMessage::PlanSetRequest | SyncMessage::PlanSetResponse(_) => return None,
        SyncMessage::Created(msg) => Event::PlanCreated(PlanCreatedEvent {
            timestamp,
            plan_index: msg.plan_index,
        }),
        SyncMessage::Deleted(msg) => Event::PlanDeleted(PlanDeletedEvent {
            timestamp,
            plan_index: msg.plan_index,
        }),
        SyncMessage::IndexChanged(msg) => Event::ActivePlanChanged(ActivePlanChangedEvent {
            timestamp,
            plan_index: msg.plan_index,
        }),
        SyncMessage::Copied(msg) => Event::PlanCopied(PlanCopiedEvent {
            timestamp,
            plan_index: msg.plan_index,
            target_plan_index: msg.target_plan_index,
        }),
        SyncMessage::LegChange(msg) => Event::LegChange(LegChangeEvent {
            timestamp,
            plan_index: msg.plan_index,
            segment_index: msg.segment_index,
            segment_leg_index: msg.segment_leg_index,
            change_type: msg.change_type,
            leg: msg.leg.clone(),
        }),
        SyncMessage::SegmentChange(msg) => Event::SegmentChange(SegmentChangeEvent {
            timestamp,
            plan_index: msg.plan_index,
            segment_index: msg.segment_index,
            change_type: msg.change_type,
            segment: msg.segment.clone(),
        }),
        SyncMessage::ActiveLegChange(msg) => Event::ActiveLegChange(ActiveLegChangeEvent {
            timestamp,
            plan_index: msg.plan_index,
            change: msg.change,
        }),
        SyncMessage::Calculated(msg) => Event::Calculated(CalculatedEvent {
            timestamp,
            plan_index: msg.plan_index,
            start_leg: msg.start_leg,
        }),
        SyncMessage::OriginDestChanged(msg) => Event::OriginDestChange(OriginDestChangeEvent {
            timestamp,
            plan_index: msg.plan_index,
            change_type: msg.change_type,
            airport: msg.airport.clone(),
        }),
        SyncMessage::ProcedureDetailsChanged(msg) => {
            Event::ProcedureDetailsChange(ProcedureDetailsChangeEvent {
                timestamp,
                plan_index: msg.plan_index,
                details: msg.details.clone(),
            })
        }
        SyncMessage::UserDataSet(msg) => Event::UserDataSet(UserDataSetEvent {
            timestamp,
            plan_index: msg.plan_index,
            key: msg.key.clone(),
            datum: msg.datum.clone(),
        }),
        SyncMessage::UserDataDelete(msg) => Event::UserDataDelete(UserDataDeleteEvent {
            timestamp,
            plan_index: msg.plan_index,
            key: msg.key.clone(),
        }),
        SyncMessage::DirectToDataChanged(msg) => {
            Event::DirectToDataChange(DirectToDataChangeEvent {
                timestamp,
                plan_index: msg.plan_index,
                direct_to_data: msg.direct_to_data,
            })
        }
    };
    Some(event)
}
