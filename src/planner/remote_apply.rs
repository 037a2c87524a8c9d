/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Inbound half of replication: applying sync messages published by other replicas.
//!
//! Every mutation arriving from the bus is applied with `notify = false`, so that it is not
//! republished, and then announced locally. Messages about empty slots are dropped.

use super::{relay::local_event_for, FlightPlanner};
use crate::bus::{messages::*, EventBus};
use crate::flight_plan::FlightPlanError;
use crate::types::{
    data_types::PlanIndex,
    plan_changes::{ActiveLegType, OriginDestChangeType, PlanChangeType},
    segment::SegmentType,
};

impl<B: EventBus> FlightPlanner<B> {
    pub(crate) fn on_sync_envelope(&mut self, envelope: SyncEnvelope) {
        if envelope.origin == self.replica_id() {
            log::trace!("dropping echo of {}", envelope.message.sync_topic());
            return;
        }

        match envelope.message {
            SyncMessage::PlanSetRequest => self.on_plan_set_request(envelope.origin),
            SyncMessage::PlanSetResponse(response) => {
                self.on_plan_set_response(envelope.origin, response)
            }
            SyncMessage::Created(msg) => self.on_plan_created(msg.plan_index),
            SyncMessage::Deleted(msg) => self.on_plan_deleted(msg.plan_index),
            SyncMessage::IndexChanged(msg) => self.on_plan_index_changed(msg.plan_index),
            SyncMessage::Copied(msg) => self.on_plan_copied(msg),
            SyncMessage::Calculated(msg) => self.on_calculated(msg),
            message => self.on_plan_change(message),
        }

        // Drop the silent hook reports the application produced.
        self.flush_plan_changes();
    }

    fn on_plan_created(&mut self, plan_index: PlanIndex) {
        if self.create_plan(plan_index) {
            self.announce(&SyncMessage::Created(PlanIndexMessage { plan_index }));
        }
    }

    fn on_plan_deleted(&mut self, plan_index: PlanIndex) {
        if self.remove_plan(plan_index) {
            self.announce(&SyncMessage::Deleted(PlanIndexMessage { plan_index }));
        }
    }

    fn on_plan_index_changed(&mut self, plan_index: PlanIndex) {
        if self.point_active_plan(plan_index) {
            self.announce(&SyncMessage::IndexChanged(PlanIndexMessage { plan_index }));
        }
    }

    fn on_plan_copied(&mut self, msg: PlanCopiedMessage) {
        if self.copy_plan(msg.plan_index, msg.target_plan_index) {
            self.announce(&msg.into());
        } else {
            self.log_missing_plan(msg.plan_index, FPL_COPIED);
        }
    }

    /// Recalculate as told. The local event waits for the result.
    fn on_calculated(&mut self, msg: CalculatedMessage) {
        if let Some(plan) = self.plan_for_message(msg.plan_index, FPL_CALCULATED) {
            plan.calculate(msg.start_leg, false);
        }
    }

    fn on_plan_change(&mut self, message: SyncMessage) {
        let plan_index = match message.plan_index() {
            Some(plan_index) => plan_index,
            None => return,
        };
        let plan = match self.plan_for_message(plan_index, message.topic()) {
            Some(plan) => plan,
            None => return,
        };

        let applied: Result<(), FlightPlanError> = match &message {
            SyncMessage::LegChange(msg) => match msg.change_type {
                PlanChangeType::Added | PlanChangeType::Inserted => plan
                    .add_leg(
                        msg.segment_index,
                        msg.leg.leg.clone(),
                        Some(msg.segment_leg_index),
                        msg.leg.flags,
                        false,
                    )
                    .map(|_| ()),
                PlanChangeType::Removed => plan
                    .remove_leg(msg.segment_index, Some(msg.segment_leg_index), false)
                    .map(|_| ()),
                PlanChangeType::Changed => plan.set_leg_vertical_data(
                    msg.segment_index,
                    msg.segment_leg_index,
                    msg.leg.vertical_data.clone(),
                    false,
                ),
            },
            SyncMessage::SegmentChange(msg) => {
                let (segment_type, airway) = match &msg.segment {
                    Some(segment) => (segment.segment_type, segment.airway.clone()),
                    None => (SegmentType::default(), None),
                };
                match msg.change_type {
                    PlanChangeType::Added => {
                        plan.add_segment(msg.segment_index, segment_type, airway, false);
                        Ok(())
                    }
                    PlanChangeType::Inserted => {
                        plan.insert_segment(msg.segment_index, segment_type, airway, false);
                        Ok(())
                    }
                    PlanChangeType::Removed if msg.leaves_gap => {
                        plan.delete_segment(msg.segment_index, false);
                        Ok(())
                    }
                    PlanChangeType::Removed => {
                        plan.remove_segment(msg.segment_index, false);
                        Ok(())
                    }
                    PlanChangeType::Changed => plan.set_airway(msg.segment_index, airway, false),
                }
            }
            SyncMessage::ActiveLegChange(msg) => {
                let change = msg.change;
                match change.leg_type {
                    ActiveLegType::Lateral => plan.set_lateral_leg(change.index, false),
                    ActiveLegType::Vertical => plan.set_vertical_leg(change.index, false),
                    ActiveLegType::Calculating => plan.set_calculating_leg(change.index, false),
                }
                Ok(())
            }
            SyncMessage::OriginDestChanged(msg) => {
                match (msg.change_type, msg.airport.clone()) {
                    (OriginDestChangeType::OriginAdded, Some(airport)) => {
                        plan.set_origin_airport(airport, false)
                    }
                    (OriginDestChangeType::DestinationAdded, Some(airport)) => {
                        plan.set_destination_airport(airport, false)
                    }
                    (OriginDestChangeType::OriginRemoved, _) => plan.remove_origin_airport(false),
                    (OriginDestChangeType::DestinationRemoved, _) => {
                        plan.remove_destination_airport(false)
                    }
                    (change_type, None) => {
                        log::warn!(
                            "ignoring {:?} without an airport for plan {}",
                            change_type,
                            plan_index
                        );
                        return;
                    }
                }
                Ok(())
            }
            SyncMessage::ProcedureDetailsChanged(msg) => {
                plan.set_procedure_details(msg.details.clone(), false);
                Ok(())
            }
            SyncMessage::UserDataSet(msg) => {
                plan.set_user_data(msg.key.clone(), msg.datum.clone(), false);
                Ok(())
            }
            SyncMessage::UserDataDelete(msg) => {
                plan.delete_user_data(&msg.key, false);
                Ok(())
            }
            SyncMessage::DirectToDataChanged(msg) => {
                plan.set_direct_to_data(msg.direct_to_data, false);
                Ok(())
            }
            _ => return,
        };

        match applied {
            Ok(()) => self.announce(&message),
            Err(error) => log::warn!(
                "could not apply {} to plan {}: {:?}",
                message.topic(),
                plan_index,
                error
            ),
        }
    }

    /// Fire the local event for a remote message that has been applied.
    fn announce(&self, message: &SyncMessage) {
        if let Some(event) = local_event_for(message) {
            self.event_handlers.fire_handlers(event);
        }
    }
}
