//! Synchronous dispatch of local [events](crate::events) to the handlers registered for them.

use crate::events::*;
use crate::logging::Logger;

pub(crate) type HandlerPtr<T> = Box<dyn Fn(&T) + Send>;

/// Collect the handlers for one event type: the default logger first if `log_events` is set, then the
/// user's handler if one was registered.
pub(crate) fn handlers_for<T: Logger>(
    log_events: bool,
    user_handler: Option<HandlerPtr<T>>,
) -> Vec<HandlerPtr<T>> {
    let mut handlers = Vec::new();
    if log_events {
        handlers.push(T::get_logger());
    }
    if let Some(handler) = user_handler {
        handlers.push(handler);
    }
    handlers
}

pub(crate) struct EventHandlers {
    pub(crate) plan_loaded_handlers: Vec<HandlerPtr<PlanLoadedEvent>>,
    pub(crate) plan_created_handlers: Vec<HandlerPtr<PlanCreatedEvent>>,
    pub(crate) plan_deleted_handlers: Vec<HandlerPtr<PlanDeletedEvent>>,
    pub(crate) plan_copied_handlers: Vec<HandlerPtr<PlanCopiedEvent>>,
    pub(crate) active_plan_changed_handlers: Vec<HandlerPtr<ActivePlanChangedEvent>>,
    pub(crate) leg_change_handlers: Vec<HandlerPtr<LegChangeEvent>>,
    pub(crate) segment_change_handlers: Vec<HandlerPtr<SegmentChangeEvent>>,
    pub(crate) active_leg_change_handlers: Vec<HandlerPtr<ActiveLegChangeEvent>>,
    pub(crate) calculated_handlers: Vec<HandlerPtr<CalculatedEvent>>,
    pub(crate) origin_dest_change_handlers: Vec<HandlerPtr<OriginDestChangeEvent>>,
    pub(crate) procedure_details_change_handlers: Vec<HandlerPtr<ProcedureDetailsChangeEvent>>,
    pub(crate) user_data_set_handlers: Vec<HandlerPtr<UserDataSetEvent>>,
    pub(crate) user_data_delete_handlers: Vec<HandlerPtr<UserDataDeleteEvent>>,
    pub(crate) direct_to_data_change_handlers: Vec<HandlerPtr<DirectToDataChangeEvent>>,
    pub(crate) receive_sync_request_handlers: Vec<HandlerPtr<ReceiveSyncRequestEvent>>,
    pub(crate) send_sync_response_handlers: Vec<HandlerPtr<SendSyncResponseEvent>>,
    pub(crate) plan_set_synced_handlers: Vec<HandlerPtr<PlanSetSyncedEvent>>,
}

impl EventHandlers {
    pub fn fire_handlers(&self, event: Event) {
        match event {
            Event::PlanLoaded(plan_loaded_event) =>
                self.plan_loaded_handlers.iter().for_each(|handler| handler(&plan_loaded_event)),

            Event::PlanCreated(plan_created_event) =>
                self.plan_created_handlers.iter().for_each(|handler| handler(&plan_created_event)),

            Event::PlanDeleted(plan_deleted_event) =>
                self.plan_deleted_handlers.iter().for_each(|handler| handler(&plan_deleted_event)),

            Event::PlanCopied(plan_copied_event) =>
                self.plan_copied_handlers.iter().for_each(|handler| handler(&plan_copied_event)),

            Event::ActivePlanChanged(active_plan_changed_event) =>
                self.active_plan_changed_handlers.iter().for_each(|handler| handler(&active_plan_changed_event)),

            Event::LegChange(leg_change_event) =>
                self.leg_change_handlers.iter().for_each(|handler| handler(&leg_change_event)),

            Event::SegmentChange(segment_change_event) =>
                self.segment_change_handlers.iter().for_each(|handler| handler(&segment_change_event)),

            Event::ActiveLegChange(active_leg_change_event) =>
                self.active_leg_change_handlers.iter().for_each(|handler| handler(&active_leg_change_event)),

            Event::Calculated(calculated_event) =>
                self.calculated_handlers.iter().for_each(|handler| handler(&calculated_event)),

            Event::OriginDestChange(origin_dest_change_event) =>
                self.origin_dest_change_handlers.iter().for_each(|handler| handler(&origin_dest_change_event)),

            Event::ProcedureDetailsChange(procedure_details_change_event) =>
                self.procedure_details_change_handlers.iter().for_each(|handler| handler(&procedure_details_change_event)),

            Event::UserDataSet(user_data_set_event) =>
                self.user_data_set_handlers.iter().for_each(|handler| handler(&user_data_set_event)),

            Event::UserDataDelete(user_data_delete_event) =>
                self.user_data_delete_handlers.iter().for_each(|handler| handler(&user_data_delete_event)),

            Event::DirectToDataChange(direct_to_data_change_event) =>
                self.direct_to_data_change_handlers.iter().for_each(|handler| handler(&direct_to_data_change_event)),

            Event::ReceiveSyncRequest(receive_sync_request_event) =>
                self.receive_sync_request_handlers.iter().for_each(|handler| handler(&receive_sync_request_event)),

            Event::SendSyncResponse(send_sync_response_event) =>
                self.send_sync_response_handlers.iter().for_each(|handler| handler(&send_sync_response_event)),

            Event::PlanSetSynced(plan_set_synced_event) =>
                self.plan_set_synced_handlers.iter().for_each(|handler| handler(&plan_set_synced_event)),
        }
    }
}
