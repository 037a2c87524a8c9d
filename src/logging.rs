/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Functions that log out events.
//!
//! The logs defined in this module are printed if the user enabled them via the planner's
//! [config](crate::replica::Configuration).
//!
//! The flight planner logs using the [log](https://docs.rs/log/latest/log/) crate. To get these
//! messages printed onto a terminal or to a file, set up a
//! [logging implementation](https://docs.rs/log/latest/log/#available-logging-implementations).
//!
//! ## Log message format
//!
//! Log messages are CSVs (Comma Separated Values) with at least two values. The first two values are
//! always:
//! 1. The name of the [event](crate::events) in PascalCase (defined in this module as constants).
//! 2. The time the event was emitted (as number of seconds since the Unix Epoch).
//!
//! The rest of the values differ depending on the kind of event. For example, the following snippet
//! is how a [LegChange](crate::events::LegChangeEvent) is printed:
//!
//! ```text
//! LegChange, 1701329264, 0, 2, 1, Added, KJFK
//! ```
//!
//! In the snippet:
//! - The third value is the slot index of the plan.
//! - The fourth and fifth values are the segment index and the position of the leg in the segment.
//! - The sixth value is the kind of change.
//! - The seventh value is the display name of the leg.
//!
//! Absent optional values are printed as `-`. Replica identifiers are printed as the first seven
//! characters of the Base64 encoding of their little-endian bytes.

use crate::events::*;
use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use log;
use std::time::SystemTime;

// Names of each event in PascalCase for printing:
pub const PLAN_LOADED: &str = "PlanLoaded";
pub const PLAN_CREATED: &str = "PlanCreated";
pub const PLAN_DELETED: &str = "PlanDeleted";
pub const PLAN_COPIED: &str = "PlanCopied";
pub const ACTIVE_PLAN_CHANGED: &str = "ActivePlanChanged";

pub const LEG_CHANGE: &str = "LegChange";
pub const SEGMENT_CHANGE: &str = "SegmentChange";
pub const ACTIVE_LEG_CHANGE: &str = "ActiveLegChange";
pub const CALCULATED: &str = "Calculated";
pub const ORIGIN_DEST_CHANGE: &str = "OriginDestChange";
pub const PROCEDURE_DETAILS_CHANGE: &str = "ProcedureDetailsChange";
pub const USER_DATA_SET: &str = "UserDataSet";
pub const USER_DATA_DELETE: &str = "UserDataDelete";
pub const DIRECT_TO_DATA_CHANGE: &str = "DirectToDataChange";

pub const RECEIVE_SYNC_REQUEST: &str = "ReceiveSyncRequest";
pub const SEND_SYNC_RESPONSE: &str = "SendSyncResponse";
pub const PLAN_SET_SYNCED: &str = "PlanSetSynced";

/// Implemented by event types. Used to get a closure that logs the event.
pub(crate) trait Logger {
    /// Returns a pointer to the default logging handler for a given event type.
    fn get_logger() -> Box<dyn Fn(&Self) + Send>;
}

impl Logger for PlanLoadedEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |plan_loaded_event: &PlanLoadedEvent| {
            log::info!(
                "{}, {}, {}",
                PLAN_LOADED,
                secs_since_unix_epoch(plan_loaded_event.timestamp),
                plan_loaded_event.plan_index
            )
        };
        Box::new(logger)
    }
}

impl Logger for PlanCreatedEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |plan_created_event: &PlanCreatedEvent| {
            log::info!(
                "{}, {}, {}",
                PLAN_CREATED,
                secs_since_unix_epoch(plan_created_event.timestamp),
                plan_created_event.plan_index
            )
        };
        Box::new(logger)
    }
}

impl Logger for PlanDeletedEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |plan_deleted_event: &PlanDeletedEvent| {
            log::info!(
                "{}, {}, {}",
                PLAN_DELETED,
                secs_since_unix_epoch(plan_deleted_event.timestamp),
                plan_deleted_event.plan_index
            )
        };
        Box::new(logger)
    }
}

impl Logger for PlanCopiedEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |plan_copied_event: &PlanCopiedEvent| {
            log::info!(
                "{}, {}, {}, {}",
                PLAN_COPIED,
                secs_since_unix_epoch(plan_copied_event.timestamp),
                plan_copied_event.plan_index,
                plan_copied_event.target_plan_index
            )
        };
        Box::new(logger)
    }
}

impl Logger for ActivePlanChangedEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |active_plan_changed_event: &ActivePlanChangedEvent| {
            log::info!(
                "{}, {}, {}",
                ACTIVE_PLAN_CHANGED,
                secs_since_unix_epoch(active_plan_changed_event.timestamp),
                active_plan_changed_event.plan_index
            )
        };
        Box::new(logger)
    }
}

impl Logger for LegChangeEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |leg_change_event: &LegChangeEvent| {
            log::info!(
                "{}, {}, {}, {}, {}, {:?}, {}",
                LEG_CHANGE,
                secs_since_unix_epoch(leg_change_event.timestamp),
                leg_change_event.plan_index,
                leg_change_event.segment_index,
                leg_change_event.segment_leg_index,
                leg_change_event.change_type,
                leg_change_event.leg.name
            )
        };
        Box::new(logger)
    }
}

impl Logger for SegmentChangeEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |segment_change_event: &SegmentChangeEvent| {
            log::info!(
                "{}, {}, {}, {}, {:?}",
                SEGMENT_CHANGE,
                secs_since_unix_epoch(segment_change_event.timestamp),
                segment_change_event.plan_index,
                segment_change_event.segment_index,
                segment_change_event.change_type
            )
        };
        Box::new(logger)
    }
}

impl Logger for ActiveLegChangeEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |active_leg_change_event: &ActiveLegChangeEvent| {
            log::info!(
                "{}, {}, {}, {:?}, {}",
                ACTIVE_LEG_CHANGE,
                secs_since_unix_epoch(active_leg_change_event.timestamp),
                active_leg_change_event.plan_index,
                active_leg_change_event.change.leg_type,
                active_leg_change_event.change.index
            )
        };
        Box::new(logger)
    }
}

impl Logger for CalculatedEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |calculated_event: &CalculatedEvent| {
            log::info!(
                "{}, {}, {}, {}",
                CALCULATED,
                secs_since_unix_epoch(calculated_event.timestamp),
                calculated_event.plan_index,
                or_dash(calculated_event.start_leg)
            )
        };
        Box::new(logger)
    }
}

impl Logger for OriginDestChangeEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |origin_dest_change_event: &OriginDestChangeEvent| {
            log::info!(
                "{}, {}, {}, {:?}, {}",
                ORIGIN_DEST_CHANGE,
                secs_since_unix_epoch(origin_dest_change_event.timestamp),
                origin_dest_change_event.plan_index,
                origin_dest_change_event.change_type,
                or_dash(origin_dest_change_event.airport.as_deref())
            )
        };
        Box::new(logger)
    }
}

impl Logger for ProcedureDetailsChangeEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |procedure_details_change_event: &ProcedureDetailsChangeEvent| {
            log::info!(
                "{}, {}, {}",
                PROCEDURE_DETAILS_CHANGE,
                secs_since_unix_epoch(procedure_details_change_event.timestamp),
                procedure_details_change_event.plan_index
            )
        };
        Box::new(logger)
    }
}

impl Logger for UserDataSetEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |user_data_set_event: &UserDataSetEvent| {
            log::info!(
                "{}, {}, {}, {}, {}",
                USER_DATA_SET,
                secs_since_unix_epoch(user_data_set_event.timestamp),
                user_data_set_event.plan_index,
                user_data_set_event.key,
                first_seven_base64_chars(user_data_set_event.datum.bytes())
            )
        };
        Box::new(logger)
    }
}

impl Logger for UserDataDeleteEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |user_data_delete_event: &UserDataDeleteEvent| {
            log::info!(
                "{}, {}, {}, {}",
                USER_DATA_DELETE,
                secs_since_unix_epoch(user_data_delete_event.timestamp),
                user_data_delete_event.plan_index,
                user_data_delete_event.key
            )
        };
        Box::new(logger)
    }
}

impl Logger for DirectToDataChangeEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |direct_to_data_change_event: &DirectToDataChangeEvent| {
            log::info!(
                "{}, {}, {}, {}, {}",
                DIRECT_TO_DATA_CHANGE,
                secs_since_unix_epoch(direct_to_data_change_event.timestamp),
                direct_to_data_change_event.plan_index,
                or_dash(direct_to_data_change_event.direct_to_data.segment_index),
                or_dash(direct_to_data_change_event.direct_to_data.segment_leg_index)
            )
        };
        Box::new(logger)
    }
}

impl Logger for ReceiveSyncRequestEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |receive_sync_request_event: &ReceiveSyncRequestEvent| {
            log::info!(
                "{}, {}, {}",
                RECEIVE_SYNC_REQUEST,
                secs_since_unix_epoch(receive_sync_request_event.timestamp),
                first_seven_base64_chars(&receive_sync_request_event.origin.to_le_bytes())
            )
        };
        Box::new(logger)
    }
}

impl Logger for SendSyncResponseEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |send_sync_response_event: &SendSyncResponseEvent| {
            log::info!(
                "{}, {}, {}, {}",
                SEND_SYNC_RESPONSE,
                secs_since_unix_epoch(send_sync_response_event.timestamp),
                send_sync_response_event.plans,
                send_sync_response_event.active_plan_index
            )
        };
        Box::new(logger)
    }
}

impl Logger for PlanSetSyncedEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |plan_set_synced_event: &PlanSetSyncedEvent| {
            log::info!(
                "{}, {}, {}, {}, {}",
                PLAN_SET_SYNCED,
                secs_since_unix_epoch(plan_set_synced_event.timestamp),
                first_seven_base64_chars(&plan_set_synced_event.origin.to_le_bytes()),
                plan_set_synced_event.plans_loaded,
                plan_set_synced_event.active_plan_index
            )
        };
        Box::new(logger)
    }
}

// Get a more readable representation of a bytesequence by base64-encoding it and taking the first 7 characters.
pub(crate) fn first_seven_base64_chars(bytes: &[u8]) -> String {
    let encoded = STANDARD_NO_PAD.encode(bytes);
    if encoded.len() > 7 {
        encoded[0..7].to_string()
    } else {
        encoded
    }
}

pub(crate) fn secs_since_unix_epoch(timestamp: SystemTime) -> u64 {
    timestamp
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|duration| duration.as_secs())
        .unwrap_or(0)
}

fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |value| value.to_string())
}
