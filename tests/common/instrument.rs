use std::sync::{Arc, Mutex};

use flightplan_sync::{
    planner::FlightPlanner,
    replica::{Configuration, FlightPlannerSpec},
    types::data_types::ReplicaId,
};

use super::{
    bus::{BusStub, MockBus},
    calculator::StraightLineCalculator,
};

/// A planner attached to a [`MockBus`], with handlers that record a short description of every local
/// event it emits.
pub(crate) struct Instrument {
    pub(crate) planner: FlightPlanner<BusStub>,
    pub(crate) calculator: StraightLineCalculator,
    events: Arc<Mutex<Vec<String>>>,
}

impl Instrument {
    pub(crate) fn start(bus: &MockBus, id: u64) -> Instrument {
        Instrument::start_with_calculator(bus, id, StraightLineCalculator::new())
    }

    pub(crate) fn start_with_calculator(
        bus: &MockBus,
        id: u64,
        calculator: StraightLineCalculator,
    ) -> Instrument {
        let events = Arc::new(Mutex::new(Vec::new()));
        let record = |events: &Arc<Mutex<Vec<String>>>| {
            let events = events.clone();
            move |description: String| events.lock().unwrap().push(description)
        };

        let configuration = Configuration::builder()
            .me(ReplicaId::new(id))
            .log_events(true)
            .build();

        let on_plan_loaded = record(&events);
        let on_plan_created = record(&events);
        let on_plan_deleted = record(&events);
        let on_plan_copied = record(&events);
        let on_active_plan_changed = record(&events);
        let on_leg_change = record(&events);
        let on_segment_change = record(&events);
        let on_active_leg_change = record(&events);
        let on_calculated = record(&events);
        let on_origin_dest_change = record(&events);
        let on_procedure_details_change = record(&events);
        let on_user_data_set = record(&events);
        let on_user_data_delete = record(&events);
        let on_direct_to_data_change = record(&events);
        let on_plan_set_synced = record(&events);

        let planner = FlightPlannerSpec::builder()
            .bus(bus.attach())
            .calculator(calculator.clone())
            .configuration(configuration)
            .on_plan_loaded(move |event| on_plan_loaded(format!("PlanLoaded {}", event.plan_index)))
            .on_plan_created(move |event| on_plan_created(format!("PlanCreated {}", event.plan_index)))
            .on_plan_deleted(move |event| on_plan_deleted(format!("PlanDeleted {}", event.plan_index)))
            .on_plan_copied(move |event| {
                on_plan_copied(format!(
                    "PlanCopied {} {}",
                    event.plan_index, event.target_plan_index
                ))
            })
            .on_active_plan_changed(move |event| {
                on_active_plan_changed(format!("ActivePlanChanged {}", event.plan_index))
            })
            .on_leg_change(move |event| {
                on_leg_change(format!(
                    "LegChange {} {} {} {:?}",
                    event.plan_index, event.segment_index, event.segment_leg_index, event.change_type
                ))
            })
            .on_segment_change(move |event| {
                on_segment_change(format!(
                    "SegmentChange {} {} {:?}",
                    event.plan_index, event.segment_index, event.change_type
                ))
            })
            .on_active_leg_change(move |event| {
                on_active_leg_change(format!(
                    "ActiveLegChange {} {:?} {}",
                    event.plan_index, event.change.leg_type, event.change.index
                ))
            })
            .on_calculated(move |event| on_calculated(format!("Calculated {}", event.plan_index)))
            .on_origin_dest_change(move |event| {
                on_origin_dest_change(format!(
                    "OriginDestChange {} {:?}",
                    event.plan_index, event.change_type
                ))
            })
            .on_procedure_details_change(move |event| {
                on_procedure_details_change(format!("ProcedureDetailsChange {}", event.plan_index))
            })
            .on_user_data_set(move |event| {
                on_user_data_set(format!("UserDataSet {} {}", event.plan_index, event.key))
            })
            .on_user_data_delete(move |event| {
                on_user_data_delete(format!("UserDataDelete {} {}", event.plan_index, event.key))
            })
            .on_direct_to_data_change(move |event| {
                on_direct_to_data_change(format!("DirectToDataChange {}", event.plan_index))
            })
            .on_plan_set_synced(move |event| {
                on_plan_set_synced(format!(
                    "PlanSetSynced {} {}",
                    event.plans_loaded, event.active_plan_index
                ))
            })
            .build()
            .start();

        Instrument {
            planner,
            calculator,
            events,
        }
    }

    /// Take the descriptions of every event recorded since the last call.
    pub(crate) fn take_events(&self) -> Vec<String> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }
}
