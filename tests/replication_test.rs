use std::time::Duration;

use flightplan_sync::{
    bus::{
        messages::{
            ActiveLegChangeMessage, CalculatedMessage, DirectToDataMessage, LegChangeMessage,
            OriginDestMessage, PlanCopiedMessage, PlanIndexMessage, ProcedureDetailsMessage,
            SegmentChangeMessage, SyncEnvelope, SyncMessage, UserDataDeleteMessage,
            UserDataSetMessage,
        },
        EventBus,
    },
    flight_plan::default_leg_name,
    planner::FlightPlannerError,
    types::{
        data_types::{PlanIndex, ReplicaId, UserDatum},
        leg::{FlightPlanLeg, LegDefinition, LegDefinitionFlags, LegType, VerticalData},
        plan_changes::{ActiveLegChange, ActiveLegType, OriginDestChangeType, PlanChangeType},
        procedure::{DirectToData, ProcedureDetails},
        segment::SegmentType,
    },
};
use log::LevelFilter;

mod common;

use common::{bus::MockBus, instrument::Instrument, logging::setup_logger};

fn waypoint(ident: &str) -> FlightPlanLeg {
    FlightPlanLeg::new(LegType::TF, format!("W    K1{:<4} ", ident))
}

/// Tests the plain lifecycle of a plan as seen from the bus and from a second instrument.
///
/// Instrument A creates a plan, gives it a segment and a leg, and deletes it. The bus must carry
/// exactly the four matching sync messages, and instrument B must replay the four matching events.
#[test]
fn plan_lifecycle_is_replicated_test() {
    setup_logger(LevelFilter::Trace);

    // 1. Start two instruments on one bus, with a spy listening in.
    let bus = MockBus::new();
    let spy = bus.spy();
    let mut a = Instrument::start(&bus, 1);
    let mut b = Instrument::start(&bus, 2);

    // 2. Build up and tear down a plan on A.
    let plan_index = PlanIndex::new(0);
    a.planner.create_flight_plan(plan_index);
    a.planner
        .with_flight_plan(plan_index, |plan| {
            plan.add_segment(0, SegmentType::Enroute, None, true);
            plan.add_leg(0, waypoint("WPT1"), None, LegDefinitionFlags::NONE, true)
        })
        .unwrap()
        .unwrap();
    a.planner.delete_flight_plan(plan_index);

    // 3. Check what went over the bus.
    assert_eq!(
        spy.drain_topics(),
        vec![
            "fplsync_fplCreated",
            "fplsync_fplSegmentChange",
            "fplsync_fplLegChange",
            "fplsync_fplDeleted",
        ]
    );

    // 4. Check that B replays the same lifecycle.
    b.planner.poll();
    assert_eq!(
        b.take_events(),
        vec![
            "PlanCreated 0",
            "SegmentChange 0 0 Added",
            "LegChange 0 0 0 Added",
            "PlanDeleted 0",
        ]
    );
    assert_eq!(a.planner.plan_slot_count(), 0);
    assert_eq!(b.planner.plan_slot_count(), 0);
}

/// Tests that a planner ignores its own messages when the bus hands them back.
#[test]
fn own_messages_are_not_reapplied_test() {
    setup_logger(LevelFilter::Trace);

    let bus = MockBus::new();
    let spy = bus.spy();
    let mut a = Instrument::start(&bus, 1);

    a.planner.create_flight_plan(PlanIndex::new(0));
    a.planner
        .with_flight_plan(PlanIndex::new(0), |plan| {
            plan.add_segment(0, SegmentType::Enroute, None, true);
            plan.add_leg(0, waypoint("WPT1"), None, LegDefinitionFlags::NONE, true)
        })
        .unwrap()
        .unwrap();
    assert_eq!(a.take_events().len(), 3);
    spy.drain();

    // The echoes of all three messages are waiting in A's inbox.
    a.planner.poll();

    assert!(a.take_events().is_empty());
    assert!(spy.drain().is_empty());
    assert_eq!(a.planner.get_flight_plan(PlanIndex::new(0)).unwrap().length(), 1);
}

/// Tests that creating a plan in a populated slot keeps the plan and announces nothing.
#[test]
fn create_is_idempotent_test() {
    let bus = MockBus::new();
    let spy = bus.spy();
    let mut a = Instrument::start(&bus, 1);
    let mut b = Instrument::start(&bus, 2);

    a.planner
        .create_flight_plan(PlanIndex::new(3))
        .add_segment(0, SegmentType::Departure, None, true);
    let plan = a.planner.create_flight_plan(PlanIndex::new(3));
    assert_eq!(plan.segment_count(), 1);

    // Once B holds the plan, creating it there announces nothing either.
    b.planner.poll();
    b.planner.create_flight_plan(PlanIndex::new(3));

    assert_eq!(
        spy.drain_topics(),
        vec!["fplsync_fplCreated", "fplsync_fplSegmentChange"]
    );
    assert_eq!(b.take_events(), vec!["PlanCreated 3", "SegmentChange 3 0 Added"]);
    assert_eq!(a.planner.plan_slot_count(), 4);
    assert_eq!(a.planner.flight_plan_indices(), vec![PlanIndex::new(3)]);
}

/// Tests that the slot table shrinks only when its highest plan goes.
#[test]
fn slot_table_shrinks_from_the_tail_test() {
    let bus = MockBus::new();
    let mut a = Instrument::start(&bus, 1);
    let mut b = Instrument::start(&bus, 2);

    for plan_index in 0..3 {
        a.planner.create_flight_plan(PlanIndex::new(plan_index));
    }
    b.planner.poll();
    assert_eq!(b.planner.plan_slot_count(), 3);

    a.planner.delete_flight_plan(PlanIndex::new(0));
    b.planner.poll();
    assert_eq!(a.planner.plan_slot_count(), 3);
    assert_eq!(b.planner.plan_slot_count(), 3);
    assert!(!b.planner.has_flight_plan(PlanIndex::new(0)));

    a.planner.delete_flight_plan(PlanIndex::new(2));
    b.planner.poll();
    assert_eq!(a.planner.plan_slot_count(), 2);
    assert_eq!(b.planner.plan_slot_count(), 2);

    // Slot 0 is already empty, so this empties the whole table.
    a.planner.delete_flight_plan(PlanIndex::new(1));
    b.planner.poll();
    assert_eq!(a.planner.plan_slot_count(), 0);
    assert_eq!(b.planner.plan_slot_count(), 0);

    // Deleting an empty slot does nothing.
    a.take_events();
    a.planner.delete_flight_plan(PlanIndex::new(7));
    assert!(a.take_events().is_empty());
}

/// Tests that the active slot can only point at a populated slot, whether set locally or remotely.
#[test]
fn active_plan_must_be_populated_test() {
    let bus = MockBus::new();
    let spy = bus.spy();
    let mut a = Instrument::start(&bus, 1);
    let mut rogue = bus.attach();

    // 1. Locally.
    assert!(!a.planner.set_active_plan_index(PlanIndex::new(3)));
    assert_eq!(a.planner.active_plan_index(), PlanIndex::new(0));
    assert!(spy.drain().is_empty());
    assert_eq!(
        a.planner.get_active_flight_plan().err(),
        Some(FlightPlannerError::PlanNotFound {
            plan_index: PlanIndex::new(0)
        })
    );

    // 2. Remotely.
    rogue.publish(SyncEnvelope::new(
        ReplicaId::new(99),
        SyncMessage::IndexChanged(PlanIndexMessage {
            plan_index: PlanIndex::new(3),
        }),
    ));
    a.planner.poll();
    assert_eq!(a.planner.active_plan_index(), PlanIndex::new(0));
    assert!(a.take_events().is_empty());

    // 3. Once the slot is populated, both succeed.
    a.planner.create_flight_plan(PlanIndex::new(3));
    assert!(a.planner.set_active_plan_index(PlanIndex::new(3)));
    assert!(a.planner.has_active_flight_plan());
    assert_eq!(
        spy.drain_topics(),
        vec![
            "fplsync_fplIndexChanged", // published by the rogue stub
            "fplsync_fplCreated",
            "fplsync_fplIndexChanged",
        ]
    );
    assert_eq!(
        a.take_events(),
        vec!["PlanCreated 3", "ActivePlanChanged 3"]
    );
}

/// Tests that a copied plan reports its own mutations under its own slot.
#[test]
fn copied_plan_is_rebound_to_its_slot_test() {
    let bus = MockBus::new();
    let spy = bus.spy();
    let mut a = Instrument::start(&bus, 1);
    let mut b = Instrument::start(&bus, 2);

    // 1. Build plan 0 and copy it to plan 1.
    a.planner
        .with_flight_plan(PlanIndex::new(0), |_| ())
        .unwrap_err();
    a.planner.create_flight_plan(PlanIndex::new(0));
    a.planner
        .with_flight_plan(PlanIndex::new(0), |plan| {
            plan.add_segment(0, SegmentType::Enroute, None, true);
            plan.add_leg(0, waypoint("WPT1"), None, LegDefinitionFlags::NONE, true)
        })
        .unwrap()
        .unwrap();
    a.planner.copy_flight_plan(PlanIndex::new(0), PlanIndex::new(1));
    spy.drain();

    // 2. Mutate the copy.
    a.planner
        .with_flight_plan(PlanIndex::new(1), |plan| {
            plan.add_leg(0, waypoint("WPT2"), None, LegDefinitionFlags::NONE, true)
        })
        .unwrap()
        .unwrap();

    let envelopes = spy.drain();
    assert_eq!(envelopes.len(), 1);
    assert_eq!(envelopes[0].message.plan_index(), Some(PlanIndex::new(1)));

    // 3. B holds both plans, and only the copy has the second leg.
    b.planner.poll();
    assert_eq!(b.planner.get_flight_plan(PlanIndex::new(0)).unwrap().length(), 1);
    assert_eq!(b.planner.get_flight_plan(PlanIndex::new(1)).unwrap().length(), 2);
    assert_eq!(
        b.planner.get_flight_plan(PlanIndex::new(1)).unwrap().plan_index(),
        PlanIndex::new(1)
    );
    assert!(b.take_events().contains(&"PlanCopied 0 1".to_string()));
}

/// Tests that every kind of plan mutation made on one instrument shows up on the other, and that
/// silent mutations stay local.
#[test]
fn plan_mutations_are_replicated_test() {
    setup_logger(LevelFilter::Trace);

    let bus = MockBus::new();
    let mut a = Instrument::start(&bus, 1);
    let mut b = Instrument::start(&bus, 2);
    let plan_index = PlanIndex::new(0);

    a.planner.create_flight_plan(plan_index);
    a.planner
        .with_flight_plan(plan_index, |plan| {
            plan.add_segment(0, SegmentType::Departure, None, true);
            plan.add_segment(1, SegmentType::Enroute, None, true);
            plan.insert_segment(1, SegmentType::Enroute, Some("J80".to_string()), true);
            for ident in ["WPT1", "WPT2"] {
                plan.add_leg(0, waypoint(ident), None, LegDefinitionFlags::NONE, true)
                    .unwrap();
            }
            plan.add_leg(2, waypoint("WPT3"), None, LegDefinitionFlags::NONE, true)
                .unwrap();
            plan.remove_leg(0, Some(0), true).unwrap();
            plan.set_lateral_leg(1, true);
            plan.set_origin_airport("A      KJFK ", true);
            plan.set_destination_airport("A      KBOS ", true);
            plan.set_departure(Some("P  KJFK KJFK".to_string()), Some(2), None, Some(1), true);
            plan.set_user_data("cruise", UserDatum::from("FL350"), true);
            plan.set_user_data("scratch", UserDatum::from("local"), false);
            plan.set_direct_to_leg(Some(1), true);
        })
        .unwrap();

    b.planner.poll();

    let remote = b.planner.get_flight_plan(plan_index).unwrap();
    let local = a.planner.get_flight_plan(plan_index).unwrap();
    assert_eq!(remote.length(), 2);
    assert_eq!(remote.get_segment(1).unwrap().airway.as_deref(), Some("J80"));
    assert_eq!(remote.get_leg(0, 0).unwrap().name, "WPT2");
    assert_eq!(remote.active_leg(ActiveLegType::Lateral), 1);
    assert_eq!(remote.origin_airport(), Some("A      KJFK "));
    assert_eq!(remote.procedure_details().departure_index, Some(2));
    assert_eq!(remote.get_user_data("cruise"), Some(&UserDatum::from("FL350")));
    assert_eq!(remote.get_user_data("scratch"), None);
    assert_eq!(local.get_user_data("scratch"), Some(&UserDatum::from("local")));
    assert_eq!(remote.direct_to_data(), local.direct_to_data());

    let events = b.take_events();
    assert!(events.contains(&"SegmentChange 0 1 Inserted".to_string()));
    assert!(events.contains(&"LegChange 0 0 0 Removed".to_string()));
    assert!(events.contains(&"ActiveLegChange 0 Lateral 1".to_string()));
    assert!(events.contains(&format!("OriginDestChange 0 {:?}", OriginDestChangeType::OriginAdded)));
    assert!(events.contains(&"UserDataSet 0 cruise".to_string()));
    assert!(!events.contains(&"UserDataSet 0 scratch".to_string()));

    // Removing the origin on B clears the departure on both instruments.
    b.planner
        .with_flight_plan(plan_index, |plan| plan.remove_origin_airport(true))
        .unwrap();
    a.planner.poll();
    let local = a.planner.get_flight_plan(plan_index).unwrap();
    assert_eq!(local.origin_airport(), None);
    assert_eq!(local.procedure_details().departure_index, None);
    assert_eq!(
        local.procedure_details().departure_facility_icao.as_deref(),
        Some("P  KJFK KJFK")
    );
}

/// Tests that a remote mutation that cannot be applied is dropped without an event.
#[test]
fn inapplicable_remote_mutations_are_dropped_test() {
    let bus = MockBus::new();
    let mut a = Instrument::start(&bus, 1);
    let mut b = Instrument::start(&bus, 2);

    a.planner.create_flight_plan(PlanIndex::new(0));
    b.planner.poll();
    b.take_events();

    // B never sees segment 0, so the leg added to it cannot be applied there.
    a.planner
        .with_flight_plan(PlanIndex::new(0), |plan| {
            plan.add_segment(0, SegmentType::Enroute, None, false);
            plan.add_leg(0, waypoint("WPT1"), None, LegDefinitionFlags::NONE, true)
        })
        .unwrap()
        .unwrap();
    b.planner.poll();

    assert!(b.take_events().is_empty());
    assert_eq!(b.planner.get_flight_plan(PlanIndex::new(0)).unwrap().length(), 0);
}

/// Tests that a plan created in a slot with a very large index costs no more than any other, and that
/// the slot table still reports its logical length.
#[test]
fn distant_slot_index_is_stored_sparsely_test() {
    setup_logger(LevelFilter::Trace);

    let bus = MockBus::new();
    let mut a = Instrument::start(&bus, 1);
    let mut rogue = bus.attach();
    let distant = PlanIndex::new(u32::MAX - 1);

    rogue.publish(SyncEnvelope::new(
        ReplicaId::new(99),
        SyncMessage::Created(PlanIndexMessage { plan_index: distant }),
    ));
    a.planner.poll();

    assert!(a.planner.has_flight_plan(distant));
    assert_eq!(a.planner.plan_slot_count(), u32::MAX as usize);
    assert_eq!(a.planner.flight_plan_indices(), vec![distant]);
    assert_eq!(a.take_events(), vec![format!("PlanCreated {}", distant)]);

    // A joining instrument receives the distant plan through bootstrap.
    let mut b = Instrument::start(&bus, 2);
    b.planner.request_sync();
    a.planner.poll();
    b.planner.poll();
    assert_eq!(b.planner.flight_plan_indices(), vec![distant]);

    rogue.publish(SyncEnvelope::new(
        ReplicaId::new(99),
        SyncMessage::Deleted(PlanIndexMessage { plan_index: distant }),
    ));
    a.planner.poll();
    assert_eq!(a.planner.plan_slot_count(), 0);
}

/// Tests that deleting a segment leaves the same gap on every instrument, and that removing one moves
/// the later segments forward on every instrument.
#[test]
fn segment_deletion_and_removal_are_replicated_test() {
    setup_logger(LevelFilter::Trace);

    // 1. Build a plan with three segments and a leg in the last one.
    let bus = MockBus::new();
    let mut a = Instrument::start(&bus, 1);
    let mut b = Instrument::start(&bus, 2);
    let plan_index = PlanIndex::new(0);

    a.planner.create_flight_plan(plan_index);
    a.planner
        .with_flight_plan(plan_index, |plan| {
            plan.add_segment(0, SegmentType::Departure, None, true);
            plan.add_segment(1, SegmentType::Enroute, None, true);
            plan.add_segment(2, SegmentType::Arrival, None, true);
            plan.add_leg(2, waypoint("ARR1"), None, LegDefinitionFlags::NONE, true)
                .map(|_| ())
        })
        .unwrap()
        .unwrap();
    b.planner.poll();

    // 2. Delete the middle segment, then add a leg to the segment after the gap.
    a.planner
        .with_flight_plan(plan_index, |plan| {
            plan.delete_segment(1, true);
            plan.add_leg(2, waypoint("ARR2"), None, LegDefinitionFlags::NONE, true)
                .map(|_| ())
        })
        .unwrap()
        .unwrap();
    b.planner.poll();

    let local = a.planner.get_flight_plan(plan_index).unwrap();
    let remote = b.planner.get_flight_plan(plan_index).unwrap();
    assert_eq!(remote.segment_count(), 3);
    assert!(remote.get_segment(1).is_err());
    assert_eq!(remote.get_segment(2).unwrap().legs.len(), 2);
    assert_eq!(remote.segment_index_of(0), local.segment_index_of(0));
    assert_eq!(remote.snapshot(), local.snapshot());

    // 3. Remove the first segment, which moves the arrival segment forward.
    a.planner
        .with_flight_plan(plan_index, |plan| plan.remove_segment(0, true))
        .unwrap();
    b.planner.poll();

    let local = a.planner.get_flight_plan(plan_index).unwrap();
    let remote = b.planner.get_flight_plan(plan_index).unwrap();
    assert_eq!(remote.segment_count(), 2);
    assert_eq!(remote.get_segment(1).unwrap().segment_type, SegmentType::Arrival);
    assert_eq!(remote.snapshot(), local.snapshot());
}

/// Tests the mutations that change or take away what earlier mutations set up: airway and vertical
/// data changes, procedure details, user data deletion, destination removal, and direct-to.
#[test]
fn changes_and_removals_are_replicated_test() {
    setup_logger(LevelFilter::Trace);

    let bus = MockBus::new();
    let mut a = Instrument::start(&bus, 1);
    let mut b = Instrument::start(&bus, 2);
    let plan_index = PlanIndex::new(0);

    a.planner.create_flight_plan(plan_index);
    a.planner
        .with_flight_plan(plan_index, |plan| {
            plan.add_segment(0, SegmentType::Enroute, None, true);
            plan.add_leg(0, waypoint("WPT1"), None, LegDefinitionFlags::NONE, true)
                .unwrap();
            plan.add_leg(0, waypoint("WPT2"), None, LegDefinitionFlags::NONE, true)
                .unwrap();
            plan.set_destination_airport("A      KBOS ", true);
            plan.set_user_data("cruise", UserDatum::from("FL350"), true);
        })
        .unwrap();
    b.planner.poll();
    b.take_events();

    let details = ProcedureDetails {
        arrival_facility_icao: Some("P  KBOS KBOS".to_string()),
        arrival_index: Some(4),
        approach_index: Some(1),
        ..Default::default()
    };
    let vertical_data = VerticalData {
        altitude1: 3048.0,
        speed: Some(250.0),
        ..Default::default()
    };
    a.planner
        .with_flight_plan(plan_index, |plan| {
            plan.set_airway(0, Some("V16".to_string()), true).unwrap();
            plan.set_leg_vertical_data(0, 1, vertical_data.clone(), true)
                .unwrap();
            plan.set_procedure_details(details.clone(), true);
            plan.delete_user_data("cruise", true);
            plan.set_direct_to_data(
                DirectToData {
                    segment_index: Some(0),
                    segment_leg_index: Some(1),
                },
                true,
            );
        })
        .unwrap();
    b.planner.poll();

    let remote = b.planner.get_flight_plan(plan_index).unwrap();
    assert_eq!(remote.get_segment(0).unwrap().airway.as_deref(), Some("V16"));
    assert_eq!(remote.get_leg(0, 1).unwrap().vertical_data, vertical_data);
    assert_eq!(remote.procedure_details(), &details);
    assert_eq!(remote.get_user_data("cruise"), None);
    assert_eq!(
        remote.direct_to_data(),
        DirectToData {
            segment_index: Some(0),
            segment_leg_index: Some(1),
        }
    );
    assert_eq!(
        b.take_events(),
        vec![
            "SegmentChange 0 0 Changed",
            "LegChange 0 0 1 Changed",
            "ProcedureDetailsChange 0",
            "UserDataDelete 0 cruise",
            "DirectToDataChange 0",
        ]
    );

    // Removing the destination on A clears the arrival and approach on B.
    a.planner
        .with_flight_plan(plan_index, |plan| plan.remove_destination_airport(true))
        .unwrap();
    b.planner.poll();

    let remote = b.planner.get_flight_plan(plan_index).unwrap();
    assert_eq!(remote.destination_airport(), None);
    assert_eq!(remote.procedure_details().arrival_index, None);
    assert_eq!(remote.procedure_details().approach_index, None);
    assert!(b
        .take_events()
        .contains(&format!("OriginDestChange 0 {:?}", OriginDestChangeType::DestinationRemoved)));
}

/// One message of every kind that names a slot, all naming `plan_index`.
fn messages_naming(plan_index: PlanIndex) -> Vec<SyncMessage> {
    let leg = LegDefinition {
        name: default_leg_name(&waypoint("WPT1")),
        leg: waypoint("WPT1"),
        flags: LegDefinitionFlags::NONE,
        vertical_data: Default::default(),
    };
    vec![
        SyncMessage::Deleted(PlanIndexMessage { plan_index }),
        SyncMessage::IndexChanged(PlanIndexMessage { plan_index }),
        PlanCopiedMessage {
            plan_index,
            target_plan_index: PlanIndex::new(0),
        }
        .into(),
        LegChangeMessage {
            plan_index,
            segment_index: 0,
            segment_leg_index: 0,
            change_type: PlanChangeType::Added,
            leg,
        }
        .into(),
        SegmentChangeMessage {
            plan_index,
            segment_index: 0,
            change_type: PlanChangeType::Added,
            segment: None,
            leaves_gap: false,
        }
        .into(),
        ActiveLegChangeMessage {
            plan_index,
            change: ActiveLegChange {
                leg_type: ActiveLegType::Lateral,
                index: 0,
                segment_index: None,
                segment_leg_index: None,
                previous_segment_index: None,
                previous_segment_leg_index: None,
            },
        }
        .into(),
        CalculatedMessage {
            plan_index,
            start_leg: Some(0),
        }
        .into(),
        OriginDestMessage {
            plan_index,
            change_type: OriginDestChangeType::OriginAdded,
            airport: Some("A      KJFK ".to_string()),
        }
        .into(),
        ProcedureDetailsMessage {
            plan_index,
            details: ProcedureDetails::default(),
        }
        .into(),
        UserDataSetMessage {
            plan_index,
            key: "cruise".to_string(),
            datum: UserDatum::from("FL350"),
        }
        .into(),
        UserDataDeleteMessage {
            plan_index,
            key: "cruise".to_string(),
        }
        .into(),
        DirectToDataMessage {
            plan_index,
            direct_to_data: DirectToData::default(),
        }
        .into(),
    ]
}

/// Tests that a message of any kind about an empty slot is dropped, for a slot whose plan was deleted
/// and for a slot that never held one.
#[test]
fn every_message_for_an_empty_slot_is_dropped_test() {
    setup_logger(LevelFilter::Trace);

    let bus = MockBus::new();
    let mut a = Instrument::start(&bus, 1);
    let mut rogue = bus.attach();

    a.planner.create_flight_plan(PlanIndex::new(1));
    a.planner.delete_flight_plan(PlanIndex::new(1));
    a.planner.poll();
    a.take_events();

    for plan_index in [1, 5] {
        for message in messages_naming(PlanIndex::new(plan_index)) {
            let topic = message.topic();
            rogue.publish(SyncEnvelope::new(ReplicaId::new(99), message));
            a.planner.poll();
            assert!(a.take_events().is_empty(), "{} for slot {}", topic, plan_index);
        }
    }

    assert_eq!(a.planner.plan_slot_count(), 0);
    assert_eq!(a.planner.active_plan_index(), PlanIndex::new(0));
    assert!(a.planner.await_calculations(Duration::from_secs(5)));
    assert!(a.calculator.start_legs().is_empty());
}
