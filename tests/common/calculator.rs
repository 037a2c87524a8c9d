use std::{
    sync::{Arc, Mutex},
    thread,
    time::Duration,
};

use flightplan_sync::{
    calculator::FlightPathCalculator,
    types::{
        flight_path::{FlightPath, LegCalculations},
        leg::LegDefinition,
    },
};

/// A calculator that treats every leg's `distance` as its length, and its `lat`/`lon` as its end
/// point. Records the start leg of every calculation it runs.
#[derive(Clone, Default)]
pub(crate) struct StraightLineCalculator {
    delay: Duration,
    start_legs: Arc<Mutex<Vec<u32>>>,
}

impl StraightLineCalculator {
    pub(crate) fn new() -> StraightLineCalculator {
        StraightLineCalculator::default()
    }

    /// A calculator that takes `delay` to run each calculation.
    pub(crate) fn slow(delay: Duration) -> StraightLineCalculator {
        StraightLineCalculator {
            delay,
            ..Default::default()
        }
    }

    pub(crate) fn start_legs(&self) -> Vec<u32> {
        self.start_legs.lock().unwrap().clone()
    }
}

impl FlightPathCalculator for StraightLineCalculator {
    fn calculate_flight_path(
        &mut self,
        legs: &[LegDefinition],
        _active_lateral_leg: u32,
        start_leg: u32,
    ) -> FlightPath {
        thread::sleep(self.delay);
        self.start_legs.lock().unwrap().push(start_leg);

        let mut cumulative_distance = 0.0;
        let legs = legs
            .iter()
            .map(|definition| {
                cumulative_distance += definition.leg.distance;
                LegCalculations {
                    distance: definition.leg.distance,
                    cumulative_distance,
                    end_lat: definition.leg.lat,
                    end_lon: definition.leg.lon,
                    ..Default::default()
                }
            })
            .collect();

        FlightPath { start_leg, legs }
    }
}
