//! Departure, arrival and approach selections of a flight plan.

use borsh::{BorshDeserialize, BorshSerialize};

/// One direction of a physical runway.
#[derive(Clone, Debug, PartialEq, BorshDeserialize, BorshSerialize)]
pub struct OneWayRunway {
    /// Index of the physical runway in its airport's runway list.
    pub parent_runway_index: u32,
    /// Index of this direction within the physical runway.
    pub direction: u32,
    /// Runway number, e.g. `27` for runway 27L.
    pub runway_number: u8,
    /// Runway designation, e.g. `27L`.
    pub designation: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Threshold elevation, in metres.
    pub elevation: f64,
    /// Magnetic course, in degrees.
    pub course: f64,
}

/// The procedures selected in a flight plan. Indices refer to the procedure lists of the named
/// facility; `None` means no selection.
#[derive(Clone, Debug, PartialEq, Default, BorshDeserialize, BorshSerialize)]
pub struct ProcedureDetails {
    pub origin_runway: Option<OneWayRunway>,
    pub departure_facility_icao: Option<String>,
    pub departure_index: Option<u32>,
    pub departure_transition_index: Option<u32>,
    pub departure_runway_index: Option<u32>,
    pub arrival_facility_icao: Option<String>,
    pub arrival_index: Option<u32>,
    pub arrival_transition_index: Option<u32>,
    pub arrival_runway_transition_index: Option<u32>,
    pub approach_facility_icao: Option<String>,
    pub approach_index: Option<u32>,
    pub approach_transition_index: Option<u32>,
    pub destination_runway: Option<OneWayRunway>,
}

impl ProcedureDetails {
    /// Forget the selected departure and origin runway.
    pub(crate) fn clear_departure(&mut self) {
        self.departure_index = None;
        self.departure_runway_index = None;
        self.departure_transition_index = None;
        self.origin_runway = None;
    }

    /// Forget the selected arrival, approach and destination runway.
    pub(crate) fn clear_arrival_and_approach(&mut self) {
        self.approach_index = None;
        self.approach_transition_index = None;
        self.arrival_index = None;
        self.arrival_runway_transition_index = None;
        self.arrival_transition_index = None;
        self.destination_runway = None;
    }
}

/// The leg a direct-to is currently targeting, by segment and position in the segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, BorshDeserialize, BorshSerialize)]
pub struct DirectToData {
    pub segment_index: Option<u32>,
    pub segment_leg_index: Option<u32>,
}
