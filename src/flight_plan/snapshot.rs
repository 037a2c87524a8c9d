use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};

use crate::types::{
    data_types::UserDatum,
    procedure::{DirectToData, ProcedureDetails},
    segment::FlightPlanSegment,
};

/// The replicable state of a [`FlightPlan`](super::FlightPlan).
///
/// A snapshot leaves out everything that only makes sense inside one process: the plan's slot
/// binding, its calculator, and any geometry computed for it.
#[derive(Clone, Debug, PartialEq, Default, BorshDeserialize, BorshSerialize)]
pub struct FlightPlanSnapshot {
    /// Segments by segment index. `None` marks a deleted segment that left a gap.
    pub segments: Vec<Option<FlightPlanSegment>>,
    pub active_lateral_leg: u32,
    pub active_vertical_leg: u32,
    pub active_calculating_leg: u32,
    pub origin_airport: Option<String>,
    pub destination_airport: Option<String>,
    pub procedure_details: ProcedureDetails,
    pub user_data: BTreeMap<String, UserDatum>,
    pub direct_to_data: DirectToData,
}
