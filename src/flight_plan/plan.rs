/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

use std::collections::BTreeMap;

use super::{
    default_leg_name,
    hooks::{PlanChange, PlanHooks},
    FlightPlanError, FlightPlanSnapshot, LegNamer,
};
use crate::calculator::{CalculationJob, CalculatorHandle};
use crate::types::{
    data_types::{CalculationGeneration, PlanIndex, UserDatum},
    flight_path::FlightPath,
    leg::{FlightPlanLeg, LegDefinition, LegDefinitionFlags, VerticalData},
    plan_changes::{ActiveLegChange, ActiveLegType, OriginDestChangeType, PlanChangeType},
    procedure::{DirectToData, OneWayRunway, ProcedureDetails},
    segment::{FlightPlanSegment, SegmentType},
};

/// An ordered route document: a sequence of segments, each a sequence of legs, plus the
/// airports, procedures, active-leg pointers and user data that go with it.
///
/// Every mutation method takes a trailing `notify` flag. The mutation is always reported to the plan's
/// hooks; `notify` tells the owning [`FlightPlanner`](crate::planner::FlightPlanner) whether to
/// republish it to the other replicas. Plans created with [`FlightPlan::new`] are not owned by a
/// planner and report to nobody.
pub struct FlightPlan {
    plan_index: PlanIndex,
    segments: Vec<Option<FlightPlanSegment>>,
    active_lateral_leg: u32,
    active_vertical_leg: u32,
    active_calculating_leg: u32,
    origin_airport: Option<String>,
    destination_airport: Option<String>,
    procedure_details: ProcedureDetails,
    user_data: BTreeMap<String, UserDatum>,
    direct_to_data: DirectToData,
    flight_path: Option<FlightPath>,
    pending_calculation: Option<PendingCalculation>,
    calculator: Option<CalculatorHandle>,
    leg_namer: LegNamer,
    hooks: PlanHooks,
}

#[derive(Clone, Copy)]
struct PendingCalculation {
    generation: CalculationGeneration,
    requested_start_leg: Option<u32>,
    notify: bool,
}

/// What a result taken in by [`FlightPlan::apply_calculation`] answered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct SettledCalculation {
    pub(crate) requested_start_leg: Option<u32>,
    pub(crate) notify: bool,
}

impl FlightPlan {
    /// Create an empty, free-standing plan with the default leg namer and no calculator.
    pub fn new(plan_index: PlanIndex) -> FlightPlan {
        Self::with_parts(plan_index, None, default_leg_name)
    }

    pub(crate) fn with_calculator(
        plan_index: PlanIndex,
        calculator: CalculatorHandle,
        leg_namer: LegNamer,
    ) -> FlightPlan {
        Self::with_parts(plan_index, Some(calculator), leg_namer)
    }

    fn with_parts(
        plan_index: PlanIndex,
        calculator: Option<CalculatorHandle>,
        leg_namer: LegNamer,
    ) -> FlightPlan {
        Self {
            plan_index,
            segments: Vec::new(),
            active_lateral_leg: 0,
            active_vertical_leg: 0,
            active_calculating_leg: 0,
            origin_airport: None,
            destination_airport: None,
            procedure_details: ProcedureDetails::default(),
            user_data: BTreeMap::new(),
            direct_to_data: DirectToData::default(),
            flight_path: None,
            pending_calculation: None,
            calculator,
            leg_namer,
            hooks: PlanHooks::unbound(),
        }
    }

    /// Rebuild a plan from a snapshot taken on another replica.
    pub(crate) fn from_snapshot(
        plan_index: PlanIndex,
        snapshot: FlightPlanSnapshot,
        calculator: CalculatorHandle,
        leg_namer: LegNamer,
    ) -> FlightPlan {
        let mut plan = Self::with_calculator(plan_index, calculator, leg_namer);
        plan.segments = snapshot.segments;
        plan.active_lateral_leg = snapshot.active_lateral_leg;
        plan.active_vertical_leg = snapshot.active_vertical_leg;
        plan.active_calculating_leg = snapshot.active_calculating_leg;
        plan.origin_airport = snapshot.origin_airport;
        plan.destination_airport = snapshot.destination_airport;
        plan.procedure_details = snapshot.procedure_details;
        plan.user_data = snapshot.user_data;
        plan.direct_to_data = snapshot.direct_to_data;
        plan.reflow_segments();
        plan.reflow_segment_offsets();
        plan
    }

    /// Get the replicable state of this plan.
    pub fn snapshot(&self) -> FlightPlanSnapshot {
        FlightPlanSnapshot {
            segments: self.segments.clone(),
            active_lateral_leg: self.active_lateral_leg,
            active_vertical_leg: self.active_vertical_leg,
            active_calculating_leg: self.active_calculating_leg,
            origin_airport: self.origin_airport.clone(),
            destination_airport: self.destination_airport.clone(),
            procedure_details: self.procedure_details.clone(),
            user_data: self.user_data.clone(),
            direct_to_data: self.direct_to_data,
        }
    }

    /// Deep-copy this plan's document into a new plan for slot `plan_index`.
    ///
    /// The copy shares this plan's calculator and leg namer, but none of its hooks or geometry.
    pub fn copy(&self, plan_index: PlanIndex) -> FlightPlan {
        let mut copy = Self::with_parts(plan_index, self.calculator.clone(), self.leg_namer);
        copy.segments = self.segments.clone();
        copy.active_lateral_leg = self.active_lateral_leg;
        copy.active_vertical_leg = self.active_vertical_leg;
        copy.active_calculating_leg = self.active_calculating_leg;
        copy.origin_airport = self.origin_airport.clone();
        copy.destination_airport = self.destination_airport.clone();
        copy.procedure_details = self.procedure_details.clone();
        copy.user_data = self.user_data.clone();
        copy.direct_to_data = self.direct_to_data;
        copy
    }

    pub(crate) fn bind_hooks(&mut self, hooks: PlanHooks) {
        if let Some(plan_index) = hooks.plan_index() {
            self.plan_index = plan_index;
        }
        self.hooks = hooks;
    }

    pub(crate) fn clear_hooks(&mut self) {
        self.hooks = PlanHooks::unbound();
    }

    /* ↓↓↓ Queries ↓↓↓ */

    pub fn plan_index(&self) -> PlanIndex {
        self.plan_index
    }

    /// Total number of legs in the plan.
    pub fn length(&self) -> u32 {
        self.segments().map(|segment| segment.legs.len() as u32).sum()
    }

    /// Number of segment positions in the plan, counting gaps left by deleted segments.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Iterate over the plan's segments in order, skipping gaps.
    pub fn segments(&self) -> impl Iterator<Item = &FlightPlanSegment> {
        self.segments.iter().flatten()
    }

    pub fn segments_of_type(
        &self,
        segment_type: SegmentType,
    ) -> impl Iterator<Item = &FlightPlanSegment> {
        self.segments()
            .filter(move |segment| segment.segment_type == segment_type)
    }

    /// Iterate over every leg of the plan in global order.
    pub fn legs(&self) -> impl Iterator<Item = &LegDefinition> {
        self.segments().flat_map(|segment| segment.legs.iter())
    }

    pub fn get_segment(&self, segment_index: u32) -> Result<&FlightPlanSegment, FlightPlanError> {
        self.segments
            .get(segment_index as usize)
            .and_then(Option::as_ref)
            .ok_or(FlightPlanError::SegmentNotFound { segment_index })
    }

    fn segment_mut(&mut self, segment_index: u32) -> Result<&mut FlightPlanSegment, FlightPlanError> {
        self.segments
            .get_mut(segment_index as usize)
            .and_then(Option::as_mut)
            .ok_or(FlightPlanError::SegmentNotFound { segment_index })
    }

    /// The segment containing the active lateral leg.
    pub fn active_segment(&self) -> Option<&FlightPlanSegment> {
        let mut calculated_segment_index = 0;
        for segment in self.segments() {
            let segment_end = segment.offset + segment.legs.len() as u32;
            if (self.active_lateral_leg == 0 && segment.legs.is_empty())
                || self.active_lateral_leg > segment_end
            {
                calculated_segment_index += 1;
            } else {
                break;
            }
        }
        self.get_segment(calculated_segment_index).ok()
    }

    pub fn get_leg(
        &self,
        segment_index: u32,
        segment_leg_index: u32,
    ) -> Result<&LegDefinition, FlightPlanError> {
        self.try_get_leg(segment_index, segment_leg_index)
            .ok_or(FlightPlanError::LegNotFound {
                segment_index,
                segment_leg_index,
            })
    }

    pub fn try_get_leg(&self, segment_index: u32, segment_leg_index: u32) -> Option<&LegDefinition> {
        self.get_segment(segment_index)
            .ok()
            .and_then(|segment| segment.legs.get(segment_leg_index as usize))
    }

    /// Get a leg by its global index.
    pub fn leg_at(&self, global_leg_index: u32) -> Option<&LegDefinition> {
        self.legs().nth(global_leg_index as usize)
    }

    /// Index of the segment containing the leg at `global_leg_index`.
    pub fn segment_index_of(&self, global_leg_index: u32) -> Option<u32> {
        self.segments()
            .find(|segment| segment.contains_global_leg(global_leg_index))
            .map(|segment| segment.segment_index)
    }

    /// Position of the leg at `global_leg_index` within its segment.
    pub fn segment_leg_index_of(&self, global_leg_index: u32) -> Option<u32> {
        self.segments()
            .find(|segment| segment.contains_global_leg(global_leg_index))
            .map(|segment| global_leg_index - segment.offset)
    }

    pub fn global_leg_index(&self, segment_index: u32, segment_leg_index: u32) -> Option<u32> {
        let segment = self.get_segment(segment_index).ok()?;
        if (segment_leg_index as usize) < segment.legs.len() {
            Some(segment.offset + segment_leg_index)
        } else {
            None
        }
    }

    /// The leg immediately before the position `segment_leg_index` in segment `segment_index`,
    /// looking back across segment boundaries.
    pub fn prev_leg(&self, segment_index: u32, segment_leg_index: u32) -> Option<&LegDefinition> {
        let mut segment_index = (segment_index as usize).min(self.segments.len());
        let leg_limit = self
            .segments
            .get(segment_index)
            .and_then(Option::as_ref)
            .map_or(0, |segment| segment.legs.len());
        let segment_leg_index = (segment_leg_index as usize).min(leg_limit);

        let mut leg = match self.segments.get(segment_index).and_then(Option::as_ref) {
            Some(segment) if segment_leg_index > 0 => segment.legs.get(segment_leg_index - 1),
            _ => None,
        };
        while leg.is_none() && segment_index > 0 {
            segment_index -= 1;
            leg = self.segments[segment_index]
                .as_ref()
                .and_then(|segment| segment.legs.last());
        }
        leg
    }

    /// The leg immediately after the position `segment_leg_index` in segment `segment_index`,
    /// looking ahead across segment boundaries. A `segment_leg_index` of `None` means "before the
    /// first leg of the segment".
    pub fn next_leg(&self, segment_index: u32, segment_leg_index: Option<u32>) -> Option<&LegDefinition> {
        let mut segment_index = segment_index as usize;
        if segment_index >= self.segments.len() {
            return None;
        }
        let next_position = segment_leg_index.map_or(0, |index| index as usize + 1);
        let mut leg = self.segments[segment_index]
            .as_ref()
            .and_then(|segment| segment.legs.get(next_position));
        while leg.is_none() && segment_index + 1 < self.segments.len() {
            segment_index += 1;
            leg = self.segments[segment_index]
                .as_ref()
                .and_then(|segment| segment.legs.first());
        }
        leg
    }

    pub fn active_lateral_leg(&self) -> u32 {
        self.active_lateral_leg
    }

    pub fn active_vertical_leg(&self) -> u32 {
        self.active_vertical_leg
    }

    pub fn active_calculating_leg(&self) -> u32 {
        self.active_calculating_leg
    }

    pub fn origin_airport(&self) -> Option<&str> {
        self.origin_airport.as_deref()
    }

    pub fn destination_airport(&self) -> Option<&str> {
        self.destination_airport.as_deref()
    }

    pub fn procedure_details(&self) -> &ProcedureDetails {
        &self.procedure_details
    }

    pub fn user_data(&self) -> &BTreeMap<String, UserDatum> {
        &self.user_data
    }

    pub fn get_user_data(&self, key: &str) -> Option<&UserDatum> {
        self.user_data.get(key)
    }

    pub fn direct_to_data(&self) -> DirectToData {
        self.direct_to_data
    }

    /// Geometry from the most recent calculation taken in by the owning planner.
    pub fn flight_path(&self) -> Option<&FlightPath> {
        self.flight_path.as_ref()
    }

    /// Whether a calculation has been requested whose result has not been taken in yet.
    pub fn is_calculating(&self) -> bool {
        self.pending_calculation.is_some()
    }

    /* ↓↓↓ Segments ↓↓↓ */

    /// Put a new, empty segment at `segment_index`, replacing any segment already there.
    pub fn add_segment(
        &mut self,
        segment_index: u32,
        segment_type: SegmentType,
        airway: Option<String>,
        notify: bool,
    ) {
        let position = segment_index as usize;
        if self.segments.len() <= position {
            self.segments.resize_with(position + 1, || None);
        }
        self.segments[position] = Some(FlightPlanSegment::new(segment_index, segment_type, airway));
        self.reflow_segment_offsets();

        let segment = self.segments[position].clone();
        self.hooks.fire(
            PlanChange::Segment {
                segment_index,
                change_type: PlanChangeType::Added,
                segment,
                leaves_gap: false,
            },
            notify,
        );
    }

    /// Insert a new, empty segment at `segment_index`, shifting the segment there and every later
    /// segment one position back. If there is no segment at `segment_index`, this is the same as
    /// [`add_segment`](Self::add_segment).
    pub fn insert_segment(
        &mut self,
        segment_index: u32,
        segment_type: SegmentType,
        airway: Option<String>,
        notify: bool,
    ) {
        let position = segment_index as usize;
        if !matches!(self.segments.get(position), Some(Some(_))) {
            return self.add_segment(segment_index, segment_type, airway, notify);
        }

        self.segments.insert(
            position,
            Some(FlightPlanSegment::new(segment_index, segment_type, airway)),
        );
        self.reflow_segments();
        self.reflow_segment_offsets();

        let segment = self.segments[position].clone();
        self.hooks.fire(
            PlanChange::Segment {
                segment_index,
                change_type: PlanChangeType::Inserted,
                segment,
                leaves_gap: false,
            },
            notify,
        );
    }

    /// Delete the segment at `segment_index`, leaving a gap in its place unless it was the last one.
    pub fn delete_segment(&mut self, segment_index: u32, notify: bool) -> Option<FlightPlanSegment> {
        let position = segment_index as usize;
        let segment = if position + 1 == self.segments.len() {
            self.segments.pop().flatten()
        } else {
            self.segments.get_mut(position).and_then(Option::take)
        };
        self.reflow_segment_offsets();

        self.hooks.fire(
            PlanChange::Segment {
                segment_index,
                change_type: PlanChangeType::Removed,
                segment: segment.clone(),
                leaves_gap: true,
            },
            notify,
        );
        segment
    }

    /// Remove the segment at `segment_index`, moving every later segment one position forward.
    pub fn remove_segment(&mut self, segment_index: u32, notify: bool) -> Option<FlightPlanSegment> {
        let position = segment_index as usize;
        let segment = if position < self.segments.len() {
            self.segments.remove(position)
        } else {
            None
        };
        self.reflow_segments();
        self.reflow_segment_offsets();

        self.hooks.fire(
            PlanChange::Segment {
                segment_index,
                change_type: PlanChangeType::Removed,
                segment: segment.clone(),
                leaves_gap: false,
            },
            notify,
        );
        segment
    }

    /// Set or clear the airway of a segment. An empty airway name clears it.
    pub fn set_airway(
        &mut self,
        segment_index: u32,
        airway: Option<String>,
        notify: bool,
    ) -> Result<(), FlightPlanError> {
        let segment = self.segment_mut(segment_index)?;
        segment.airway = airway.filter(|airway| !airway.is_empty());
        let segment = segment.clone();

        self.hooks.fire(
            PlanChange::Segment {
                segment_index,
                change_type: PlanChangeType::Changed,
                segment: Some(segment),
                leaves_gap: false,
            },
            notify,
        );
        Ok(())
    }

    /* ↓↓↓ Legs ↓↓↓ */

    /// Add `leg` to segment `segment_index`, at position `segment_leg_index` or at the end of the
    /// segment. Returns the position the leg ended up at.
    pub fn add_leg(
        &mut self,
        segment_index: u32,
        leg: FlightPlanLeg,
        segment_leg_index: Option<u32>,
        flags: LegDefinitionFlags,
        notify: bool,
    ) -> Result<u32, FlightPlanError> {
        let definition = LegDefinition::new((self.leg_namer)(&leg), leg, flags);
        let segment = self.segment_mut(segment_index)?;
        let segment_leg_index = match segment_leg_index {
            Some(index) => {
                let position = (index as usize).min(segment.legs.len());
                segment.legs.insert(position, definition.clone());
                position as u32
            }
            None => {
                segment.legs.push(definition.clone());
                segment.legs.len() as u32 - 1
            }
        };
        self.reflow_segment_offsets();

        self.hooks.fire(
            PlanChange::Leg {
                segment_index,
                segment_leg_index,
                change_type: PlanChangeType::Added,
                leg: definition,
            },
            notify,
        );
        Ok(segment_leg_index)
    }

    /// Remove the leg at `segment_leg_index` of segment `segment_index`, or the segment's last leg.
    pub fn remove_leg(
        &mut self,
        segment_index: u32,
        segment_leg_index: Option<u32>,
        notify: bool,
    ) -> Result<Option<LegDefinition>, FlightPlanError> {
        let segment = self.segment_mut(segment_index)?;
        let (removed, segment_leg_index) = match segment_leg_index {
            Some(index) if (index as usize) < segment.legs.len() => {
                (Some(segment.legs.remove(index as usize)), index)
            }
            Some(index) => (None, index),
            None => {
                let removed = segment.legs.pop();
                (removed, segment.legs.len() as u32)
            }
        };
        self.reflow_segment_offsets();

        if let Some(leg) = &removed {
            self.hooks.fire(
                PlanChange::Leg {
                    segment_index,
                    segment_leg_index,
                    change_type: PlanChangeType::Removed,
                    leg: leg.clone(),
                },
                notify,
            );
        }
        Ok(removed)
    }

    pub fn set_leg_vertical_data(
        &mut self,
        segment_index: u32,
        segment_leg_index: u32,
        vertical_data: VerticalData,
        notify: bool,
    ) -> Result<(), FlightPlanError> {
        let leg = self
            .segment_mut(segment_index)
            .ok()
            .and_then(|segment| segment.legs.get_mut(segment_leg_index as usize))
            .ok_or(FlightPlanError::LegNotFound {
                segment_index,
                segment_leg_index,
            })?;
        leg.vertical_data = vertical_data;
        let leg = leg.clone();

        self.hooks.fire(
            PlanChange::Leg {
                segment_index,
                segment_leg_index,
                change_type: PlanChangeType::Changed,
                leg,
            },
            notify,
        );
        Ok(())
    }

    /* ↓↓↓ Active legs ↓↓↓ */

    /// Move the active lateral leg to `global_leg_index`, clamped to the legs of the plan.
    pub fn set_lateral_leg(&mut self, global_leg_index: u32, notify: bool) {
        self.set_active_leg(ActiveLegType::Lateral, global_leg_index, notify)
    }

    /// Move the active vertical leg to `global_leg_index`, clamped to the legs of the plan.
    pub fn set_vertical_leg(&mut self, global_leg_index: u32, notify: bool) {
        self.set_active_leg(ActiveLegType::Vertical, global_leg_index, notify)
    }

    /// Move the active calculating leg to `global_leg_index`, clamped to the legs of the plan.
    pub fn set_calculating_leg(&mut self, global_leg_index: u32, notify: bool) {
        self.set_active_leg(ActiveLegType::Calculating, global_leg_index, notify)
    }

    pub fn set_active_leg(&mut self, leg_type: ActiveLegType, global_leg_index: u32, notify: bool) {
        let length = self.length();
        let mut change = ActiveLegChange {
            leg_type,
            index: 0,
            segment_index: None,
            segment_leg_index: None,
            previous_segment_index: None,
            previous_segment_leg_index: None,
        };

        if length > 0 {
            let previous = self.active_leg(leg_type);
            change.previous_segment_index = self.segment_index_of(previous);
            change.previous_segment_leg_index = self.segment_leg_index_of(previous);

            change.index = global_leg_index.min(length - 1);
            change.segment_index = self.segment_index_of(change.index);
            change.segment_leg_index = self.segment_leg_index_of(change.index);
        }

        match leg_type {
            ActiveLegType::Lateral => self.active_lateral_leg = change.index,
            ActiveLegType::Vertical => self.active_vertical_leg = change.index,
            ActiveLegType::Calculating => self.active_calculating_leg = change.index,
        }

        self.hooks.fire(PlanChange::ActiveLeg(change), notify);
    }

    pub fn active_leg(&self, leg_type: ActiveLegType) -> u32 {
        match leg_type {
            ActiveLegType::Lateral => self.active_lateral_leg,
            ActiveLegType::Vertical => self.active_vertical_leg,
            ActiveLegType::Calculating => self.active_calculating_leg,
        }
    }

    /* ↓↓↓ Origin and destination ↓↓↓ */

    pub fn set_origin_airport(&mut self, facility_icao: impl Into<String>, notify: bool) {
        let facility_icao = facility_icao.into();
        self.origin_airport = Some(facility_icao.clone());
        self.fire_origin_dest(OriginDestChangeType::OriginAdded, Some(facility_icao), notify);
    }

    /// Remove the origin airport, along with the departure and origin runway chosen for it.
    pub fn remove_origin_airport(&mut self, notify: bool) {
        let facility_icao = self.origin_airport.take();
        self.procedure_details.clear_departure();
        self.fire_origin_dest(OriginDestChangeType::OriginRemoved, facility_icao, notify);
    }

    pub fn set_destination_airport(&mut self, facility_icao: impl Into<String>, notify: bool) {
        let facility_icao = facility_icao.into();
        self.destination_airport = Some(facility_icao.clone());
        self.fire_origin_dest(
            OriginDestChangeType::DestinationAdded,
            Some(facility_icao),
            notify,
        );
    }

    /// Remove the destination airport, along with the arrival, approach and destination runway chosen
    /// for it.
    pub fn remove_destination_airport(&mut self, notify: bool) {
        let facility_icao = self.destination_airport.take();
        self.procedure_details.clear_arrival_and_approach();
        self.fire_origin_dest(OriginDestChangeType::DestinationRemoved, facility_icao, notify);
    }

    fn fire_origin_dest(
        &self,
        change_type: OriginDestChangeType,
        airport: Option<String>,
        notify: bool,
    ) {
        self.hooks
            .fire(PlanChange::OriginDest { change_type, airport }, notify);
    }

    /* ↓↓↓ Procedures ↓↓↓ */

    pub fn set_procedure_details(&mut self, details: ProcedureDetails, notify: bool) {
        self.procedure_details = details;
        self.fire_procedure_details(notify);
    }

    pub fn set_origin_runway(&mut self, runway: Option<OneWayRunway>, notify: bool) {
        self.procedure_details.origin_runway = runway;
        self.fire_procedure_details(notify);
    }

    pub fn set_destination_runway(&mut self, runway: Option<OneWayRunway>, notify: bool) {
        self.procedure_details.destination_runway = runway;
        self.fire_procedure_details(notify);
    }

    pub fn set_departure(
        &mut self,
        facility_icao: Option<String>,
        departure_index: Option<u32>,
        departure_transition_index: Option<u32>,
        departure_runway_index: Option<u32>,
        notify: bool,
    ) {
        self.procedure_details.departure_facility_icao = facility_icao;
        self.procedure_details.departure_index = departure_index;
        self.procedure_details.departure_transition_index = departure_transition_index;
        self.procedure_details.departure_runway_index = departure_runway_index;
        self.fire_procedure_details(notify);
    }

    pub fn set_arrival(
        &mut self,
        facility_icao: Option<String>,
        arrival_index: Option<u32>,
        arrival_transition_index: Option<u32>,
        arrival_runway_transition_index: Option<u32>,
        notify: bool,
    ) {
        self.procedure_details.arrival_facility_icao = facility_icao;
        self.procedure_details.arrival_index = arrival_index;
        self.procedure_details.arrival_transition_index = arrival_transition_index;
        self.procedure_details.arrival_runway_transition_index = arrival_runway_transition_index;
        self.fire_procedure_details(notify);
    }

    pub fn set_approach(
        &mut self,
        facility_icao: Option<String>,
        approach_index: Option<u32>,
        approach_transition_index: Option<u32>,
        notify: bool,
    ) {
        self.procedure_details.approach_facility_icao = facility_icao;
        self.procedure_details.approach_index = approach_index;
        self.procedure_details.approach_transition_index = approach_transition_index;
        self.fire_procedure_details(notify);
    }

    fn fire_procedure_details(&self, notify: bool) {
        self.hooks.fire(
            PlanChange::ProcedureDetails(self.procedure_details.clone()),
            notify,
        );
    }

    /* ↓↓↓ User data ↓↓↓ */

    pub fn set_user_data(&mut self, key: impl Into<String>, datum: UserDatum, notify: bool) {
        let key = key.into();
        self.user_data.insert(key.clone(), datum.clone());
        self.hooks.fire(PlanChange::UserDataSet { key, datum }, notify);
    }

    pub fn delete_user_data(&mut self, key: &str, notify: bool) {
        self.user_data.remove(key);
        self.hooks.fire(
            PlanChange::UserDataDelete {
                key: key.to_string(),
            },
            notify,
        );
    }

    /* ↓↓↓ Direct-to ↓↓↓ */

    pub fn set_direct_to_data(&mut self, direct_to_data: DirectToData, notify: bool) {
        self.direct_to_data = direct_to_data;
        self.hooks
            .fire(PlanChange::DirectToData(direct_to_data), notify);
    }

    /// Target the direct-to at the leg with global index `global_leg_index`, or clear it.
    pub fn set_direct_to_leg(&mut self, global_leg_index: Option<u32>, notify: bool) {
        let segment_index = global_leg_index.and_then(|index| self.segment_index_of(index));
        let segment_leg_index = global_leg_index.and_then(|index| self.segment_leg_index_of(index));
        self.set_direct_to_data(
            DirectToData {
                segment_index,
                segment_leg_index,
            },
            notify,
        )
    }

    /* ↓↓↓ Calculation ↓↓↓ */

    /// Request a recalculation of this plan's flight path from the leg at global index `start_leg`, or
    /// from the active calculating leg.
    ///
    /// The result arrives asynchronously. A request made while an earlier one is still outstanding
    /// supersedes it: only the latest request's result is ever applied. If any of the superseded
    /// requests asked to notify, the surviving one does too.
    pub fn calculate(&mut self, start_leg: Option<u32>, notify: bool) -> Option<CalculationGeneration> {
        let calculator = match &self.calculator {
            Some(calculator) => calculator.clone(),
            None => {
                log::warn!(
                    "plan {} has no flight path calculator, ignoring calculation request",
                    self.plan_index
                );
                return None;
            }
        };

        let generation = calculator.next_generation();
        let notify = notify || self.pending_calculation.map_or(false, |pending| pending.notify);
        self.pending_calculation = Some(PendingCalculation {
            generation,
            requested_start_leg: start_leg,
            notify,
        });

        calculator.submit(CalculationJob {
            plan_index: self.plan_index,
            generation,
            legs: self.legs().cloned().collect(),
            active_lateral_leg: self.active_lateral_leg,
            start_leg: start_leg.unwrap_or(self.active_calculating_leg),
        });
        Some(generation)
    }

    /// Take in a calculation result. Returns `None`, leaving the plan untouched, if the result does not
    /// answer this plan's latest request.
    pub(crate) fn apply_calculation(
        &mut self,
        generation: CalculationGeneration,
        flight_path: FlightPath,
    ) -> Option<SettledCalculation> {
        match self.pending_calculation {
            Some(pending) if pending.generation == generation => {
                self.pending_calculation = None;
                self.flight_path = Some(flight_path);
                self.hooks.fire(
                    PlanChange::Calculated {
                        start_leg: pending.requested_start_leg,
                    },
                    pending.notify,
                );
                Some(SettledCalculation {
                    requested_start_leg: pending.requested_start_leg,
                    notify: pending.notify,
                })
            }
            _ => None,
        }
    }

    /* ↓↓↓ Reflow ↓↓↓ */

    fn reflow_segments(&mut self) {
        for (position, segment) in self.segments.iter_mut().enumerate() {
            if let Some(segment) = segment {
                segment.segment_index = position as u32;
            }
        }
    }

    fn reflow_segment_offsets(&mut self) {
        let mut next_offset = 0;
        for segment in self.segments.iter_mut().flatten() {
            segment.offset = next_offset;
            next_offset += segment.legs.len() as u32;
        }
    }
}
