/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Flight plan legs: the ARINC 424 leg record, its vertical restrictions, and the [`LegDefinition`]
//! that a [`FlightPlan`](crate::flight_plan::FlightPlan) stores for each leg.

use std::ops::{BitOr, BitOrAssign};

use borsh::{BorshDeserialize, BorshSerialize};

/// An ICAO that identifies no facility. Twelve spaces.
pub const EMPTY_ICAO: &str = "            ";

/// ARINC 424 path and terminator of a leg.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, BorshDeserialize, BorshSerialize)]
pub enum LegType {
    #[default]
    Unknown,
    /// Arc to a fix.
    AF,
    /// Course to an altitude.
    CA,
    /// Course to a DME distance.
    CD,
    /// Course to a fix.
    CF,
    /// Course to an intercept.
    CI,
    /// Course to a radial.
    CR,
    /// Direct to a fix.
    DF,
    /// Course from a fix to an altitude.
    FA,
    /// Course from a fix to a distance.
    FC,
    /// Course from a fix to a DME distance.
    FD,
    /// Course from a fix to a manual termination.
    FM,
    /// Hold to an altitude.
    HA,
    /// Hold to a fix.
    HF,
    /// Hold to a manual termination.
    HM,
    /// Initial fix.
    IF,
    /// Procedure turn.
    PI,
    /// Radius to a fix.
    RF,
    /// Track to a fix.
    TF,
    /// Heading to an altitude.
    VA,
    /// Heading to a DME distance.
    VD,
    /// Heading to an intercept.
    VI,
    /// Heading to a manual termination.
    VM,
    /// Heading to a radial.
    VR,
    Discontinuity,
}

impl LegType {
    /// The numeric code used for this leg type by the simulator's navigation database.
    pub const fn code(&self) -> u8 {
        match self {
            LegType::Unknown => 0,
            LegType::AF => 1,
            LegType::CA => 2,
            LegType::CD => 3,
            LegType::CF => 4,
            LegType::CI => 5,
            LegType::CR => 6,
            LegType::DF => 7,
            LegType::FA => 8,
            LegType::FC => 9,
            LegType::FD => 10,
            LegType::FM => 11,
            LegType::HA => 12,
            LegType::HF => 13,
            LegType::HM => 14,
            LegType::IF => 15,
            LegType::PI => 16,
            LegType::RF => 17,
            LegType::TF => 18,
            LegType::VA => 19,
            LegType::VD => 20,
            LegType::VI => 21,
            LegType::VM => 22,
            LegType::VR => 23,
            LegType::Discontinuity => 99,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, BorshDeserialize, BorshSerialize)]
pub enum LegTurnDirection {
    #[default]
    None,
    Left,
    Right,
    Either,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, BorshDeserialize, BorshSerialize)]
pub enum AltitudeRestrictionType {
    #[default]
    Unused,
    At,
    AtOrAbove,
    AtOrBelow,
    Between,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, BorshDeserialize, BorshSerialize)]
pub enum SpeedType {
    Ias,
    Mach,
}

/// A single ARINC 424 leg, as published by the navigation database.
///
/// Distances are in metres, altitudes in metres, angles in degrees.
#[derive(Clone, Debug, PartialEq, BorshDeserialize, BorshSerialize)]
pub struct FlightPlanLeg {
    pub leg_type: LegType,
    pub fix_icao: String,
    pub fly_over: bool,
    /// Whether `distance` is a time in minutes rather than a length.
    pub distance_minutes: bool,
    /// Whether `course` is relative to true north rather than magnetic north.
    pub true_degrees: bool,
    pub turn_direction: LegTurnDirection,
    pub origin_icao: String,
    pub arc_center_fix_icao: String,
    pub theta: f64,
    pub rho: f64,
    pub course: f64,
    pub distance: f64,
    pub speed_restriction: f64,
    pub alt_desc: AltitudeRestrictionType,
    pub altitude1: f64,
    pub altitude2: f64,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub fix_type_flags: u32,
}

impl FlightPlanLeg {
    /// Create a leg of the given type to the given fix, with every other field empty.
    pub fn new(leg_type: LegType, fix_icao: impl Into<String>) -> Self {
        Self {
            leg_type,
            fix_icao: fix_icao.into(),
            ..Default::default()
        }
    }
}

impl Default for FlightPlanLeg {
    fn default() -> Self {
        Self {
            leg_type: LegType::Unknown,
            fix_icao: EMPTY_ICAO.to_string(),
            fly_over: false,
            distance_minutes: false,
            true_degrees: false,
            turn_direction: LegTurnDirection::None,
            origin_icao: EMPTY_ICAO.to_string(),
            arc_center_fix_icao: EMPTY_ICAO.to_string(),
            theta: 0.0,
            rho: 0.0,
            course: 0.0,
            distance: 0.0,
            speed_restriction: 0.0,
            alt_desc: AltitudeRestrictionType::Unused,
            altitude1: 0.0,
            altitude2: 0.0,
            lat: None,
            lon: None,
            fix_type_flags: 0,
        }
    }
}

/// Vertical restrictions attached to a leg by the flight management system.
#[derive(Clone, Debug, PartialEq, Default, BorshDeserialize, BorshSerialize)]
pub struct VerticalData {
    pub alt_desc: AltitudeRestrictionType,
    pub altitude1: f64,
    pub altitude2: f64,
    pub speed: Option<f64>,
    pub speed_desc: Option<SpeedType>,
    /// Flight path angle, in degrees.
    pub fpa: Option<f64>,
}

/// Bit flags describing how a leg came to be in a flight plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, BorshDeserialize, BorshSerialize)]
pub struct LegDefinitionFlags(u32);

impl LegDefinitionFlags {
    pub const NONE: LegDefinitionFlags = LegDefinitionFlags(0);
    pub const DIRECT_TO: LegDefinitionFlags = LegDefinitionFlags(1 << 0);
    pub const MISSED_APPROACH: LegDefinitionFlags = LegDefinitionFlags(1 << 1);
    pub const OBS: LegDefinitionFlags = LegDefinitionFlags(1 << 2);
    pub const VECTORS_TO_FINAL: LegDefinitionFlags = LegDefinitionFlags(1 << 3);

    pub const fn new(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    pub const fn contains(&self, other: LegDefinitionFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for LegDefinitionFlags {
    type Output = LegDefinitionFlags;
    fn bitor(self, rhs: Self) -> Self::Output {
        LegDefinitionFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for LegDefinitionFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0
    }
}

/// A leg as stored in a flight plan.
#[derive(Clone, Debug, PartialEq, BorshDeserialize, BorshSerialize)]
pub struct LegDefinition {
    /// Display name, produced by the plan's leg namer when the leg was added.
    pub name: String,
    pub leg: FlightPlanLeg,
    pub flags: LegDefinitionFlags,
    pub vertical_data: VerticalData,
}

impl LegDefinition {
    pub(crate) fn new(name: String, leg: FlightPlanLeg, flags: LegDefinitionFlags) -> Self {
        Self {
            name,
            leg,
            flags,
            vertical_data: VerticalData::default(),
        }
    }
}
