//! Display names for legs.

use crate::types::leg::{FlightPlanLeg, LegType};

/// Produces the display name of a leg when it is added to a plan.
pub type LegNamer = fn(&FlightPlanLeg) -> String;

const METRES_PER_FOOT: f64 = 0.3048;
const METRES_PER_NAUTICAL_MILE: f64 = 1852.0;

/// The identifier part of a twelve character ICAO, e.g. `KJFK` for `A      KJFK `.
pub fn icao_ident(icao: &str) -> &str {
    icao.get(7..).unwrap_or("").trim()
}

/// Name a leg after what terminates it.
///
/// Legs that end at an altitude are named after the altitude, legs that end at a distance or radial
/// after the reference fix, and fix-terminated legs after the fix.
pub fn default_leg_name(leg: &FlightPlanLeg) -> String {
    match leg.leg_type {
        LegType::CA | LegType::FA | LegType::VA => {
            format!("{:.0}FT", leg.altitude1 / METRES_PER_FOOT)
        }
        LegType::FM | LegType::VM => "MANSEQ".to_string(),
        LegType::FC => {
            let distance_nm = (leg.distance / METRES_PER_NAUTICAL_MILE).round().clamp(1.0, 26.0);
            let letter = char::from(64 + distance_nm as u8);
            format!("D{:03.0}{}", leg.course, letter)
        }
        LegType::CD | LegType::FD | LegType::VD => {
            let distance_nm = leg.distance / METRES_PER_NAUTICAL_MILE;
            format!("{}{:.1}", icao_ident(&leg.origin_icao), distance_nm)
        }
        LegType::CR | LegType::VR => format!("{}{:.0}", icao_ident(&leg.origin_icao), leg.theta),
        LegType::CI | LegType::VI => "INTRCPT".to_string(),
        LegType::PI => "PROC. TURN".to_string(),
        LegType::HA | LegType::HM | LegType::HF => "HOLD".to_string(),
        _ => icao_ident(&leg.fix_icao).to_string(),
    }
}
