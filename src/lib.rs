//! A replicated flight plan manager: every process that needs flight plans runs a
//! [planner](planner::FlightPlanner), and the planners keep their plan slots identical over a shared
//! publish/subscribe [bus](bus::EventBus).
//!
//! Start with [replica::FlightPlannerSpec].

pub mod types;

pub mod flight_plan;

pub mod calculator;

pub mod bus;

pub mod planner;

pub mod replica;

pub mod events;

pub(crate) mod event_bus;

pub(crate) mod logging;
