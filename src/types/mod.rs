//! Types that are used across multiple components of the flight planner.
//!
//! Types specific to a single component can be found in that component's module, e.g.,
//! [`crate::bus::messages`].

pub mod data_types;

pub mod leg;

pub mod segment;

pub mod procedure;

pub mod plan_changes;

pub mod flight_path;
