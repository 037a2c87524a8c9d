/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Types that exist only to store numbers and bytes, and do not have any major "active" behavior.

use std::{
    fmt::{self, Debug, Display, Formatter},
    hash::Hash,
};

use borsh::{BorshDeserialize, BorshSerialize};

/// Index of a slot in a planner's plan slot table.
///
/// Slot indices are shared by every replica on the bus: slot `n` on one instrument refers to the same
/// logical flight plan as slot `n` on every other instrument.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, BorshDeserialize, BorshSerialize,
)]
pub struct PlanIndex(u32);

impl PlanIndex {
    /// Create a new `PlanIndex` with an `int` value.
    pub const fn new(int: u32) -> Self {
        Self(int)
    }

    /// Get the `u32` value of this `PlanIndex`.
    pub const fn int(&self) -> u32 {
        self.0
    }

    pub(crate) fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

impl Display for PlanIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// Identifier of the process (replica) that authored a sync message.
///
/// Every planner attached to the bus must have a distinct `ReplicaId`. A planner recognizes its own
/// messages when the bus hands them back by comparing the envelope's origin against its own id.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, BorshDeserialize, BorshSerialize)]
pub struct ReplicaId(u64);

impl ReplicaId {
    /// Create a new `ReplicaId` with an `int` value.
    pub const fn new(int: u64) -> Self {
        Self(int)
    }

    /// Draw a random `ReplicaId` from the thread-local RNG.
    pub fn random() -> Self {
        Self(rand::random())
    }

    /// Get the `u64` value of this `ReplicaId`.
    pub const fn int(&self) -> u64 {
        self.0
    }

    /// Get the little-endian representation of the inner `u64` value of this `ReplicaId`.
    pub fn to_le_bytes(&self) -> [u8; 8] {
        self.0.to_le_bytes()
    }
}

impl Debug for ReplicaId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "ReplicaId({:#018x})", self.0)
    }
}

impl Display for ReplicaId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Sequence number of a flight path calculation request.
///
/// Generations are handed out by a single counter per process, so a generation never repeats even
/// across plans that are deleted and re-created in the same slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalculationGeneration(u64);

impl CalculationGeneration {
    pub const fn new(int: u64) -> Self {
        Self(int)
    }

    pub const fn int(&self) -> u64 {
        self.0
    }
}

impl Display for CalculationGeneration {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// Opaque value stored in a flight plan's user data map.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default, BorshDeserialize, BorshSerialize)]
pub struct UserDatum(Vec<u8>);

impl UserDatum {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn bytes(&self) -> &Vec<u8> {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<&str> for UserDatum {
    fn from(value: &str) -> Self {
        Self(value.as_bytes().to_vec())
    }
}
