/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! [Trait definition](EventBus) for the pluggable publish/subscribe bus that connects instrument
//! processes, and the [messages](messages) planners exchange over it.
//!
//! The bus is a store-and-forward broadcast medium. Whatever one process publishes is eventually
//! delivered to every process attached to the bus, the publisher included. Messages from a single
//! publisher arrive in the order they were published. Messages from different publishers may
//! interleave arbitrarily.

pub mod messages;

pub(crate) mod sending;

use messages::SyncEnvelope;

pub trait EventBus: Send {
    /// Publish an envelope to every process attached to the bus, without blocking.
    fn publish(&mut self, envelope: SyncEnvelope);

    /// Receive the next envelope delivered to this process. Returns immediately with a None if no
    /// envelope is available now.
    fn recv(&mut self) -> Option<SyncEnvelope>;
}
