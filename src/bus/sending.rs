//! Functions and types for publishing messages to the [`EventBus`].

use super::{
    messages::{SyncEnvelope, SyncMessage},
    EventBus,
};
use crate::types::data_types::ReplicaId;

/// Handle for publishing messages to the [`EventBus`] on behalf of one replica.
///
/// It can be used to publish instances of any type that implement the [`Into<SyncMessage>`] trait.
/// Every published message is stamped with the replica's identifier.
pub(crate) struct SyncPublisher<B: EventBus> {
    me: ReplicaId,
    bus: B,
}

impl<B: EventBus> SyncPublisher<B> {
    pub(crate) fn new(me: ReplicaId, bus: B) -> Self {
        Self { me, bus }
    }

    pub(crate) fn me(&self) -> ReplicaId {
        self.me
    }

    pub(crate) fn publish<S: Into<SyncMessage>>(&mut self, msg: S) {
        let message = msg.into();
        log::trace!("publishing {} from {}", message.sync_topic(), self.me);
        self.bus.publish(SyncEnvelope::new(self.me, message))
    }

    pub(crate) fn recv(&mut self) -> Option<SyncEnvelope> {
        self.bus.recv()
    }
}
