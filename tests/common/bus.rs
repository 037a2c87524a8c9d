use std::sync::{
    mpsc::{self, Receiver, Sender, TryRecvError},
    Arc, Mutex,
};

use flightplan_sync::bus::{messages::SyncEnvelope, EventBus};

/// A mock bus which carries serialized envelopes between threads using channels.
///
/// Like a real bus, it delivers every envelope to every attached stub, the publisher included. Stubs
/// attached later only see envelopes published after they attached.
#[derive(Clone, Default)]
pub(crate) struct MockBus {
    all_inboxes: Arc<Mutex<Vec<Sender<Vec<u8>>>>>,
}

impl MockBus {
    pub(crate) fn new() -> MockBus {
        MockBus::default()
    }

    pub(crate) fn attach(&self) -> BusStub {
        BusStub {
            all_inboxes: self.all_inboxes.clone(),
            inbox: Arc::new(Mutex::new(self.new_inbox())),
        }
    }

    /// Attach a listener that records everything published on the bus from now on.
    pub(crate) fn spy(&self) -> BusSpy {
        BusSpy {
            inbox: self.new_inbox(),
        }
    }

    fn new_inbox(&self) -> Receiver<Vec<u8>> {
        let (sender, receiver) = mpsc::channel();
        self.all_inboxes.lock().unwrap().push(sender);
        receiver
    }
}

pub(crate) struct BusStub {
    all_inboxes: Arc<Mutex<Vec<Sender<Vec<u8>>>>>,
    inbox: Arc<Mutex<Receiver<Vec<u8>>>>,
}

impl EventBus for BusStub {
    fn publish(&mut self, envelope: SyncEnvelope) {
        let bytes = envelope.to_bytes().unwrap();
        for inbox in self.all_inboxes.lock().unwrap().iter() {
            let _ = inbox.send(bytes.clone());
        }
    }

    fn recv(&mut self) -> Option<SyncEnvelope> {
        match self.inbox.lock().unwrap().try_recv() {
            Ok(bytes) => Some(SyncEnvelope::from_bytes(&bytes).unwrap()),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => panic!(),
        }
    }
}

pub(crate) struct BusSpy {
    inbox: Receiver<Vec<u8>>,
}

impl BusSpy {
    /// Take every envelope published since the last call.
    pub(crate) fn drain(&self) -> Vec<SyncEnvelope> {
        self.inbox
            .try_iter()
            .map(|bytes| SyncEnvelope::from_bytes(&bytes).unwrap())
            .collect()
    }

    /// Like [`drain`](Self::drain), but only the sync topic of each envelope.
    pub(crate) fn drain_topics(&self) -> Vec<String> {
        self.drain()
            .iter()
            .map(|envelope| envelope.message.sync_topic())
            .collect()
    }
}
