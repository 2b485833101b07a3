//! The playback endpoint seam.
//!
//! An endpoint is the single playable media resource of a session. The
//! coordinator drives it through `Endpoint` and learns about asynchronous
//! outcomes (metadata, position, end of track, refused playback) through a
//! subscription created with `Endpoint::subscribe`.

use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use crate::error::{EndpointError, GraphError};

use super::analyser::Analyser;
use super::types::{EndpointEvent, GraphState};

pub type SubscriptionId = u64;

/// Receiving side of an endpoint subscription.
pub struct Subscription {
    pub id: SubscriptionId,
    pub events: Receiver<EndpointEvent>,
}

/// A platform media endpoint.
pub trait Endpoint {
    /// Register a listener for lifecycle events.
    fn subscribe(&mut self) -> Subscription;
    fn unsubscribe(&mut self, id: SubscriptionId);

    /// URL of the currently loaded source, if any.
    fn source(&self) -> Option<&str>;
    /// Replace the loaded source. Playback is left paused.
    fn load(&mut self, url: &str) -> Result<(), EndpointError>;
    fn clear_source(&mut self);

    /// Request playback. An `Ok` may still be followed by
    /// `EndpointEvent::PlayRejected`.
    fn play(&mut self) -> Result<(), EndpointError>;
    fn pause(&mut self);

    fn current_time(&self) -> Duration;
    fn set_current_time(&mut self, position: Duration) -> Result<(), EndpointError>;
    /// `None` until the loaded source has a finite, known duration.
    fn duration(&self) -> Option<Duration>;
    /// Linear volume in `[0.0, 1.0]`.
    fn set_volume(&mut self, volume: f32);

    /// Give the endpoint a chance to report progress. Called once per tick.
    fn poll(&mut self) {}

    /// Route the endpoint's output through an analyser.
    fn connect_analyser(&mut self, fft_size: usize) -> Result<Box<dyn RoutingGraph>, GraphError>;
}

/// The analysis/output graph an endpoint is routed through.
pub trait RoutingGraph {
    fn state(&self) -> GraphState;
    fn resume(&mut self) -> Result<(), GraphError>;
    fn suspend(&mut self) -> Result<(), GraphError>;
    fn close(&mut self) -> Result<(), GraphError>;
    fn analyser(&self) -> &Analyser;
}

/// Subscription list shared by endpoint implementations.
#[derive(Default)]
pub struct Listeners {
    next_id: SubscriptionId,
    senders: Vec<(SubscriptionId, Sender<EndpointEvent>)>,
}

impl Listeners {
    pub fn subscribe(&mut self) -> Subscription {
        let (tx, rx) = mpsc::channel();
        let id = self.next_id;
        self.next_id += 1;
        self.senders.push((id, tx));
        Subscription { id, events: rx }
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.senders.retain(|(sid, _)| *sid != id);
    }

    /// Deliver `event` to every live subscriber, dropping those whose
    /// receiver is gone.
    pub fn emit(&mut self, event: EndpointEvent) {
        self.senders
            .retain(|(_, tx)| tx.send(event.clone()).is_ok());
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.senders.len()
    }
}
