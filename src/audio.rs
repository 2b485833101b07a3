//! Audio module: playback coordination over a single endpoint.
//!
//! `PlaybackCoordinator` owns the transport state and drives an `Endpoint`;
//! `RodioEndpoint` is the desktop implementation and `Analyser` exposes the
//! spectrum of whatever is playing.

mod analyser;
mod coordinator;
mod endpoint;
mod sink;
mod types;

pub use analyser::DEFAULT_FFT_SIZE;
pub use coordinator::{PlaybackCoordinator, PlayerOptions};
pub use endpoint::Endpoint;
pub use sink::RodioEndpoint;
pub use types::{PlaybackState, RepeatMode};
