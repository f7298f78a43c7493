//! A throwaway subscriber for poking at a pub/sub component.
//!
//! The endpoint answers the sidecar's subscription probe with a single descriptor and accepts
//! whatever gets delivered to the events route (or the routes named by routing rules).

pub mod descriptor;
mod endpoint;
pub mod error;
mod handlers;
mod listener;
pub mod sink;
mod state;

pub use descriptor::{event_routes, parse_metadata, RoutingRules, SubscriptionDescriptor};
pub use endpoint::{serve, RunningEndpoint, SubscriptionEndpoint, SubscriptionOptions};
pub use error::SubscribeError;
pub use listener::BoundAddress;
pub use sink::{ConsoleEventSink, EventSink};
