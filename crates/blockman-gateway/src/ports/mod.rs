//! Ports: the seams between the gateway and the outside world.

pub mod outbound;

pub use outbound::{NodeClient, NodeError, SystemTimeSource, TimeSource};
