// Domain layer: card/session models, wire messages and ports. No I/O here.

pub mod classifier;
pub mod model;
pub mod ports;
pub mod wire;
