// Domain layer: request-scoped models and the outbound transport port.

pub mod model;
pub mod ports;
