// Domain layer: core models and ports (interfaces). External tools are only reached through ports.

pub mod model;
pub mod ports;
