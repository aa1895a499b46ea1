// Domain layer: wire models and ports (interfaces) shared by core and adapters.

pub mod model;
pub mod ports;
