// Domain layer: data model and ports (interfaces) shared by every source.

pub mod model;
pub mod ports;
