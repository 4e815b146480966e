// Domain layer: probe/target models and the ports the core drives.

pub mod model;
pub mod ports;
