// Domain layer: vault models and the ports the commands are written against.

pub mod model;
pub mod ports;
