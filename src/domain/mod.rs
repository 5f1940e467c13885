// Domain layer: core models and ports (interfaces). No external dependencies beyond serde/decimal.

pub mod model;
pub mod ports;
