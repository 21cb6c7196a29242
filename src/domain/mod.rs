// Domain layer: core models and ports (interfaces). Nothing here touches storage or I/O.

pub mod model;
pub mod ports;
