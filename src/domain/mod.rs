// Domain layer: data model and ports. Adapters implement the ports; core depends only on them.

pub mod model;
pub mod ports;
