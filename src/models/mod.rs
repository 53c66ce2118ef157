pub mod bridge;
pub mod forward_sde;
pub mod model;
pub mod schedule;
