pub mod endpoint;
pub mod initial;

pub use endpoint::EndpointDistribution;
pub use initial::InitialDistribution;
