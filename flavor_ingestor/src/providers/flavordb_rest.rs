//! FlavorDB REST provider (`entities_json?id=<n>`).

pub mod params;
pub mod provider;

pub use params::FlavorDbRestParams;
pub use provider::FlavorDbRestProvider;

/// Public FlavorDB endpoint serving one entity per id.
pub const BASE_URL: &str = "https://cosylab.iiitd.edu.in/flavordb/entities_json";
