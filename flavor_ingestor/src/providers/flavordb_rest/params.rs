use std::{num::NonZeroU32, time::Duration};

use nonzero_ext::nonzero;

use super::BASE_URL;

/// Connection parameters for [`super::FlavorDbRestProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlavorDbRestParams {
    /// Endpoint URL; the entity id is passed as the `id` query parameter.
    pub base_url: String,
    /// Upper bound on outgoing requests per second.
    pub requests_per_second: NonZeroU32,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for FlavorDbRestParams {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            requests_per_second: nonzero!(4u32),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Query string for a single entity lookup.
pub fn entity_query(entity_id: u32) -> [(&'static str, String); 1] {
    [("id", entity_id.to_string())]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_public_endpoint() {
        let p = FlavorDbRestParams::default();
        assert_eq!(p.base_url, BASE_URL);
        assert_eq!(p.requests_per_second.get(), 4);
    }

    #[test]
    fn query_carries_the_id() {
        assert_eq!(entity_query(42), [("id", "42".to_string())]);
    }
}
