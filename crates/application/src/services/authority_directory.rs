use ferrous_relay_domain::{Authority, DomainError};
use std::sync::Arc;
use tracing::debug;

/// Routes a queried name to one of the configured upstream authorities.
///
/// Authorities whose suffix matches the name win over catch-all ones. When
/// several authorities qualify, one is picked uniformly at random, which is
/// the only load balancing between servers sharing a suffix.
pub struct AuthorityDirectory {
    authorities: Arc<[Authority]>,
}

impl AuthorityDirectory {
    pub fn new(authorities: Vec<Authority>) -> Self {
        debug!(
            authorities = authorities.len(),
            catch_all = authorities.iter().filter(|a| a.is_catch_all()).count(),
            "Authority directory created"
        );
        Self {
            authorities: Arc::from(authorities),
        }
    }

    pub fn authorities(&self) -> &[Authority] {
        &self.authorities
    }

    pub fn len(&self) -> usize {
        self.authorities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.authorities.is_empty()
    }

    pub fn select(&self, name: &str) -> Result<&Authority, DomainError> {
        let candidates = self.candidates(name);

        if candidates.is_empty() {
            return Err(DomainError::NoAuthorityFound(name.to_string()));
        }

        let chosen = candidates[fastrand::usize(..candidates.len())];
        debug!(
            domain = %name,
            candidates = candidates.len(),
            authority = %chosen,
            "Authority selected"
        );
        Ok(chosen)
    }

    /// Every authority `select` may return for `name`.
    pub fn candidates(&self, name: &str) -> Vec<&Authority> {
        let matching: Vec<&Authority> = self
            .authorities
            .iter()
            .filter(|authority| authority.matches_suffix(name))
            .collect();

        if !matching.is_empty() {
            return matching;
        }

        self.authorities
            .iter()
            .filter(|authority| authority.is_catch_all())
            .collect()
    }
}
