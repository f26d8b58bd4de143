use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::{ApiReply, CaseNumberDto};
use crate::catalog::Branch;

pub const FALLBACK_PREFIX: &str = "EXPE";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CaseOrigin {
    Server,
    LocalFallback,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CaseRecord {
    pub numeric_id: u64,
    pub display_code: String,
    pub contact_email: String,
    pub origin: CaseOrigin,
}

impl CaseRecord {
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.numeric_id > 0 && !self.display_code.trim().is_empty()
    }
}

/// Turns the case-number reply for a branch into a [`CaseRecord`], falling
/// back to a local per-branch counter.
///
/// The counters live only as long as this instance. They are never persisted,
/// so locally generated codes are not unique across restarts.
#[derive(Debug, Clone, Default)]
pub struct CaseNumberResolver {
    counters: HashMap<String, u32>,
}

impl CaseNumberResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&mut self, branch: &Branch, reply: ApiReply<CaseNumberDto>) -> CaseRecord {
        match reply {
            ApiReply::Success(CaseNumberDto {
                nro_expediente: Some(id),
                codigo_expediente: Some(code),
                correo_expediente,
            }) if id > 0 && !code.trim().is_empty() => {
                info!(
                    branch = %branch.legal_entity_code,
                    case_code = %code,
                    "case number issued by server"
                );
                CaseRecord {
                    numeric_id: id,
                    display_code: code,
                    contact_email: correo_expediente.unwrap_or_default(),
                    origin: CaseOrigin::Server,
                }
            }
            ApiReply::Success(_) => {
                warn!(
                    branch = %branch.legal_entity_code,
                    "case number reply incomplete, using local counter"
                );
                self.fallback(&branch.establishment_id)
            }
            ApiReply::Failure { reason, .. } => {
                warn!(
                    branch = %branch.legal_entity_code,
                    %reason,
                    "case number request failed, using local counter"
                );
                self.fallback(&branch.establishment_id)
            }
        }
    }

    pub fn fallback(&mut self, establishment_id: &str) -> CaseRecord {
        let key = establishment_id.trim().to_uppercase();
        let counter = self.counters.entry(key.clone()).or_insert(0);
        *counter = counter.saturating_add(1);

        CaseRecord {
            numeric_id: u64::from(*counter),
            display_code: format!("{FALLBACK_PREFIX}-{key}-{:04}", *counter),
            contact_email: String::new(),
            origin: CaseOrigin::LocalFallback,
        }
    }

    #[must_use]
    pub fn issued_locally(&self, establishment_id: &str) -> u32 {
        self.counters
            .get(&establishment_id.trim().to_uppercase())
            .copied()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn branch(estab: &str) -> Branch {
        Branch {
            legal_entity_code: "0001".into(),
            display_name: "Sede".into(),
            establishment_id: estab.into(),
        }
    }

    #[test]
    fn consecutive_fallbacks_are_sequential() {
        let mut resolver = CaseNumberResolver::new();
        let first = resolver.resolve(&branch("ABC"), ApiReply::failure("offline"));
        let second = resolver.resolve(&branch("ABC"), ApiReply::failure("offline"));
        assert_eq!(first.display_code, "EXPE-ABC-0001");
        assert_eq!(second.display_code, "EXPE-ABC-0002");
        assert_eq!(second.numeric_id, 2);
        assert_eq!(second.contact_email, "");
        assert_eq!(second.origin, CaseOrigin::LocalFallback);
    }

    #[test]
    fn counter_key_is_upper_cased() {
        let mut resolver = CaseNumberResolver::new();
        resolver.fallback("abc");
        let record = resolver.fallback("ABC");
        assert_eq!(record.display_code, "EXPE-ABC-0002");
        assert_eq!(resolver.issued_locally("Abc"), 2);
    }

    #[test]
    fn counters_are_per_branch() {
        let mut resolver = CaseNumberResolver::new();
        resolver.fallback("ABC");
        let other = resolver.fallback("XYZ");
        assert_eq!(other.display_code, "EXPE-XYZ-0001");
    }

    #[test]
    fn fresh_instances_do_not_share_state() {
        CaseNumberResolver::new().fallback("ABC");
        let record = CaseNumberResolver::new().fallback("ABC");
        assert_eq!(record.display_code, "EXPE-ABC-0001");
    }

    #[test]
    fn server_values_adopted_verbatim() {
        let mut resolver = CaseNumberResolver::new();
        let record = resolver.resolve(
            &branch("ABC"),
            ApiReply::Success(CaseNumberDto {
                nro_expediente: Some(905),
                codigo_expediente: Some("DU-2025-0905".into()),
                correo_expediente: Some("defensoria@example.edu".into()),
            }),
        );
        assert_eq!(record.numeric_id, 905);
        assert_eq!(record.display_code, "DU-2025-0905");
        assert_eq!(record.contact_email, "defensoria@example.edu");
        assert_eq!(record.origin, CaseOrigin::Server);
        assert_eq!(resolver.issued_locally("ABC"), 0);
    }

    #[test]
    fn incomplete_success_falls_back() {
        let mut resolver = CaseNumberResolver::new();
        let record = resolver.resolve(
            &branch("ABC"),
            ApiReply::Success(CaseNumberDto {
                nro_expediente: Some(7),
                codigo_expediente: None,
                correo_expediente: None,
            }),
        );
        assert_eq!(record.display_code, "EXPE-ABC-0001");
    }

    #[test]
    fn usable_requires_id_and_code() {
        let mut record = CaseNumberResolver::new().fallback("ABC");
        assert!(record.is_usable());
        record.display_code = " ".into();
        assert!(!record.is_usable());
    }
}
