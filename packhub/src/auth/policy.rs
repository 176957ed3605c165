//! Ownership and contributor checks.

use super::verifier::TokenVerifier;
use crate::catalog::CatalogError;
use crate::model::{Bundle, Pack, UserId};

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user: UserId,
}

impl Identity {
    pub fn new(user: impl Into<UserId>) -> Self {
        Self { user: user.into() }
    }
}

/// Resolve the caller from an optional token.
///
/// A missing, empty or unknown token is `Unauthorized`.
pub async fn authenticate(
    verifier: &dyn TokenVerifier,
    token: Option<&str>,
) -> Result<Identity, CatalogError> {
    let token = token.filter(|t| !t.is_empty()).ok_or(CatalogError::Unauthorized)?;
    verifier
        .verify(token)
        .await
        .map(|user| Identity { user })
        .ok_or(CatalogError::Unauthorized)
}

/// The caller must be the pack owner.
pub fn require_owner(identity: &Identity, pack: &Pack) -> Result<(), CatalogError> {
    if pack.is_owner(&identity.user) {
        Ok(())
    } else {
        Err(CatalogError::Forbidden(format!(
            "You are not the owner of {}",
            pack.id
        )))
    }
}

/// The caller must be one of the pack's contributors.
pub fn require_contributor(identity: &Identity, pack: &Pack) -> Result<(), CatalogError> {
    if pack.is_contributor(&identity.user) {
        Ok(())
    } else {
        Err(CatalogError::Forbidden(format!(
            "You are not a contributor for {}",
            pack.id
        )))
    }
}

/// The caller must be the bundle owner.
pub fn require_bundle_owner(identity: &Identity, bundle: &Bundle) -> Result<(), CatalogError> {
    if bundle.is_owner(&identity.user) {
        Ok(())
    } else {
        Err(CatalogError::Forbidden(format!(
            "You are not the owner of bundle {}",
            bundle.uid
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticTokenVerifier;
    use crate::model::{BundleData, PackData};
    use chrono::Utc;

    fn pack_owned_by(owner: &str) -> Pack {
        Pack::new("doc", "tcc", UserId::new(owner), PackData::new("tcc", "TCC"), Utc::now())
    }

    #[tokio::test]
    async fn test_authenticate_fails_closed() {
        let verifier = StaticTokenVerifier::new().with_token("good", "alice");

        assert_eq!(
            authenticate(&verifier, Some("good")).await.unwrap(),
            Identity::new("alice")
        );
        assert!(matches!(
            authenticate(&verifier, None).await,
            Err(CatalogError::Unauthorized)
        ));
        assert!(matches!(
            authenticate(&verifier, Some("")).await,
            Err(CatalogError::Unauthorized)
        ));
        assert!(matches!(
            authenticate(&verifier, Some("invalid")).await,
            Err(CatalogError::Unauthorized)
        ));
    }

    #[test]
    fn test_owner_check_is_exact_equality() {
        let mut pack = pack_owned_by("alice");
        pack.add_contributors(&[UserId::new("bob")]);

        assert!(require_owner(&Identity::new("alice"), &pack).is_ok());
        let err = require_owner(&Identity::new("bob"), &pack).unwrap_err();
        assert!(matches!(err, CatalogError::Forbidden(_)));
        assert!(err.to_string().contains("owner of tcc"));
    }

    #[test]
    fn test_contributor_check_is_membership() {
        let mut pack = pack_owned_by("alice");
        pack.add_contributors(&[UserId::new("bob")]);

        assert!(require_contributor(&Identity::new("alice"), &pack).is_ok());
        assert!(require_contributor(&Identity::new("bob"), &pack).is_ok());
        assert!(matches!(
            require_contributor(&Identity::new("mallory"), &pack),
            Err(CatalogError::Forbidden(_))
        ));
    }

    #[test]
    fn test_bundle_owner_check() {
        let bundle = Bundle::new("b1", UserId::new("alice"), BundleData::new("B", "1.19"));
        assert!(require_bundle_owner(&Identity::new("alice"), &bundle).is_ok());
        assert!(require_bundle_owner(&Identity::new("bob"), &bundle).is_err());
    }
}
