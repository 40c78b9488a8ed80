//! Principal registry.
//!
//! Creates and looks up principals and resolves outstanding challenges.
//! The registry owns no state of its own; it is a view over the injected
//! store, and every mutation it performs is a single atomic store
//! operation.

use std::sync::Arc;

use crate::{
    env::Environment,
    error::RelayError,
    principal::Principal,
    store::{Store, StoreError},
    token::TokenMinter,
};

/// Registry of principals keyed by name.
pub struct PrincipalRegistry<S> {
    store: Arc<S>,
}

impl<S: Store> PrincipalRegistry<S> {
    /// Create a registry over the shared store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Register a new principal and issue its first challenge.
    ///
    /// Returns the stored principal and the minted challenge token (the
    /// plaintext the caller will seal under the principal's public key).
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::NameTaken`] if the name is already
    /// registered. The check-and-insert is atomic in the store, so two
    /// concurrent registrations of the same name cannot both succeed.
    pub fn register<E: Environment>(
        &self,
        env: &E,
        minter: &TokenMinter,
        name: &str,
        public_key: &str,
    ) -> Result<(Principal, String), RelayError> {
        // Cheap pre-check; the insert below still arbitrates races.
        if self.store.principal_by_name(name).is_some() {
            return Err(RelayError::NameTaken { name: name.to_string() });
        }

        let challenge = minter.mint(env, self.store.as_ref())?;
        let principal = Principal {
            name: name.to_string(),
            public_key: public_key.to_string(),
            pending_challenge: Some(challenge.clone()),
        };

        match self.store.insert_principal(principal.clone()) {
            Ok(()) => {
                tracing::info!(name, "registered principal");
                Ok((principal, challenge))
            },
            Err(StoreError::DuplicateName { name }) => Err(RelayError::NameTaken { name }),
            Err(err) => Err(RelayError::Store(err)),
        }
    }

    /// Look up a principal by name.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::UnknownPrincipal`] when absent.
    pub fn lookup(&self, name: &str) -> Result<Principal, RelayError> {
        self.store
            .principal_by_name(name)
            .ok_or_else(|| RelayError::UnknownPrincipal { name: name.to_string() })
    }

    /// Resolve a decrypted challenge token to the principal it was issued
    /// for, consuming the challenge.
    ///
    /// Matching proves possession of the private key: the relay minted the
    /// token, sealed it under the principal's public key, and only the
    /// key-holder could have recovered the plaintext. The challenge is
    /// cleared atomically with the match, so a captured value proves
    /// identity exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::UnmatchedToken`] if no pending challenge
    /// equals the value.
    pub fn resolve_challenge(&self, decrypted: &str) -> Result<Principal, RelayError> {
        self.store.resolve_challenge(decrypted).ok_or(RelayError::UnmatchedToken)
    }
}

impl<S> std::fmt::Debug for PrincipalRegistry<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrincipalRegistry").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::store::MemoryStore;

    #[derive(Clone, Default)]
    struct SeqEnv {
        counter: Arc<std::sync::Mutex<u64>>,
    }

    impl Environment for SeqEnv {
        fn unix_millis(&self) -> u64 {
            7
        }

        fn sleep(&self, _duration: Duration) -> impl std::future::Future<Output = ()> + Send {
            std::future::ready(())
        }

        fn random_bytes(&self, buffer: &mut [u8]) {
            let mut counter = self.counter.lock().unwrap();
            *counter += 1;
            let bytes = counter.to_be_bytes();
            for (i, slot) in buffer.iter_mut().enumerate() {
                *slot = bytes[i % bytes.len()];
            }
        }
    }

    fn registry() -> (SeqEnv, TokenMinter, PrincipalRegistry<MemoryStore>) {
        (SeqEnv::default(), TokenMinter::default(), PrincipalRegistry::new(Arc::new(MemoryStore::new())))
    }

    #[test]
    fn register_issues_a_challenge() {
        let (env, minter, registry) = registry();

        let (principal, challenge) = registry.register(&env, &minter, "alice", "PK_A").unwrap();
        assert_eq!(principal.name, "alice");
        assert_eq!(principal.pending_challenge.as_deref(), Some(challenge.as_str()));
    }

    #[test]
    fn register_rejects_taken_name() {
        let (env, minter, registry) = registry();
        registry.register(&env, &minter, "alice", "PK_A").unwrap();

        let result = registry.register(&env, &minter, "alice", "PK_OTHER");
        assert!(matches!(result, Err(RelayError::NameTaken { .. })));
    }

    #[test]
    fn resolve_challenge_is_one_shot() {
        let (env, minter, registry) = registry();
        let (_, challenge) = registry.register(&env, &minter, "alice", "PK_A").unwrap();

        let principal = registry.resolve_challenge(&challenge).unwrap();
        assert_eq!(principal.name, "alice");

        let replay = registry.resolve_challenge(&challenge);
        assert!(matches!(replay, Err(RelayError::UnmatchedToken)));
    }

    #[test]
    fn lookup_unknown_names_the_principal() {
        let (_, _, registry) = registry();

        let err = registry.lookup("ghost").unwrap_err();
        assert_eq!(err.to_string(), "principal does not exist: 'ghost'");
    }
}
