//! Property-based tests for token minting.
//!
//! The uniqueness invariant: across all tokens minted for principals and
//! messages in a run, no two are equal at any point in time. Mint calls
//! are serialized and each minted token is parked in the store so the
//! collision check sees it.

use std::collections::HashSet;

use courier_core::{
    MemoryStore, MessageDraft, Principal, Store, TOKEN_LEN, TokenMinter, env::Environment,
};
use courier_harness::TestEnv;
use proptest::prelude::*;

proptest! {
    #[test]
    fn minted_tokens_are_globally_unique(count in 1usize..200, seed in any::<u64>()) {
        let env = TestEnv::new(seed);
        let store = MemoryStore::new();
        let minter = TokenMinter::default();

        let mut seen = HashSet::new();
        for i in 0..count {
            let token = minter.mint(&env, &store).expect("mint");
            prop_assert_eq!(token.len(), TOKEN_LEN);
            prop_assert!(seen.insert(token.clone()), "collision at mint {}", i);

            // Alternate where the token lands; uniqueness spans both
            // collections.
            if i % 2 == 0 {
                store
                    .insert_principal(Principal {
                        name: format!("p{i}"),
                        public_key: String::new(),
                        pending_challenge: Some(token),
                    })
                    .expect("insert principal");
            } else {
                store.insert_message(MessageDraft {
                    sender: "a".to_string(),
                    receiver: "b".to_string(),
                    body: String::new(),
                    token,
                    created_at: env.unix_millis(),
                });
            }
        }

        // Set cardinality grew by exactly one per mint.
        prop_assert_eq!(seen.len(), count);
    }

    #[test]
    fn tokens_are_lowercase_hex(seed in any::<u64>()) {
        let env = TestEnv::new(seed);
        let store = MemoryStore::new();
        let minter = TokenMinter::default();

        let token = minter.mint(&env, &store).expect("mint");
        prop_assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn distinct_seeds_disagree(seed in any::<u64>()) {
        let store = MemoryStore::new();
        let minter = TokenMinter::default();

        let first = minter.mint(&TestEnv::new(seed), &store).expect("mint");
        let second = minter.mint(&TestEnv::new(seed.wrapping_add(1)), &store).expect("mint");
        prop_assert_ne!(first, second);
    }
}
