// Copyright 2026 The wlan-auth Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Anti-clogging token defense for SAE. IEEE Std 802.11-2020, 12.4.6.
//!
//! Processing an SAE commit is expensive, so once enough exchanges are in
//! flight a fresh commit is answered with a statelessly verifiable token
//! instead of being processed. The peer proves return-routability by
//! echoing the token in its retried commit. Tokens are a keyed hash over
//! the peer address and group, so verification needs no per-peer state and
//! rotating the key invalidates every outstanding token at once.

use {
    hmac::{Hmac, Mac},
    rand::RngCore,
    sha2::Sha256,
};

type HmacSha256 = Hmac<Sha256>;

pub const TOKEN_LEN: usize = 32;
const TOKEN_KEY_LEN: usize = 32;

pub struct AntiCloggingGuard {
    token_key: [u8; TOKEN_KEY_LEN],
}

impl AntiCloggingGuard {
    pub fn new(rng: &mut impl RngCore) -> Self {
        let mut token_key = [0u8; TOKEN_KEY_LEN];
        rng.fill_bytes(&mut token_key);
        Self { token_key }
    }

    /// Whether a fresh commit must be challenged. `open_sessions` counts
    /// mid-handshake SAE sessions plus concurrently open PASN exchanges;
    /// the queue length is added on top. A zero threshold disables
    /// challenging unconditionally.
    pub fn should_challenge(
        &self,
        open_sessions: usize,
        queued_commits: usize,
        threshold: usize,
    ) -> bool {
        threshold != 0 && open_sessions + queued_commits >= threshold
    }

    pub fn mint_token(&self, addr: &[u8; 6], group: u16) -> Vec<u8> {
        self.tag(addr, group)
    }

    /// Stateless verification: recompute the tag under the current key.
    /// Tokens minted before the last key rotation do not verify.
    pub fn verify_token(&self, addr: &[u8; 6], group: u16, token: &[u8]) -> bool {
        if token.len() != TOKEN_LEN {
            return false;
        }
        // Constant-time comparison via the MAC's own verifier.
        self.keyed_mac(addr, group).verify_slice(token).is_ok()
    }

    /// Replaces the token key. Invoked from the dispatcher's periodic key
    /// rotation timeout.
    pub fn rotate_key(&mut self, rng: &mut impl RngCore) {
        rng.fill_bytes(&mut self.token_key);
    }

    fn keyed_mac(&self, addr: &[u8; 6], group: u16) -> HmacSha256 {
        // Key length is fixed; new_from_slice cannot fail for HMAC.
        let mut mac = HmacSha256::new_from_slice(&self.token_key)
            .unwrap_or_else(|_| unreachable!("HMAC accepts any key length"));
        mac.update(addr);
        mac.update(&group.to_le_bytes());
        mac
    }

    fn tag(&self, addr: &[u8; 6], group: u16) -> Vec<u8> {
        self.keyed_mac(addr, group).finalize().into_bytes().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use {super::*, rand::rngs::mock::StepRng};

    const ADDR_A: [u8; 6] = [2, 2, 2, 2, 2, 2];
    const ADDR_B: [u8; 6] = [4, 4, 4, 4, 4, 4];

    fn guard() -> AntiCloggingGuard {
        AntiCloggingGuard::new(&mut StepRng::new(7, 11))
    }

    #[test]
    fn threshold_decision() {
        let guard = guard();
        assert!(!guard.should_challenge(2, 2, 5));
        assert!(guard.should_challenge(3, 2, 5));
        assert!(guard.should_challenge(10, 0, 5));
        // Zero threshold disables challenging regardless of load.
        assert!(!guard.should_challenge(100, 100, 0));
    }

    #[test]
    fn minted_token_verifies() {
        let guard = guard();
        let token = guard.mint_token(&ADDR_A, 19);
        assert_eq!(token.len(), TOKEN_LEN);
        assert!(guard.verify_token(&ADDR_A, 19, &token));
    }

    #[test]
    fn token_bound_to_address_and_group() {
        let guard = guard();
        let token = guard.mint_token(&ADDR_A, 19);
        assert!(!guard.verify_token(&ADDR_B, 19, &token));
        assert!(!guard.verify_token(&ADDR_A, 20, &token));
    }

    #[test]
    fn rotation_invalidates_outstanding_tokens() {
        let mut guard = guard();
        let token = guard.mint_token(&ADDR_A, 19);
        guard.rotate_key(&mut StepRng::new(1234, 7));
        assert!(!guard.verify_token(&ADDR_A, 19, &token));
        // Freshly minted tokens verify under the new key.
        let token = guard.mint_token(&ADDR_A, 19);
        assert!(guard.verify_token(&ADDR_A, 19, &token));
    }

    #[test]
    fn malformed_token_rejected() {
        let guard = guard();
        assert!(!guard.verify_token(&ADDR_A, 19, &[]));
        assert!(!guard.verify_token(&ADDR_A, 19, &[0xab; 16]));
    }
}
