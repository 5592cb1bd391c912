// Copyright 2026 The wlan-auth Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! AP-side IEEE Std 802.11-2020 authentication frame handling.
//!
//! This crate implements the access-point half of the 802.11 authentication
//! exchange: a dispatcher that admits or rejects incoming Authentication
//! frames, and the SAE (WPA3) handshake state machine it drives, including
//! the anti-clogging defenses of IEEE Std 802.11-2020, 12.4. Cryptographic
//! derivations, the full management-frame codec, and non-SAE authentication
//! algorithms are collaborators behind traits; see [`dispatcher`] and
//! [`sae`].

pub mod anti_clogging;
pub mod commit_queue;
pub mod dispatcher;
pub mod error;
pub mod ie;
pub mod mac;
pub mod sae;
pub mod station;
pub mod timer;

#[cfg(test)]
pub mod test_utils;

use std::time::Duration;

/// Deployment mode of the interface that owns the dispatcher. Mesh and
/// infrastructure BSS differ in SAE message sequencing: a mesh STA may send
/// commit and confirm back-to-back and drives retransmission itself, while
/// an infrastructure AP staggers them and relies on the peer to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Infrastructure,
    Mesh,
}

/// Which password element derivations are acceptable for incoming commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PwePolicy {
    /// Hunt-and-peck loop only (commit status SUCCESS).
    HuntAndPeck,
    /// Hash-to-element only (commit status SAE_HASH_TO_ELEMENT or SAE_PK).
    HashToElement,
    /// Either derivation, chosen by the peer's commit status.
    Both,
}

/// Runtime configuration for an [`dispatcher::AuthDispatcher`] instance.
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,
    /// Enabled finite cyclic groups, in negotiation preference order.
    pub sae_groups: Vec<u16>,
    pub pwe_policy: PwePolicy,
    /// Send our confirm immediately after our commit (always implied in
    /// mesh mode).
    pub sae_confirm_immediate: bool,
    /// Open-session count at which fresh commits are challenged with an
    /// anti-clogging token. Zero disables challenging entirely.
    pub anti_clogging_threshold: usize,
    /// dot11RSNASAESync: retries tolerated before the session is torn down.
    pub sae_sync_max: u8,
    /// Cool-down applied after the sync counter is exhausted.
    pub sae_cooldown: Duration,
    /// Mesh commit/confirm retransmission cadence.
    pub sae_retransmit_period: Duration,
    /// Per-entry pacing of commit queue drains.
    pub commit_queue_tick: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::Infrastructure,
            sae_groups: vec![19],
            pwe_policy: PwePolicy::Both,
            sae_confirm_immediate: false,
            anti_clogging_threshold: 5,
            sae_sync_max: 5,
            sae_cooldown: Duration::from_secs(10),
            sae_retransmit_period: Duration::from_secs(1),
            commit_queue_tick: Duration::from_millis(10),
        }
    }
}
