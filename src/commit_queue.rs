// Copyright 2026 The wlan-auth Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Bounded deferral queue for SAE commit messages.
//!
//! Processing a commit costs a scalar multiplication, so under load the
//! dispatcher parks fresh commits here and drains them one at a time from a
//! timer. The queue deduplicates on (source address, transaction number):
//! a retry from the same peer replaces the stale payload instead of being
//! processed twice.

use {
    crate::mac::{MacAddr, MacFmt},
    log::debug,
    std::{collections::VecDeque, time::Duration},
};

pub const COMMIT_QUEUE_MAX_LEN: usize = 15;

#[derive(Debug, PartialEq)]
pub struct CommitQueueEntry {
    pub source_addr: MacAddr,
    pub transaction: u16,
    /// Raw authentication frame body, re-parsed on redelivery.
    pub frame_body: Vec<u8>,
    pub signal_dbm: i8,
    pub seq_ctrl: u16,
}

#[derive(Default)]
pub struct CommitQueue {
    entries: VecDeque<CommitQueueEntry>,
}

impl CommitQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry. An entry with the same (source address,
    /// transaction) replaces the queued one: the old entry is deleted and
    /// the new one appended. When the queue is full the new entry is
    /// dropped; the peer is expected to retry.
    pub fn enqueue(&mut self, entry: CommitQueueEntry) {
        if let Some(pos) = self.entries.iter().position(|queued| {
            queued.source_addr == entry.source_addr && queued.transaction == entry.transaction
        }) {
            debug!(
                "replacing queued SAE commit from {} (txn {})",
                entry.source_addr.to_mac_str(),
                entry.transaction
            );
            self.entries.remove(pos);
        } else if self.entries.len() >= COMMIT_QUEUE_MAX_LEN {
            debug!("SAE commit queue full; dropping frame from {}", entry.source_addr.to_mac_str());
            return;
        }
        self.entries.push_back(entry);
    }

    pub fn drain_one(&mut self) -> Option<CommitQueueEntry> {
        self.entries.pop_front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a commit from `addr` is already parked here. Used by the
    /// dispatcher to route retries through the queue for deduplication.
    pub fn contains_peer(&self, addr: &MacAddr) -> bool {
        self.entries.iter().any(|entry| entry.source_addr == *addr)
    }

    /// Delay before the next drain: immediate when the queue is empty and
    /// one tick per queued entry otherwise, so redelivery trickles under
    /// load instead of re-creating the burst that caused the queueing.
    pub fn drain_delay(&self, tick: Duration) -> Duration {
        tick * self.entries.len() as u32
    }
}
