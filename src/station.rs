// Copyright 2026 The wlan-auth Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Per-peer authentication state and the address-keyed table that owns it.

use {
    crate::{mac::{AuthAlgorithm, MacAddr}, sae::SaeSession},
    std::collections::HashMap,
};

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct StationFlags(pub u32);

impl StationFlags {
    pub const AUTHENTICATED: Self = Self(1);
    pub const ASSOCIATED: Self = Self(1 << 1);
    pub const ASSOC_PENDING_ACK: Self = Self(1 << 2);
    pub const AUTHORIZED: Self = Self(1 << 3);
    /// The driver holds an entry for this station even though it has not
    /// associated; such entries must be removed on authentication failure.
    pub const ADDED_UNASSOCIATED: Self = Self(1 << 4);

    pub fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }
}

/// Authentication state for one peer, keyed by its MAC address.
///
/// Created on the first admissible Authentication frame from a new peer and
/// destroyed on deauthentication or admission failure cleanup. The SAE
/// session, when present, is exclusively owned by this record.
pub struct StationAuthRecord {
    pub addr: MacAddr,
    pub flags: StationFlags,
    pub chosen_algorithm: Option<AuthAlgorithm>,
    /// Sequence control of the last processed frame, for duplicate
    /// detection together with `last_subtype`.
    pub last_seq_ctrl: Option<u16>,
    pub last_subtype: Option<u8>,
    pub sae: Option<SaeSession>,
}

impl StationAuthRecord {
    pub fn new(addr: MacAddr) -> Self {
        Self {
            addr,
            flags: StationFlags::default(),
            chosen_algorithm: None,
            last_seq_ctrl: None,
            last_subtype: None,
            sae: None,
        }
    }

    /// Whether `(seq_ctrl, subtype)` exactly matches the last processed
    /// frame. Exact retransmissions are dropped rather than reprocessed.
    pub fn is_duplicate(&self, seq_ctrl: u16, subtype: u8) -> bool {
        self.last_seq_ctrl == Some(seq_ctrl) && self.last_subtype == Some(subtype)
    }

    pub fn record_frame(&mut self, seq_ctrl: u16, subtype: u8) {
        self.last_seq_ctrl = Some(seq_ctrl);
        self.last_subtype = Some(subtype);
    }
}

/// Address-keyed station registry. All lookups go through this table; the
/// records never hand out aliasing references back to their owner.
#[derive(Default)]
pub struct StationTable {
    stations: HashMap<MacAddr, StationAuthRecord>,
}

impl StationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, addr: &MacAddr) -> Option<&StationAuthRecord> {
        self.stations.get(addr)
    }

    pub fn get_mut(&mut self, addr: &MacAddr) -> Option<&mut StationAuthRecord> {
        self.stations.get_mut(addr)
    }

    pub fn get_or_create(&mut self, addr: MacAddr) -> &mut StationAuthRecord {
        self.stations.entry(addr).or_insert_with(|| StationAuthRecord::new(addr))
    }

    pub fn remove(&mut self, addr: &MacAddr) -> Option<StationAuthRecord> {
        self.stations.remove(addr)
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    /// Stations whose SAE session is mid-handshake (committed or
    /// confirmed); feeds the anti-clogging threshold decision.
    pub fn open_sae_sessions(&self) -> usize {
        self.stations.values().filter(|sta| {
            sta.sae.as_ref().map_or(false, |sae| sae.is_open())
        }).count()
    }
}

#[cfg(test)]
mod tests {
    use {super::*, crate::sae::{SaeSession, SaeState}};

    const ADDR: MacAddr = [1, 2, 3, 4, 5, 6];

    #[test]
    fn flags_insert_remove() {
        let mut flags = StationFlags::default();
        flags.insert(StationFlags::AUTHENTICATED);
        flags.insert(StationFlags::ASSOCIATED);
        assert!(flags.contains(StationFlags::AUTHENTICATED));
        flags.remove(StationFlags::AUTHENTICATED);
        assert!(!flags.contains(StationFlags::AUTHENTICATED));
        assert!(flags.contains(StationFlags::ASSOCIATED));
    }

    #[test]
    fn duplicate_detection() {
        let mut sta = StationAuthRecord::new(ADDR);
        assert!(!sta.is_duplicate(0x10, 0x0b));
        sta.record_frame(0x10, 0x0b);
        assert!(sta.is_duplicate(0x10, 0x0b));
        // A different sequence control or subtype is not a duplicate.
        assert!(!sta.is_duplicate(0x20, 0x0b));
        assert!(!sta.is_duplicate(0x10, 0x00));
    }

    #[test]
    fn open_sae_session_count() {
        let mut table = StationTable::new();
        table.get_or_create([1; 6]);
        let sta = table.get_or_create([2; 6]);
        let mut session = SaeSession::new(19);
        session.state = SaeState::Committed;
        sta.sae.replace(session);
        let sta = table.get_or_create([3; 6]);
        let mut session = SaeSession::new(19);
        session.state = SaeState::Accepted;
        sta.sae.replace(session);
        assert_eq!(table.open_sae_sessions(), 1);
    }
}
