// Copyright 2026 The wlan-auth Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! The subset of the IEEE Std 802.11-2020 management frame format that the
//! authentication machinery reads and writes: the fixed Authentication
//! frame header and the numeric spaces it carries. The full MAC codec is
//! out of scope; frames arrive here with the management header already
//! stripped by the driver abstraction.

use {
    crate::error::Error,
    zerocopy::{AsBytes, FromBytes, LayoutVerified, Unaligned},
};

pub type MacAddr = [u8; 6];

pub trait MacFmt {
    fn to_mac_str(&self) -> String;
}

impl MacFmt for MacAddr {
    fn to_mac_str(&self) -> String {
        format!(
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self[0], self[1], self[2], self[3], self[4], self[5]
        )
    }
}

/// Management frame subtype, used together with the sequence control field
/// for duplicate detection. Authentication frames are subtype 11.
pub const MGMT_SUBTYPE_AUTH: u8 = 0x0b;

/// IEEE Std 802.11-2020, 9.4.1.1
#[repr(C)]
#[derive(AsBytes, FromBytes, PartialEq, Eq, Hash, Clone, Copy, Debug, Default)]
pub struct AuthAlgorithm(pub u16);

impl AuthAlgorithm {
    pub const OPEN: Self = Self(0);
    pub const SHARED_KEY: Self = Self(1);
    pub const FAST_BSS_TRANSITION: Self = Self(2);
    pub const SAE: Self = Self(3);
    pub const FILS_SK: Self = Self(4);
    pub const FILS_SK_PFS: Self = Self(5);
    pub const FILS_PK: Self = Self(6);
    pub const PASN: Self = Self(7);
}

/// IEEE Std 802.11-2020, 9.4.1.9, Table 9-50
#[repr(C)]
#[derive(AsBytes, FromBytes, PartialEq, Eq, Clone, Copy, Debug, Default)]
pub struct StatusCode(pub u16);

impl StatusCode {
    pub const SUCCESS: Self = Self(0);
    pub const UNSPECIFIED_FAILURE: Self = Self(1);
    pub const CHALLENGE_FAILURE: Self = Self(15);
    pub const UNSUPPORTED_AUTH_ALGORITHM: Self = Self(13);
    pub const UNKNOWN_AUTH_TRANSACTION: Self = Self(14);
    pub const ANTI_CLOGGING_TOKEN_REQUIRED: Self = Self(76);
    pub const UNSUPPORTED_FINITE_CYCLIC_GROUP: Self = Self(77);
    pub const UNKNOWN_PASSWORD_IDENTIFIER: Self = Self(123);
    pub const SAE_HASH_TO_ELEMENT: Self = Self(126);
    pub const SAE_PK: Self = Self(127);
}

/// Fixed portion of the Authentication frame body.
/// IEEE Std 802.11-2020, 9.3.3.11
#[repr(C, packed)]
#[derive(AsBytes, FromBytes, Unaligned, Clone, Copy, Debug)]
pub struct AuthHdr {
    pub auth_alg: AuthAlgorithm,
    pub auth_txn_seq_num: u16,
    pub status_code: StatusCode,
}

/// Splits an Authentication frame body into its fixed header and the
/// variable elements that follow. The body must have the management header
/// already removed.
pub fn parse_auth_frame(body: &[u8]) -> Result<(LayoutVerified<&[u8], AuthHdr>, &[u8]), Error> {
    LayoutVerified::<&[u8], AuthHdr>::new_unaligned_from_prefix(body)
        .ok_or(Error::FrameTooShort(body.len()))
}

/// Builds an Authentication frame body: the fixed header followed by
/// whatever variable fields the caller supplies.
pub fn write_auth_frame(
    alg: AuthAlgorithm,
    transaction: u16,
    status: StatusCode,
    elements: &[u8],
) -> Vec<u8> {
    let hdr = AuthHdr { auth_alg: alg, auth_txn_seq_num: transaction, status_code: status };
    let mut frame = Vec::with_capacity(std::mem::size_of::<AuthHdr>() + elements.len());
    frame.extend_from_slice(hdr.as_bytes());
    frame.extend_from_slice(elements);
    frame
}
