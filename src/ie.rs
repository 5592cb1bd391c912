// Copyright 2026 The wlan-auth Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Information elements and SAE field layouts consumed by the state
//! machine. Only the fields the authentication machinery reads or writes
//! are modeled; scalar and element bytes stay opaque and are handed to the
//! crypto collaborator untouched.

use {
    crate::error::Error,
    zerocopy::{AsBytes, FromBytes, LayoutVerified, Unaligned},
};

/// IEEE Std 802.11-2020, 9.4.2.1
#[repr(C)]
#[derive(AsBytes, FromBytes, Unaligned, PartialEq, Eq, Clone, Copy, Debug)]
pub struct Id(pub u8);

impl Id {
    pub const EXTENSION: Self = Self(255);
}

/// Element ID extension values. IEEE Std 802.11-2020, Table 9-92.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct IdExt(pub u8);

impl IdExt {
    pub const PASSWORD_IDENTIFIER: Self = Self(33);
    pub const REJECTED_GROUPS: Self = Self(92);
    pub const ANTI_CLOGGING_TOKEN_CONTAINER: Self = Self(93);
}

#[repr(C, packed)]
#[derive(AsBytes, FromBytes, Unaligned, Clone, Copy, Debug)]
pub struct Header {
    pub id: Id,
    pub body_len: u8,
}

/// Iterates over a chain of elements, yielding `(id, body)` pairs and
/// stopping at the first truncated element.
pub struct Reader<'a>(&'a [u8]);

impl<'a> Reader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Reader(bytes)
    }
}

impl<'a> Iterator for Reader<'a> {
    type Item = (Id, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        let (header, rest) =
            LayoutVerified::<&[u8], Header>::new_unaligned_from_prefix(self.0)?;
        let body_len = header.body_len as usize;
        if rest.len() < body_len {
            return None;
        }
        let (body, remaining) = rest.split_at(body_len);
        self.0 = remaining;
        Some((header.id, body))
    }
}

/// Fields of an SAE Commit message relevant to the state machine.
/// IEEE Std 802.11-2020, 9.3.3.11 (Authentication frame format, SAE).
#[derive(Debug, PartialEq)]
pub struct SaeCommit<'a> {
    /// Finite cyclic group the peer committed to.
    pub group: u16,
    /// Echoed anti-clogging token, if any.
    pub token: Option<&'a [u8]>,
    /// Scalar and element bytes, opaque to this crate.
    pub scalar_element: &'a [u8],
    /// Password identifier the peer is using, if any.
    pub password_id: Option<&'a [u8]>,
    /// Groups the peer claims to have rejected in earlier exchanges.
    pub rejected_groups: Vec<u16>,
}

/// Parses an SAE commit following the fixed authentication header.
///
/// `scalar_element_len` is the expected combined length of the scalar and
/// element fields for the committed group; it comes from the crypto
/// collaborator since it depends on group arithmetic. In a hunt-and-peck
/// commit any bytes between the group field and the scalar are an echoed
/// anti-clogging token. In a hash-to-element commit (`h2e` set) the token
/// and the other optional fields trail the element as container elements.
pub fn parse_sae_commit<'a>(
    elements: &'a [u8],
    scalar_element_len: usize,
    h2e: bool,
) -> Result<SaeCommit<'a>, Error> {
    if elements.len() < 2 {
        return Err(Error::MalformedElement("SAE commit missing group field"));
    }
    let group = u16::from_le_bytes([elements[0], elements[1]]);
    let rest = &elements[2..];
    if rest.len() < scalar_element_len {
        return Err(Error::MalformedElement("SAE commit scalar/element truncated"));
    }

    if !h2e {
        // Hunt-and-peck: no trailing elements are defined; everything in
        // front of the scalar is a token echo.
        let token_len = rest.len() - scalar_element_len;
        let (token, scalar_element) = rest.split_at(token_len);
        return Ok(SaeCommit {
            group,
            token: if token.is_empty() { None } else { Some(token) },
            scalar_element,
            password_id: None,
            rejected_groups: vec![],
        });
    }

    let (scalar_element, trailing) = rest.split_at(scalar_element_len);
    let mut commit = SaeCommit {
        group,
        token: None,
        scalar_element,
        password_id: None,
        rejected_groups: vec![],
    };
    for (id, body) in Reader::new(trailing) {
        if id != Id::EXTENSION || body.is_empty() {
            continue;
        }
        let (ext, body) = (IdExt(body[0]), &body[1..]);
        match ext {
            IdExt::ANTI_CLOGGING_TOKEN_CONTAINER => commit.token = Some(body),
            IdExt::PASSWORD_IDENTIFIER => commit.password_id = Some(body),
            IdExt::REJECTED_GROUPS => {
                commit.rejected_groups = parse_rejected_groups(body)?;
            }
            _ => (),
        }
    }
    Ok(commit)
}

/// Parses the body of a Rejected Groups element: a list of 16-bit group
/// identifiers. IEEE Std 802.11-2020, 9.4.2.241.
pub fn parse_rejected_groups(body: &[u8]) -> Result<Vec<u16>, Error> {
    if body.len() % 2 != 0 {
        return Err(Error::MalformedElement("odd-length rejected groups element"));
    }
    Ok(body.chunks_exact(2).map(|c| u16::from_le_bytes([c[0], c[1]])).collect())
}

/// Serializes the body of an anti-clogging token challenge reply for a
/// commit that negotiated hash-to-element: the group being challenged
/// followed by the token in its container element.
pub fn write_token_challenge_h2e(group: u16, token: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(4 + token.len());
    body.extend_from_slice(&group.to_le_bytes());
    body.push(Id::EXTENSION.0);
    body.push((token.len() + 1) as u8);
    body.push(IdExt::ANTI_CLOGGING_TOKEN_CONTAINER.0);
    body.extend_from_slice(token);
    body
}

/// Serializes the body of a hunt-and-peck token challenge reply: the group
/// followed directly by the token.
pub fn write_token_challenge(group: u16, token: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(2 + token.len());
    body.extend_from_slice(&group.to_le_bytes());
    body.extend_from_slice(token);
    body
}
