// Copyright 2026 The wlan-auth Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use thiserror::Error;

/// Errors surfaced by authentication frame handling.
///
/// Nothing here is fatal to the process. Every error either maps to a
/// status code in a reply frame or is logged at the point the frame is
/// dropped; the station table is left consistent in both cases.
#[derive(Debug, Error)]
pub enum Error {
    #[error("frame too short: {0} bytes")]
    FrameTooShort(usize),
    #[error("malformed element: {0}")]
    MalformedElement(&'static str),
    #[error("unsupported authentication algorithm {0}")]
    UnsupportedAlgorithm(u16),
    #[error("unknown authentication transaction {1} for algorithm {0}")]
    UnknownTransaction(u16, u16),
    #[error("driver rejected request: {0}")]
    Driver(&'static str),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}
