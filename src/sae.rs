// Copyright 2026 The wlan-auth Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! SAE handshake state machine (IEEE Std 802.11-2020, 12.4).
//!
//! The machine advances one peer frame at a time via [`step`]. It never
//! performs side effects directly; outcomes accumulate in an
//! [`UpdateSink`] that the dispatcher translates into frame transmissions,
//! timer operations, PMKSA handoff, and station removal. Group arithmetic
//! and key derivation live behind [`SaeHandshake`], created per exchange by
//! an [`SaeCryptoProvider`].

use {
    crate::{
        ie,
        mac::{MacAddr, MacFmt, StatusCode},
        timer::EventId,
        Config, Mode, PwePolicy,
    },
    log::{debug, info},
};

/// SAE protocol state. Only ever advances, except for the explicit
/// reauthentication reset (ACCEPTED back to NOTHING) and the sync-counter
/// cool-down reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaeState {
    Nothing,
    Committed,
    Confirmed,
    Accepted,
}

/// Which password element derivation the exchange negotiated. Fixed once
/// set for the lifetime of the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PweVariant {
    HuntAndPeck,
    HashToElement,
    SaePk,
}

impl PweVariant {
    /// Hash-to-element framing also covers SAE-PK, which is an H2E
    /// extension on the wire.
    pub fn is_h2e(&self) -> bool {
        !matches!(self, PweVariant::HuntAndPeck)
    }

    /// The status code our own commit carries for this variant.
    pub fn commit_status(&self) -> StatusCode {
        match self {
            PweVariant::HuntAndPeck => StatusCode::SUCCESS,
            PweVariant::HashToElement => StatusCode::SAE_HASH_TO_ELEMENT,
            PweVariant::SaePk => StatusCode::SAE_PK,
        }
    }
}

/// Maps a transaction-1 status code to the PWE variant it requests, or
/// `None` if the status is failure-like under the configured policy.
pub fn pwe_from_status(status: StatusCode, policy: PwePolicy) -> Option<PweVariant> {
    match status {
        StatusCode::SUCCESS if policy != PwePolicy::HashToElement => {
            Some(PweVariant::HuntAndPeck)
        }
        StatusCode::SAE_HASH_TO_ELEMENT if policy != PwePolicy::HuntAndPeck => {
            Some(PweVariant::HashToElement)
        }
        StatusCode::SAE_PK if policy != PwePolicy::HuntAndPeck => Some(PweVariant::SaePk),
        _ => None,
    }
}

/// Established keys, handed off to the PMKSA cache on acceptance.
#[derive(Debug, Clone, PartialEq)]
pub struct SaeKeys {
    pub pmk: Vec<u8>,
    pub pmkid: [u8; 16],
}

#[derive(Debug, PartialEq)]
pub enum SaeCryptoError {
    UnsupportedGroup,
    UnknownPasswordIdentifier,
    DerivationFailed,
    InvalidCommit,
    ConfirmMismatch,
}

/// Per-exchange cryptographic collaborator: owns the PWE, scalars, and key
/// schedule for one handshake instance.
pub trait SaeHandshake {
    /// Absorbs the peer's scalar and element.
    fn handle_peer_commit(&mut self, scalar_element: &[u8]) -> Result<(), SaeCryptoError>;
    /// Produces our own scalar and element bytes.
    fn own_commit(&mut self) -> Result<Vec<u8>, SaeCryptoError>;
    /// Produces our confirm field (send-confirm counter and hash).
    fn own_confirm(&mut self) -> Result<Vec<u8>, SaeCryptoError>;
    /// Verifies the peer's confirm field, matching its send-confirm
    /// counter against the exchanged commits.
    fn verify_peer_confirm(&mut self, confirm: &[u8]) -> Result<(), SaeCryptoError>;
    /// Yields the PMK and PMKID once both confirms have matched.
    fn take_keys(&mut self) -> Option<SaeKeys>;
}

/// Factory for handshake instances; also the oracle for group parameters
/// the frame layer needs before any session exists.
pub trait SaeCryptoProvider {
    /// Combined scalar+element length for a supported group, or `None` if
    /// the group is unsupported. Needed to delimit commit fields on parse.
    fn commit_field_len(&self, group: u16) -> Option<usize>;
    /// Starts a handshake: resolves the password (by identifier when one
    /// is given) and derives the password element for `group`.
    fn start_handshake(
        &self,
        peer: MacAddr,
        group: u16,
        pwe: PweVariant,
        password_id: Option<&[u8]>,
    ) -> Result<Box<dyn SaeHandshake>, SaeCryptoError>;
}

/// One SAE exchange with a single peer, exclusively owned by the peer's
/// station record.
pub struct SaeSession {
    pub state: SaeState,
    pub group: u16,
    /// Position of `group` in the configured group list; group
    /// renegotiation continues from here.
    group_index: usize,
    pub sync: u8,
    /// While set, incoming commits are silently discarded. Cleared when
    /// the cool-down timeout fires.
    pub disabled: bool,
    pub pwe: Option<PweVariant>,
    /// Groups the peer has advertised as rejected; checked against the
    /// locally enabled set on every commit (anti-downgrade).
    pub rejected_groups: Vec<u16>,
    pub password_id: Option<Vec<u8>>,
    pub last_commit: Option<(StatusCode, Vec<u8>)>,
    pub last_confirm: Option<Vec<u8>>,
    pub retransmit_timer: Option<EventId>,
    pub cooldown_timer: Option<EventId>,
    handshake: Option<Box<dyn SaeHandshake>>,
}

impl SaeSession {
    pub fn new(group: u16) -> Self {
        Self {
            state: SaeState::Nothing,
            group,
            group_index: 0,
            sync: 0,
            disabled: false,
            pwe: None,
            rejected_groups: vec![],
            password_id: None,
            last_commit: None,
            last_confirm: None,
            retransmit_timer: None,
            cooldown_timer: None,
            handshake: None,
        }
    }

    /// Mid-handshake sessions count against the anti-clogging threshold.
    pub fn is_open(&self) -> bool {
        matches!(self.state, SaeState::Committed | SaeState::Confirmed)
    }

    fn reset_to_nothing(&mut self, sink: &mut UpdateSink) {
        self.state = SaeState::Nothing;
        self.handshake = None;
        self.sync = 0;
        self.disabled = true;
        self.clear_transient();
        sink.push(SaeUpdate::CancelRetransmit);
        sink.push(SaeUpdate::ScheduleCooldown);
    }

    fn clear_transient(&mut self) {
        self.password_id = None;
        self.last_commit = None;
        self.last_confirm = None;
    }

    /// Bumps the sync counter, tearing the session down into the disabled
    /// cool-down once the configured maximum is exceeded. Returns whether
    /// the caller may retry.
    fn sync_allows_retry(&mut self, config: &Config, sink: &mut UpdateSink) -> bool {
        if self.sync >= config.sae_sync_max {
            info!("SAE sync counter exhausted; disabling session for cool-down");
            self.reset_to_nothing(sink);
            return false;
        }
        self.sync += 1;
        true
    }
}

/// Outcomes of a state machine step, applied by the dispatcher in order.
#[derive(Debug, PartialEq)]
pub enum SaeUpdate {
    SendFrame { transaction: u16, status: StatusCode, body: Vec<u8> },
    /// Hand the established keys to the PMKSA cache.
    Key(SaeKeys),
    /// The exchange reached ACCEPTED; report authentication success.
    HandshakeComplete,
    /// Reply with a failure status; the offending group is echoed for
    /// group-mismatch rejections.
    Reject { status: StatusCode, echo_group: Option<u16> },
    /// Tear the peer down. `reauth` marks the mesh forced-reauthentication
    /// path where the peer must start over as a new instance.
    RemovePeer { reauth: bool },
    ScheduleRetransmit,
    CancelRetransmit,
    ScheduleCooldown,
}

pub type UpdateSink = Vec<SaeUpdate>;

/// Input to one state machine step, as classified by the dispatcher.
pub enum SaeRx<'a> {
    /// Transaction 1 with a success-like status and parsed fields.
    Commit { pwe: PweVariant, commit: ie::SaeCommit<'a> },
    /// Transaction 1 with a failure-like status.
    CommitFailure { status: StatusCode, rejected_group: Option<u16> },
    /// Transaction 2; the confirm field is verified in-machine.
    Confirm { body: &'a [u8] },
}

enum Input<'a> {
    Rx(SaeRx<'a>),
    /// Continuation applied after a deferred confirm: completes the
    /// CONFIRMED -> ACCEPTED transition within the same step call instead
    /// of the machine re-invoking itself.
    ConfirmMatched,
}

/// Advances the session by one received frame. All effects are pushed into
/// `sink`; the session is left in a consistent state on every path.
pub fn step(
    session: &mut SaeSession,
    peer: MacAddr,
    rx: SaeRx<'_>,
    allow_pwe_reuse: bool,
    config: &Config,
    provider: &dyn SaeCryptoProvider,
    sink: &mut UpdateSink,
) {
    let mut input = Input::Rx(rx);
    // Transitions that fall through two table rows in one frame (deferred
    // confirm, infrastructure reauthentication) loop here rather than
    // recursing.
    loop {
        input = match (session.state, input) {
            (SaeState::Nothing, Input::Rx(SaeRx::Commit { pwe, commit })) => {
                handle_fresh_commit(session, peer, pwe, &commit, config, provider, sink);
                return;
            }
            (SaeState::Nothing, Input::Rx(SaeRx::CommitFailure { status, .. })) => {
                debug!(
                    "SAE commit from {} with failure status {}; aborting",
                    peer.to_mac_str(),
                    status.0
                );
                sink.push(SaeUpdate::RemovePeer { reauth: false });
                return;
            }
            (SaeState::Nothing, Input::Rx(SaeRx::Confirm { .. })) => {
                info!("SAE confirm before commit from {}; ignored", peer.to_mac_str());
                return;
            }

            (SaeState::Committed, Input::Rx(SaeRx::Commit { pwe, commit })) => {
                handle_recommit(session, peer, pwe, &commit, allow_pwe_reuse, config, provider, sink);
                return;
            }
            (SaeState::Committed, Input::Rx(SaeRx::CommitFailure { status, rejected_group })) => {
                match config.mode {
                    Mode::Mesh => {
                        renegotiate_group(session, peer, status, rejected_group, config, provider, sink);
                        return;
                    }
                    Mode::Infrastructure => {
                        // Deferred confirm: the peer is already past its
                        // commit. Send ours and fall through to complete
                        // the exchange.
                        if send_own_confirm(session, sink).is_err() {
                            sink.push(SaeUpdate::Reject {
                                status: StatusCode::UNSPECIFIED_FAILURE,
                                echo_group: None,
                            });
                            return;
                        }
                        session.state = SaeState::Confirmed;
                        Input::ConfirmMatched
                    }
                }
            }
            (SaeState::Committed, Input::Rx(SaeRx::Confirm { body })) => {
                match session.handshake.as_mut().map(|hs| hs.verify_peer_confirm(body)) {
                    Some(Ok(())) => (),
                    outcome => {
                        debug!(
                            "SAE confirm verification failed for {}: {:?}; dropping",
                            peer.to_mac_str(),
                            outcome
                        );
                        return;
                    }
                }
                if send_own_confirm(session, sink).is_err() {
                    sink.push(SaeUpdate::Reject {
                        status: StatusCode::UNSPECIFIED_FAILURE,
                        echo_group: None,
                    });
                    return;
                }
                session.state = SaeState::Confirmed;
                Input::ConfirmMatched
            }

            (SaeState::Confirmed, Input::Rx(SaeRx::Commit { .. })) => {
                // The peer missed our confirm; resend both halves, bounded
                // by the sync counter.
                if !session.sync_allows_retry(config, sink) {
                    return;
                }
                if let Some((status, body)) = session.last_commit.clone() {
                    sink.push(SaeUpdate::SendFrame { transaction: 1, status, body });
                }
                if send_own_confirm(session, sink).is_err() {
                    sink.push(SaeUpdate::Reject {
                        status: StatusCode::UNSPECIFIED_FAILURE,
                        echo_group: None,
                    });
                }
                return;
            }
            (SaeState::Confirmed, Input::Rx(SaeRx::CommitFailure { status, rejected_group })) => {
                match config.mode {
                    Mode::Mesh => {
                        // A mesh peer answers our commit immediately, so a
                        // group rejection usually lands after we confirmed.
                        renegotiate_group(session, peer, status, rejected_group, config, provider, sink);
                    }
                    Mode::Infrastructure => {
                        debug!(
                            "SAE failure status {} from {} while confirmed; aborting",
                            status.0,
                            peer.to_mac_str()
                        );
                        sink.push(SaeUpdate::RemovePeer { reauth: false });
                    }
                }
                return;
            }
            (SaeState::Confirmed, Input::Rx(SaeRx::Confirm { body })) => {
                match session.handshake.as_mut().map(|hs| hs.verify_peer_confirm(body)) {
                    Some(Ok(())) => Input::ConfirmMatched,
                    outcome => {
                        debug!(
                            "SAE confirm verification failed for {}: {:?}; dropping",
                            peer.to_mac_str(),
                            outcome
                        );
                        return;
                    }
                }
            }
            (SaeState::Confirmed, Input::ConfirmMatched) => {
                let keys = session.handshake.as_mut().and_then(|hs| hs.take_keys());
                match keys {
                    Some(keys) => {
                        session.state = SaeState::Accepted;
                        session.sync = 0;
                        let last_confirm = session.last_confirm.take();
                        session.clear_transient();
                        // Keep the confirm for ACCEPTED-state resends.
                        session.last_confirm = last_confirm;
                        sink.push(SaeUpdate::Key(keys));
                        sink.push(SaeUpdate::HandshakeComplete);
                        sink.push(SaeUpdate::CancelRetransmit);
                    }
                    None => {
                        sink.push(SaeUpdate::Reject {
                            status: StatusCode::UNSPECIFIED_FAILURE,
                            echo_group: None,
                        });
                    }
                }
                return;
            }

            (SaeState::Accepted, Input::Rx(rx @ SaeRx::Commit { .. })) => match config.mode {
                Mode::Mesh => {
                    // A mesh peer that re-commits must start over as a new
                    // peer instance.
                    sink.push(SaeUpdate::RemovePeer { reauth: true });
                    return;
                }
                Mode::Infrastructure => {
                    debug!("SAE reauthentication from {}", peer.to_mac_str());
                    session.state = SaeState::Nothing;
                    session.handshake = None;
                    session.sync = 0;
                    session.clear_transient();
                    Input::Rx(rx)
                }
            },
            (SaeState::Accepted, Input::Rx(SaeRx::CommitFailure { status, .. })) => {
                debug!(
                    "ignoring SAE failure status {} from accepted peer {}",
                    status.0,
                    peer.to_mac_str()
                );
                return;
            }
            (SaeState::Accepted, Input::Rx(SaeRx::Confirm { .. })) => {
                // The peer missed our confirm; resend it and drop whatever
                // transient state is still around.
                if !session.sync_allows_retry(config, sink) {
                    return;
                }
                if let Some(body) = session.last_confirm.clone() {
                    sink.push(SaeUpdate::SendFrame {
                        transaction: 2,
                        status: StatusCode::SUCCESS,
                        body,
                    });
                }
                session.password_id = None;
                return;
            }

            // ConfirmMatched is only synthesized into the Confirmed state.
            (_, Input::ConfirmMatched) => return,
        };
    }
}

/// NOTHING + commit: derive the PWE, answer with our own commit, and in
/// mesh (or confirm-immediate) mode follow up with our confirm.
fn handle_fresh_commit(
    session: &mut SaeSession,
    peer: MacAddr,
    pwe: PweVariant,
    commit: &ie::SaeCommit<'_>,
    config: &Config,
    provider: &dyn SaeCryptoProvider,
    sink: &mut UpdateSink,
) {
    if reject_downgrade(session, commit, config, sink) {
        return;
    }
    let group_index = match config.sae_groups.iter().position(|g| *g == commit.group) {
        Some(index) => index,
        None => {
            sink.push(SaeUpdate::Reject {
                status: StatusCode::UNSUPPORTED_FINITE_CYCLIC_GROUP,
                echo_group: Some(commit.group),
            });
            return;
        }
    };
    session.group = commit.group;
    session.group_index = group_index;
    session.pwe = Some(pwe);
    session.password_id = commit.password_id.map(|id| id.to_vec());

    if start_and_absorb(session, peer, commit, provider, sink).is_err() {
        return;
    }
    if send_own_commit(session, sink).is_err() {
        sink.push(SaeUpdate::Reject {
            status: StatusCode::UNSPECIFIED_FAILURE,
            echo_group: None,
        });
        return;
    }
    session.state = SaeState::Committed;
    session.sync = 0;
    if config.mode == Mode::Mesh {
        sink.push(SaeUpdate::ScheduleRetransmit);
    }
    if config.mode == Mode::Mesh || config.sae_confirm_immediate {
        if send_own_confirm(session, sink).is_err() {
            sink.push(SaeUpdate::Reject {
                status: StatusCode::UNSPECIFIED_FAILURE,
                echo_group: None,
            });
            return;
        }
        session.state = SaeState::Confirmed;
    }
}

/// COMMITTED + commit: the peer re-committed, possibly on a new group.
fn handle_recommit(
    session: &mut SaeSession,
    peer: MacAddr,
    pwe: PweVariant,
    commit: &ie::SaeCommit<'_>,
    allow_pwe_reuse: bool,
    config: &Config,
    provider: &dyn SaeCryptoProvider,
    sink: &mut UpdateSink,
) {
    if reject_downgrade(session, commit, config, sink) {
        return;
    }
    let same_group = commit.group == session.group;
    if !same_group {
        // Group is mutable only during renegotiation while committed.
        match config.sae_groups.iter().position(|g| *g == commit.group) {
            Some(index) => {
                session.group = commit.group;
                session.group_index = index;
                session.handshake = None;
            }
            None => {
                sink.push(SaeUpdate::Reject {
                    status: StatusCode::UNSUPPORTED_FINITE_CYCLIC_GROUP,
                    echo_group: Some(commit.group),
                });
                return;
            }
        }
    }
    session.pwe.get_or_insert(pwe);
    let reuse = same_group && allow_pwe_reuse && session.handshake.is_some();
    if reuse {
        let absorbed = session
            .handshake
            .as_mut()
            .map(|hs| hs.handle_peer_commit(commit.scalar_element));
        if !matches!(absorbed, Some(Ok(()))) {
            sink.push(SaeUpdate::Reject {
                status: StatusCode::UNSPECIFIED_FAILURE,
                echo_group: None,
            });
            return;
        }
    } else if start_and_absorb(session, peer, commit, provider, sink).is_err() {
        return;
    }
    if send_own_confirm(session, sink).is_err() {
        sink.push(SaeUpdate::Reject {
            status: StatusCode::UNSPECIFIED_FAILURE,
            echo_group: None,
        });
        return;
    }
    session.state = SaeState::Confirmed;
    session.sync = 0;
    if config.mode == Mode::Mesh {
        sink.push(SaeUpdate::ScheduleRetransmit);
    }
}

/// Mesh-only: the peer rejected our group; move down the configured list.
fn renegotiate_group(
    session: &mut SaeSession,
    peer: MacAddr,
    status: StatusCode,
    rejected_group: Option<u16>,
    config: &Config,
    provider: &dyn SaeCryptoProvider,
    sink: &mut UpdateSink,
) {
    if status != StatusCode::UNSUPPORTED_FINITE_CYCLIC_GROUP {
        // Not a group rejection; bounded retry of our last commit.
        if !session.sync_allows_retry(config, sink) {
            return;
        }
        if let Some((status, body)) = session.last_commit.clone() {
            sink.push(SaeUpdate::SendFrame { transaction: 1, status, body });
            sink.push(SaeUpdate::ScheduleRetransmit);
        }
        return;
    }
    if !session.sync_allows_retry(config, sink) {
        return;
    }
    let rejected = rejected_group.unwrap_or(session.group);
    let next = config
        .sae_groups
        .iter()
        .enumerate()
        .skip(session.group_index + 1)
        .find(|(_, g)| **g != rejected);
    let (index, group) = match next {
        Some((index, group)) => (index, *group),
        None => {
            info!(
                "SAE group list exhausted negotiating with {}; aborting",
                peer.to_mac_str()
            );
            sink.push(SaeUpdate::RemovePeer { reauth: false });
            return;
        }
    };
    debug!("SAE renegotiating with {}: group {} -> {}", peer.to_mac_str(), rejected, group);
    session.group = group;
    session.group_index = index;
    session.handshake = None;

    let pwe = session.pwe.unwrap_or(PweVariant::HuntAndPeck);
    let password_id = session.password_id.clone();
    let handshake =
        provider.start_handshake(peer, group, pwe, password_id.as_deref());
    match handshake {
        Ok(handshake) => session.handshake = Some(handshake),
        Err(e) => {
            push_crypto_reject(session, e, sink);
            return;
        }
    }
    if send_own_commit(session, sink).is_err() {
        sink.push(SaeUpdate::Reject {
            status: StatusCode::UNSPECIFIED_FAILURE,
            echo_group: None,
        });
        return;
    }
    session.state = SaeState::Committed;
    session.last_confirm = None;
    sink.push(SaeUpdate::ScheduleRetransmit);
}

/// Mesh retransmission timeout: re-send whatever the peer has not answered
/// yet and re-arm, bounded by the sync counter.
pub fn retransmit(session: &mut SaeSession, config: &Config, sink: &mut UpdateSink) {
    if !matches!(session.state, SaeState::Committed | SaeState::Confirmed) {
        return;
    }
    if !session.sync_allows_retry(config, sink) {
        return;
    }
    match session.state {
        SaeState::Committed => {
            if let Some((status, body)) = session.last_commit.clone() {
                sink.push(SaeUpdate::SendFrame { transaction: 1, status, body });
            }
        }
        _ => {
            if let Some(body) = session.last_confirm.clone() {
                sink.push(SaeUpdate::SendFrame {
                    transaction: 2,
                    status: StatusCode::SUCCESS,
                    body,
                });
            }
        }
    }
    sink.push(SaeUpdate::ScheduleRetransmit);
}

/// Anti-downgrade: a peer claiming to have rejected a group we still have
/// enabled is lying to force a weaker group; reject regardless of the
/// commit's cryptographic validity.
fn reject_downgrade(
    session: &mut SaeSession,
    commit: &ie::SaeCommit<'_>,
    config: &Config,
    sink: &mut UpdateSink,
) -> bool {
    if !commit.rejected_groups.is_empty() {
        session.rejected_groups = commit.rejected_groups.clone();
        if commit.rejected_groups.iter().any(|g| config.sae_groups.contains(g)) {
            sink.push(SaeUpdate::Reject {
                status: StatusCode::UNSPECIFIED_FAILURE,
                echo_group: None,
            });
            return true;
        }
    }
    false
}

fn start_and_absorb(
    session: &mut SaeSession,
    peer: MacAddr,
    commit: &ie::SaeCommit<'_>,
    provider: &dyn SaeCryptoProvider,
    sink: &mut UpdateSink,
) -> Result<(), ()> {
    let pwe = session.pwe.unwrap_or(PweVariant::HuntAndPeck);
    let handshake = provider.start_handshake(
        peer,
        session.group,
        pwe,
        commit.password_id,
    );
    let mut handshake = match handshake {
        Ok(handshake) => handshake,
        Err(e) => {
            push_crypto_reject(session, e, sink);
            return Err(());
        }
    };
    if let Err(e) = handshake.handle_peer_commit(commit.scalar_element) {
        push_crypto_reject(session, e, sink);
        return Err(());
    }
    session.handshake = Some(handshake);
    Ok(())
}

fn push_crypto_reject(session: &mut SaeSession, e: SaeCryptoError, sink: &mut UpdateSink) {
    let update = match e {
        SaeCryptoError::UnknownPasswordIdentifier => {
            session.password_id = None;
            SaeUpdate::Reject {
                status: StatusCode::UNKNOWN_PASSWORD_IDENTIFIER,
                echo_group: None,
            }
        }
        SaeCryptoError::UnsupportedGroup => SaeUpdate::Reject {
            status: StatusCode::UNSUPPORTED_FINITE_CYCLIC_GROUP,
            echo_group: Some(session.group),
        },
        _ => SaeUpdate::Reject { status: StatusCode::UNSPECIFIED_FAILURE, echo_group: None },
    };
    sink.push(update);
}

fn send_own_commit(session: &mut SaeSession, sink: &mut UpdateSink) -> Result<(), ()> {
    let commit = match session.handshake.as_mut().map(|hs| hs.own_commit()) {
        Some(Ok(commit)) => commit,
        _ => return Err(()),
    };
    let status =
        session.pwe.map(|pwe| pwe.commit_status()).unwrap_or(StatusCode::SUCCESS);
    let mut body = session.group.to_le_bytes().to_vec();
    body.extend_from_slice(&commit);
    session.last_commit = Some((status, body.clone()));
    sink.push(SaeUpdate::SendFrame { transaction: 1, status, body });
    Ok(())
}

fn send_own_confirm(session: &mut SaeSession, sink: &mut UpdateSink) -> Result<(), ()> {
    let confirm = match session.handshake.as_mut().map(|hs| hs.own_confirm()) {
        Some(Ok(confirm)) => confirm,
        _ => return Err(()),
    };
    session.last_confirm = Some(confirm.clone());
    sink.push(SaeUpdate::SendFrame {
        transaction: 2,
        status: StatusCode::SUCCESS,
        body: confirm,
    });
    Ok(())
}


#[cfg(test)]
mod tests {
    use {
        super::{test_utils::*, *},
        crate::assert_variant,
    };

    const PEER: MacAddr = [0x50, 0x74, 0x97, 0x10, 0x20, 0x30];
    const SCALAR_ELEMENT: [u8; COMMIT_FIELD_LEN] = [0xab; COMMIT_FIELD_LEN];

    fn infra_config() -> Config {
        Config { sae_groups: vec![19, 20], ..Config::default() }
    }

    fn mesh_config() -> Config {
        Config { mode: Mode::Mesh, sae_groups: vec![19, 20], ..Config::default() }
    }

    fn commit_rx(group: u16) -> SaeRx<'static> {
        SaeRx::Commit {
            pwe: PweVariant::HuntAndPeck,
            commit: fake_commit(group, &SCALAR_ELEMENT),
        }
    }

    fn step_commit(
        session: &mut SaeSession,
        group: u16,
        config: &Config,
        provider: &FakeSaeProvider,
    ) -> UpdateSink {
        let mut sink = UpdateSink::new();
        step(session, PEER, commit_rx(group), true, config, provider, &mut sink);
        sink
    }

    fn step_confirm(
        session: &mut SaeSession,
        config: &Config,
        provider: &FakeSaeProvider,
    ) -> UpdateSink {
        let mut sink = UpdateSink::new();
        let confirm = [1, 0, 0xcf, 0xcf];
        step(session, PEER, SaeRx::Confirm { body: &confirm[..] }, true, config, provider, &mut sink);
        sink
    }

    #[test]
    fn infra_commit_then_confirm_reaches_accepted() {
        let config = infra_config();
        let provider = FakeSaeProvider::default();
        let mut session = SaeSession::new(19);

        let sink = step_commit(&mut session, 19, &config, &provider);
        assert_eq!(session.state, SaeState::Committed);
        assert_variant!(
            &sink[..],
            [SaeUpdate::SendFrame { transaction: 1, status, body }] => {
                assert_eq!(*status, StatusCode::SUCCESS);
                assert_eq!(&body[0..2], &19u16.to_le_bytes());
            }
        );

        let sink = step_confirm(&mut session, &config, &provider);
        assert_eq!(session.state, SaeState::Accepted);
        assert_variant!(
            &sink[..],
            [SaeUpdate::SendFrame { transaction: 2, .. }, SaeUpdate::Key(keys), SaeUpdate::HandshakeComplete, SaeUpdate::CancelRetransmit] => {
                assert_eq!(keys.pmk, vec![0x42; 32]);
            }
        );
    }

    #[test]
    fn mesh_commit_sends_commit_and_confirm() {
        let config = mesh_config();
        let provider = FakeSaeProvider::default();
        let mut session = SaeSession::new(19);

        let sink = step_commit(&mut session, 19, &config, &provider);
        assert_eq!(session.state, SaeState::Confirmed);
        let frames: Vec<u16> = sink
            .iter()
            .filter_map(|u| match u {
                SaeUpdate::SendFrame { transaction, .. } => Some(*transaction),
                _ => None,
            })
            .collect();
        assert_eq!(frames, vec![1, 2]);
        assert!(sink.contains(&SaeUpdate::ScheduleRetransmit));
    }

    #[test]
    fn confirm_before_commit_is_ignored() {
        let config = infra_config();
        let provider = FakeSaeProvider::default();
        let mut session = SaeSession::new(19);
        let sink = step_confirm(&mut session, &config, &provider);
        assert_eq!(session.state, SaeState::Nothing);
        assert!(sink.is_empty());
    }

    #[test]
    fn unsupported_group_echoed_in_rejection() {
        let config = infra_config();
        let provider = FakeSaeProvider::default();
        let mut session = SaeSession::new(21);
        // Group 21 exists in the provider but is not enabled locally.
        let sink = step_commit(&mut session, 21, &config, &provider);
        assert_eq!(session.state, SaeState::Nothing);
        assert_variant!(
            &sink[..],
            [SaeUpdate::Reject { status, echo_group: Some(21) }] => {
                assert_eq!(*status, StatusCode::UNSUPPORTED_FINITE_CYCLIC_GROUP);
            }
        );
    }

    #[test]
    fn rejected_groups_naming_enabled_group_rejects_valid_commit() {
        let config = infra_config();
        let provider = FakeSaeProvider::default();
        let mut session = SaeSession::new(20);
        let commit = ie::SaeCommit {
            group: 20,
            token: None,
            scalar_element: &SCALAR_ELEMENT,
            password_id: None,
            rejected_groups: vec![19],
        };
        let mut sink = UpdateSink::new();
        step(
            &mut session,
            PEER,
            SaeRx::Commit { pwe: PweVariant::HashToElement, commit },
            true,
            &config,
            &provider,
            &mut sink,
        );
        assert_eq!(session.state, SaeState::Nothing);
        assert_variant!(
            &sink[..],
            [SaeUpdate::Reject { status, echo_group: None }] => {
                assert_eq!(*status, StatusCode::UNSPECIFIED_FAILURE);
            }
        );
        assert_eq!(session.rejected_groups, vec![19]);
    }

    #[test]
    fn unknown_password_identifier_rejected_and_cleared() {
        let config = infra_config();
        let provider = FakeSaeProvider::default();
        let mut session = SaeSession::new(19);
        let commit = ie::SaeCommit {
            group: 19,
            token: None,
            scalar_element: &SCALAR_ELEMENT,
            password_id: Some(b"nosuch"),
            rejected_groups: vec![],
        };
        let mut sink = UpdateSink::new();
        step(
            &mut session,
            PEER,
            SaeRx::Commit { pwe: PweVariant::HuntAndPeck, commit },
            true,
            &config,
            &provider,
            &mut sink,
        );
        assert_variant!(
            &sink[..],
            [SaeUpdate::Reject { status, echo_group: None }] => {
                assert_eq!(*status, StatusCode::UNKNOWN_PASSWORD_IDENTIFIER);
            }
        );
        assert_eq!(session.password_id, None);
    }

    #[test]
    fn committed_retry_resends_and_bounds_sync() {
        let config = infra_config();
        let provider = FakeSaeProvider::default();
        let mut session = SaeSession::new(19);
        step_commit(&mut session, 19, &config, &provider);
        assert_eq!(session.state, SaeState::Committed);

        // Peer re-commits on the same group: confirm goes out.
        let sink = step_commit(&mut session, 19, &config, &provider);
        assert_eq!(session.state, SaeState::Confirmed);
        assert_variant!(
            &sink[..],
            [SaeUpdate::SendFrame { transaction: 2, .. }] => {}
        );
        assert_eq!(session.sync, 0);
    }

    #[test]
    fn confirmed_commit_retries_until_sync_exhausted() {
        let config = infra_config();
        let provider = FakeSaeProvider::default();
        let mut session = SaeSession::new(19);
        step_commit(&mut session, 19, &config, &provider);
        step_commit(&mut session, 19, &config, &provider);
        assert_eq!(session.state, SaeState::Confirmed);

        for expected_sync in 1..=config.sae_sync_max {
            let sink = step_commit(&mut session, 19, &config, &provider);
            assert_eq!(session.sync, expected_sync);
            assert_eq!(session.state, SaeState::Confirmed);
            // Both halves are resent.
            let frames: Vec<u16> = sink
                .iter()
                .filter_map(|u| match u {
                    SaeUpdate::SendFrame { transaction, .. } => Some(*transaction),
                    _ => None,
                })
                .collect();
            assert_eq!(frames, vec![1, 2]);
        }

        // One more retry exceeds the maximum: session resets and cools off.
        let sink = step_commit(&mut session, 19, &config, &provider);
        assert_eq!(session.state, SaeState::Nothing);
        assert!(session.disabled);
        assert!(sink.contains(&SaeUpdate::ScheduleCooldown));
        assert!(sink.contains(&SaeUpdate::CancelRetransmit));
    }

    #[test]
    fn mesh_group_rejection_walks_group_list_then_aborts() {
        let config = mesh_config();
        let provider = FakeSaeProvider::default();
        let mut session = SaeSession::new(19);
        step_commit(&mut session, 19, &config, &provider);
        // Force back to Committed for the renegotiation path.
        session.state = SaeState::Committed;

        // Peer rejects 19: we re-commit with 20.
        let mut sink = UpdateSink::new();
        step(
            &mut session,
            PEER,
            SaeRx::CommitFailure {
                status: StatusCode::UNSUPPORTED_FINITE_CYCLIC_GROUP,
                rejected_group: Some(19),
            },
            true,
            &config,
            &provider,
            &mut sink,
        );
        assert_eq!(session.group, 20);
        assert_eq!(session.state, SaeState::Committed);
        assert_variant!(
            &sink[..],
            [SaeUpdate::SendFrame { transaction: 1, body, .. }, SaeUpdate::ScheduleRetransmit] => {
                assert_eq!(&body[0..2], &20u16.to_le_bytes());
            }
        );

        // Peer rejects 20 as well: list exhausted, abort.
        let mut sink = UpdateSink::new();
        step(
            &mut session,
            PEER,
            SaeRx::CommitFailure {
                status: StatusCode::UNSUPPORTED_FINITE_CYCLIC_GROUP,
                rejected_group: Some(20),
            },
            true,
            &config,
            &provider,
            &mut sink,
        );
        assert_variant!(&sink[..], [SaeUpdate::RemovePeer { reauth: false }] => {});
    }

    #[test]
    fn mesh_retransmit_resends_confirm_then_exhausts_sync() {
        let config = mesh_config();
        let provider = FakeSaeProvider::default();
        let mut session = SaeSession::new(19);
        step_commit(&mut session, 19, &config, &provider);
        assert_eq!(session.state, SaeState::Confirmed);

        for _ in 0..config.sae_sync_max {
            let mut sink = UpdateSink::new();
            retransmit(&mut session, &config, &mut sink);
            assert_variant!(
                &sink[..],
                [SaeUpdate::SendFrame { transaction: 2, .. }, SaeUpdate::ScheduleRetransmit] => {}
            );
        }
        // The next firing exceeds the maximum and tears the session down.
        let mut sink = UpdateSink::new();
        retransmit(&mut session, &config, &mut sink);
        assert_eq!(session.state, SaeState::Nothing);
        assert!(session.disabled);
        assert!(sink.contains(&SaeUpdate::ScheduleCooldown));
    }

    #[test]
    fn infra_deferred_confirm_completes_in_one_step() {
        let config = infra_config();
        let provider = FakeSaeProvider::default();
        let mut session = SaeSession::new(19);
        step_commit(&mut session, 19, &config, &provider);
        assert_eq!(session.state, SaeState::Committed);

        // Confirm arrives while we are still committed: our confirm goes
        // out and the exchange completes without another frame.
        let sink = step_confirm(&mut session, &config, &provider);
        assert_eq!(session.state, SaeState::Accepted);
        assert_variant!(
            &sink[..],
            [SaeUpdate::SendFrame { transaction: 2, .. }, SaeUpdate::Key(_), SaeUpdate::HandshakeComplete, SaeUpdate::CancelRetransmit] => {}
        );
    }

    #[test]
    fn accepted_infra_commit_starts_fresh_reauthentication() {
        let config = infra_config();
        let provider = FakeSaeProvider::default();
        let mut session = SaeSession::new(19);
        step_commit(&mut session, 19, &config, &provider);
        let _ = step_confirm(&mut session, &config, &provider);
        assert_eq!(session.state, SaeState::Accepted);

        let sink = step_commit(&mut session, 19, &config, &provider);
        assert_eq!(session.state, SaeState::Committed);
        assert_variant!(
            &sink[..],
            [SaeUpdate::SendFrame { transaction: 1, .. }] => {}
        );
    }

    #[test]
    fn accepted_mesh_commit_removes_peer() {
        let config = mesh_config();
        let provider = FakeSaeProvider::default();
        let mut session = SaeSession::new(19);
        session.state = SaeState::Accepted;

        let sink = step_commit(&mut session, 19, &config, &provider);
        assert_variant!(&sink[..], [SaeUpdate::RemovePeer { reauth: true }] => {});
    }

    #[test]
    fn accepted_confirm_resends_confirm() {
        let config = infra_config();
        let provider = FakeSaeProvider::default();
        let mut session = SaeSession::new(19);
        step_commit(&mut session, 19, &config, &provider);
        let _ = step_confirm(&mut session, &config, &provider);
        assert_eq!(session.state, SaeState::Accepted);

        let sink = step_confirm(&mut session, &config, &provider);
        assert_eq!(session.state, SaeState::Accepted);
        assert_variant!(
            &sink[..],
            [SaeUpdate::SendFrame { transaction: 2, status, .. }] => {
                assert_eq!(*status, StatusCode::SUCCESS);
            }
        );
    }

    #[test]
    fn invalid_confirm_is_dropped_without_transition() {
        let config = infra_config();
        let provider = FakeSaeProvider::default();
        let mut session = SaeSession::new(19);
        step_commit(&mut session, 19, &config, &provider);

        let mut sink = UpdateSink::new();
        // Too short to carry a send-confirm counter.
        step(&mut session, PEER, SaeRx::Confirm { body: &[1] }, true, &config, &provider, &mut sink);
        assert_eq!(session.state, SaeState::Committed);
        assert!(sink.is_empty());
    }

    #[test]
    fn derivation_failure_rejects_with_unspecified_failure() {
        let config = infra_config();
        let provider = FakeSaeProvider { fail_derivation: true, ..Default::default() };
        let mut session = SaeSession::new(19);
        let sink = step_commit(&mut session, 19, &config, &provider);
        assert_eq!(session.state, SaeState::Nothing);
        assert_variant!(
            &sink[..],
            [SaeUpdate::Reject { status, .. }] => {
                assert_eq!(*status, StatusCode::UNSPECIFIED_FAILURE);
            }
        );
    }
}
