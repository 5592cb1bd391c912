// Copyright 2026 The wlan-auth Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Entry point for every incoming Authentication frame.
//!
//! The dispatcher owns the station table, the SAE commit queue, and the
//! anti-clogging guard. Frames arrive via [`AuthDispatcher::handle_authentication`];
//! timeouts via [`AuthDispatcher::handle_timeout`]. Both run to completion
//! on the event-loop thread that owns the dispatcher. Replies and driver
//! operations go through the [`Device`] collaborator; admission decisions
//! through [`AccessControl`]; non-SAE algorithms through registered
//! [`AuthAlgorithmHandler`]s.

use {
    crate::{
        anti_clogging::AntiCloggingGuard,
        commit_queue::{CommitQueue, CommitQueueEntry},
        error::Error,
        ie,
        mac::{self, AuthAlgorithm, MacAddr, MacFmt, StatusCode, MGMT_SUBTYPE_AUTH},
        sae::{self, SaeCryptoProvider, SaeKeys, SaeRx, SaeSession, SaeUpdate, UpdateSink},
        station::{StationAuthRecord, StationFlags, StationTable},
        timer::{EventId, Scheduler, Timer},
        Config, Mode,
    },
    log::{debug, error, info},
    rand::RngCore,
    std::collections::HashMap,
};

/// Driver and service hooks the dispatcher drives. All calls are made on
/// the event-loop thread; failures are logged by the dispatcher and never
/// retried.
pub trait Device {
    /// Transmits an Authentication frame to `peer`. `body` carries the
    /// fields following the fixed header.
    fn send_auth_frame(
        &mut self,
        peer: MacAddr,
        alg: AuthAlgorithm,
        transaction: u16,
        status: StatusCode,
        body: &[u8],
    ) -> Result<(), Error>;
    /// Adds a driver entry for a peer that has not associated yet.
    fn add_sta_unassociated(&mut self, peer: MacAddr) -> Result<(), Error>;
    fn remove_sta(&mut self, peer: MacAddr) -> Result<(), Error>;
    /// Authentication indication: a peer completed authentication.
    fn notify_authenticated(&mut self, peer: MacAddr);
    /// Hands an established SAE PMK to the PMKSA cache.
    fn store_pmksa(&mut self, peer: MacAddr, keys: SaeKeys);
    /// Mesh only: whether the peer is a known mesh candidate. Frames from
    /// unknown candidates are buffered outside this crate.
    fn is_mesh_candidate(&self, peer: &MacAddr) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AclDecision {
    Accept,
    Reject,
    /// The check needs an external round trip; the collaborator re-delivers
    /// the frame once it resolves.
    Pending,
}

/// External ACL/RADIUS admission check.
pub trait AccessControl {
    fn admit(&mut self, peer: &MacAddr) -> AclDecision;
}

/// Outcome of a non-SAE algorithm handler.
#[derive(Debug, PartialEq)]
pub enum HandlerOutcome {
    Reply { status: StatusCode, elements: Vec<u8> },
    /// The handler needs an external round trip (RADIUS, FT-over-DS) and
    /// will call [`AuthDispatcher::send_auth_reply`] itself when done.
    Deferred,
}

/// Contract every non-SAE authentication algorithm satisfies. Handlers own
/// their algorithm's state; the dispatcher owns the station record.
pub trait AuthAlgorithmHandler {
    fn handle(
        &mut self,
        record: &mut StationAuthRecord,
        transaction: u16,
        status: StatusCode,
        elements: &[u8],
    ) -> HandlerOutcome;
}

/// Open System authentication: a single request/response with no
/// cryptographic exchange.
pub struct OpenSystemHandler;

impl AuthAlgorithmHandler for OpenSystemHandler {
    fn handle(
        &mut self,
        _record: &mut StationAuthRecord,
        transaction: u16,
        _status: StatusCode,
        _elements: &[u8],
    ) -> HandlerOutcome {
        match transaction {
            1 => HandlerOutcome::Reply { status: StatusCode::SUCCESS, elements: vec![] },
            _ => HandlerOutcome::Reply {
                status: StatusCode::UNKNOWN_AUTH_TRANSACTION,
                elements: vec![],
            },
        }
    }
}

/// Typed timeout descriptors; see the concurrency rules in the crate docs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimedEvent {
    /// Mesh SAE retransmission cadence for one peer.
    SaeRetransmit { peer: MacAddr },
    /// End of a peer's sync-exhaustion cool-down.
    SaeCooldownExpired { peer: MacAddr },
    /// Redeliver one queued SAE commit.
    CommitQueueDrain,
    /// Rotate the anti-clogging token key.
    AntiCloggingKeyRotation,
}

/// Receive metadata and body of one Authentication frame, with the
/// management header already stripped.
pub struct AuthFrameRx<'a> {
    pub source_addr: MacAddr,
    pub seq_ctrl: u16,
    pub subtype: u8,
    pub signal_dbm: i8,
    pub body: &'a [u8],
}

pub struct AuthDispatcher<D: Device> {
    config: Config,
    device: D,
    acl: Box<dyn AccessControl>,
    sae_provider: Box<dyn SaeCryptoProvider>,
    handlers: HashMap<AuthAlgorithm, Box<dyn AuthAlgorithmHandler>>,
    stations: StationTable,
    commit_queue: CommitQueue,
    guard: AntiCloggingGuard,
    timer: Timer<TimedEvent>,
    drain_timer: Option<EventId>,
    /// Concurrently open PASN ECDH exchanges, pushed in by the PASN
    /// collaborator; counted against the anti-clogging threshold together
    /// with open SAE sessions.
    pasn_open_exchanges: usize,
    rng: Box<dyn RngCore>,
}

impl<D: Device> AuthDispatcher<D> {
    pub fn new(
        config: Config,
        device: D,
        acl: Box<dyn AccessControl>,
        sae_provider: Box<dyn SaeCryptoProvider>,
        scheduler: Box<dyn Scheduler>,
        mut rng: Box<dyn RngCore>,
    ) -> Self {
        let guard = AntiCloggingGuard::new(&mut rng);
        let mut handlers: HashMap<AuthAlgorithm, Box<dyn AuthAlgorithmHandler>> = HashMap::new();
        handlers.insert(AuthAlgorithm::OPEN, Box::new(OpenSystemHandler));
        Self {
            config,
            device,
            acl,
            sae_provider,
            handlers,
            stations: StationTable::new(),
            commit_queue: CommitQueue::new(),
            guard,
            timer: Timer::new(scheduler),
            drain_timer: None,
            pasn_open_exchanges: 0,
            rng,
        }
    }

    /// Registers (or replaces) the handler owning a non-SAE algorithm.
    /// Algorithms without a handler are rejected as unsupported.
    pub fn register_handler(
        &mut self,
        alg: AuthAlgorithm,
        handler: Box<dyn AuthAlgorithmHandler>,
    ) {
        self.handlers.insert(alg, handler);
    }

    /// PASN collaborator input to the anti-clogging load computation.
    pub fn set_pasn_open_exchanges(&mut self, count: usize) {
        self.pasn_open_exchanges = count;
    }

    /// Key-rotation entry point for the collaborator that owns the
    /// rotation schedule. Outstanding tokens stop verifying.
    pub fn rotate_anti_clogging_key(&mut self) {
        self.guard.rotate_key(&mut self.rng);
    }

    pub fn station(&self, addr: &MacAddr) -> Option<&StationAuthRecord> {
        self.stations.get(addr)
    }

    /// Handles one received Authentication frame. `is_requeued` marks
    /// redelivery from the commit queue as opposed to first-pass receipt.
    pub fn handle_authentication(&mut self, rx: AuthFrameRx<'_>, is_requeued: bool) {
        let peer = rx.source_addr;
        let (hdr, elements) = match mac::parse_auth_frame(rx.body) {
            Ok(parsed) => parsed,
            Err(e) => {
                info!("dropping authentication frame from {}: {}", peer.to_mac_str(), e);
                return;
            }
        };
        let alg = { hdr.auth_alg };
        let transaction = { hdr.auth_txn_seq_num };
        let status = { hdr.status_code };

        if alg != AuthAlgorithm::SAE && !self.handlers.contains_key(&alg) {
            debug!("{} from {}", Error::UnsupportedAlgorithm(alg.0), peer.to_mac_str());
            self.send_frame_logged(
                peer,
                alg,
                transaction.wrapping_add(1),
                StatusCode::UNSUPPORTED_AUTH_ALGORITHM,
                &[],
            );
            return;
        }
        if !valid_transaction(alg, transaction) {
            debug!(
                "{} from {}",
                Error::UnknownTransaction(alg.0, transaction),
                peer.to_mac_str()
            );
            self.send_frame_logged(
                peer,
                alg,
                transaction.wrapping_add(1),
                StatusCode::UNKNOWN_AUTH_TRANSACTION,
                &[],
            );
            return;
        }

        // SAE commits are expensive to process; all first-pass commits go
        // through the bounded queue and are redelivered from a timer, one
        // at a time, paced by the current backlog. A confirm overtaking
        // its peer's queued commit would be processed out of order, so it
        // queues behind it.
        if alg == AuthAlgorithm::SAE
            && !is_requeued
            && (transaction == 1
                || (transaction == 2 && self.commit_queue.contains_peer(&peer)))
        {
            let delay = self.commit_queue.drain_delay(self.config.commit_queue_tick);
            self.commit_queue.enqueue(CommitQueueEntry {
                source_addr: peer,
                transaction,
                frame_body: rx.body.to_vec(),
                signal_dbm: rx.signal_dbm,
                seq_ctrl: rx.seq_ctrl,
            });
            if self.drain_timer.is_none() {
                self.drain_timer =
                    Some(self.timer.schedule_after(delay, TimedEvent::CommitQueueDrain));
            }
            return;
        }

        match self.acl.admit(&peer) {
            AclDecision::Accept => (),
            AclDecision::Reject => {
                debug!("ACL rejected {}", peer.to_mac_str());
                self.send_frame_logged(
                    peer,
                    alg,
                    transaction.wrapping_add(1),
                    StatusCode::UNSPECIFIED_FAILURE,
                    &[],
                );
                return;
            }
            AclDecision::Pending => return,
        }

        if let Some(sta) = self.stations.get(&peer) {
            if sta.is_duplicate(rx.seq_ctrl, rx.subtype) {
                debug!("dropping retransmitted auth frame from {}", peer.to_mac_str());
                return;
            }
        }

        if self.config.mode == Mode::Mesh && !self.device.is_mesh_candidate(&peer) {
            debug!("auth frame from unknown mesh candidate {}; deferred", peer.to_mac_str());
            return;
        }

        let created = self.stations.get(&peer).is_none();
        let sta = self.stations.get_or_create(peer);
        sta.record_frame(rx.seq_ctrl, rx.subtype);
        sta.chosen_algorithm = Some(alg);
        if created {
            match self.device.add_sta_unassociated(peer) {
                Ok(()) => sta.flags.insert(StationFlags::ADDED_UNASSOCIATED),
                Err(e) => {
                    error!("failed to add driver entry for {}: {}", peer.to_mac_str(), e)
                }
            }
        }

        if alg == AuthAlgorithm::SAE {
            self.handle_sae(peer, transaction, status, elements);
        } else {
            let sta = match self.stations.get_mut(&peer) {
                Some(sta) => sta,
                None => return,
            };
            let handler = match self.handlers.get_mut(&alg) {
                Some(handler) => handler,
                None => return,
            };
            match handler.handle(sta, transaction, status, elements) {
                HandlerOutcome::Deferred => (),
                HandlerOutcome::Reply { status, elements } => {
                    self.send_auth_reply(peer, alg, transaction.wrapping_add(1), status, &elements);
                }
            }
        }
    }

    /// Transmits an authentication reply and applies the result to the
    /// station record: success for the pre-RSNA algorithms marks the peer
    /// authenticated, any failure tears speculative driver state down.
    /// Also the completion callback for [`HandlerOutcome::Deferred`].
    pub fn send_auth_reply(
        &mut self,
        peer: MacAddr,
        alg: AuthAlgorithm,
        transaction: u16,
        status: StatusCode,
        elements: &[u8],
    ) {
        self.send_frame_logged(peer, alg, transaction, status, elements);
        if status == StatusCode::SUCCESS {
            let authenticates = matches!(
                alg,
                AuthAlgorithm::OPEN
                    | AuthAlgorithm::SHARED_KEY
                    | AuthAlgorithm::FAST_BSS_TRANSITION
            );
            if authenticates {
                if let Some(sta) = self.stations.get_mut(&peer) {
                    sta.flags.insert(StationFlags::AUTHENTICATED);
                }
                self.device.notify_authenticated(peer);
            }
        } else {
            self.cleanup_failed_auth(peer);
        }
    }

    /// Timeout entry point; the hosting loop calls this for every fired
    /// deadline. Stale ids (canceled or already consumed) are ignored.
    pub fn handle_timeout(&mut self, event_id: EventId) {
        let event = match self.timer.triggered(&event_id) {
            Some(event) => event,
            None => return,
        };
        match event {
            TimedEvent::SaeRetransmit { peer } => self.handle_sae_retransmit(peer),
            TimedEvent::SaeCooldownExpired { peer } => {
                if let Some(session) =
                    self.stations.get_mut(&peer).and_then(|sta| sta.sae.as_mut())
                {
                    session.disabled = false;
                    session.cooldown_timer = None;
                    session.sync = 0;
                }
            }
            TimedEvent::CommitQueueDrain => {
                self.drain_timer = None;
                if let Some(entry) = self.commit_queue.drain_one() {
                    let body = entry.frame_body;
                    self.handle_authentication(
                        AuthFrameRx {
                            source_addr: entry.source_addr,
                            seq_ctrl: entry.seq_ctrl,
                            subtype: MGMT_SUBTYPE_AUTH,
                            signal_dbm: entry.signal_dbm,
                            body: &body,
                        },
                        true,
                    );
                }
                if !self.commit_queue.is_empty() && self.drain_timer.is_none() {
                    let delay = self.commit_queue.drain_delay(self.config.commit_queue_tick);
                    self.drain_timer =
                        Some(self.timer.schedule_after(delay, TimedEvent::CommitQueueDrain));
                }
            }
            TimedEvent::AntiCloggingKeyRotation => self.rotate_anti_clogging_key(),
        }
    }

    /// Removes a peer entirely: timers, SAE session, station record, and
    /// driver entry.
    pub fn remove_station(&mut self, peer: &MacAddr) {
        if let Some(sta) = self.stations.remove(peer) {
            if let Some(session) = sta.sae {
                if let Some(id) = session.retransmit_timer {
                    self.timer.cancel_event(id);
                }
                if let Some(id) = session.cooldown_timer {
                    self.timer.cancel_event(id);
                }
            }
            if let Err(e) = self.device.remove_sta(*peer) {
                error!("failed to remove driver entry for {}: {}", peer.to_mac_str(), e);
            }
        }
    }

    fn handle_sae(&mut self, peer: MacAddr, transaction: u16, status: StatusCode, elements: &[u8]) {
        if let Some(session) = self.stations.get(&peer).and_then(|sta| sta.sae.as_ref()) {
            if session.disabled {
                debug!("SAE session for {} in cool-down; frame discarded", peer.to_mac_str());
                return;
            }
        }
        match transaction {
            1 => self.handle_sae_commit(peer, status, elements),
            2 => self.handle_sae_confirm(peer, status, elements),
            _ => debug!("SAE frame with transaction {} ignored", transaction),
        }
    }

    fn handle_sae_commit(&mut self, peer: MacAddr, status: StatusCode, elements: &[u8]) {
        let pwe = match sae::pwe_from_status(status, self.config.pwe_policy) {
            Some(pwe) => pwe,
            None => {
                // Failure-like status: only meaningful for an existing
                // exchange (mesh group rejection, peer abort).
                let rejected_group = (status == StatusCode::UNSUPPORTED_FINITE_CYCLIC_GROUP
                    && elements.len() >= 2)
                    .then(|| u16::from_le_bytes([elements[0], elements[1]]));
                let sink = {
                    let session = match self
                        .stations
                        .get_mut(&peer)
                        .and_then(|sta| sta.sae.as_mut())
                    {
                        Some(session) => session,
                        None => {
                            debug!(
                                "SAE failure status {} from {} without session; ignored",
                                status.0,
                                peer.to_mac_str()
                            );
                            return;
                        }
                    };
                    let mut sink = UpdateSink::new();
                    sae::step(
                        session,
                        peer,
                        SaeRx::CommitFailure { status, rejected_group },
                        true,
                        &self.config,
                        self.sae_provider.as_ref(),
                        &mut sink,
                    );
                    sink
                };
                self.apply_sae_updates(peer, sink);
                return;
            }
        };

        if elements.len() < 2 {
            self.send_frame_logged(peer, AuthAlgorithm::SAE, 1, StatusCode::UNSPECIFIED_FAILURE, &[]);
            self.cleanup_failed_auth(peer);
            return;
        }
        let group = u16::from_le_bytes([elements[0], elements[1]]);
        let field_len = match self.sae_provider.commit_field_len(group) {
            Some(len) => len,
            None => {
                debug!("SAE commit for unsupported group {} from {}", group, peer.to_mac_str());
                self.send_frame_logged(
                    peer,
                    AuthAlgorithm::SAE,
                    1,
                    StatusCode::UNSUPPORTED_FINITE_CYCLIC_GROUP,
                    &group.to_le_bytes(),
                );
                self.cleanup_failed_auth(peer);
                return;
            }
        };
        let commit = match ie::parse_sae_commit(elements, field_len, pwe.is_h2e()) {
            Ok(commit) => commit,
            Err(e) => {
                info!("malformed SAE commit from {}: {}", peer.to_mac_str(), e);
                self.send_frame_logged(
                    peer,
                    AuthAlgorithm::SAE,
                    1,
                    StatusCode::UNSPECIFIED_FAILURE,
                    &[],
                );
                self.cleanup_failed_auth(peer);
                return;
            }
        };

        // Anti-clogging: under load, a commit must carry a token we minted
        // for this address and group. No session state is spent on peers
        // that have not echoed one.
        let open_sessions = self.stations.open_sae_sessions() + self.pasn_open_exchanges;
        let challenge = self.guard.should_challenge(
            open_sessions,
            self.commit_queue.len(),
            self.config.anti_clogging_threshold,
        );
        if challenge {
            match commit.token {
                None => {
                    let token = self.guard.mint_token(&peer, group);
                    let body = if pwe.is_h2e() {
                        ie::write_token_challenge_h2e(group, &token)
                    } else {
                        ie::write_token_challenge(group, &token)
                    };
                    self.send_frame_logged(
                        peer,
                        AuthAlgorithm::SAE,
                        1,
                        StatusCode::ANTI_CLOGGING_TOKEN_REQUIRED,
                        &body,
                    );
                    return;
                }
                Some(token) => {
                    if !self.guard.verify_token(&peer, group, token) {
                        info!("invalid anti-clogging token from {}", peer.to_mac_str());
                        self.send_frame_logged(
                            peer,
                            AuthAlgorithm::SAE,
                            1,
                            StatusCode::UNSPECIFIED_FAILURE,
                            &[],
                        );
                        self.cleanup_failed_auth(peer);
                        return;
                    }
                }
            }
        }

        let sink = {
            let sta = match self.stations.get_mut(&peer) {
                Some(sta) => sta,
                None => return,
            };
            let session = sta.sae.get_or_insert_with(|| SaeSession::new(group));
            let mut sink = UpdateSink::new();
            sae::step(
                session,
                peer,
                SaeRx::Commit { pwe, commit },
                true,
                &self.config,
                self.sae_provider.as_ref(),
                &mut sink,
            );
            sink
        };
        self.apply_sae_updates(peer, sink);
    }

    fn handle_sae_confirm(&mut self, peer: MacAddr, status: StatusCode, elements: &[u8]) {
        if status != StatusCode::SUCCESS {
            debug!(
                "SAE confirm with status {} from {}; dropped",
                status.0,
                peer.to_mac_str()
            );
            return;
        }
        let sink = {
            let session = match self.stations.get_mut(&peer).and_then(|sta| sta.sae.as_mut()) {
                Some(session) => session,
                None => {
                    info!("SAE confirm before commit from {}; ignored", peer.to_mac_str());
                    return;
                }
            };
            let mut sink = UpdateSink::new();
            sae::step(
                session,
                peer,
                SaeRx::Confirm { body: elements },
                true,
                &self.config,
                self.sae_provider.as_ref(),
                &mut sink,
            );
            sink
        };
        self.apply_sae_updates(peer, sink);
    }

    fn handle_sae_retransmit(&mut self, peer: MacAddr) {
        let sink = {
            let session = match self.stations.get_mut(&peer).and_then(|sta| sta.sae.as_mut()) {
                Some(session) => session,
                None => return,
            };
            session.retransmit_timer = None;
            let mut sink = UpdateSink::new();
            sae::retransmit(session, &self.config, &mut sink);
            sink
        };
        self.apply_sae_updates(peer, sink);
    }

    fn apply_sae_updates(&mut self, peer: MacAddr, updates: UpdateSink) {
        for update in updates {
            match update {
                SaeUpdate::SendFrame { transaction, status, body } => {
                    self.send_frame_logged(peer, AuthAlgorithm::SAE, transaction, status, &body);
                }
                SaeUpdate::Key(keys) => self.device.store_pmksa(peer, keys),
                SaeUpdate::HandshakeComplete => {
                    if let Some(sta) = self.stations.get_mut(&peer) {
                        sta.flags.insert(StationFlags::AUTHENTICATED);
                    }
                    self.device.notify_authenticated(peer);
                }
                SaeUpdate::Reject { status, echo_group } => {
                    let body =
                        echo_group.map(|g| g.to_le_bytes().to_vec()).unwrap_or_default();
                    self.send_frame_logged(peer, AuthAlgorithm::SAE, 1, status, &body);
                    self.cleanup_failed_auth(peer);
                }
                SaeUpdate::RemovePeer { reauth } => {
                    if reauth {
                        info!("removing {} for forced reauthentication", peer.to_mac_str());
                    }
                    self.remove_station(&peer);
                }
                SaeUpdate::ScheduleRetransmit => {
                    let period = self.config.sae_retransmit_period;
                    if let Some(session) =
                        self.stations.get_mut(&peer).and_then(|sta| sta.sae.as_mut())
                    {
                        if let Some(id) = session.retransmit_timer.take() {
                            self.timer.cancel_event(id);
                        }
                        let id = self
                            .timer
                            .schedule_after(period, TimedEvent::SaeRetransmit { peer });
                        session.retransmit_timer = Some(id);
                    }
                }
                SaeUpdate::CancelRetransmit => {
                    if let Some(session) =
                        self.stations.get_mut(&peer).and_then(|sta| sta.sae.as_mut())
                    {
                        if let Some(id) = session.retransmit_timer.take() {
                            self.timer.cancel_event(id);
                        }
                    }
                }
                SaeUpdate::ScheduleCooldown => {
                    let cooldown = self.config.sae_cooldown;
                    if let Some(session) =
                        self.stations.get_mut(&peer).and_then(|sta| sta.sae.as_mut())
                    {
                        if let Some(id) = session.cooldown_timer.take() {
                            self.timer.cancel_event(id);
                        }
                        let id = self
                            .timer
                            .schedule_after(cooldown, TimedEvent::SaeCooldownExpired { peer });
                        session.cooldown_timer = Some(id);
                    }
                }
            }
        }
    }

    /// Drops speculative state after a failed authentication attempt: the
    /// SAE session, and the driver entry if the station was added while
    /// unassociated. The station record itself stays for duplicate
    /// detection.
    fn cleanup_failed_auth(&mut self, peer: MacAddr) {
        let removed_driver_entry = match self.stations.get_mut(&peer) {
            Some(sta) => {
                if let Some(session) = sta.sae.take() {
                    if let Some(id) = session.retransmit_timer {
                        self.timer.cancel_event(id);
                    }
                    if let Some(id) = session.cooldown_timer {
                        self.timer.cancel_event(id);
                    }
                }
                let added = sta.flags.contains(StationFlags::ADDED_UNASSOCIATED);
                if added {
                    sta.flags.remove(StationFlags::ADDED_UNASSOCIATED);
                }
                added
            }
            None => false,
        };
        if removed_driver_entry {
            if let Err(e) = self.device.remove_sta(peer) {
                error!("failed to remove driver entry for {}: {}", peer.to_mac_str(), e);
            }
        }
    }

    fn send_frame_logged(
        &mut self,
        peer: MacAddr,
        alg: AuthAlgorithm,
        transaction: u16,
        status: StatusCode,
        body: &[u8],
    ) {
        if let Err(e) = self.device.send_auth_frame(peer, alg, transaction, status, body) {
            error!("failed to send auth frame to {}: {}", peer.to_mac_str(), e);
        }
    }
}

fn valid_transaction(alg: AuthAlgorithm, transaction: u16) -> bool {
    match alg {
        AuthAlgorithm::SAE => matches!(transaction, 1 | 2),
        AuthAlgorithm::SHARED_KEY | AuthAlgorithm::PASN => matches!(transaction, 1 | 3),
        _ => transaction == 1,
    }
}
