//! Per-user player engine
//!
//! The command-facing orchestrator: holds what is loaded (single track,
//! program, or ad interstitial), reacts to clock ticks, and owns the side
//! effects of playback transitions — loaded-count accounting through
//! [`CatalogHooks`], listen reporting and ad events through [`EventSink`].
//!
//! Every operation either succeeds or leaves state exactly as it was; all
//! failures are recoverable [`PlayerError`] outcomes.

use crate::clock::TickListener;
use crate::error::{PlayerError, Result};
use crate::hooks::{CatalogHooks, EventSink, SessionPolicy};
use crate::playback::item::ItemCursor;
use crate::playback::program::ProgramCursor;
use crate::playback::progress::ProgressStore;
use crate::playback::state::{PlayerStatus, StatusSnapshot};
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, info};
use vamp_common::catalog::{Program, ProgramKind, Track, TrackId};
use vamp_common::config::EngineConfig;
use vamp_common::events::PlayerEvent;
use vamp_common::Seconds;

/// Display name of the synthetic ad interstitial
const AD_BREAK_TITLE: &str = "Ad Break";
const AD_BREAK_OWNER: &str = "ads";

/// What the external selection collaborator handed over for loading
#[derive(Debug, Clone)]
pub enum Selected {
    Track(Arc<Track>),
    Program(Arc<Program>),
}

/// Outcome of arming an ad marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdOutcome {
    /// Marker armed; the ad plays at the next natural end of the track
    Armed,
    /// Premium session: markers are reported no-ops
    PremiumNoOp,
}

/// What the engine is currently playing
#[derive(Debug)]
enum PlaybackTarget {
    Item(ItemCursor),
    Program(ProgramCursor),
    /// Ad interstitial at an item boundary; `resume` is the repeated
    /// track to continue with once the ad ends (None goes idle)
    Ad {
        cursor: ItemCursor,
        resume: Option<ItemCursor>,
    },
}

/// Playback engine for one user session
pub struct PlayerEngine {
    user: String,
    config: EngineConfig,
    catalog: Rc<dyn CatalogHooks>,
    session: Rc<dyn SessionPolicy>,
    events: Rc<dyn EventSink>,
    status: PlayerStatus,
    target: Option<PlaybackTarget>,
    pending_ad: Option<u64>,
    progress: ProgressStore,
    /// Mirror of the global virtual clock, used to stamp events
    now: Seconds,
}

impl PlayerEngine {
    pub fn new(
        user: impl Into<String>,
        config: EngineConfig,
        now: Seconds,
        catalog: Rc<dyn CatalogHooks>,
        session: Rc<dyn SessionPolicy>,
        events: Rc<dyn EventSink>,
    ) -> Self {
        Self {
            user: user.into(),
            config,
            catalog,
            session,
            events,
            status: PlayerStatus::Idle,
            target: None,
            pending_ad: None,
            progress: ProgressStore::new(),
            now,
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn player_status(&self) -> PlayerStatus {
        self.status
    }

    pub fn has_pending_ad(&self) -> bool {
        self.pending_ad.is_some()
    }

    /// Load the externally selected target
    ///
    /// Validation happens before any state change, so a failed load is an
    /// atomic no-op: whatever played before keeps playing.
    pub fn load(&mut self, selection: Option<Selected>) -> Result<()> {
        let selection = selection.ok_or(PlayerError::NothingSelected)?;
        if let Selected::Program(program) = &selection {
            if program.is_empty() {
                return Err(PlayerError::EmptyCollection);
            }
        }

        self.unload();
        match selection {
            Selected::Track(track) => {
                info!(user = %self.user, track = %track.title, "loading track");
                self.catalog.increment_loaded(track.id);
                self.target = Some(PlaybackTarget::Item(ItemCursor::new(track)));
            }
            Selected::Program(program) => {
                info!(user = %self.user, program = %program.title, "loading program");
                self.catalog.increment_loaded(program.id);
                let cursor = match (program.kind, self.progress.get(program.id)) {
                    (ProgramKind::Podcast, Some(saved)) => {
                        debug!(user = %self.user, position = saved.position, "resuming podcast");
                        ProgramCursor::resume(program.clone(), saved.position, saved.elapsed)
                    }
                    _ => ProgramCursor::new(program.clone()),
                };
                if let Some(id) = cursor.current_track_id() {
                    self.catalog.increment_loaded(id);
                }
                self.target = Some(PlaybackTarget::Program(cursor));
            }
        }
        self.set_status(PlayerStatus::Playing);
        Ok(())
    }

    /// Drop whatever is loaded, settling all side effects
    ///
    /// Emits a partial-listen event for the in-flight item, releases
    /// loaded counts, saves podcast progress, and goes idle.
    pub fn unload(&mut self) {
        let Some(target) = self.target.take() else {
            return;
        };
        match target {
            PlaybackTarget::Item(cursor) => {
                self.emit_listen(cursor.track_id(), false);
                self.catalog.decrement_loaded(cursor.track_id());
            }
            PlaybackTarget::Ad { resume, .. } => {
                if let Some(item) = resume {
                    self.catalog.decrement_loaded(item.track_id());
                }
            }
            PlaybackTarget::Program(cursor) => {
                if let Some(id) = cursor.current_track_id() {
                    self.emit_listen(id, false);
                    self.catalog.decrement_loaded(id);
                }
                let program = cursor.program();
                if program.kind == ProgramKind::Podcast && !cursor.is_finished() {
                    let elapsed = cursor.current().map(|i| i.elapsed()).unwrap_or(0);
                    self.progress
                        .save(program.id, cursor.canonical_position(), elapsed);
                }
                self.catalog.decrement_loaded(program.id);
            }
        }
        self.pending_ad = None;
        self.set_status(PlayerStatus::Idle);
    }

    /// Toggle between playing and paused
    pub fn play_pause(&mut self) -> Result<PlayerStatus> {
        let pausing = self.status == PlayerStatus::Playing;
        let Some(target) = self.target.as_mut() else {
            return Err(PlayerError::NothingLoaded);
        };
        match target {
            PlaybackTarget::Item(cursor) | PlaybackTarget::Ad { cursor, .. } => {
                if pausing {
                    cursor.pause()
                } else {
                    cursor.resume()
                }
            }
            PlaybackTarget::Program(cursor) => {
                if pausing {
                    cursor.pause()
                } else {
                    cursor.unpause()
                }
            }
        }
        self.set_status(if pausing {
            PlayerStatus::Paused
        } else {
            PlayerStatus::Playing
        });
        Ok(self.status)
    }

    /// React to a clock tick
    ///
    /// No-op for offline sessions and for anything not actively playing;
    /// the virtual-time mirror still advances so event stamps stay true.
    pub fn on_tick(&mut self, delta: Seconds) {
        self.now += delta;
        if !self.session.is_online(&self.user) {
            return;
        }
        if self.status != PlayerStatus::Playing {
            return;
        }
        self.route_delta(delta);
    }

    /// Skip to the next item of the loaded program
    pub fn next(&mut self) -> Result<StatusSnapshot> {
        let mut cursor = self.take_program_cursor()?;
        if let Some(id) = cursor.current_track_id() {
            self.emit_listen(id, false);
            self.catalog.decrement_loaded(id);
        }
        if cursor.next() {
            self.finish_program(cursor);
            return Ok(StatusSnapshot::empty());
        }
        if let Some(id) = cursor.current_track_id() {
            self.catalog.increment_loaded(id);
        }
        cursor.unpause();
        let snapshot = cursor.snapshot();
        self.target = Some(PlaybackTarget::Program(cursor));
        self.set_status(PlayerStatus::Playing);
        Ok(snapshot)
    }

    /// Restart the current item, or step back to the previous one when
    /// already at its start
    pub fn prev(&mut self) -> Result<StatusSnapshot> {
        let mut cursor = self.take_program_cursor()?;
        let old = cursor.current_track_id();
        cursor.prev();
        let new = cursor.current_track_id();
        if old != new {
            if let Some(id) = old {
                self.emit_listen(id, false);
                self.catalog.decrement_loaded(id);
            }
            if let Some(id) = new {
                self.catalog.increment_loaded(id);
            }
        }
        cursor.unpause();
        let snapshot = cursor.snapshot();
        self.target = Some(PlaybackTarget::Program(cursor));
        self.set_status(PlayerStatus::Playing);
        Ok(snapshot)
    }

    /// Fixed-size seek toward the end of the current item
    ///
    /// Clamped at the item boundary; reaching it triggers the same
    /// end-of-item logic a tick would.
    pub fn forward(&mut self) -> Result<()> {
        let remaining = match self.target.as_ref() {
            None => return Err(PlayerError::InvalidRepeatTarget),
            Some(PlaybackTarget::Item(cursor)) | Some(PlaybackTarget::Ad { cursor, .. }) => {
                cursor.remaining()
            }
            Some(PlaybackTarget::Program(cursor)) => {
                cursor.current().map(|i| i.remaining()).unwrap_or(0)
            }
        };
        self.route_delta(self.config.seek_step.min(remaining));
        Ok(())
    }

    /// Fixed-size seek toward the start of the current item, clamped at 0
    pub fn backward(&mut self) -> Result<()> {
        let step = self.config.seek_step;
        match self.target.as_mut() {
            None => Err(PlayerError::InvalidRepeatTarget),
            Some(PlaybackTarget::Item(cursor)) | Some(PlaybackTarget::Ad { cursor, .. }) => {
                cursor.seek_backward(step);
                Ok(())
            }
            Some(PlaybackTarget::Program(cursor)) => {
                if let Some(item) = cursor.current_mut() {
                    item.seek_backward(step);
                }
                Ok(())
            }
        }
    }

    /// Cycle the repeat mode of whatever is loaded, returning its label
    pub fn set_repeat(&mut self) -> Result<&'static str> {
        match self.target.as_mut() {
            None | Some(PlaybackTarget::Ad { .. }) => Err(PlayerError::InvalidRepeatTarget),
            Some(PlaybackTarget::Item(cursor)) => Ok(cursor.cycle_repeat().label()),
            Some(PlaybackTarget::Program(cursor)) => Ok(cursor.cycle_repeat().label()),
        }
    }

    /// Toggle shuffle on the loaded program; returns whether it is now on
    pub fn set_shuffle(&mut self, seed: u64) -> Result<bool> {
        match self.target.as_mut() {
            None => Err(PlayerError::NothingLoaded),
            Some(PlaybackTarget::Item(_)) | Some(PlaybackTarget::Ad { .. }) => {
                Err(PlayerError::NotACollection)
            }
            Some(PlaybackTarget::Program(cursor)) => {
                if cursor.program().len() <= 1 {
                    return Err(PlayerError::InvalidShuffleState);
                }
                cursor.toggle_shuffle(seed)
            }
        }
    }

    /// Arm an ad break for the next natural end of the playing track
    ///
    /// Ads are never inserted mid-item. Premium sessions report a no-op
    /// without arming anything.
    pub fn insert_ad_marker(&mut self, price: u64) -> Result<AdOutcome> {
        if self.session.is_premium(&self.user) {
            return Ok(AdOutcome::PremiumNoOp);
        }
        match &self.target {
            Some(PlaybackTarget::Item(_)) => {
                self.pending_ad = Some(price);
                Ok(AdOutcome::Armed)
            }
            None => Err(PlayerError::NothingLoaded),
            Some(_) => Err(PlayerError::NoAdTarget),
        }
    }

    /// Drop a pending ad marker (user upgraded to premium)
    pub fn clear_ad_marker(&mut self) {
        self.pending_ad = None;
    }

    /// Derived status snapshot; the empty snapshot when nothing is loaded
    pub fn status(&self) -> StatusSnapshot {
        match &self.target {
            None => StatusSnapshot::empty(),
            Some(PlaybackTarget::Item(cursor)) | Some(PlaybackTarget::Ad { cursor, .. }) => {
                cursor.snapshot()
            }
            Some(PlaybackTarget::Program(cursor)) => cursor.snapshot(),
        }
    }

    /// Drive playback forward by a time delta, resolving every transition
    /// it causes, until the delta is exhausted or playback stops.
    fn route_delta(&mut self, mut delta: Seconds) {
        loop {
            let Some(target) = self.target.take() else {
                return;
            };
            match target {
                PlaybackTarget::Item(mut cursor) => {
                    delta = cursor.advance(delta);
                    if !cursor.is_finished() {
                        self.target = Some(PlaybackTarget::Item(cursor));
                        return;
                    }
                    self.emit_listen(cursor.track_id(), true);
                    let repeated = cursor.apply_repeat();

                    if let Some(price) = self.pending_ad.take() {
                        debug!(user = %self.user, price, "ad break at item boundary");
                        self.publish(PlayerEvent::AdBreak {
                            price,
                            at: self.now,
                        });
                        let mut ad = ItemCursor::new(Arc::new(Track::new(
                            AD_BREAK_TITLE,
                            AD_BREAK_OWNER,
                            self.config.ad_break_duration,
                        )));
                        if self.status != PlayerStatus::Playing {
                            ad.pause();
                        }
                        let resume = if repeated {
                            Some(cursor)
                        } else {
                            self.catalog.decrement_loaded(cursor.track_id());
                            None
                        };
                        self.target = Some(PlaybackTarget::Ad { cursor: ad, resume });
                        continue;
                    }

                    if repeated {
                        let stalled = cursor.track().duration == 0;
                        self.target = Some(PlaybackTarget::Item(cursor));
                        if delta == 0 || stalled {
                            return;
                        }
                        continue;
                    }

                    // Exhausted: leftover delta is discarded
                    self.catalog.decrement_loaded(cursor.track_id());
                    debug!(user = %self.user, "track exhausted, going idle");
                    self.set_status(PlayerStatus::Idle);
                    return;
                }

                PlaybackTarget::Ad { mut cursor, resume } => {
                    delta = cursor.advance(delta);
                    if !cursor.is_finished() {
                        self.target = Some(PlaybackTarget::Ad { cursor, resume });
                        return;
                    }
                    match resume {
                        Some(item) => {
                            self.target = Some(PlaybackTarget::Item(item));
                            if delta == 0 {
                                return;
                            }
                        }
                        None => {
                            self.set_status(PlayerStatus::Idle);
                            return;
                        }
                    }
                }

                PlaybackTarget::Program(mut cursor) => {
                    let before = cursor.current_track_id();
                    let result = cursor.advance(delta);
                    for id in &result.completed {
                        self.emit_listen(*id, true);
                    }
                    let after = cursor.current_track_id();
                    if before != after {
                        if let Some(old) = before {
                            self.catalog.decrement_loaded(old);
                        }
                        if let Some(new) = after {
                            self.catalog.increment_loaded(new);
                        }
                    }
                    if result.finished {
                        self.finish_program(cursor);
                    } else {
                        self.target = Some(PlaybackTarget::Program(cursor));
                    }
                    // The cursor consumed or discarded the whole delta
                    return;
                }
            }
        }
    }

    /// Take the loaded program cursor or fail with the right taxonomy
    fn take_program_cursor(&mut self) -> Result<ProgramCursor> {
        match self.target.take() {
            None => Err(PlayerError::NothingLoaded),
            Some(other @ (PlaybackTarget::Item(_) | PlaybackTarget::Ad { .. })) => {
                self.target = Some(other);
                Err(PlayerError::NotACollection)
            }
            Some(PlaybackTarget::Program(cursor)) => Ok(cursor),
        }
    }

    /// Settle an exhausted program: release counts, clear progress, idle
    fn finish_program(&mut self, cursor: ProgramCursor) {
        let program = cursor.program().clone();
        if program.kind == ProgramKind::Podcast {
            self.progress.clear(program.id);
        }
        self.catalog.decrement_loaded(program.id);
        debug!(user = %self.user, program = %program.title, "program exhausted, going idle");
        self.set_status(PlayerStatus::Idle);
    }

    fn set_status(&mut self, new_status: PlayerStatus) {
        if new_status != self.status {
            self.publish(PlayerEvent::StateChanged {
                old_status: self.status,
                new_status,
                at: self.now,
            });
            self.status = new_status;
        }
    }

    fn emit_listen(&self, item_id: TrackId, completed_fully: bool) {
        self.publish(PlayerEvent::ListenFinished {
            item_id,
            completed_fully,
            at: self.now,
        });
    }

    fn publish(&self, event: PlayerEvent) {
        self.events.publish(event);
    }
}

impl TickListener for PlayerEngine {
    fn on_tick(&mut self, delta: Seconds) {
        PlayerEngine::on_tick(self, delta);
    }
}
