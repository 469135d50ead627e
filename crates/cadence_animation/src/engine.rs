//! Position engine
//!
//! Everything that happens when a temporal object moves: normalizing the raw
//! position, applying it (property writes for tweens, fan-out for
//! timelines), replaying the actions the move passed over, and announcing
//! the change.
//!
//! Action callbacks receive the scheduler and may seek or pause anything,
//! including the object being replayed. Replay notices when the object's
//! position moved underneath it and abandons the rest of the pass.

use crate::labels::Seek;
use crate::ledger::{Action, ActionCall, ActionKind};
use crate::scheduler::{Scheduler, TweenId};
use crate::temporal::TemporalKind;
use cadence_core::events::event_types;
use smallvec::SmallVec;

/// Updater invoked after properties are applied and before actions run
pub type OnUpdated<'a> = &'a mut dyn FnMut(&mut Scheduler, TweenId);

impl Scheduler {
    /// Move forward by `delta` (scaled by the object's time scale)
    ///
    /// Returns true once the final loop has ended.
    pub fn advance(&mut self, id: TweenId, delta: f64) -> bool {
        self.advance_with(id, delta, false)
    }

    pub fn advance_with(&mut self, id: TweenId, delta: f64, ignore_actions: bool) -> bool {
        let Some(entry) = self.tweens.get(id) else {
            tracing::warn!("advance on removed temporal object {:?}", id);
            return false;
        };
        // An unpositioned object starts counting from zero
        let raw = entry.raw_position.max(0.0) + delta * entry.time_scale;
        self.set_position_with(id, raw, ignore_actions, false, None)
    }

    /// Seek to a raw position, running the actions passed over
    ///
    /// Returns true if the position is at or past the end of the final loop.
    pub fn set_position(&mut self, id: TweenId, raw: f64) -> bool {
        self.set_position_with(id, raw, false, false, None)
    }

    /// Seek to a raw position
    ///
    /// With `jump`, only actions exactly at the destination fire.
    /// `on_updated` runs after the new position is applied and before any
    /// action fires.
    pub fn set_position_with(
        &mut self,
        id: TweenId,
        raw: f64,
        ignore_actions: bool,
        jump: bool,
        on_updated: Option<OnUpdated<'_>>,
    ) -> bool {
        let Some(entry) = self.tweens.get_mut(id) else {
            tracing::warn!("set_position on removed temporal object {:?}", id);
            return false;
        };

        let prev_raw = entry.raw_position;
        let shape = entry.shape();
        let state = shape.calculate(raw);
        if shape.duration <= 0.0 {
            if prev_raw >= 0.0 {
                return true;
            }
        } else if state.raw == prev_raw {
            return state.ended;
        }

        // Committed before anything runs so callbacks observe the new position
        entry.position = state.position;
        entry.raw_position = state.raw;
        tracing::trace!(
            "{:?} raw={} position={} ended={}",
            id,
            state.raw,
            state.position,
            state.ended
        );

        self.update_position(id, jump, state.ended);
        if state.ended {
            self.set_paused(id, true);
        }
        if let Some(updated) = on_updated {
            updated(self, id);
        }
        if !ignore_actions {
            self.run_actions(id, prev_raw, state.raw, jump, !jump && prev_raw < 0.0);
        }

        self.dispatch(id, event_types::CHANGE);
        if state.ended {
            self.dispatch(id, event_types::COMPLETE);
        }
        state.ended
    }

    /// Resume and seek to a position or label
    ///
    /// Returns false (and only resumes) if the label is unknown.
    pub fn goto_and_play(&mut self, id: TweenId, seek: impl Into<Seek>) -> bool {
        self.set_paused(id, false);
        self.goto(id, seek.into())
    }

    /// Pause and seek to a position or label
    pub fn goto_and_stop(&mut self, id: TweenId, seek: impl Into<Seek>) -> bool {
        self.set_paused(id, true);
        self.goto(id, seek.into())
    }

    fn goto(&mut self, id: TweenId, seek: Seek) -> bool {
        let Some(entry) = self.tweens.get(id) else {
            tracing::warn!("goto on removed temporal object {:?}", id);
            return false;
        };
        match entry.labels.resolve(&seek) {
            Some(position) => {
                self.set_position_with(id, position, false, true, None);
                true
            }
            None => {
                tracing::warn!("Unknown label {:?} on {:?}", seek, id);
                false
            }
        }
    }

    fn update_position(&mut self, id: TweenId, jump: bool, end: bool) {
        let Some(entry) = self.tweens.get(id) else {
            return;
        };
        match &entry.kind {
            TemporalKind::Tween(_) => self.update_tween_props(id, end),
            TemporalKind::Timeline(body) => {
                let position = entry.position;
                let children = body.children.clone();
                for child in children {
                    self.set_position_with(child, position, true, jump, None);
                }
            }
        }
    }

    /// Replay actions between two raw positions
    ///
    /// The span is split per loop so every pass replays in the direction it
    /// plays. Returns true if replay was interrupted by a position change.
    pub(crate) fn run_actions(
        &mut self,
        id: TweenId,
        start_raw: f64,
        end_raw: f64,
        jump: bool,
        mut include_start: bool,
    ) -> bool {
        let Some(entry) = self.tweens.get(id) else {
            return false;
        };
        if entry.actions().is_some_and(|actions| actions.is_empty()) {
            return false;
        }

        let d = entry.duration;
        let mut shape = entry.shape();
        if d <= 0.0 {
            shape.reversed = false;
            shape.bounce = false;
        }
        let bounce = shape.bounce;
        let (loop0, t0) = shape.split(start_raw);
        let (loop1, t1) = shape.split(end_raw);

        if jump {
            let at = if shape.is_loop_reversed(loop1) { d - t1 } else { t1 };
            return self.run_actions_range(id, at, at, true, include_start);
        }
        if loop0 == loop1 && t0 == t1 && !include_start {
            return false;
        }

        let forward = start_raw <= end_raw;
        let mut current = loop0;
        loop {
            let mut start = if current == loop0 {
                t0
            } else if forward {
                0.0
            } else {
                d
            };
            let mut end = if current == loop1 {
                t1
            } else if forward {
                d
            } else {
                0.0
            };
            if shape.is_loop_reversed(current) {
                start = d - start;
                end = d - end;
            }

            // A bounce turns around on the loop boundary it already replayed
            let turnaround = bounce && current != loop0 && start == end;
            if !turnaround {
                let include = include_start || (current != loop0 && !bounce);
                if self.run_actions_range(id, start, end, false, include) {
                    return true;
                }
            }
            include_start = false;

            if forward {
                current += 1;
                if current > loop1 {
                    break;
                }
            } else {
                current -= 1;
                if current < loop1 {
                    break;
                }
            }
        }
        false
    }

    /// Replay actions between two positions of a single pass
    fn run_actions_range(
        &mut self,
        id: TweenId,
        start: f64,
        end: f64,
        jump: bool,
        include_start: bool,
    ) -> bool {
        let Some(entry) = self.tweens.get(id) else {
            return true;
        };
        let position = entry.position;
        let (children, count): (SmallVec<[TweenId; 4]>, usize) = match &entry.kind {
            TemporalKind::Timeline(body) => (body.children.clone(), 0),
            TemporalKind::Tween(body) => (SmallVec::new(), body.actions.len()),
        };

        let moved = |scheduler: &Scheduler| {
            scheduler
                .tweens
                .get(id)
                .map_or(true, |entry| entry.position != position)
        };

        if entry.is_timeline() {
            for child in children {
                self.run_actions(child, start, end, jump, include_start);
                if moved(self) {
                    return true;
                }
            }
            return false;
        }

        let reverse = start > end;
        let (low, high) = if reverse { (end, start) } else { (start, end) };
        for k in 0..count {
            let index = if reverse { count - 1 - k } else { k };
            let Some(action) = self
                .tweens
                .get(id)
                .and_then(|entry| entry.actions())
                .and_then(|actions| actions.get(index))
            else {
                return true;
            };
            let at = action.start;
            if at == end || (at > low && at < high) || (include_start && at == start) {
                let action = action.clone();
                self.fire_action(id, &action);
                if moved(self) {
                    return true;
                }
            }
        }
        false
    }

    fn fire_action(&mut self, id: TweenId, action: &Action) {
        tracing::trace!("{:?} fires action at {}", id, action.start);
        let own_target = self.tweens.get(id).and_then(|entry| entry.target());
        match &action.kind {
            ActionKind::Call {
                callback,
                args,
                scope,
            } => {
                let call = ActionCall {
                    tween: id,
                    scope: scope.or(own_target),
                    args,
                };
                callback(self, &call);
            }
            ActionKind::Set { props, target } => {
                match target.or(own_target).and_then(|t| self.targets.get_mut(t)) {
                    Some(object) => {
                        for (name, value) in props {
                            object.set(name, value.clone());
                        }
                    }
                    None => tracing::warn!("set action of {:?} has no live target", id),
                }
            }
            ActionKind::Paused { tween, paused } => self.set_paused(*tween, *paused),
        }
    }
}
