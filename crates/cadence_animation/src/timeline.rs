//! Timelines
//!
//! A timeline groups temporal objects under one position. Children are
//! paused when added and from then on move only when the timeline moves;
//! the timeline replays their actions on their behalf.

use crate::scheduler::{Scheduler, TweenId};
use crate::temporal::{Temporal, TemporalKind, TimelineBody, TweenConfig};
use cadence_core::{CadenceError, Result};
use smallvec::SmallVec;

impl Scheduler {
    /// Create a timeline over `children`
    ///
    /// Children that cannot be added (removed ids, cycles) are skipped with a
    /// warning.
    pub fn create_timeline(&mut self, children: &[TweenId], config: TweenConfig) -> TweenId {
        let body = TimelineBody::default();
        let id = self
            .tweens
            .insert(Temporal::new(&config, TemporalKind::Timeline(body)));
        for &child in children {
            if let Err(err) = self.add_tween(id, child) {
                tracing::warn!("Skipping child {:?} of timeline {:?}: {}", child, id, err);
            }
        }
        self.init_temporal(id, &config);
        tracing::debug!("Created timeline {:?} with {} children", id, children.len());
        id
    }

    /// Add a child to a timeline
    ///
    /// The child leaves any previous timeline, is paused, and immediately
    /// takes the timeline's current position if the timeline has been
    /// positioned.
    pub fn add_tween(&mut self, timeline: TweenId, child: TweenId) -> Result<()> {
        match self.tweens.get(timeline) {
            Some(entry) if entry.is_timeline() => {}
            Some(_) => return Err(CadenceError::NotATimeline),
            None => return Err(CadenceError::UnknownTween),
        }
        let Some(previous) = self.tweens.get(child).map(|entry| entry.parent) else {
            return Err(CadenceError::UnknownTween);
        };

        let mut ancestor = Some(timeline);
        while let Some(id) = ancestor {
            if id == child {
                return Err(CadenceError::Unsupported(
                    "A timeline can not contain itself".to_string(),
                ));
            }
            ancestor = self.tweens.get(id).and_then(|entry| entry.parent);
        }

        if previous == Some(timeline) {
            return Ok(());
        }
        if let Some(previous) = previous {
            self.remove_tween(previous, child);
        }

        self.set_paused(child, true);
        let span = match self.tweens.get_mut(child) {
            Some(entry) => {
                entry.parent = Some(timeline);
                entry.span()
            }
            None => 0.0,
        };

        let Some(entry) = self.tweens.get_mut(timeline) else {
            return Err(CadenceError::UnknownTween);
        };
        if let Some(body) = entry.timeline_body_mut() {
            body.children.push(child);
        }
        if span > entry.duration {
            entry.duration = span;
        }
        let positioned = entry.raw_position >= 0.0;
        let position = entry.position;
        tracing::debug!("Added {:?} to timeline {:?}", child, timeline);

        if positioned {
            self.set_position_with(child, position, true, false, None);
        }
        self.refresh_ancestors(timeline);
        Ok(())
    }

    /// Add several children in order, stopping at the first failure
    pub fn add_tweens(&mut self, timeline: TweenId, children: &[TweenId]) -> Result<()> {
        for &child in children {
            self.add_tween(timeline, child)?;
        }
        Ok(())
    }

    /// Detach a child from a timeline
    ///
    /// Returns false if `child` is not a child of `timeline`.
    pub fn remove_tween(&mut self, timeline: TweenId, child: TweenId) -> bool {
        let Some(entry) = self.tweens.get_mut(timeline) else {
            return false;
        };
        let duration = entry.duration;
        let Some(body) = entry.timeline_body_mut() else {
            return false;
        };
        let Some(index) = body.children.iter().rposition(|&c| c == child) else {
            return false;
        };
        body.children.remove(index);

        let span = match self.tweens.get_mut(child) {
            Some(entry) => {
                entry.parent = None;
                entry.span()
            }
            None => duration,
        };
        tracing::debug!("Removed {:?} from timeline {:?}", child, timeline);

        // Only the longest child determines the duration
        if span >= duration {
            self.update_duration(timeline);
            self.refresh_ancestors(timeline);
        }
        true
    }

    /// Detach several children; true only if every one was a child
    pub fn remove_children(&mut self, timeline: TweenId, children: &[TweenId]) -> bool {
        children
            .iter()
            .fold(true, |all, &child| self.remove_tween(timeline, child) && all)
    }

    /// Recompute a timeline's duration from its children
    pub fn update_duration(&mut self, timeline: TweenId) -> f64 {
        let children: SmallVec<[TweenId; 4]> = match self.tweens.get(timeline) {
            Some(entry) => entry.children().iter().copied().collect(),
            None => return 0.0,
        };
        let duration = children
            .iter()
            .filter_map(|&child| self.tweens.get(child))
            .map(Temporal::span)
            .fold(0.0, f64::max);
        if let Some(entry) = self.tweens.get_mut(timeline) {
            if entry.is_timeline() {
                entry.duration = duration;
            }
        }
        duration
    }
}
