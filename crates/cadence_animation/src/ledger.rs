//! Step and action ledgers
//!
//! Both ledgers are append-only vectors. A step's predecessor is the entry
//! at `index - 1`, so the start snapshot of a step is simply the end
//! snapshot of the step before it. Index 0 of the step ledger is a
//! zero-length head step holding the initial property values.

use crate::easing::Easing;
use crate::scheduler::{Scheduler, TargetId, TweenId};
use cadence_core::{PropMap, Value};
use std::rc::Rc;

/// An interpolation segment
#[derive(Clone, Debug)]
pub struct Step {
    pub(crate) index: usize,
    pub(crate) start: f64,
    pub(crate) duration: f64,
    pub(crate) props: PropMap,
    pub(crate) ease: Option<Easing>,
    pub(crate) passive: bool,
}

impl Step {
    pub fn index(&self) -> usize {
        self.index
    }

    /// Offset of this step from the start of the tween
    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Property values at the end of this step
    pub fn props(&self) -> &PropMap {
        &self.props
    }

    pub fn ease(&self) -> Option<Easing> {
        self.ease
    }

    pub fn is_passive(&self) -> bool {
        self.passive
    }
}

/// Ordered interpolation segments of one tween
#[derive(Clone, Debug)]
pub struct StepLedger {
    steps: Vec<Step>,
}

impl StepLedger {
    pub fn new() -> Self {
        Self {
            steps: vec![Step {
                index: 0,
                start: 0.0,
                duration: 0.0,
                props: PropMap::new(),
                ease: None,
                passive: true,
            }],
        }
    }

    /// The head step carrying the initial snapshot
    pub fn head(&self) -> &Step {
        &self.steps[0]
    }

    pub fn tail(&self) -> &Step {
        &self.steps[self.steps.len() - 1]
    }

    pub fn get(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    /// Number of authored steps (the head is not counted)
    pub fn len(&self) -> usize {
        self.steps.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total authored duration
    pub fn duration(&self) -> f64 {
        self.tail().end()
    }

    /// Authored steps, head excluded
    pub fn iter(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter().skip(1)
    }

    /// Append a step starting where the ledger currently ends
    pub(crate) fn push(
        &mut self,
        duration: f64,
        props: PropMap,
        ease: Option<Easing>,
        passive: bool,
    ) -> usize {
        let index = self.steps.len();
        let start = self.duration();
        self.steps.push(Step {
            index,
            start,
            duration,
            props,
            ease,
            passive,
        });
        index
    }

    /// Locate the step containing `t`, walking forward from `cursor`
    ///
    /// Falls back to the first authored step when the cursor is ahead of
    /// `t`. Must not be called on an empty ledger.
    pub(crate) fn locate(&self, cursor: usize, t: f64) -> usize {
        let mut index = match self.steps.get(cursor) {
            Some(step) if cursor > 0 && step.start <= t => cursor,
            _ => 1,
        };
        while let Some(next) = self.steps.get(index + 1) {
            if next.start > t {
                break;
            }
            index += 1;
        }
        index
    }

    /// Write an initial value for a newly introduced property into step
    /// `from` and every earlier step that lacks it
    pub(crate) fn backfill(&mut self, from: usize, name: &str, value: &Value) {
        for step in self.steps[..=from].iter_mut().rev() {
            if step.props.contains_key(name) {
                break;
            }
            step.props.insert(name.to_string(), value.clone());
        }
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Step> {
        self.steps.get_mut(index)
    }

    /// Borrow a step's predecessor alongside the step itself
    pub(crate) fn pair_mut(&mut self, index: usize) -> Option<(&Step, &mut Step)> {
        if index == 0 || index >= self.steps.len() {
            return None;
        }
        let (before, rest) = self.steps.split_at_mut(index);
        Some((&before[index - 1], &mut rest[0]))
    }
}

impl Default for StepLedger {
    fn default() -> Self {
        Self::new()
    }
}

/// Context handed to a queued call
pub struct ActionCall<'a> {
    /// The tween that queued the call
    pub tween: TweenId,
    /// The target the call is scoped to, if any
    pub scope: Option<TargetId>,
    pub args: &'a [Value],
}

/// Callback type for queued calls
pub type ActionFn = Rc<dyn Fn(&mut Scheduler, &ActionCall<'_>)>;

/// What a queued action does when it fires
#[derive(Clone)]
pub(crate) enum ActionKind {
    Call {
        callback: ActionFn,
        args: Vec<Value>,
        scope: Option<TargetId>,
    },
    Set {
        props: PropMap,
        target: Option<TargetId>,
    },
    Paused {
        tween: TweenId,
        paused: bool,
    },
}

/// A side effect queued at an offset
#[derive(Clone)]
pub struct Action {
    pub(crate) start: f64,
    pub(crate) kind: ActionKind,
}

impl Action {
    /// Offset at which the action fires
    pub fn start(&self) -> f64 {
        self.start
    }
}

/// Ordered side effects of one tween
#[derive(Clone, Default)]
pub struct ActionLedger {
    actions: Vec<Action>,
}

impl ActionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, start: f64, kind: ActionKind) -> usize {
        self.actions.push(Action { start, kind });
        self.actions.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&Action> {
        self.actions.get(index)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Offsets of every queued action, in authoring order
    pub fn offsets(&self) -> impl Iterator<Item = f64> + '_ {
        self.actions.iter().map(|a| a.start)
    }
}
