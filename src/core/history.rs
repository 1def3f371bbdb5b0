/// Appearance model with snapshot-based undo/redo.
///
/// Callers push a snapshot before each discrete change, which keeps the
/// customizer's "edit, then undo" flow and survives rapid slider updates
/// without recording every intermediate value.
use rand::Rng;
use tracing::debug;

use crate::schema::appearance::AppearanceSettings;

/// Cap on stored snapshots per stack.
pub const MAX_HISTORY: usize = 100;

/// Moments worth a haptic or sound cue in the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackEvent {
    Selection,
    Undo,
    Redo,
    Randomize,
    Reset,
}

/// Fire-and-forget sink for feedback cues.
pub trait FeedbackHook {
    fn signal(&mut self, event: FeedbackEvent);
}

impl<F: FnMut(FeedbackEvent)> FeedbackHook for F {
    fn signal(&mut self, event: FeedbackEvent) {
        self(event)
    }
}

pub struct AppearanceModel {
    current: AppearanceSettings,
    undo_stack: Vec<AppearanceSettings>,
    redo_stack: Vec<AppearanceSettings>,
    feedback: Option<Box<dyn FeedbackHook>>,
}

impl Default for AppearanceModel {
    fn default() -> Self {
        Self::new(AppearanceSettings::default())
    }
}

impl std::fmt::Debug for AppearanceModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppearanceModel")
            .field("current", &self.current)
            .field("undo", &self.undo_stack.len())
            .field("redo", &self.redo_stack.len())
            .finish()
    }
}

impl AppearanceModel {
    pub fn new(current: AppearanceSettings) -> Self {
        Self {
            current,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            feedback: None,
        }
    }

    pub fn with_feedback(mut self, hook: impl FeedbackHook + 'static) -> Self {
        self.feedback = Some(Box::new(hook));
        self
    }

    pub fn current(&self) -> &AppearanceSettings {
        &self.current
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Snapshot the current settings onto the undo stack.
    ///
    /// Skipped when the snapshot would duplicate the top of the stack. A
    /// real push invalidates the redo history.
    pub fn push_state(&mut self) {
        if self.undo_stack.last() == Some(&self.current) {
            return;
        }
        self.undo_stack.push(self.current.clone());
        if self.undo_stack.len() > MAX_HISTORY {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
    }

    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.undo_stack.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.current, previous);
        self.redo_stack.push(current);
        self.signal(FeedbackEvent::Undo);
        debug!(depth = self.undo_stack.len(), "undo");
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.current, next);
        self.undo_stack.push(current);
        self.signal(FeedbackEvent::Redo);
        debug!(depth = self.redo_stack.len(), "redo");
        true
    }

    /// Shuffle the look. Background, filter and sliders stay put.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let next = self.current.randomized(rng);
        self.replace(next);
        self.signal(FeedbackEvent::Randomize);
    }

    /// Back to the default look. The cue fires even when already there.
    pub fn reset(&mut self) {
        self.replace(AppearanceSettings::default());
        self.signal(FeedbackEvent::Reset);
    }

    /// Replace the settings, recording history only when they differ.
    pub fn set(&mut self, settings: AppearanceSettings) -> bool {
        if !self.replace(settings) {
            return false;
        }
        self.signal(FeedbackEvent::Selection);
        true
    }

    fn replace(&mut self, next: AppearanceSettings) -> bool {
        if next == self.current {
            return false;
        }
        self.push_state();
        self.current = next;
        true
    }

    /// Edit a copy of the settings and keep it if anything changed.
    pub fn update(&mut self, edit: impl FnOnce(&mut AppearanceSettings)) -> bool {
        let mut next = self.current.clone();
        edit(&mut next);
        self.set(next)
    }

    fn signal(&mut self, event: FeedbackEvent) {
        if let Some(hook) = self.feedback.as_mut() {
            hook.signal(event);
        }
    }
}
