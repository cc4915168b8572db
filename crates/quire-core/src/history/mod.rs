//! Undo/redo command log.
//!
//! Commands live in an append-only list with a cursor: everything before the
//! cursor is undoable, everything after it is redoable. Pushing a command
//! after an undo discards the redoable tail.
//!
//! Gestures that touch several items open a macro with `begin_macro`, push
//! their commands, and close it with `end_macro`. The macro is recorded as a
//! single entry, so one undo reverts the whole gesture. Macros nest; only
//! the outermost one lands in the log.

mod command;

pub use command::{Command, PointsState, SegmentState};

use crate::item::ItemId;
use crate::scene::Scene;

/// A macro being assembled.
#[derive(Debug)]
struct OpenMacro {
    label: String,
    commands: Vec<Command>,
}

/// Linear undo history.
#[derive(Debug, Default)]
pub struct CommandLog {
    entries: Vec<Command>,
    /// Number of entries currently applied.
    cursor: usize,
    open: Vec<OpenMacro>,
    /// Maximum undo steps, 0 = unlimited.
    limit: usize,
}

impl CommandLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log keeping at most `limit` undo steps (0 = unlimited).
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
        self.enforce_limit();
    }

    /// Apply a command's "after" state and record it.
    pub fn push(&mut self, scene: &mut Scene, command: Command) {
        command.redo(scene);
        self.record(command);
    }

    fn record(&mut self, command: Command) {
        if let Some(open) = self.open.last_mut() {
            open.commands.push(command);
            return;
        }
        self.entries.truncate(self.cursor);
        self.entries.push(command);
        self.cursor = self.entries.len();
        self.enforce_limit();
    }

    fn enforce_limit(&mut self) {
        if self.limit == 0 || self.entries.len() <= self.limit {
            return;
        }
        let excess = self.entries.len() - self.limit;
        self.entries.drain(..excess);
        self.cursor = self.cursor.saturating_sub(excess);
    }

    /// Start collecting commands into one undo step.
    pub fn begin_macro(&mut self, label: impl Into<String>) {
        let label = label.into();
        log::debug!("Begin macro '{label}'");
        self.open.push(OpenMacro {
            label,
            commands: Vec::new(),
        });
    }

    /// Close the innermost macro. Empty macros are dropped.
    pub fn end_macro(&mut self) {
        let Some(open) = self.open.pop() else {
            log::warn!("end_macro called without a matching begin_macro");
            return;
        };
        if open.commands.is_empty() {
            log::debug!("Dropping empty macro '{}'", open.label);
            return;
        }
        log::debug!("End macro '{}' ({} commands)", open.label, open.commands.len());
        self.record(Command::Macro {
            label: open.label,
            commands: open.commands,
        });
    }

    pub fn in_macro(&self) -> bool {
        !self.open.is_empty()
    }

    /// Undo the last step. Returns false if there is nothing to undo or a
    /// macro is still open.
    pub fn undo(&mut self, scene: &mut Scene) -> bool {
        if self.in_macro() {
            log::warn!("Undo requested while a macro is open, ignoring");
            return false;
        }
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let command = &self.entries[self.cursor];
        command.undo(scene);
        refit_groups(scene, command);
        true
    }

    /// Redo the next step. Returns false if there is nothing to redo or a
    /// macro is still open.
    pub fn redo(&mut self, scene: &mut Scene) -> bool {
        if self.in_macro() {
            log::warn!("Redo requested while a macro is open, ignoring");
            return false;
        }
        let Some(command) = self.entries.get(self.cursor) else {
            return false;
        };
        command.redo(scene);
        refit_groups(scene, command);
        self.cursor += 1;
        true
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0 && !self.in_macro()
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len() && !self.in_macro()
    }

    pub fn undo_label(&self) -> Option<&str> {
        self.cursor
            .checked_sub(1)
            .and_then(|idx| self.entries.get(idx))
            .map(Command::label)
    }

    pub fn redo_label(&self) -> Option<&str> {
        self.entries.get(self.cursor).map(Command::label)
    }

    /// Drop all history, including any open macros.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.open.clear();
        self.cursor = 0;
    }

    /// Recorded steps, oldest first.
    pub fn entries(&self) -> &[Command] {
        &self.entries
    }

    /// Number of steps that can be undone.
    pub fn undo_depth(&self) -> usize {
        self.cursor
    }
}

/// Derived group bounds follow their children after every replayed step.
fn refit_groups(scene: &mut Scene, command: &Command) {
    let mut touched = Vec::new();
    command.touched_items(&mut touched);
    let mut groups: Vec<ItemId> = Vec::new();
    for id in touched {
        let group = match scene.get(id) {
            Some(item) if item.is_group() => Some(id),
            Some(_) => scene.parent_of(id),
            None => None,
        };
        if let Some(group) = group {
            if !groups.contains(&group) {
                groups.push(group);
            }
        }
    }
    for group in groups {
        scene.recompute_group_bounds(group);
    }
}
