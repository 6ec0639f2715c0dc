//! Ordered command group

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use super::{CmdCtx, Command, ResourceSet};
use crate::drive_ctrl::BodySpeeds;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// An ordered, fixed sequence of child commands executed strictly in
/// sequence order.
///
/// At most one child is mid-run at a time. When a child finishes its `end`
/// runs, the cursor advances and the next child is initialised in the same
/// cycle. If the group is interrupted the mid-run child is interrupted and
/// the cursor does not advance - remaining children never start.
pub struct CommandGroup {
    children: Vec<Box<dyn Command>>,
    cursor: usize,
    child_mid_run: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CommandGroup {
    pub fn new() -> Self {
        Self {
            children: Vec::new(),
            cursor: 0,
            child_mid_run: false,
        }
    }

    /// Append a child command, builder style.
    pub fn add(mut self, cmd: Box<dyn Command>) -> Self {
        self.children.push(cmd);
        self
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Default for CommandGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl Command for CommandGroup {
    fn requirements(&self) -> ResourceSet {
        self.children
            .iter()
            .fold(ResourceSet::NONE, |set, c| set.union(c.requirements()))
    }

    fn initialize(&mut self, ctx: &CmdCtx) -> BodySpeeds {
        self.cursor = 0;

        match self.children.first_mut() {
            Some(child) => {
                self.child_mid_run = true;
                child.initialize(ctx)
            }
            None => BodySpeeds::ZERO,
        }
    }

    fn execute(&mut self, ctx: &CmdCtx) -> BodySpeeds {
        let child = match self.children.get_mut(self.cursor) {
            Some(c) => c,
            None => return BodySpeeds::ZERO,
        };

        let mut speeds = child.execute(ctx);

        if child.is_finished(ctx) {
            // Child ends with a zero demand, then its successor is
            // initialised within the same cycle
            speeds = child.end(false);
            self.child_mid_run = false;
            self.cursor += 1;

            if let Some(next) = self.children.get_mut(self.cursor) {
                speeds = next.initialize(ctx);
                self.child_mid_run = true;
            }
        }

        speeds
    }

    fn is_finished(&self, _ctx: &CmdCtx) -> bool {
        self.cursor >= self.children.len()
    }

    fn end(&mut self, interrupted: bool) -> BodySpeeds {
        // On interruption the mid-run child is interrupted and the cursor is
        // not advanced
        if interrupted && self.child_mid_run {
            if let Some(child) = self.children.get_mut(self.cursor) {
                child.end(true);
            }
            self.child_mid_run = false;
        }

        BodySpeeds::ZERO
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
