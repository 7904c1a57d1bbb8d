//! Retained canvas contents, kept per implement so one implement's marks
//! can be erased without touching the others.

use crate::renderer::{RenderResult, validate};
use kurbo::Size;
use std::collections::HashMap;
use turtleink_core::{Cursor, ImplementId, Primitive};

/// Everything currently on a canvas, in drawing order.
#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    primitives: Vec<Primitive>,
    cursors: HashMap<ImplementId, Cursor>,
    /// Cursor owners in the order they first appeared, so cursors stack
    /// the same way on every frame.
    cursor_order: Vec<ImplementId>,
    size: Size,
}

impl DisplayList {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    /// Append a primitive, rejecting geometry that cannot be painted.
    pub fn push(&mut self, primitive: Primitive) -> RenderResult<()> {
        validate(&primitive)?;
        self.primitives.push(primitive);
        Ok(())
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Erase all marks. Cursors stay.
    pub fn clear(&mut self) {
        self.primitives.clear();
    }

    /// Erase the marks of one implement. Returns how many were removed.
    pub fn clear_owner(&mut self, owner: ImplementId) -> usize {
        let before = self.primitives.len();
        self.primitives.retain(|primitive| primitive.owner() != owner);
        before - self.primitives.len()
    }

    /// Show, move or hide an implement's cursor.
    pub fn set_cursor(&mut self, owner: ImplementId, cursor: Option<&Cursor>) {
        match cursor {
            Some(cursor) => {
                if self.cursors.insert(owner, cursor.clone()).is_none() {
                    self.cursor_order.push(owner);
                }
            }
            None => {
                if self.cursors.remove(&owner).is_some() {
                    self.cursor_order.retain(|id| *id != owner);
                }
            }
        }
    }

    /// Visible cursors in stacking order.
    pub fn cursors(&self) -> impl Iterator<Item = &Cursor> {
        self.cursor_order.iter().filter_map(|id| self.cursors.get(id))
    }

    pub fn clear_cursors(&mut self) {
        self.cursors.clear();
        self.cursor_order.clear();
    }
}
