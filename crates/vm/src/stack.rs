//! The frame-structured run-time stack.
//!
//! Integer slots grow and shrink only at the end. A parallel stack of
//! frame bases records where each active activation's slots begin; the
//! active frame owns `[frame_base, size)`. The stack starts with one
//! implicit base frame at offset 0 that is never popped.

use std::fmt;
use thiserror::Error;

/// Errors from run-time stack operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StackError {
    /// Pop or peek on an empty stack.
    #[error("stack underflow")]
    Underflow,

    /// Frame reset with only the base frame active.
    #[error("no active frame to pop")]
    NoActiveFrame,

    /// A slot index computed from a frame offset lies outside the stack.
    #[error("slot {offset} is outside a stack of {size} values")]
    OffsetOutOfRange { offset: usize, size: usize },
}

/// Integer slots plus frame-base offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunTimeStack {
    slots: Vec<i32>,
    frames: Vec<usize>,
}

impl Default for RunTimeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl RunTimeStack {
    /// An empty stack with the base frame at offset 0.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            frames: vec![0],
        }
    }

    pub fn push(&mut self, value: i32) {
        self.slots.push(value);
    }

    pub fn pop(&mut self) -> Result<i32, StackError> {
        self.slots.pop().ok_or(StackError::Underflow)
    }

    pub fn peek(&self) -> Result<i32, StackError> {
        self.slots.last().copied().ok_or(StackError::Underflow)
    }

    /// Number of values on the stack.
    pub fn size(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// All values, bottom first.
    pub fn slots(&self) -> &[i32] {
        &self.slots
    }

    /// The value at absolute index `index`.
    pub fn slot(&self, index: usize) -> Option<i32> {
        self.slots.get(index).copied()
    }

    /// Start of the active frame.
    pub fn frame_base(&self) -> usize {
        self.frames.last().copied().unwrap_or(0)
    }

    /// Number of active frames, including the base frame.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Values belonging to the active frame.
    pub fn frame_values(&self) -> &[i32] {
        let base = self.frame_base().min(self.slots.len());
        &self.slots[base..]
    }

    /// Begin a frame whose base is `offset` slots below the top, so the
    /// most recent `offset` values become the new frame's arguments.
    pub fn new_frame_at(&mut self, offset: usize) -> Result<(), StackError> {
        let size = self.slots.len();
        let base = size
            .checked_sub(offset)
            .ok_or(StackError::OffsetOutOfRange { offset, size })?;
        self.frames.push(base);
        Ok(())
    }

    /// Pop the active frame, returning its base. The base frame stays.
    pub fn pop_frame(&mut self) -> Result<usize, StackError> {
        if self.frames.len() <= 1 {
            return Err(StackError::NoActiveFrame);
        }
        self.frames.pop().ok_or(StackError::NoActiveFrame)
    }

    /// Push a copy of the value at `frame_base + offset`.
    pub fn load(&mut self, offset: usize) -> Result<i32, StackError> {
        let index = self.frame_index(offset, self.slots.len())?;
        let value = self.slots[index];
        self.slots.push(value);
        Ok(value)
    }

    /// Pop the top value and write it at `frame_base + offset`.
    ///
    /// The target must lie below the popped slot; nothing changes when it
    /// does not.
    pub fn store(&mut self, offset: usize) -> Result<i32, StackError> {
        let remaining = self
            .slots
            .len()
            .checked_sub(1)
            .ok_or(StackError::Underflow)?;
        let index = self.frame_index(offset, remaining)?;
        let value = self.pop()?;
        self.slots[index] = value;
        Ok(value)
    }

    /// Discard the top `n` values when `n` is smaller than the stack size.
    ///
    /// Larger counts leave the stack untouched. Returns how many values
    /// were discarded.
    pub fn pop_n(&mut self, n: usize) -> usize {
        if n < self.slots.len() {
            self.slots.truncate(self.slots.len() - n);
            n
        } else {
            0
        }
    }

    /// Return protocol: keep the top value, discard the active frame's
    /// slots, pop the frame, push the kept value back.
    pub fn reset(&mut self) -> Result<i32, StackError> {
        if self.frames.len() <= 1 {
            return Err(StackError::NoActiveFrame);
        }
        let value = self.pop()?;
        let base = self.pop_frame()?;
        if self.slots.len() > base {
            self.slots.truncate(base);
        }
        self.slots.push(value);
        Ok(value)
    }

    /// Per-frame views of the stack, base frame first.
    pub fn frames(&self) -> impl Iterator<Item = &[i32]> + '_ {
        let size = self.slots.len();
        self.frames.iter().enumerate().map(move |(i, &base)| {
            let end = self.frames.get(i + 1).copied().unwrap_or(size).min(size);
            let start = base.min(end);
            &self.slots[start..end]
        })
    }

    fn frame_index(&self, offset: usize, limit: usize) -> Result<usize, StackError> {
        let index = self.frame_base() + offset;
        if index < limit {
            Ok(index)
        } else {
            Err(StackError::OffsetOutOfRange {
                offset: index,
                size: limit,
            })
        }
    }
}

impl fmt::Display for RunTimeStack {
    /// One bracket group per frame, e.g. `[1,2] [3]`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, frame) in self.frames().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str("[")?;
            for (j, value) in frame.iter().enumerate() {
                if j > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{value}")?;
            }
            f.write_str("]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack_of(values: &[i32]) -> RunTimeStack {
        let mut stack = RunTimeStack::new();
        for &v in values {
            stack.push(v);
        }
        stack
    }

    #[test]
    fn starts_empty_with_base_frame() {
        let stack = RunTimeStack::new();
        assert!(stack.is_empty());
        assert_eq!(stack.frame_count(), 1);
        assert_eq!(stack.frame_base(), 0);
        assert_eq!(stack.to_string(), "[]");
    }

    #[test]
    fn pop_and_peek_on_empty_underflow() {
        let mut stack = RunTimeStack::new();
        assert_eq!(stack.pop(), Err(StackError::Underflow));
        assert_eq!(stack.peek(), Err(StackError::Underflow));
    }

    #[test]
    fn new_frame_takes_top_values_as_arguments() {
        let mut stack = stack_of(&[1, 2, 3]);
        stack.new_frame_at(2).unwrap();
        assert_eq!(stack.frame_base(), 1);
        assert_eq!(stack.frame_values(), &[2, 3]);
        assert_eq!(stack.to_string(), "[1] [2,3]");
    }

    #[test]
    fn new_frame_deeper_than_stack_fails() {
        let mut stack = stack_of(&[1]);
        assert_eq!(
            stack.new_frame_at(2),
            Err(StackError::OffsetOutOfRange { offset: 2, size: 1 })
        );
        assert_eq!(stack.frame_count(), 1);
    }

    #[test]
    fn load_and_store_are_frame_relative() {
        let mut stack = stack_of(&[10, 20, 30]);
        stack.new_frame_at(2).unwrap();
        assert_eq!(stack.load(1), Ok(30));
        assert_eq!(stack.slots(), &[10, 20, 30, 30]);

        stack.push(99);
        assert_eq!(stack.store(0), Ok(99));
        assert_eq!(stack.slots(), &[10, 99, 30, 30]);
    }

    #[test]
    fn load_out_of_range_fails() {
        let mut stack = stack_of(&[1]);
        assert_eq!(
            stack.load(1),
            Err(StackError::OffsetOutOfRange { offset: 1, size: 1 })
        );
    }

    #[test]
    fn store_into_popped_slot_fails_without_change() {
        let mut stack = stack_of(&[1, 2]);
        assert_eq!(
            stack.store(1),
            Err(StackError::OffsetOutOfRange { offset: 1, size: 1 })
        );
        assert_eq!(stack.slots(), &[1, 2]);
    }

    #[test]
    fn store_on_empty_underflows() {
        let mut stack = RunTimeStack::new();
        assert_eq!(stack.store(0), Err(StackError::Underflow));
    }

    #[test]
    fn pop_n_guards_against_underflow() {
        let mut stack = stack_of(&[1, 2, 3]);
        assert_eq!(stack.pop_n(3), 0);
        assert_eq!(stack.size(), 3);
        assert_eq!(stack.pop_n(2), 2);
        assert_eq!(stack.slots(), &[1]);
    }

    #[test]
    fn reset_leaves_single_return_value() {
        let mut stack = stack_of(&[7, 1, 2]);
        stack.new_frame_at(2).unwrap();
        stack.push(5);
        stack.push(42);
        assert_eq!(stack.reset(), Ok(42));
        assert_eq!(stack.slots(), &[7, 42]);
        assert_eq!(stack.frame_count(), 1);
    }

    #[test]
    fn reset_without_frame_fails() {
        let mut stack = stack_of(&[1]);
        assert_eq!(stack.reset(), Err(StackError::NoActiveFrame));
        assert_eq!(stack.slots(), &[1]);
    }

    #[test]
    fn base_frame_cannot_be_popped() {
        let mut stack = RunTimeStack::new();
        assert_eq!(stack.pop_frame(), Err(StackError::NoActiveFrame));
    }

    #[test]
    fn display_groups_nested_frames() {
        let mut stack = stack_of(&[1, 2]);
        stack.new_frame_at(1).unwrap();
        stack.push(3);
        stack.new_frame_at(0).unwrap();
        assert_eq!(stack.to_string(), "[1] [2,3] []");
        stack.push(4);
        assert_eq!(stack.to_string(), "[1] [2,3] [4]");
    }
}
