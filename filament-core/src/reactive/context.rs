//! Execution Stack
//!
//! Tracks which effect is currently running. Signal reads attribute their
//! subscription to the top of this stack; an empty stack means nothing is
//! tracking and reads are inert.
//!
//! # Implementation
//!
//! Each scope owns its own stack. Running an effect pushes a frame and the
//! returned [`EffectFrame`] guard pops it when dropped, so nested effects
//! (an effect whose body creates or triggers another effect) attribute reads
//! to the innermost effect and hand attribution back to the outer one when
//! they finish. Because the pop lives in `Drop`, the stack is also restored
//! when an effect body panics.

use std::cell::RefCell;

use super::EffectId;

/// The stack of effects currently executing in one scope, innermost last.
#[derive(Debug, Default)]
pub(crate) struct ExecutionStack {
    frames: Vec<EffectId>,
}

impl ExecutionStack {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// The innermost running effect, if any.
    pub(crate) fn current(&self) -> Option<EffectId> {
        self.frames.last().copied()
    }

    /// Number of effects currently executing.
    pub(crate) fn depth(&self) -> usize {
        self.frames.len()
    }
}

/// Guard that pops the frame it pushed when dropped.
pub(crate) struct EffectFrame<'a> {
    stack: &'a RefCell<ExecutionStack>,
    effect: EffectId,
    parent: Option<EffectId>,
}

impl<'a> EffectFrame<'a> {
    /// Push `effect` onto the stack.
    ///
    /// The stack's `RefCell` is only borrowed for the push itself, so the
    /// effect body is free to read the stack while the frame is alive.
    pub(crate) fn enter(stack: &'a RefCell<ExecutionStack>, effect: EffectId) -> Self {
        let mut guard = stack.borrow_mut();
        let parent = guard.current();
        guard.frames.push(effect);
        drop(guard);

        Self {
            stack,
            effect,
            parent,
        }
    }

    /// The effect that was running when this frame was entered.
    pub(crate) fn parent(&self) -> Option<EffectId> {
        self.parent
    }
}

impl Drop for EffectFrame<'_> {
    fn drop(&mut self) {
        let popped = self.stack.borrow_mut().frames.pop();

        // Frames are strictly LIFO; anything else is a bug in the runtime.
        debug_assert_eq!(
            popped,
            Some(self.effect),
            "execution stack mismatch: expected {:?}, got {:?}",
            self.effect,
            popped
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_tracks_current_effect() {
        let stack = RefCell::new(ExecutionStack::new());
        let id = EffectId::from(0);

        assert!(stack.borrow().current().is_none());

        {
            let frame = EffectFrame::enter(&stack, id);
            assert_eq!(stack.borrow().current(), Some(id));
            assert_eq!(frame.parent(), None);
        }

        // Frame should be popped after drop
        assert!(stack.borrow().current().is_none());
        assert_eq!(stack.borrow().depth(), 0);
    }

    #[test]
    fn nested_frames() {
        let stack = RefCell::new(ExecutionStack::new());
        let outer = EffectId::from(1);
        let inner = EffectId::from(2);

        {
            let _outer = EffectFrame::enter(&stack, outer);
            assert_eq!(stack.borrow().current(), Some(outer));

            {
                let frame = EffectFrame::enter(&stack, inner);
                assert_eq!(frame.parent(), Some(outer));
                assert_eq!(stack.borrow().current(), Some(inner));
                assert_eq!(stack.borrow().depth(), 2);
            }

            // After the inner frame drops, the outer effect is current again
            assert_eq!(stack.borrow().current(), Some(outer));
        }

        assert!(stack.borrow().current().is_none());
    }

    #[test]
    fn frame_is_popped_on_panic() {
        let stack = RefCell::new(ExecutionStack::new());

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _frame = EffectFrame::enter(&stack, EffectId::from(0));
            panic!("effect body failed");
        }));

        assert!(result.is_err());
        assert_eq!(stack.borrow().depth(), 0);
    }
}
