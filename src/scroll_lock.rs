//! Reference-counted page scroll lock.
//!
//! Any number of overlays may hold the lock at once. The first holder saves
//! the surface's scroll setting and suppresses scrolling; the last holder to
//! drop its guard restores the saved setting.

use std::{cell::RefCell, rc::Rc};

pub trait ScrollSurface {
    /// Suppresses scrolling and returns the setting that was in effect.
    fn suppress(&self) -> String;
    fn restore(&self, previous: &str);
}

struct LockState {
    holders: usize,
    saved: String,
}

pub struct ScrollLock<S: ScrollSurface> {
    surface: S,
    state: RefCell<LockState>,
}

impl<S: ScrollSurface> ScrollLock<S> {
    pub fn new(surface: S) -> Rc<Self> {
        Rc::new(Self {
            surface,
            state: RefCell::new(LockState {
                holders: 0,
                saved: String::new(),
            }),
        })
    }

    pub fn acquire(self: &Rc<Self>) -> ScrollLockGuard<S> {
        let mut state = self.state.borrow_mut();
        if state.holders == 0 {
            state.saved = self.surface.suppress();
        }
        state.holders += 1;

        ScrollLockGuard {
            lock: Rc::clone(self),
        }
    }

    /// Guard for an overlay whose visibility is `held`. Keeping the returned
    /// value for as long as that visibility lasts is what ties the lock to it.
    pub fn hold_while(self: &Rc<Self>, held: bool) -> Option<ScrollLockGuard<S>> {
        held.then(|| self.acquire())
    }

    fn release(&self) {
        let mut state = self.state.borrow_mut();
        state.holders = state.holders.saturating_sub(1);
        if state.holders == 0 {
            let saved = std::mem::take(&mut state.saved);
            self.surface.restore(&saved);
        }
    }
}

#[must_use = "dropping the guard releases the scroll lock"]
pub struct ScrollLockGuard<S: ScrollSurface> {
    lock: Rc<ScrollLock<S>>,
}

impl<S: ScrollSurface> Drop for ScrollLockGuard<S> {
    fn drop(&mut self) {
        self.lock.release();
    }
}

#[cfg(target_arch = "wasm32")]
pub use body::{lock_body_scroll_while, BodyOverflow};

#[cfg(target_arch = "wasm32")]
mod body {
    use super::{ScrollLock, ScrollLockGuard, ScrollSurface};
    use std::rc::Rc;
    use web_sys::{window, CssStyleDeclaration};

    pub struct BodyOverflow;

    fn body_style() -> Option<CssStyleDeclaration> {
        Some(window()?.document()?.body()?.style())
    }

    impl ScrollSurface for BodyOverflow {
        fn suppress(&self) -> String {
            let Some(style) = body_style() else {
                return String::new();
            };

            let previous = style.get_property_value("overflow").unwrap_or_default();
            let _ = style.set_property("overflow", "hidden");
            previous
        }

        fn restore(&self, previous: &str) {
            let Some(style) = body_style() else {
                return;
            };

            if previous.is_empty() {
                let _ = style.remove_property("overflow");
            } else {
                let _ = style.set_property("overflow", previous);
            }
        }
    }

    thread_local! {
        static BODY_LOCK: Rc<ScrollLock<BodyOverflow>> = ScrollLock::new(BodyOverflow);
    }

    pub fn lock_body_scroll_while(open: bool) -> Option<ScrollLockGuard<BodyOverflow>> {
        BODY_LOCK.with(|lock| lock.hold_while(open))
    }
}
