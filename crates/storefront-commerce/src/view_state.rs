//! Shared state for view models.
//!
//! A view owns its state through [`ViewState`]; work it starts (API calls,
//! timers) holds only a [`ViewHandle`]. Once the view is dropped, late
//! completions find nothing to update and are discarded.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

/// Owning side of a view's state.
#[derive(Debug, Default)]
pub struct ViewState<T> {
    inner: Arc<Mutex<T>>,
}

impl<T> ViewState<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(value)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, T> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// A non-owning handle for in-flight work.
    pub fn handle(&self) -> ViewHandle<T> {
        ViewHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Read the state.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.lock())
    }

    /// Mutate the state.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.lock())
    }

    /// Clone the current state.
    pub fn snapshot(&self) -> T
    where
        T: Clone,
    {
        self.lock().clone()
    }
}

/// Non-owning handle onto a [`ViewState`].
#[derive(Debug)]
pub struct ViewHandle<T> {
    inner: Weak<Mutex<T>>,
}

impl<T> Clone for ViewHandle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> ViewHandle<T> {
    /// Whether the owning view still exists.
    pub fn is_mounted(&self) -> bool {
        self.inner.strong_count() > 0
    }

    /// Read the state if the view still exists.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let inner = self.inner.upgrade()?;
        let guard = inner.lock().unwrap_or_else(|e| e.into_inner());
        Some(f(&guard))
    }

    /// Mutate the state if the view still exists.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let inner = self.inner.upgrade()?;
        let mut guard = inner.lock().unwrap_or_else(|e| e.into_inner());
        Some(f(&mut guard))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_updates_while_mounted() {
        let state = ViewState::new(0u32);
        let handle = state.handle();
        assert_eq!(handle.update(|n| {
            *n += 1;
            *n
        }), Some(1));
        assert_eq!(state.snapshot(), 1);
    }

    #[test]
    fn test_handle_is_inert_after_drop() {
        let state = ViewState::new(vec![1, 2]);
        let handle = state.handle();
        drop(state);

        assert!(!handle.is_mounted());
        assert_eq!(handle.update(|v| v.push(3)), None);
        assert_eq!(handle.read(|v| v.len()), None);
    }
}
