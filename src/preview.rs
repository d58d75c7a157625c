//! Preview resources for host file controllers.
//!
//! The built-in file controller lists picked files by name, type and size.
//! A host controller that draws thumbnails keeps one [`PreviewSlot`] per file
//! field and calls [`PreviewSlot::replace`] when the selection changes, so the
//! thumbnail it supersedes is released.

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

pub type ReleaseFn<R> = Arc<dyn Fn(R) + Send + Sync>;

/// Holds at most one preview resource (an object URL, a decoded thumbnail, ...)
/// and releases it when it is replaced, cleared or dropped.
pub struct PreviewSlot<R> {
    current: Option<R>,
    release: ReleaseFn<R>,
}

impl<R> PreviewSlot<R> {
    pub fn new(release: impl Fn(R) + Send + Sync + 'static) -> Self {
        Self {
            current: None,
            release: Arc::new(release),
        }
    }

    pub fn get(&self) -> Option<&R> {
        self.current.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }

    /// Installs `resource`, releasing the one it supersedes.
    pub fn replace(&mut self, resource: R) -> &R {
        self.clear();
        self.current.insert(resource)
    }

    /// Acquires a new resource; on failure the slot ends up empty.
    pub fn acquire_with<E>(&mut self, acquire: impl FnOnce() -> Result<R, E>) -> Result<&R, E> {
        self.clear();
        let resource = acquire()?;
        Ok(self.current.insert(resource))
    }

    pub fn clear(&mut self) {
        if let Some(previous) = self.current.take() {
            (self.release)(previous);
        }
    }
}

impl<R> Drop for PreviewSlot<R> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<R: Debug> Debug for PreviewSlot<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewSlot")
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::PreviewSlot;

    fn recording_slot() -> (PreviewSlot<String>, Arc<Mutex<Vec<String>>>) {
        let released = Arc::new(Mutex::new(Vec::new()));
        let sink = released.clone();
        let slot = PreviewSlot::new(move |url: String| {
            sink.lock().expect("release log").push(url);
        });
        (slot, released)
    }

    #[test]
    fn superseded_resource_is_released_once() {
        let (mut slot, released) = recording_slot();
        slot.replace("blob:1".to_string());
        slot.replace("blob:2".to_string());

        assert_eq!(slot.get().map(String::as_str), Some("blob:2"));
        assert_eq!(*released.lock().expect("release log"), vec!["blob:1"]);
    }

    #[test]
    fn dropping_the_slot_releases_current_resource() {
        let (mut slot, released) = recording_slot();
        slot.replace("blob:1".to_string());
        drop(slot);
        assert_eq!(*released.lock().expect("release log"), vec!["blob:1"]);
    }

    #[test]
    fn failed_acquisition_leaves_slot_empty() {
        let (mut slot, released) = recording_slot();
        slot.replace("blob:1".to_string());
        let result = slot.acquire_with(|| Err::<String, _>("decode failed"));

        assert!(result.is_err());
        assert!(slot.is_empty());
        assert_eq!(*released.lock().expect("release log"), vec!["blob:1"]);
    }
}
