use std::sync::atomic::{AtomicBool, Ordering};

/// The "shader sources changed" signal shared between the file watcher and the
/// render loop.
///
/// Setting and clearing are single atomic operations, so a change that lands
/// while a rebuild is running re-arms the flag instead of being lost. Extra
/// rebuilds are possible, missed ones are not.
#[derive(Debug)]
pub struct ReloadController {
    dirty: AtomicBool,
}

impl ReloadController {
    /// Starts dirty so that the first frame builds the program
    pub fn new() -> Self {
        ReloadController {
            dirty: AtomicBool::new(true),
        }
    }

    pub fn new_clean() -> Self {
        ReloadController {
            dirty: AtomicBool::new(false),
        }
    }

    /// Request a rebuild. Never blocks, callable from any thread.
    #[inline(always)]
    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    /// Clear the flag, returning whether it was set
    #[inline(always)]
    pub fn take_dirty_and_clear(&self) -> bool {
        self.dirty.swap(false, Ordering::AcqRel)
    }

    #[inline(always)]
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }
}

impl Default for ReloadController {
    fn default() -> Self {
        Self::new()
    }
}
