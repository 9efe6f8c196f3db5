/// Keeps the transcript view pinned to its newest message.
///
/// The view feeds in the transcript revision every frame; whenever it moved
/// since the last frame a single scroll-to-bottom is requested.
#[derive(Debug, Default)]
pub struct ScrollSync {
    last_revision: Option<u64>,
    pending_scroll_to_bottom: bool,
}

impl ScrollSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, revision: u64) {
        if self.last_revision != Some(revision) {
            self.last_revision = Some(revision);
            self.pending_scroll_to_bottom = true;
        }
    }

    /// Consume the pending request, if any.
    pub fn take_pending_scroll(&mut self) -> bool {
        std::mem::take(&mut self.pending_scroll_to_bottom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_scrolls_to_bottom() {
        let mut scroll = ScrollSync::new();
        scroll.observe(0);
        assert!(scroll.take_pending_scroll());
        assert!(!scroll.take_pending_scroll());
    }

    #[test]
    fn scrolls_once_per_mutation() {
        let mut scroll = ScrollSync::new();
        scroll.observe(3);
        scroll.take_pending_scroll();

        scroll.observe(3);
        assert!(!scroll.take_pending_scroll());

        scroll.observe(4);
        scroll.observe(4);
        assert!(scroll.take_pending_scroll());
        assert!(!scroll.take_pending_scroll());
    }
}
