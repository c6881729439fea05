//! In-memory slot board.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::ports::{PresentationSurface, SlotContent, StatusIndicator};

/// Latest value of every slot; `None` until first written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Slots {
    pub tag_info: Option<SlotContent>,
    pub link_status: Option<StatusIndicator>,
    pub memory: Option<String>,
    pub weight: Option<String>,
    pub tag_present: Option<bool>,
}

/// Shared slot store. Clones see the same slots.
#[derive(Debug, Clone, Default)]
pub struct SlotBoard {
    slots: Arc<Mutex<Slots>>,
}

impl SlotBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Slots {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PresentationSurface for SlotBoard {
    fn show_tag_info(&mut self, content: SlotContent) {
        self.lock().tag_info = Some(content);
    }

    fn show_link_status(&mut self, indicator: StatusIndicator) {
        self.lock().link_status = Some(indicator);
    }

    fn show_memory(&mut self, text: String) {
        self.lock().memory = Some(text);
    }

    fn show_weight(&mut self, text: String) {
        self.lock().weight = Some(text);
    }

    fn show_tag_presence(&mut self, present: bool) {
        self.lock().tag_present = Some(present);
    }
}
