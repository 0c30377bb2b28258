use std::time::{Duration, Instant};

/// How long the selection outlives the open flag, so the close transition
/// still has content to animate against
pub const CLOSE_TRANSITION: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalEvent {
    Escape,
    BackdropClick,
    /// Clicks inside the content never reach the backdrop handler
    ContentClick,
}

/// Overlay showing the details of one selected item
#[derive(Debug, Clone)]
pub struct DetailModal<T> {
    selected: Option<T>,
    is_open: bool,
    clear_at: Option<Instant>,
}

impl<T> Default for DetailModal<T> {
    fn default() -> Self {
        Self {
            selected: None,
            is_open: false,
            clear_at: None,
        }
    }
}

impl<T> DetailModal<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, item: T) {
        self.selected = Some(item);
        self.is_open = true;
        self.clear_at = None;
    }

    /// Hide immediately; the selection is dropped by a later `tick`
    pub fn close(&mut self, now: Instant) {
        if !self.is_open {
            return;
        }
        self.is_open = false;
        self.clear_at = Some(now + CLOSE_TRANSITION);
    }

    /// Run the deferred clear once its deadline has passed
    pub fn tick(&mut self, now: Instant) {
        if let Some(deadline) = self.clear_at
            && now >= deadline
        {
            self.selected = None;
            self.clear_at = None;
        }
    }

    /// Returns true when the event closed the modal
    pub fn handle(&mut self, event: ModalEvent, now: Instant) -> bool {
        match event {
            ModalEvent::Escape | ModalEvent::BackdropClick if self.is_open => {
                self.close(now);
                true
            }
            _ => false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn selected(&self) -> Option<&T> {
        self.selected.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_sets_selection() {
        let mut modal = DetailModal::new();
        modal.open("weather-app");

        assert!(modal.is_open());
        assert_eq!(modal.selected(), Some(&"weather-app"));
    }

    #[test]
    fn test_close_defers_clearing_selection() {
        let mut modal = DetailModal::new();
        let start = Instant::now();
        modal.open(1);

        modal.close(start);
        assert!(!modal.is_open());
        assert_eq!(modal.selected(), Some(&1));

        modal.tick(start + Duration::from_millis(100));
        assert_eq!(modal.selected(), Some(&1));

        modal.tick(start + CLOSE_TRANSITION);
        assert_eq!(modal.selected(), None);
    }

    #[test]
    fn test_reopen_cancels_pending_clear() {
        let mut modal = DetailModal::new();
        let start = Instant::now();
        modal.open(1);
        modal.close(start);

        modal.open(2);
        modal.tick(start + Duration::from_secs(1));

        assert!(modal.is_open());
        assert_eq!(modal.selected(), Some(&2));
    }

    #[test]
    fn test_escape_and_backdrop_close_but_content_does_not() {
        let now = Instant::now();
        let mut modal = DetailModal::new();
        modal.open("x");

        assert!(!modal.handle(ModalEvent::ContentClick, now));
        assert!(modal.is_open());

        assert!(modal.handle(ModalEvent::Escape, now));
        assert!(!modal.is_open());

        modal.open("x");
        assert!(modal.handle(ModalEvent::BackdropClick, now));
        assert!(!modal.handle(ModalEvent::Escape, now));
    }
}
