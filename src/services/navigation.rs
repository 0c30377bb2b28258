use std::ops::Range;

/// Minimum horizontal travel for a swipe to count as navigation
pub const SWIPE_THRESHOLD: f64 = 50.0;

/// Minimum wheel delta for a wheel event to count as navigation
pub const WHEEL_THRESHOLD: f64 = 50.0;

/// How far the section top may sit from the viewport top and still be "in view"
pub const IN_VIEW_TOLERANCE: f64 = 100.0;

/// Cards shown side by side for a viewport width in pixels
pub fn items_per_view_for_width(width: u32) -> usize {
    if width < 768 {
        1
    } else if width < 1024 {
        2
    } else {
        3
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliderMode {
    /// One project at a time
    Fullscreen,
    /// Several projects side by side
    Carousel { items_per_view: usize },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NavInput {
    ArrowLeft,
    ArrowRight,
    ArrowDown,
    Swipe { start_x: f64, end_x: f64 },
    Wheel { delta_x: f64, delta_y: f64 },
}

/// Conditions under which inputs reach a slider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputGate {
    /// Distance of the slider's top edge from the viewport top
    pub section_top: f64,
    pub modal_open: bool,
}

impl InputGate {
    /// Slider aligned with the viewport and nothing on top of it
    pub fn focused() -> Self {
        Self {
            section_top: 0.0,
            modal_open: false,
        }
    }

    pub fn in_view(&self) -> bool {
        (-IN_VIEW_TOLERANCE..=IN_VIEW_TOLERANCE).contains(&self.section_top)
    }

    fn allows_input(&self) -> bool {
        self.in_view() && !self.modal_open
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    /// The index changed to the carried value
    Moved(usize),
    /// The input mapped to a move but the slider was already at that bound
    AtBound,
    /// Filtered out by the gate, or not a navigation gesture
    Ignored,
    /// Ask the page to scroll to the following category section
    NextSection,
}

/// Index state of a fullscreen slider or multi-card carousel
#[derive(Debug, Clone, PartialEq)]
pub struct Slider {
    len: usize,
    current_index: usize,
    mode: SliderMode,
    is_last_section: bool,
}

impl Slider {
    /// `None` for an empty list: nothing is rendered at all
    pub fn fullscreen(len: usize, is_last_section: bool) -> Option<Self> {
        (len > 0).then_some(Self {
            len,
            current_index: 0,
            mode: SliderMode::Fullscreen,
            is_last_section,
        })
    }

    pub fn carousel(len: usize, viewport_width: u32) -> Option<Self> {
        (len > 0).then_some(Self {
            len,
            current_index: 0,
            mode: SliderMode::Carousel {
                items_per_view: items_per_view_for_width(viewport_width),
            },
            is_last_section: true,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn mode(&self) -> SliderMode {
        self.mode
    }

    pub fn items_per_view(&self) -> usize {
        match self.mode {
            SliderMode::Fullscreen => 1,
            SliderMode::Carousel { items_per_view } => items_per_view,
        }
    }

    pub fn max_index(&self) -> usize {
        self.len.saturating_sub(self.items_per_view())
    }

    pub fn can_prev(&self) -> bool {
        self.current_index > 0
    }

    pub fn can_next(&self) -> bool {
        self.current_index < self.max_index()
    }

    /// Arrows and indicator dots only appear when there is somewhere to go
    pub fn shows_controls(&self) -> bool {
        self.len > self.items_per_view()
    }

    /// Indices of the projects currently on screen
    pub fn visible_range(&self) -> Range<usize> {
        let end = (self.current_index + self.items_per_view()).min(self.len);
        self.current_index..end
    }

    pub fn prev(&mut self) -> NavOutcome {
        if !self.can_prev() {
            return NavOutcome::AtBound;
        }
        self.current_index -= 1;
        NavOutcome::Moved(self.current_index)
    }

    pub fn next(&mut self) -> NavOutcome {
        if !self.can_next() {
            return NavOutcome::AtBound;
        }
        self.current_index += 1;
        NavOutcome::Moved(self.current_index)
    }

    /// Indicator dot click
    pub fn jump_to(&mut self, index: usize) -> NavOutcome {
        self.current_index = index.min(self.max_index());
        NavOutcome::Moved(self.current_index)
    }

    /// Recompute items per view for a new viewport width. The current index is
    /// pulled back inside the new maximum.
    pub fn resize(&mut self, viewport_width: u32) {
        if let SliderMode::Carousel { .. } = self.mode {
            self.mode = SliderMode::Carousel {
                items_per_view: items_per_view_for_width(viewport_width),
            };
            self.current_index = self.current_index.min(self.max_index());
        }
    }

    fn on_last_card(&self) -> bool {
        self.current_index == self.max_index()
    }

    pub fn handle(&mut self, input: NavInput, gate: InputGate) -> NavOutcome {
        if !gate.allows_input() {
            return NavOutcome::Ignored;
        }

        match input {
            NavInput::ArrowLeft => self.prev(),
            NavInput::ArrowRight => self.next(),
            NavInput::ArrowDown if !self.is_last_section => NavOutcome::NextSection,
            NavInput::ArrowDown => NavOutcome::Ignored,
            NavInput::Swipe { start_x, end_x } => {
                let travel = start_x - end_x;
                if travel.abs() <= SWIPE_THRESHOLD {
                    NavOutcome::Ignored
                } else if travel > 0.0 {
                    self.next()
                } else {
                    self.prev()
                }
            }
            NavInput::Wheel { delta_x, delta_y } => {
                if delta_y.abs() > delta_x.abs() {
                    if delta_y > WHEEL_THRESHOLD && !self.is_last_section && self.on_last_card() {
                        NavOutcome::NextSection
                    } else {
                        NavOutcome::Ignored
                    }
                } else if delta_x > WHEEL_THRESHOLD {
                    self.next()
                } else if delta_x < -WHEEL_THRESHOLD {
                    self.prev()
                } else {
                    NavOutcome::Ignored
                }
            }
        }
    }
}
