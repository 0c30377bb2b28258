use std::time::Instant;

use crate::{
    models::project::{Project, ProjectType},
    services::{
        listing::CategoryGroup,
        modal::{DetailModal, ModalEvent},
        navigation::{InputGate, NavInput, NavOutcome, Slider},
    },
};

/// A line typed at the browse prompt
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BrowseCommand {
    Nav(NavInput),
    /// 1-based indicator dot
    Jump(usize),
    /// Open the current card, or the given 1-based card
    Open(Option<usize>),
    Modal(ModalEvent),
    Resize(u32),
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Option<BrowseCommand> {
    let mut words = line.split_whitespace();
    let head = words.next()?.to_lowercase();
    let args: Vec<&str> = words.collect();

    let command = match (head.as_str(), args.as_slice()) {
        ("h" | "left", []) => BrowseCommand::Nav(NavInput::ArrowLeft),
        ("l" | "right", []) => BrowseCommand::Nav(NavInput::ArrowRight),
        ("j" | "down", []) => BrowseCommand::Nav(NavInput::ArrowDown),
        ("swipe", [start, end]) => BrowseCommand::Nav(NavInput::Swipe {
            start_x: start.parse().ok()?,
            end_x: end.parse().ok()?,
        }),
        ("wheel", [dx, dy]) => BrowseCommand::Nav(NavInput::Wheel {
            delta_x: dx.parse().ok()?,
            delta_y: dy.parse().ok()?,
        }),
        ("o" | "open", []) => BrowseCommand::Open(None),
        ("o" | "open", [n]) => BrowseCommand::Open(Some(n.parse().ok()?)),
        ("esc" | "escape", []) => BrowseCommand::Modal(ModalEvent::Escape),
        ("backdrop", []) => BrowseCommand::Modal(ModalEvent::BackdropClick),
        ("click", []) => BrowseCommand::Modal(ModalEvent::ContentClick),
        ("resize", [width]) => BrowseCommand::Resize(width.parse().ok()?),
        ("?" | "help", []) => BrowseCommand::Help,
        ("q" | "quit", []) => BrowseCommand::Quit,
        (n, []) => BrowseCommand::Jump(n.parse().ok()?),
        _ => return None,
    };
    Some(command)
}

#[derive(Debug, Clone, PartialEq)]
pub enum BrowseEvent {
    Navigated(NavOutcome),
    /// Moved on to the section at this index
    SectionChanged(usize),
    Opened,
    Closed,
    Unchanged,
    Quit,
}

/// Category sections stacked one after another, each with its own slider,
/// plus the detail modal on top
pub struct Browser {
    sections: Vec<CategoryGroup>,
    section: usize,
    slider: Slider,
    modal: DetailModal<Project>,
    fullscreen: bool,
    viewport_width: u32,
}

impl Browser {
    /// `None` when `start` has no projects
    pub fn new(
        sections: Vec<CategoryGroup>,
        start: ProjectType,
        fullscreen: bool,
        viewport_width: u32,
    ) -> Option<Self> {
        let section = sections.iter().position(|g| g.project_type == start)?;
        let slider = slider_for(&sections, section, fullscreen, viewport_width)?;
        Some(Self {
            sections,
            section,
            slider,
            modal: DetailModal::new(),
            fullscreen,
            viewport_width,
        })
    }

    pub fn section(&self) -> &CategoryGroup {
        &self.sections[self.section]
    }

    pub fn slider(&self) -> &Slider {
        &self.slider
    }

    pub fn modal(&self) -> &DetailModal<Project> {
        &self.modal
    }

    fn gate(&self) -> InputGate {
        InputGate {
            modal_open: self.modal.is_open(),
            ..InputGate::focused()
        }
    }

    pub fn apply(&mut self, command: BrowseCommand, now: Instant) -> BrowseEvent {
        self.modal.tick(now);

        match command {
            BrowseCommand::Nav(input) => match self.slider.handle(input, self.gate()) {
                NavOutcome::NextSection => self.advance_section(),
                outcome => BrowseEvent::Navigated(outcome),
            },
            BrowseCommand::Jump(_) if self.modal.is_open() => BrowseEvent::Unchanged,
            BrowseCommand::Jump(dot) => {
                BrowseEvent::Navigated(self.slider.jump_to(dot.saturating_sub(1)))
            }
            BrowseCommand::Open(card) => {
                let index = card
                    .map(|n| n.saturating_sub(1))
                    .unwrap_or(self.slider.current_index());
                match self.section().projects.get(index).cloned() {
                    Some(project) => {
                        self.modal.open(project);
                        BrowseEvent::Opened
                    }
                    None => BrowseEvent::Unchanged,
                }
            }
            BrowseCommand::Modal(event) => {
                if self.modal.handle(event, now) {
                    BrowseEvent::Closed
                } else {
                    BrowseEvent::Unchanged
                }
            }
            BrowseCommand::Resize(width) => {
                self.viewport_width = width;
                self.slider.resize(width);
                BrowseEvent::Unchanged
            }
            BrowseCommand::Help => BrowseEvent::Unchanged,
            BrowseCommand::Quit => BrowseEvent::Quit,
        }
    }

    fn advance_section(&mut self) -> BrowseEvent {
        let next = self.section + 1;
        match slider_for(&self.sections, next, self.fullscreen, self.viewport_width) {
            Some(slider) => {
                self.section = next;
                self.slider = slider;
                BrowseEvent::SectionChanged(next)
            }
            None => BrowseEvent::Navigated(NavOutcome::Ignored),
        }
    }
}

fn slider_for(
    sections: &[CategoryGroup],
    index: usize,
    fullscreen: bool,
    viewport_width: u32,
) -> Option<Slider> {
    let len = sections.get(index)?.projects.len();
    if fullscreen {
        Slider::fullscreen(len, index + 1 == sections.len())
    } else {
        Slider::carousel(len, viewport_width)
    }
}
