use egui::{Context, Pos2, Rect};

/// Represents the location where an input event occurred
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputLocation {
    /// The position in canvas (buffer pixel) coordinates
    pub position: Pos2,
    /// Whether this position is within the canvas bounds
    pub is_in_canvas: bool,
}

impl InputLocation {
    pub fn in_canvas(position: Pos2) -> Self {
        Self {
            position,
            is_in_canvas: true,
        }
    }
}

/// Primary-button pointer events, in the order the UI thread delivers them
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Button was pressed
    PointerDown { location: InputLocation },
    /// Pointer moved while the button is held
    PointerMove { location: InputLocation },
    /// Button was released
    PointerUp { location: InputLocation },
}

impl InputEvent {
    pub fn down(position: Pos2) -> Self {
        Self::PointerDown {
            location: InputLocation::in_canvas(position),
        }
    }

    pub fn moved(position: Pos2) -> Self {
        Self::PointerMove {
            location: InputLocation::in_canvas(position),
        }
    }

    pub fn up(position: Pos2) -> Self {
        Self::PointerUp {
            location: InputLocation::in_canvas(position),
        }
    }

    pub fn location(&self) -> InputLocation {
        match self {
            InputEvent::PointerDown { location }
            | InputEvent::PointerMove { location }
            | InputEvent::PointerUp { location } => *location,
        }
    }
}

/// Handles converting raw egui input into canvas-local InputEvents
pub struct InputHandler {
    last_pointer_pos: Option<Pos2>,
    canvas_rect: Rect,
}

impl InputHandler {
    pub fn new(canvas_rect: Rect) -> Self {
        Self {
            last_pointer_pos: None,
            canvas_rect,
        }
    }

    /// Update the canvas rectangle (e.g. if the canvas is scrolled or the window resized)
    pub fn set_canvas_rect(&mut self, rect: Rect) {
        self.canvas_rect = rect;
    }

    /// Creates an InputLocation from a screen position
    fn make_location(&self, pos: Pos2) -> InputLocation {
        InputLocation {
            position: (pos - self.canvas_rect.min).to_pos2(),
            is_in_canvas: self.canvas_rect.contains(pos),
        }
    }

    /// Process raw egui input and generate our InputEvents.
    /// `blocked` is set while a popup or menu covers the canvas.
    pub fn process_input(&mut self, ctx: &Context, blocked: bool) -> Vec<InputEvent> {
        let mut events = Vec::new();

        ctx.input(|input| {
            let pointer = &input.pointer;
            let hover = pointer.hover_pos();

            if pointer.primary_pressed() && !blocked {
                if let Some(pos) = hover.filter(|pos| self.canvas_rect.contains(*pos)) {
                    events.push(InputEvent::PointerDown {
                        location: self.make_location(pos),
                    });
                }
            }

            if let Some(pos) = hover {
                if pointer.primary_down() && Some(pos) != self.last_pointer_pos {
                    events.push(InputEvent::PointerMove {
                        location: self.make_location(pos),
                    });
                }
                self.last_pointer_pos = Some(pos);
            }

            if pointer.primary_released() {
                if let Some(pos) = hover.or(self.last_pointer_pos) {
                    events.push(InputEvent::PointerUp {
                        location: self.make_location(pos),
                    });
                }
            }
        });

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    #[test]
    fn test_locations_are_canvas_relative() {
        let handler = InputHandler::new(Rect::from_min_size(pos2(100.0, 50.0), egui::vec2(200.0, 100.0)));
        let inside = handler.make_location(pos2(110.0, 60.0));
        assert_eq!(inside.position, pos2(10.0, 10.0));
        assert!(inside.is_in_canvas);

        let outside = handler.make_location(pos2(90.0, 60.0));
        assert_eq!(outside.position, pos2(-10.0, 10.0));
        assert!(!outside.is_in_canvas);
    }

    #[test]
    fn test_event_helpers() {
        let event = InputEvent::moved(pos2(3.0, 4.0));
        assert_eq!(event.location().position, pos2(3.0, 4.0));
        assert!(event.location().is_in_canvas);
    }
}
