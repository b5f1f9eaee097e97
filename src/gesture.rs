//! Pointer gesture handling.
//!
//! | state    | event | tool          | action                                        | next     |
//! |----------|-------|---------------|-----------------------------------------------|----------|
//! | any      | down  | any           | drop stale preview and pending text input     | Dragging |
//! |          |       | fill          | flood fill at the press point, repaint        |          |
//! |          |       | text          | open text input anchored at the press point   |          |
//! | Dragging | move  | pencil/eraser | commit segment last -> current, advance last  | Dragging |
//! |          |       | shape         | replace the preview with start -> current     |          |
//! | Dragging | up    | shape         | commit the previewed geometry, drop preview   | Idle     |
//! |          |       | others        | nothing                                       | Idle     |
//! | Idle     | move  | any           | nothing (hover)                               | Idle     |
//! | Idle     | up    | any           | nothing (no drag to finish)                   | Idle     |
//!
//! Presses outside the canvas are ignored. Positions are snapped to the
//! pixel they fall in before any tool sees them.

use std::time::{Duration, Instant};

use egui::Pos2;

use crate::document::Document;
use crate::error::Result;
use crate::flood_fill::FloodFill;
use crate::input::InputEvent;
use crate::overlay::{Overlay, PreviewHandle};
use crate::raster::{self, PixelRect};
use crate::shape::Shape;
use crate::stroke::{Brush, LineStyle};
use crate::text::{FontCache, TextAnnotation};
use crate::tool::{Tool, ToolState};

/// Everything a gesture may read or write, passed in explicitly
pub struct EditContext<'a> {
    pub tools: &'a ToolState,
    pub document: &'a mut Document,
    pub overlay: &'a mut dyn Overlay,
    pub fill: &'a mut FloodFill,
    pub fonts: &'a mut FontCache,
    pub slow_fill_warning: Duration,
}

impl EditContext<'_> {
    /// Repaint the overlay from the buffer, then the annotations not yet
    /// burned into it, in placement order
    pub fn repaint_overlay(&mut self) -> Result<()> {
        self.overlay.repaint(self.document.buffer());
        for annotation in self.document.pending_annotations() {
            let font = self.fonts.resolve(&annotation.font)?;
            self.overlay.draw_text(&font, annotation);
        }
        Ok(())
    }

    fn sync(&mut self, region: Option<PixelRect>) {
        if let Some(region) = region {
            self.overlay.sync_region(self.document.buffer(), region);
        }
    }
}

/// Transient state of one press-move-release sequence
#[derive(Debug, Clone)]
pub struct GestureSession {
    /// Fixed at press time, even if the toolbar changes mid-drag
    pub tool: Tool,
    pub brush: Brush,
    pub start: Pos2,
    pub last: Pos2,
    pub preview: Option<PreviewHandle>,
    /// Distance into the dot/dash pattern where the next segment starts
    pub pattern_phase: f32,
}

#[derive(Debug, Clone, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Dragging(GestureSession),
}

#[derive(Debug, Default)]
pub struct GestureMachine {
    state: GestureState,
    text_anchor: Option<Pos2>,
}

impl GestureMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, GestureState::Dragging(_))
    }

    /// Anchor of the open text input, if any
    pub fn text_anchor(&self) -> Option<Pos2> {
        self.text_anchor
    }

    pub fn handle(&mut self, event: InputEvent, ctx: &mut EditContext<'_>) -> Result<()> {
        match event {
            InputEvent::PointerDown { .. } if !event.location().is_in_canvas => {
                log::trace!("Ignoring press outside the canvas at {:?}", event.location().position);
                Ok(())
            }
            InputEvent::PointerDown { location } => self.press(raster::snap(location.position), ctx),
            InputEvent::PointerMove { location } => {
                if let GestureState::Dragging(session) = &mut self.state {
                    Self::drag(session, raster::snap(location.position), ctx);
                }
                Ok(())
            }
            InputEvent::PointerUp { .. } => {
                match std::mem::take(&mut self.state) {
                    GestureState::Dragging(session) => Self::release(session, ctx),
                    GestureState::Idle => log::trace!("Pointer released without an active drag"),
                }
                Ok(())
            }
        }
    }

    fn press(&mut self, pos: Pos2, ctx: &mut EditContext<'_>) -> Result<()> {
        if let GestureState::Dragging(stale) = std::mem::take(&mut self.state) {
            if let Some(handle) = stale.preview {
                log::debug!("Discarding stale {} preview", stale.tool.name());
                ctx.overlay.delete_preview(handle);
            }
        }
        if self.text_anchor.take().is_some() {
            log::debug!("Closing unconfirmed text input");
        }

        let tool = ctx.tools.active_tool();
        let brush = match tool {
            Tool::Eraser => ctx.tools.eraser_brush(),
            _ => ctx.tools.brush(),
        };
        self.state = GestureState::Dragging(GestureSession {
            tool,
            brush,
            start: pos,
            last: pos,
            preview: None,
            pattern_phase: 0.0,
        });

        match tool {
            Tool::Fill => Self::fill_at(pos, ctx)?,
            Tool::Text => self.text_anchor = Some(pos),
            Tool::Pencil(_) | Tool::Eraser | Tool::Shape(_) => {}
        }
        Ok(())
    }

    fn drag(session: &mut GestureSession, pos: Pos2, ctx: &mut EditContext<'_>) {
        match session.tool {
            Tool::Pencil(style) => {
                let style = ctx.tools.line_style(style);
                let dirty = ctx.document.buffer_mut().draw_stroke(
                    session.last,
                    pos,
                    session.brush,
                    style,
                    &mut session.pattern_phase,
                );
                ctx.sync(dirty);
                session.last = pos;
            }
            Tool::Eraser => {
                let dirty = ctx
                    .document
                    .buffer_mut()
                    .draw_line(session.last, pos, session.brush, LineStyle::Solid);
                ctx.sync(dirty);
                session.last = pos;
            }
            Tool::Shape(kind) => {
                let shape = Shape {
                    kind,
                    start: session.start,
                    end: pos,
                    brush: session.brush,
                };
                match session.preview {
                    Some(handle) if ctx.overlay.replace_preview(handle, shape) => {}
                    _ => session.preview = Some(ctx.overlay.create_preview(shape)),
                }
                session.last = pos;
            }
            Tool::Fill | Tool::Text => {}
        }
    }

    fn release(session: GestureSession, ctx: &mut EditContext<'_>) {
        let Tool::Shape(_) = session.tool else {
            return;
        };
        let Some(handle) = session.preview else {
            log::trace!("Shape released without a preview; nothing to commit");
            return;
        };
        // Commit what the preview showed, not a recomputation from the release point
        if let Some(shape) = ctx.overlay.delete_preview(handle) {
            let dirty = shape.draw(ctx.document.buffer_mut());
            ctx.sync(dirty);
        }
    }

    fn fill_at(pos: Pos2, ctx: &mut EditContext<'_>) -> Result<()> {
        let seed = raster::to_pixel(pos);
        let started = Instant::now();
        let outcome = ctx.fill.fill(ctx.document.buffer_mut(), seed, ctx.tools.color());
        let elapsed = started.elapsed();

        if elapsed > ctx.slow_fill_warning {
            log::warn!("Fill at {:?} took {:?} for {} pixels", seed, elapsed, outcome.filled);
        } else {
            log::debug!("Fill at {:?} recolored {} pixels in {:?}", seed, outcome.filled, elapsed);
        }

        if outcome.filled > 0 {
            ctx.repaint_overlay()?;
        }
        Ok(())
    }

    /// Place the pending text input's content as an annotation.
    /// Returns whether an annotation was added.
    pub fn confirm_text(&mut self, text: &str, ctx: &mut EditContext<'_>) -> Result<bool> {
        let Some(anchor) = self.text_anchor.take() else {
            log::debug!("Text confirmed with no open text input");
            return Ok(false);
        };
        if text.trim().is_empty() {
            return Ok(false);
        }

        let annotation = TextAnnotation::new(anchor, text, ctx.tools.color(), ctx.tools.font().clone());
        let font = ctx.fonts.resolve(&annotation.font)?;
        ctx.overlay.draw_text(&font, &annotation);
        ctx.document.add_annotation(annotation);
        Ok(true)
    }

    pub fn cancel_text(&mut self) {
        self.text_anchor = None;
    }
}
