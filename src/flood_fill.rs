use crate::raster::{PixelBuffer, PixelRect};
use crate::stroke::Color;

/// Result of a single fill request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillOutcome {
    /// Number of pixels recolored
    pub filled: usize,
    /// Bounding box of the recolored pixels
    pub region: Option<PixelRect>,
}

impl FillOutcome {
    fn unchanged() -> Self {
        Self {
            filled: 0,
            region: None,
        }
    }
}

/// Iterative 4-connected region fill.
///
/// The worklist is kept between calls so repeated large fills reuse the
/// same allocation. Recoloring a pixel doubles as marking it visited, which
/// only holds because fills where target == replacement return early.
#[derive(Debug, Default)]
pub struct FloodFill {
    worklist: Vec<(i32, i32)>,
}

impl FloodFill {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recolor the region connected to `seed` with `replacement`
    pub fn fill(&mut self, buffer: &mut PixelBuffer, seed: (i32, i32), replacement: Color) -> FillOutcome {
        let Some(target) = buffer.get_pixel(seed.0, seed.1) else {
            log::debug!("Fill seed {:?} outside the buffer", seed);
            return FillOutcome::unchanged();
        };
        if target == replacement {
            return FillOutcome::unchanged();
        }

        self.worklist.clear();
        self.worklist.push(seed);

        let mut filled = 0;
        let mut region: Option<PixelRect> = None;
        while let Some((x, y)) = self.worklist.pop() {
            if buffer.get_pixel(x, y) != Some(target) {
                continue;
            }
            buffer.set_pixel(x, y, replacement);
            filled += 1;

            let point = PixelRect {
                min_x: x,
                min_y: y,
                max_x: x,
                max_y: y,
            };
            region = Some(region.map_or(point, |r| r.union(point)));

            for neighbor in [(x + 1, y), (x - 1, y), (x, y + 1), (x, y - 1)] {
                if buffer.get_pixel(neighbor.0, neighbor.1) == Some(target) {
                    self.worklist.push(neighbor);
                }
            }
        }

        FillOutcome { filled, region }
    }

    /// Capacity currently held by the worklist
    pub fn worklist_capacity(&self) -> usize {
        self.worklist.capacity()
    }
}
