use raster_paint::stroke::{BLACK, WHITE};
use raster_paint::{Color, FloodFill, PixelBuffer};

const RED: Color = image::Rgb([255, 0, 0]);

fn count(buffer: &PixelBuffer, color: Color) -> usize {
    buffer.image().pixels().filter(|p| **p == color).count()
}

// 10x10 white buffer with a 1px black square outline from (1,1) to (8,8)
fn outlined_square() -> PixelBuffer {
    let mut buffer = PixelBuffer::new(10, 10, WHITE);
    for i in 1..=8 {
        buffer.set_pixel(i, 1, BLACK);
        buffer.set_pixel(i, 8, BLACK);
        buffer.set_pixel(1, i, BLACK);
        buffer.set_pixel(8, i, BLACK);
    }
    buffer
}

#[test]
fn test_fill_stays_inside_outline() {
    let mut buffer = outlined_square();
    let mut fill = FloodFill::new();

    let outcome = fill.fill(&mut buffer, (4, 4), RED);

    assert_eq!(outcome.filled, 36);
    assert_eq!(count(&buffer, RED), 36);
    assert_eq!(count(&buffer, BLACK), 28);
    assert_eq!(count(&buffer, WHITE), 36);
    for y in 2..=7 {
        for x in 2..=7 {
            assert_eq!(buffer.get_pixel(x, y), Some(RED));
        }
    }
    assert_eq!(buffer.get_pixel(0, 0), Some(WHITE));
    assert_eq!(buffer.get_pixel(9, 9), Some(WHITE));
}

#[test]
fn test_refill_with_same_color_is_noop() {
    let mut buffer = outlined_square();
    let mut fill = FloodFill::new();
    fill.fill(&mut buffer, (4, 4), RED);
    let after_first = buffer.clone();

    let outcome = fill.fill(&mut buffer, (4, 4), RED);

    assert_eq!(outcome.filled, 0);
    assert!(outcome.region.is_none());
    assert_eq!(buffer, after_first);
}

#[test]
fn test_seed_outside_buffer_is_noop() {
    let mut buffer = outlined_square();
    let before = buffer.clone();
    let mut fill = FloodFill::new();

    assert_eq!(fill.fill(&mut buffer, (-1, 4), RED).filled, 0);
    assert_eq!(fill.fill(&mut buffer, (4, 10), RED).filled, 0);
    assert_eq!(buffer, before);
}

#[test]
fn test_fill_is_four_connected() {
    // A black diagonal splits the buffer for 4-connectivity
    let mut buffer = PixelBuffer::new(5, 5, WHITE);
    for i in 0..5 {
        buffer.set_pixel(i, i, BLACK);
    }
    let mut fill = FloodFill::new();

    let outcome = fill.fill(&mut buffer, (4, 0), RED);

    assert_eq!(outcome.filled, 10);
    assert_eq!(buffer.get_pixel(0, 4), Some(WHITE));
    assert_eq!(buffer.get_pixel(1, 0), Some(RED));
}

#[test]
fn test_fill_entire_uniform_canvas() {
    let (width, height) = (1024, 768);
    let mut buffer = PixelBuffer::new(width, height, WHITE);
    let mut fill = FloodFill::new();

    let outcome = fill.fill(&mut buffer, (512, 384), RED);

    assert_eq!(outcome.filled, (width * height) as usize);
    let region = outcome.region.unwrap();
    assert_eq!((region.min_x, region.min_y), (0, 0));
    assert_eq!((region.max_x, region.max_y), (width as i32 - 1, height as i32 - 1));
    assert!(fill.worklist_capacity() > 0);
}

#[test]
fn test_worklist_is_reused_between_fills() {
    let mut buffer = PixelBuffer::new(64, 64, WHITE);
    let mut fill = FloodFill::new();
    fill.fill(&mut buffer, (0, 0), RED);
    let capacity = fill.worklist_capacity();

    fill.fill(&mut buffer, (0, 0), BLACK);

    assert!(fill.worklist_capacity() >= capacity);
    assert_eq!(count(&buffer, BLACK), 64 * 64);
}
