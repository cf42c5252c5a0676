//! Rendering: draws the grid mirror to a 2D context.
//!
//! This module is the only place that touches [`web_sys::CanvasRenderingContext2d`].
//! It reads the mirror and camera and produces pixels; it never mutates
//! application state.
//!
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`.
//! The top-level caller ([`crate::engine::Engine::render`]) handles the result.

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::camera::{Camera, Viewport};
use crate::consts::{BACKGROUND_FILL, GRID_LINE_WIDTH_PX, GRID_STROKE};
use crate::geometry::GridLayout;
use crate::grid::GridMirror;

/// Draw the full scene: background, painted cells, then grid lines.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails (e.g. invalid context state).
pub fn draw(
    ctx: &CanvasRenderingContext2d,
    grid: &GridMirror,
    camera: &Camera,
    viewport: &Viewport,
    cell_size: f64,
) -> Result<(), JsValue> {
    let width = viewport.css_width();
    let height = viewport.css_height();
    let center = viewport.center();

    // Layer 1: clear in screen space.
    ctx.set_transform(viewport.dpr, 0.0, 0.0, viewport.dpr, 0.0, 0.0)?;
    ctx.clear_rect(0.0, 0.0, width, height);
    ctx.set_fill_style_str(BACKGROUND_FILL);
    ctx.fill_rect(0.0, 0.0, width, height);

    // Layer 2: world space, matching `Camera::world_to_screen`.
    ctx.translate(center.x + camera.offset.x, center.y + camera.offset.y)?;
    ctx.scale(camera.scale, camera.scale)?;

    let layout = GridLayout::of(grid, cell_size);
    draw_cells(ctx, grid, &layout);
    draw_lines(ctx, &layout, camera)
}

fn draw_cells(ctx: &CanvasRenderingContext2d, grid: &GridMirror, layout: &GridLayout) {
    for cell in grid.cells() {
        let Some(color) = &cell.color else {
            continue;
        };
        let rect = layout.cell_rect(cell.id());
        ctx.set_fill_style_str(color);
        ctx.fill_rect(rect.x, rect.y, rect.width, rect.height);
    }
}

fn draw_lines(ctx: &CanvasRenderingContext2d, layout: &GridLayout, camera: &Camera) -> Result<(), JsValue> {
    let bounds = layout.bounds();
    ctx.set_line_dash(&js_sys::Array::new())?;
    ctx.set_stroke_style_str(GRID_STROKE);
    // Constant on screen regardless of zoom.
    ctx.set_line_width(camera.screen_dist_to_world(GRID_LINE_WIDTH_PX));
    ctx.begin_path();
    for i in 0..=layout.columns {
        let x = bounds.x + f64::from(i) * layout.cell_size;
        ctx.move_to(x, bounds.y);
        ctx.line_to(x, bounds.y + bounds.height);
    }
    for i in 0..=layout.rows {
        let y = bounds.y + f64::from(i) * layout.cell_size;
        ctx.move_to(bounds.x, y);
        ctx.line_to(bounds.x + bounds.width, y);
    }
    ctx.stroke();
    Ok(())
}
