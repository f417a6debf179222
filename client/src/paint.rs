use std::cell::RefCell;
use std::collections::HashMap;
use std::f64::consts::TAU;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlImageElement};

use drawpilot_shared::{base64_from_data_url, decode_base64};

use crate::geometry::union_bounds;
use crate::render::{
    filter_css, regular_polygon_vertices, render_export, render_scene, star_vertices,
    LineDescriptor, RenderDescriptor, Scene, ShapeStyle, HIGHLIGHT_COLOR,
};
use crate::state::{Point, SelectionRect, State};

const EDIT_REGION_COLOR: &str = "#FF9800";

pub fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, JsValue> {
    canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("Missing 2d context"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| JsValue::from_str("Invalid 2d context"))
}

/// Paints scenes and keeps decoded `<img>` elements around by source.
pub struct Painter {
    ctx: CanvasRenderingContext2d,
    images: RefCell<HashMap<String, HtmlImageElement>>,
    on_image_load: RefCell<Option<Rc<dyn Fn()>>>,
}

impl Painter {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self {
            ctx,
            images: RefCell::new(HashMap::new()),
            on_image_load: RefCell::new(None),
        }
    }

    /// Called once an image that was still loading becomes drawable.
    pub fn set_on_image_load(&self, callback: Rc<dyn Fn()>) {
        *self.on_image_load.borrow_mut() = Some(callback);
    }

    fn image(&self, src: &str) -> Option<HtmlImageElement> {
        if let Some(image) = self.images.borrow().get(src) {
            return (image.complete() && image.natural_width() > 0).then(|| image.clone());
        }
        let image = HtmlImageElement::new().ok()?;
        if let Some(callback) = self.on_image_load.borrow().clone() {
            let onload = Closure::<dyn FnMut()>::new(move || callback());
            image.set_onload(Some(onload.as_ref().unchecked_ref()));
            onload.forget();
        }
        image.set_src(src);
        self.images
            .borrow_mut()
            .insert(src.to_string(), image.clone());
        (image.complete() && image.natural_width() > 0).then_some(image)
    }

    pub fn paint(&self, state: &State) {
        let ctx = &self.ctx;
        let width = state.canvas.stage_width;
        let height = state.canvas.stage_height;
        ctx.save();
        let _ = ctx.set_global_composite_operation("source-over");
        ctx.set_fill_style_str("#ffffff");
        ctx.fill_rect(0.0, 0.0, width, height);

        if let Some(raster) = &state.image.image {
            if let Some(image) = self.image(&raster.src) {
                ctx.save();
                ctx.set_filter(&filter_css(&state.image.filter));
                let _ = ctx.draw_image_with_html_image_element(&image, 0.0, 0.0);
                ctx.restore();
            }
        }

        let scene = render_scene(state);
        self.draw_scene(ctx, &scene);
        for image in &state.canvas.images {
            if state.selection.is_selected(&image.id) {
                ctx.set_stroke_style_str(HIGHLIGHT_COLOR);
                ctx.set_line_width(2.0);
                ctx.stroke_rect(image.x, image.y, image.width, image.height);
            }
        }
        if let Some(rect) = scene.selection_rect {
            draw_dashed_rect(ctx, rect, HIGHLIGHT_COLOR, Some("rgba(33, 150, 243, 0.1)"));
        }
        if let Some(region) = scene.edit_region {
            draw_dashed_rect(ctx, region, EDIT_REGION_COLOR, None);
        }
        if let Some(preview) = &scene.preview {
            if let Some(image) = self.image(preview) {
                let w = f64::from(image.natural_width());
                let h = f64::from(image.natural_height());
                ctx.set_global_alpha(0.9);
                let _ = ctx.draw_image_with_html_image_element(
                    &image,
                    (width - w) / 2.0,
                    (height - h) / 2.0,
                );
            }
        }
        ctx.restore();
    }

    fn draw_scene(&self, ctx: &CanvasRenderingContext2d, scene: &Scene) {
        for placed in &scene.images {
            if let Some(image) = self.image(&placed.src) {
                let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
                    &image,
                    placed.x,
                    placed.y,
                    placed.width,
                    placed.height,
                );
            }
        }
        for shape in &scene.shapes {
            draw_shape(ctx, shape);
        }
        for line in &scene.lines {
            draw_line(ctx, line);
        }
    }

    /// PNG bytes of the given objects, cropped to their combined bounds on a
    /// white background.
    pub fn export_png(
        &self,
        document: &Document,
        state: &State,
        ids: &[String],
    ) -> Result<Vec<u8>, JsValue> {
        let bounds = union_bounds(&state.canvas, ids)
            .filter(|bounds| bounds.width() > 0.0 && bounds.height() > 0.0)
            .ok_or_else(|| JsValue::from_str("Nothing to export"))?;
        let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
        canvas.set_width(bounds.width().ceil() as u32);
        canvas.set_height(bounds.height().ceil() as u32);
        let ctx = context_2d(&canvas)?;
        ctx.set_fill_style_str("#ffffff");
        ctx.fill_rect(0.0, 0.0, bounds.width(), bounds.height());
        ctx.translate(-bounds.min_x, -bounds.min_y)?;
        self.draw_scene(&ctx, &render_export(state, ids));

        let url = canvas.to_data_url()?;
        base64_from_data_url(&url)
            .and_then(decode_base64)
            .ok_or_else(|| JsValue::from_str("Canvas export was not a data URL"))
    }
}

fn apply_style(ctx: &CanvasRenderingContext2d, style: &ShapeStyle) {
    ctx.set_fill_style_str(&style.fill);
    ctx.set_stroke_style_str(&style.stroke);
    ctx.set_line_width(style.stroke_width);
    ctx.set_shadow_color(&style.shadow_color);
    ctx.set_shadow_blur(style.shadow_blur);
}

fn trace_polygon(ctx: &CanvasRenderingContext2d, vertices: &[Point]) {
    let Some((first, rest)) = vertices.split_first() else {
        return;
    };
    ctx.move_to(first.x, first.y);
    for vertex in rest {
        ctx.line_to(vertex.x, vertex.y);
    }
    ctx.close_path();
}

fn draw_shape(ctx: &CanvasRenderingContext2d, shape: &RenderDescriptor) {
    ctx.save();
    apply_style(ctx, shape.style());
    ctx.begin_path();
    match shape {
        RenderDescriptor::Rect {
            x,
            y,
            width,
            height,
            ..
        } => ctx.rect(*x, *y, *width, *height),
        RenderDescriptor::Ellipse {
            x,
            y,
            radius_x,
            radius_y,
            ..
        } => {
            let _ = ctx.ellipse(*x, *y, *radius_x, *radius_y, 0.0, 0.0, TAU);
        }
        RenderDescriptor::RegularPolygon {
            x, y, sides, radius, ..
        } => trace_polygon(ctx, &regular_polygon_vertices(*x, *y, *sides, *radius)),
        RenderDescriptor::Star {
            x,
            y,
            num_points,
            inner_radius,
            outer_radius,
            ..
        } => trace_polygon(
            ctx,
            &star_vertices(*x, *y, *num_points, *inner_radius, *outer_radius),
        ),
    }
    ctx.fill();
    if shape.style().stroke_width > 0.0 {
        ctx.stroke();
    }
    ctx.restore();
}

fn draw_line(ctx: &CanvasRenderingContext2d, line: &LineDescriptor) {
    let points: Vec<Point> = line
        .points
        .chunks_exact(2)
        .map(|pair| Point::new(pair[0], pair[1]))
        .collect();
    let Some((first, rest)) = points.split_first() else {
        return;
    };
    ctx.save();
    let _ = ctx.set_global_composite_operation(line.composite.as_str());
    ctx.set_shadow_color(HIGHLIGHT_COLOR);
    ctx.set_shadow_blur(line.shadow_blur);
    ctx.begin_path();
    if rest.is_empty() {
        ctx.set_fill_style_str(&line.stroke);
        let _ = ctx.arc(first.x, first.y, line.stroke_width / 2.0, 0.0, TAU);
        ctx.fill();
    } else {
        ctx.set_stroke_style_str(&line.stroke);
        ctx.set_line_width(line.stroke_width);
        ctx.set_line_cap("round");
        ctx.set_line_join("round");
        ctx.move_to(first.x, first.y);
        for point in rest {
            ctx.line_to(point.x, point.y);
        }
        ctx.stroke();
    }
    ctx.restore();
}

fn draw_dashed_rect(
    ctx: &CanvasRenderingContext2d,
    rect: SelectionRect,
    color: &str,
    fill: Option<&str>,
) {
    ctx.save();
    if let Some(fill) = fill {
        ctx.set_fill_style_str(fill);
        ctx.fill_rect(rect.x, rect.y, rect.width, rect.height);
    }
    let dash = js_sys::Array::of2(&JsValue::from_f64(5.0), &JsValue::from_f64(5.0));
    let _ = ctx.set_line_dash(&dash);
    ctx.set_stroke_style_str(color);
    ctx.set_line_width(1.0);
    ctx.stroke_rect(rect.x, rect.y, rect.width, rect.height);
    ctx.restore();
}
