use autospector_core::geom::PercentRect;
use autospector_core::overlay::{Annotation, Overlay, Rgb};
use image::DynamicImage;

/// Texture for the dashboard image, rebuilt only when the data URI changes.
#[derive(Default)]
pub struct ImageTexture {
    source: Option<String>,
    texture: Option<egui::TextureHandle>,
}

impl ImageTexture {
    pub fn get(&mut self, ctx: &egui::Context, data_uri: &str) -> Option<&egui::TextureHandle> {
        if self.source.as_deref() != Some(data_uri) {
            self.source = Some(data_uri.to_string());
            self.texture = match autospector_image::acquire::decode_data_uri(data_uri) {
                Ok(img) => Some(ctx.load_texture("inspection", color_image(&img), egui::TextureOptions::LINEAR)),
                Err(err) => {
                    tracing::warn!(error = %err, "cannot display image");
                    None
                }
            };
        }
        self.texture.as_ref()
    }

    pub fn clear(&mut self) {
        self.source = None;
        self.texture = None;
    }
}

/// Uploads `frame` into `slot`, reusing the texture once it exists.
pub fn update_frame(ctx: &egui::Context, slot: &mut Option<egui::TextureHandle>, frame: &DynamicImage) {
    let img = color_image(frame);
    match slot {
        Some(tex) => tex.set(img, egui::TextureOptions::LINEAR),
        None => *slot = Some(ctx.load_texture("camera", img, egui::TextureOptions::LINEAR)),
    }
}

fn color_image(img: &DynamicImage) -> egui::ColorImage {
    let rgba = img.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    let pixels = rgba.as_flat_samples();
    egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice())
}

pub fn color(c: Rgb) -> egui::Color32 {
    egui::Color32::from_rgb(c.r, c.g, c.b)
}

fn tint(c: Rgb, alpha: f32) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(c.r, c.g, c.b, (alpha.clamp(0.0, 1.0) * 255.0) as u8)
}

/// Largest rect with the texture's aspect ratio centered in `avail`.
fn fit(avail: egui::Rect, size: egui::Vec2) -> egui::Rect {
    if size.x <= 0.0 || size.y <= 0.0 {
        return avail;
    }
    let scale = (avail.width() / size.x).min(avail.height() / size.y);
    egui::Rect::from_center_size(avail.center(), size * scale)
}

fn screen_rect(image_rect: egui::Rect, r: &PercentRect) -> egui::Rect {
    let min = image_rect.min
        + egui::vec2(
            image_rect.width() * (r.left / 100.0) as f32,
            image_rect.height() * (r.top / 100.0) as f32,
        );
    let size = egui::vec2(
        image_rect.width() * (r.width / 100.0) as f32,
        image_rect.height() * (r.height / 100.0) as f32,
    );
    egui::Rect::from_min_size(min, size)
}

/// Paints the image with its damage boxes. Returns the id of the hovered
/// annotation, whose label is shown next to the pointer.
pub fn show(
    ui: &mut egui::Ui,
    texture: &egui::TextureHandle,
    overlay: Option<&Overlay>,
    highlight: Option<&str>,
) -> Option<String> {
    let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::hover());
    let canvas = response.rect;
    painter.rect_filled(canvas, egui::CornerRadius::same(0), egui::Color32::from_gray(24));

    let image_rect = fit(canvas, texture.size_vec2());
    painter.image(
        texture.id(),
        image_rect,
        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
        egui::Color32::WHITE,
    );

    let overlay = overlay?;
    let hovered = response.hover_pos().and_then(|pos| {
        if !image_rect.contains(pos) {
            return None;
        }
        let x = ((pos.x - image_rect.min.x) / image_rect.width() * 100.0) as f64;
        let y = ((pos.y - image_rect.min.y) / image_rect.height() * 100.0) as f64;
        overlay.hit(x, y).map(|a| (pos, a))
    });

    for a in overlay.draw_order() {
        let lit = highlight == Some(a.damage_id.as_str())
            || hovered.is_some_and(|(_, h)| h.damage_id == a.damage_id);
        paint_annotation(&painter, screen_rect(image_rect, &a.rect), a, lit);
    }

    let (pos, a) = hovered?;
    paint_tooltip(&painter, pos, a);
    Some(a.damage_id.clone())
}

fn paint_annotation(painter: &egui::Painter, r: egui::Rect, a: &Annotation, lit: bool) {
    let style = a.style;
    let fill_alpha = if lit { style.fill_alpha + 0.15 } else { style.fill_alpha };
    let width = if lit { style.stroke_width + 1.0 } else { style.stroke_width };
    let c = color(style.stroke);

    painter.rect_filled(r, egui::CornerRadius::same(2), tint(style.stroke, fill_alpha));
    painter.rect_stroke(
        r,
        egui::CornerRadius::same(2),
        egui::Stroke::new(width, c),
        egui::StrokeKind::Inside,
    );

    let k = (width * 2.5).max(6.0);
    for corner in [r.left_top(), r.right_top(), r.left_bottom(), r.right_bottom()] {
        painter.rect_filled(
            egui::Rect::from_center_size(corner, egui::vec2(k, k)),
            egui::CornerRadius::same(0),
            c,
        );
    }

    if style.marker {
        painter.circle_filled(r.right_top() + egui::vec2(-k, k), k * 0.6, egui::Color32::WHITE);
        painter.circle_filled(r.right_top() + egui::vec2(-k, k), k * 0.45, c);
    }
}

fn paint_tooltip(painter: &egui::Painter, pos: egui::Pos2, a: &Annotation) {
    let galley = painter.layout_no_wrap(
        a.tooltip(),
        egui::FontId::proportional(13.0),
        egui::Color32::WHITE,
    );
    let at = pos + egui::vec2(14.0, 14.0);
    let bg = egui::Rect::from_min_size(at, galley.size()).expand(6.0);
    painter.rect_filled(bg, egui::CornerRadius::same(4), egui::Color32::from_black_alpha(220));
    painter.rect_stroke(
        bg,
        egui::CornerRadius::same(4),
        egui::Stroke::new(1.0, color(a.style.stroke)),
        egui::StrokeKind::Outside,
    );
    painter.galley(at, galley, egui::Color32::WHITE);
}
