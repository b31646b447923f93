//! egui overlay: narrative sections scrolling over the fixed stage, the
//! debug panel and the reduced-motion poster.

use egui::{Align2, Color32, RichText};

use crate::config::{OverlayConfig, Section};
use crate::core::ScrollSample;

pub const PAGE_BACKGROUND: Color32 = Color32::from_rgb(0x1e, 0x1e, 0x1e);
const DEBUG_ACCENT: Color32 = Color32::from_rgb(74, 158, 255);
const SECTION_WIDTH: f32 = 520.0;

/// Top edge of section `index`, in the same units as `offset`
pub fn section_top(index: usize, viewport_height: f32, offset: f32) -> f32 {
    index as f32 * viewport_height - offset
}

/// Whether a section starting at `top` and spanning one viewport is on screen
pub fn section_visible(top: f32, viewport_height: f32) -> bool {
    top < viewport_height && top + viewport_height > 0.0
}

/// Snapshot shown in the debug panel
#[derive(Debug, Clone, PartialEq)]
pub struct DebugInfo {
    pub model: String,
    pub status: &'static str,
    pub progress: f32,
    pub offset: f32,
    pub fps: f32,
    pub reduced_motion: bool,
}

impl DebugInfo {
    pub fn scroll_percent(&self) -> f32 {
        self.progress * 100.0
    }
}

/// Everything the overlay needs for one frame
pub struct OverlayFrame<'a> {
    pub config: &'a OverlayConfig,
    pub scroll: ScrollSample,
    pub debug: Option<DebugInfo>,
}

pub fn draw(ctx: &egui::Context, frame: &OverlayFrame<'_>) {
    draw_sections(ctx, &frame.config.sections, frame.scroll);
    if let Some(debug) = &frame.debug {
        draw_debug(ctx, debug);
    }
}

/// Sections are laid out one viewport apart and shifted up by the scroll offset.
/// Scroll values are physical pixels; egui positions are points.
pub fn draw_sections(ctx: &egui::Context, sections: &[Section], scroll: ScrollSample) {
    let ppp = ctx.pixels_per_point();
    let viewport = scroll.viewport_height / ppp;
    let offset = scroll.offset / ppp;

    for (index, section) in sections.iter().enumerate() {
        let top = section_top(index, viewport, offset);
        if !section_visible(top, viewport) {
            continue;
        }
        let title = if index == 0 {
            RichText::new(&section.title).size(44.0).strong()
        } else {
            RichText::new(&section.title).size(34.0).strong()
        };
        let color = section
            .accent
            .map_or(Color32::WHITE, |[r, g, b]| Color32::from_rgb(r, g, b));

        egui::Area::new(egui::Id::new(("section", index)))
            .fixed_pos(egui::pos2(48.0, top + viewport * 0.3))
            .order(egui::Order::Foreground)
            .interactable(false)
            .show(ctx, |ui| {
                egui::Frame::NONE
                    .fill(Color32::from_black_alpha(140))
                    .corner_radius(8.0)
                    .inner_margin(20.0)
                    .show(ui, |ui| {
                        ui.set_max_width(SECTION_WIDTH);
                        ui.label(title.color(color));
                        ui.add_space(12.0);
                        ui.label(RichText::new(&section.body).size(18.0).color(Color32::WHITE));
                    });
            });
    }
}

pub fn draw_debug(ctx: &egui::Context, info: &DebugInfo) {
    egui::Window::new("Debug")
        .title_bar(false)
        .resizable(false)
        .anchor(Align2::RIGHT_TOP, egui::vec2(-10.0, 10.0))
        .frame(egui::Frame::NONE.fill(Color32::from_black_alpha(180)).inner_margin(10.0))
        .show(ctx, |ui| {
            ui.label(
                RichText::new(format!("{:.0}", info.fps))
                    .size(32.0)
                    .color(DEBUG_ACCENT),
            );
            ui.label(RichText::new("FPS").size(12.0).color(Color32::GRAY));
            ui.separator();
            let line = |ui: &mut egui::Ui, key: &str, value: String| {
                ui.label(RichText::new(format!("{key}: {value}")).monospace().color(Color32::LIGHT_GRAY));
            };
            line(ui, "model", info.model.clone());
            line(ui, "status", info.status.to_string());
            line(ui, "scroll", format!("{:.1}%", info.scroll_percent()));
            line(ui, "offset", format!("{:.0}px", info.offset));
            line(ui, "motion", if info.reduced_motion { "reduced" } else { "full" }.to_string());
            ui.label(RichText::new("M toggles motion").size(11.0).color(Color32::GRAY));
        });
}

/// Static page shown instead of the stage when motion is reduced
pub fn draw_poster(ctx: &egui::Context, title: &str, subtitle: &str) {
    egui::CentralPanel::default()
        .frame(egui::Frame::NONE.fill(PAGE_BACKGROUND))
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(ui.available_height() * 0.4);
                ui.label(RichText::new(title).size(48.0).strong().color(Color32::WHITE));
                ui.add_space(16.0);
                ui.label(RichText::new(subtitle).size(19.0).color(Color32::WHITE));
            });
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_start_one_viewport_apart() {
        assert_eq!(section_top(0, 600.0, 0.0), 0.0);
        assert_eq!(section_top(2, 600.0, 0.0), 1200.0);
        assert_eq!(section_top(1, 600.0, 900.0), -300.0);
    }

    #[test]
    fn visibility_window() {
        assert!(section_visible(0.0, 600.0));
        assert!(section_visible(-599.0, 600.0));
        assert!(!section_visible(-600.0, 600.0));
        assert!(!section_visible(600.0, 600.0));
    }

    #[test]
    fn overlay_runs_headless() {
        let ctx = egui::Context::default();
        let config = OverlayConfig::default();
        let frame = OverlayFrame {
            config: &config,
            scroll: ScrollSample {
                offset: 300.0,
                progress: 0.25,
                viewport_height: 600.0,
            },
            debug: Some(DebugInfo {
                model: "assets/ziggs.glb".to_string(),
                status: "loading",
                progress: 0.25,
                offset: 300.0,
                fps: 60.0,
                reduced_motion: false,
            }),
        };
        // New areas are measured invisibly on their first frame
        let _ = ctx.run(egui::RawInput::default(), |ctx| draw(ctx, &frame));
        let output = ctx.run(egui::RawInput::default(), |ctx| draw(ctx, &frame));
        assert!(!output.shapes.is_empty());
    }

    #[test]
    fn poster_runs_headless() {
        let ctx = egui::Context::default();
        let output = ctx.run(egui::RawInput::default(), |ctx| {
            draw_poster(ctx, "Meet Ziggs", "3D animations disabled due to motion preferences")
        });
        assert!(!output.shapes.is_empty());
    }
}
