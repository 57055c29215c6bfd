//! Popup, banner, and notice rendering.

use std::time::Instant;

use eframe::egui;
use weatherpin_core::{ErrorBanner, PopupState};

/// Fixed banner text; the failure reasons are deliberately collapsed.
pub const BANNER_TEXT: &str = "Could not fetch weather data";

/// Modal-style weather popup: city, temperature, close action.
pub fn weather_popup(ctx: &egui::Context, popup: &mut PopupState) {
    if !popup.is_open() {
        return;
    }

    let mut close = false;
    egui::Window::new("Weather")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            if let Some(place) = popup.place() {
                ui.label(format!("Current city: {place}"));
            }
            if let Some(temperature) = popup.temperature_c() {
                ui.label(temperature_label(temperature));
            }
            ui.add_space(8.0);
            if ui.button("Close").clicked() {
                close = true;
            }
        });

    if close {
        popup.close();
    }
}

/// Transient top banner. No dismiss action; it hides itself when the
/// deadline passes.
pub fn error_banner(ctx: &egui::Context, banner: &ErrorBanner, now: Instant) {
    let Some(remaining) = banner.time_remaining(now) else {
        return;
    };

    egui::Area::new(egui::Id::new("error-banner"))
        .anchor(egui::Align2::CENTER_TOP, egui::vec2(0.0, 20.0))
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.label(BANNER_TEXT);
            });
        });

    // Wake up once the deadline passes so the banner disappears without
    // further input.
    ctx.request_repaint_after(remaining);
}

/// Blocking notice shown when location tracking could not start.
pub fn location_notice(ctx: &egui::Context, notice: &mut Option<&'static str>) {
    let Some(message) = *notice else {
        return;
    };

    let mut dismissed = false;
    egui::Window::new("Location")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            ui.label(message);
            ui.add_space(8.0);
            if ui.button("OK").clicked() {
                dismissed = true;
            }
        });

    if dismissed {
        *notice = None;
    }
}

fn temperature_label(temperature_c: f64) -> String {
    format!("Current temperature: {temperature_c} °C")
}
