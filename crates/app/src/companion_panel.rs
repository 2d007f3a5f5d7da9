//! The "AI Study Companion" side panel: transcript plus follow-up input.

use crate::state::ReaderState;
use companion::{Message, PanelEvent, Sender};
use eframe::egui;

pub fn render_companion_panel(s: &mut ReaderState, ctx: &egui::Context, dark: bool) {
    if !s.panel.is_open() {
        return;
    }

    egui::SidePanel::right("companion")
        .default_width(384.0)
        .min_width(300.0)
        .max_width(520.0)
        .frame(
            egui::Frame::none()
                .fill(if dark {
                    egui::Color32::from_rgb(35, 35, 42)
                } else {
                    egui::Color32::from_rgb(248, 250, 252)
                })
                .inner_margin(egui::Margin::same(12.0)),
        )
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(
                    egui::RichText::new("AI Study Companion")
                        .size(16.0)
                        .strong()
                        .color(egui::Color32::from_rgb(16, 150, 110)),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button("✕").on_hover_text("Close panel").clicked() {
                        s.panel.handle(PanelEvent::Close);
                    }
                });
            });
            ui.separator();

            egui::TopBottomPanel::bottom("companion_input")
                .frame(egui::Frame::none().inner_margin(egui::Margin::symmetric(0.0, 8.0)))
                .show_inside(ui, |ui| render_input(s, ui));

            egui::ScrollArea::vertical()
                .id_source("transcript")
                .auto_shrink([false, false])
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    if s.panel.conversation().is_empty() {
                        render_onboarding(ui, dark);
                        return;
                    }
                    for msg in s.panel.conversation().messages() {
                        render_message(ui, msg, dark);
                        ui.add_space(8.0);
                    }
                });
        });
}

fn render_input(s: &mut ReaderState, ui: &mut egui::Ui) {
    let enabled = s.panel.input_enabled();
    let hint = if s.panel.is_streaming() {
        "Thinking..."
    } else {
        "Ask a follow-up..."
    };
    let wants_focus = s.panel.take_focus_request();

    ui.horizontal(|ui| {
        let response = ui.add_enabled(
            enabled,
            egui::TextEdit::singleline(s.panel.input_mut())
                .hint_text(hint)
                .desired_width(ui.available_width() - 70.0),
        );
        if wants_focus {
            response.request_focus();
        }

        let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        let clicked = ui
            .add_enabled(enabled, egui::Button::new("Send").min_size(egui::vec2(60.0, 0.0)))
            .clicked();
        if submitted || clicked {
            s.panel.handle(PanelEvent::Submit);
        }
    });
}

fn render_onboarding(ui: &mut egui::Ui, dark: bool) {
    ui.vertical_centered(|ui| {
        ui.add_space(60.0);
        ui.label(egui::RichText::new("✎").size(32.0));
        ui.add_space(8.0);
        ui.label(egui::RichText::new("Welcome to PEP-talk!").size(17.0).strong());
        ui.add_space(4.0);
        ui.label(
            egui::RichText::new(
                "Highlight any text in the MPEP document to get an explanation or see a real-world example.",
            )
            .size(13.0)
            .color(if dark {
                egui::Color32::from_rgb(170, 170, 180)
            } else {
                egui::Color32::from_rgb(80, 90, 100)
            }),
        );
    });
}

fn render_message(ui: &mut egui::Ui, msg: &Message, dark: bool) {
    let time = msg.created_at().format("%H:%M:%S").to_string();

    match msg.sender() {
        Sender::User => {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
                egui::Frame::none()
                    .fill(egui::Color32::from_rgb(37, 99, 235))
                    .rounding(egui::Rounding::same(8.0))
                    .inner_margin(egui::Margin::same(10.0))
                    .show(ui, |ui| {
                        ui.set_max_width(300.0);
                        ui.label(
                            egui::RichText::new(msg.text())
                                .color(egui::Color32::WHITE)
                                .size(14.0),
                        );
                    })
                    .response
                    .on_hover_text(time);
            });
        }
        Sender::Bot => {
            egui::Frame::none()
                .fill(if dark {
                    egui::Color32::from_rgb(50, 50, 58)
                } else {
                    egui::Color32::WHITE
                })
                .rounding(egui::Rounding::same(8.0))
                .inner_margin(egui::Margin::same(10.0))
                .show(ui, |ui| {
                    ui.set_max_width(320.0);
                    let text_color = if dark {
                        egui::Color32::from_rgb(220, 220, 230)
                    } else {
                        egui::Color32::from_rgb(30, 41, 59)
                    };
                    if msg.text().is_empty() {
                        ui.spinner();
                    } else {
                        ui.label(egui::RichText::new(msg.text()).color(text_color).size(14.0));
                    }
                })
                .response
                .on_hover_text(time);
        }
    }
}
