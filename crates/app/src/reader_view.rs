//! Document reading area: renders the active section and reports text
//! selections to the companion panel.

use crate::doc_layout;
use crate::state::{DocumentView, ReaderState};
use companion::{Action, PanelEvent, SelectionRead, SelectionRect};
use eframe::egui;

pub fn render_reader(s: &mut ReaderState, ui: &mut egui::Ui, dark: bool) {
    let text = match &s.document {
        DocumentView::Loading => {
            ui.add_space(24.0);
            ui.label(egui::RichText::new("Loading MPEP content...").size(15.0));
            return;
        }
        DocumentView::Failed(message) => {
            ui.add_space(24.0);
            ui.label(
                egui::RichText::new(message)
                    .size(15.0)
                    .color(egui::Color32::from_rgb(200, 50, 50)),
            );
            return;
        }
        DocumentView::Loaded(text) => text.clone(),
    };

    let output = egui::ScrollArea::vertical()
        .id_source("document")
        .auto_shrink([false, false])
        .show_viewport(ui, |ui, viewport| {
            let content_origin = ui.max_rect().min;
            let mut view: &str = &text;
            let mut layouter = |ui: &egui::Ui, text: &str, wrap_width: f32| {
                let mut job = doc_layout::layout_job(text, dark);
                job.wrap.max_width = wrap_width;
                ui.fonts(|f| f.layout_job(job))
            };

            let edit = egui::TextEdit::multiline(&mut view)
                .id_source("document_text")
                .frame(false)
                .desired_width(f32::INFINITY)
                .layouter(&mut layouter)
                .show(ui);

            let released = ui.input(|i| i.pointer.any_released());
            if !released || !edit.response.contains_pointer() {
                return None;
            }

            // Read the selection, converting its screen rect to viewport coordinates
            let scroll = (viewport.min.x, viewport.min.y);
            let selection = edit.cursor_range.map(|range| {
                let (a, b) = (range.primary, range.secondary);
                if a.ccursor.index <= b.ccursor.index {
                    (a, b)
                } else {
                    (b, a)
                }
            });
            let read = match selection {
                Some((start, end)) if start.ccursor.index < end.ccursor.index => {
                    let selected: String = text
                        .chars()
                        .skip(start.ccursor.index)
                        .take(end.ccursor.index - start.ccursor.index)
                        .collect();
                    let rect = edit
                        .galley
                        .pos_from_cursor(&start)
                        .union(edit.galley.pos_from_cursor(&end))
                        .translate(edit.galley_pos.to_vec2());
                    let in_page = rect.translate(-content_origin.to_vec2());
                    SelectionRead {
                        text: selected,
                        bounds: SelectionRect {
                            left: in_page.left() - scroll.0,
                            top: in_page.top() - scroll.1,
                            width: in_page.width(),
                            height: in_page.height(),
                        },
                        scroll,
                    }
                }
                _ => SelectionRead {
                    text: String::new(),
                    bounds: SelectionRect {
                        left: 0.0,
                        top: 0.0,
                        width: 0.0,
                        height: 0.0,
                    },
                    scroll,
                },
            };
            Some(read)
        });

    if let Some(read) = output.inner {
        s.panel.handle(PanelEvent::PointerReleased(read));
    }

    if ui.input(|i| i.key_pressed(egui::Key::Escape)) && s.panel.popup().is_some() {
        s.panel.handle(PanelEvent::PopupDismissed);
    }

    render_popup(s, ui.ctx(), output.inner_rect.min, output.state.offset, dark);
}

/// Explain / Example / Ask buttons floating next to the selection
fn render_popup(
    s: &mut ReaderState,
    ctx: &egui::Context,
    viewport_origin: egui::Pos2,
    offset: egui::Vec2,
    dark: bool,
) {
    let Some(snapshot) = s.panel.popup() else {
        return;
    };
    let (left, top) = snapshot.to_viewport((offset.x, offset.y));
    let pos = viewport_origin + egui::vec2(left, top);

    let mut chosen = None;
    egui::Area::new(egui::Id::new("selection_popup"))
        .order(egui::Order::Foreground)
        .fixed_pos(pos)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style())
                .fill(if dark {
                    egui::Color32::from_rgb(45, 45, 52)
                } else {
                    egui::Color32::WHITE
                })
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        for action in Action::ALL {
                            if ui.button(action.label()).clicked() {
                                chosen = Some(action);
                            }
                        }
                    });
                });
        });

    if let Some(action) = chosen {
        s.panel.handle(PanelEvent::ActionChosen(action));
    }
}
