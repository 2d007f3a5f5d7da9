use eframe::egui;
use parking_lot::Mutex;
use services::routes;
use shared::settings::ReaderSettings;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

mod companion_panel;
mod doc_layout;
mod reader_view;

mod state;
pub use state::*;

fn config_path() -> Option<std::path::PathBuf> {
    if let Some(proj) = directories::ProjectDirs::from("com.local", "PEP-talk", "PEPtalk") {
        let p = proj.config_dir().join("settings.json");
        let _ = fs::create_dir_all(proj.config_dir());
        Some(p)
    } else {
        None
    }
}

fn load_settings_or_default() -> ReaderSettings {
    let mut settings = match config_path() {
        Some(path) => load_settings_from(&path),
        None => ReaderSettings::default(),
    };
    settings.apply_env_overrides();
    settings
}

/// Defaults are written only when no settings file exists yet; a file that
/// fails to parse is left alone so the user can fix it.
fn load_settings_from(path: &Path) -> ReaderSettings {
    match fs::read(path) {
        Ok(bytes) => match serde_json::from_slice::<ReaderSettings>(&bytes) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(
                    "ignoring unreadable settings file {}: {}",
                    path.display(),
                    e
                );
                ReaderSettings::default()
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            let defaults = ReaderSettings::default();
            save_settings(path, &defaults);
            defaults
        }
        Err(e) => {
            tracing::warn!("could not read {}: {}", path.display(), e);
            ReaderSettings::default()
        }
    }
}

fn save_settings(path: &Path, settings: &ReaderSettings) {
    match serde_json::to_vec_pretty(settings) {
        Ok(bytes) => {
            if let Err(e) = fs::write(path, bytes) {
                tracing::warn!("could not write {}: {}", path.display(), e);
            }
        }
        Err(e) => tracing::warn!("could not serialize settings: {}", e),
    }
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings_or_default();
    tracing::info!("chat endpoint: {}", settings.chat_endpoint());

    let state = match ReaderState::new(settings) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("failed to start reader: {}", e);
            std::process::exit(1);
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([800.0, 600.0]),
        vsync: true,
        ..Default::default()
    };
    eframe::run_native(
        "PEP-talk",
        options,
        Box::new(move |_cc| {
            Box::new(ReaderApp {
                state: Arc::new(Mutex::new(state)),
            })
        }),
    )
}

struct ReaderApp {
    state: Arc<Mutex<ReaderState>>,
}

impl eframe::App for ReaderApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut s = self.state.lock();
        let dark = ctx.style().visuals.dark_mode;

        // Non-blocking: pick up fetched documents and streamed fragments
        s.poll_document();
        if let Some(outcome) = s.panel.tick() {
            tracing::debug!("answer finished: {:?}", outcome);
        }
        if s.is_busy() {
            ctx.request_repaint_after(Duration::from_millis(30));
        }

        egui::TopBottomPanel::top("header")
            .exact_height(48.0)
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new("PEP-talk")
                            .size(18.0)
                            .strong()
                            .color(egui::Color32::from_rgb(16, 150, 110)),
                    );
                    ui.add_space(16.0);

                    let response = ui.add(
                        egui::TextEdit::singleline(&mut s.location_input)
                            .desired_width(220.0)
                            .font(egui::TextStyle::Monospace),
                    );
                    if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                        let path = s.location_input.clone();
                        s.navigate(&path);
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if !s.panel.is_open()
                            && ui.button("AI Companion").on_hover_text("Open panel").clicked()
                        {
                            s.panel.handle(companion::PanelEvent::Open);
                        }
                    });
                });
            });

        egui::SidePanel::left("sections")
            .exact_width(160.0)
            .show(ctx, |ui| {
                ui.add_space(12.0);
                let sections = s.settings.documents.sections.clone();
                for id in sections {
                    let active = s.section_id.as_deref() == Some(id.as_str());
                    if ui
                        .selectable_label(active, format!("MPEP {}", id))
                        .clicked()
                    {
                        s.navigate(&routes::section_path(&id));
                    }
                }
            });

        companion_panel::render_companion_panel(&mut s, ctx, dark);

        egui::CentralPanel::default()
            .frame(egui::Frame::central_panel(&ctx.style()).inner_margin(egui::Margin::same(24.0)))
            .show(ctx, |ui| {
                reader_view::render_reader(&mut s, ui, dark);
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_first_run_writes_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");

        let settings = load_settings_from(&path);
        assert_eq!(settings.backend_url, "http://127.0.0.1:8000");
        let saved: ReaderSettings = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(saved.chat_path, settings.chat_path);
    }

    #[test]
    fn test_unreadable_settings_are_not_overwritten() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        let broken = r#"{"backend_url": "http://10.0.0.2:8000",}"#;
        fs::write(&path, broken).unwrap();

        let settings = load_settings_from(&path);
        assert_eq!(settings.backend_url, "http://127.0.0.1:8000");
        assert_eq!(fs::read_to_string(&path).unwrap(), broken);
    }

    #[test]
    fn test_partial_settings_file_is_kept() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        let partial = r#"{"request_timeout_secs": 300}"#;
        fs::write(&path, partial).unwrap();

        let settings = load_settings_from(&path);
        assert_eq!(settings.request_timeout_secs, 300);
        assert_eq!(fs::read_to_string(&path).unwrap(), partial);
    }
}
