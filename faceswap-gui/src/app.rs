//! Application construction, dialogs and the frame loop.

use std::path::PathBuf;

use eframe::{App, CreationContext, Frame};
use faceswap_utils::{FaceSelection, QualityLevel, configure_telemetry, default_settings_path};
use log::{info, warn};
use rfd::FileDialog;

use crate::{
    core::{
        settings::{load_settings, persist_settings_with_feedback},
        swap::build_pipeline,
    },
    theme,
    types::{FaceSwapApp, InputKind},
};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "webp", "tif", "tiff", "gif"];

impl FaceSwapApp {
    pub fn new(cc: &CreationContext<'_>) -> Self {
        Self::create(&cc.egui_ctx, default_settings_path())
    }

    /// Build the app with settings read from `settings_path`.
    pub fn create(ctx: &egui::Context, settings_path: PathBuf) -> Self {
        theme::apply(ctx);

        info!("Loading GUI settings from {}", settings_path.display());
        let settings = load_settings(&settings_path);
        configure_telemetry(
            settings.telemetry.enabled,
            settings.telemetry.level_filter(),
        );

        let (pipeline, last_error) = match build_pipeline(&settings) {
            Ok(pipeline) => (Some(pipeline), None),
            Err(err) => {
                warn!("Unable to load models: {err}");
                (None, Some(err.user_message()))
            }
        };
        let models_dir_input = settings.models.directory.display().to_string();

        let mut app = Self {
            settings,
            settings_path,
            status_line: String::new(),
            last_error,
            pipeline,
            source: None,
            target: None,
            result: None,
            models_dir_input,
            texture_seq: 0,
        };
        app.status_line = app.idle_status();
        app
    }

    pub fn set_quality(&mut self, quality: QualityLevel) {
        if self.settings.quality == quality {
            return;
        }
        self.settings.quality = quality;
        self.settings_changed();
    }

    pub fn set_face_selection(&mut self, selection: FaceSelection) {
        if self.settings.swap.face_selection == selection {
            return;
        }
        self.settings.swap.face_selection = selection;
        self.settings_changed();
    }

    pub fn set_swap_all_faces(&mut self, enabled: bool) {
        if self.settings.swap.swap_all_faces == enabled {
            return;
        }
        self.settings.swap.swap_all_faces = enabled;
        self.settings_changed();
    }

    /// Point the models directory at the text field's value and reload.
    pub fn apply_models_dir_input(&mut self) {
        let trimmed = self.models_dir_input.trim();
        let directory = if trimmed.is_empty() {
            faceswap_utils::AppSettings::default().models.directory
        } else {
            PathBuf::from(trimmed)
        };
        self.models_dir_input = directory.display().to_string();
        if self.settings.models.directory != directory {
            self.settings.models.directory = directory;
            self.persist();
        }
        self.reload_pipeline();
    }

    pub(crate) fn open_input_dialog(&mut self, kind: InputKind) {
        if let Some(path) = FileDialog::new()
            .set_title(kind.title())
            .add_filter("Images", IMAGE_EXTENSIONS)
            .pick_file()
        {
            self.load_input(kind, path);
        }
    }

    pub(crate) fn open_models_dir_dialog(&mut self) {
        if let Some(dir) = FileDialog::new().pick_folder() {
            self.models_dir_input = dir.display().to_string();
            self.apply_models_dir_input();
        }
    }

    pub(crate) fn save_result_dialog(&mut self) {
        let Some(result) = self.result.as_ref() else {
            return;
        };
        let suggested = result.suggested_path.clone();
        let mut dialog = FileDialog::new()
            .add_filter("PNG", &["png"])
            .add_filter("JPEG", &["jpg", "jpeg"]);
        if let Some(dir) = suggested.parent().filter(|dir| dir.exists()) {
            dialog = dialog.set_directory(dir);
        }
        if let Some(name) = suggested.file_name() {
            dialog = dialog.set_file_name(name.to_string_lossy());
        }
        if let Some(path) = dialog.save_file() {
            self.save_result_to(&path);
        }
    }

    /// Save to the suggested path inside the configured output directory.
    pub fn quick_save(&mut self) {
        let Some(path) = self.result.as_ref().map(|r| r.suggested_path.clone()) else {
            return;
        };
        self.save_result_to(&path);
    }

    /// Create the output directory if needed and return it as a `file://` URL.
    pub fn output_folder_url(&mut self) -> Option<String> {
        let dir = self.settings.output.directory.clone();
        let resolved = std::fs::create_dir_all(&dir).and_then(|()| dir.canonicalize());
        match resolved {
            Ok(path) => {
                let path = path.to_string_lossy().replace('\\', "/");
                let path = path.trim_start_matches("//?/");
                let separator = if path.starts_with('/') { "" } else { "/" };
                Some(format!("file://{separator}{path}"))
            }
            Err(err) => {
                self.show_error(format!(
                    "Could not open the output folder {}: {err}",
                    dir.display()
                ));
                None
            }
        }
    }

    /// Show the output directory in the system file manager.
    pub(crate) fn open_output_folder(&mut self, ctx: &egui::Context) {
        if let Some(url) = self.output_folder_url() {
            info!("Opening {url}");
            ctx.open_url(egui::OpenUrl::same_tab(url));
        }
    }

    fn settings_changed(&mut self) {
        self.sync_pipeline_options();
        self.persist();
    }

    fn persist(&mut self) {
        if let Err(message) = persist_settings_with_feedback(&self.settings, &self.settings_path) {
            self.last_error = Some(message);
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|file| file.path.clone())
                .collect()
        });
        for path in dropped {
            // First drop fills the source, later drops replace the target.
            let kind = if self.source.is_none() {
                InputKind::Source
            } else {
                InputKind::Target
            };
            self.load_input(kind, path);
        }
    }
}

impl App for FaceSwapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.handle_dropped_files(ctx);
        self.show_status_bar(ctx);
        self.show_controls(ctx);
        self.show_previews(ctx);
    }
}
