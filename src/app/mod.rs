//! App module - owns the UI-thread state, the async runtime and the event channel

mod loaders;
mod modals;
mod views;

use crate::api::ApiClient;
use crate::forms::FormState;
use crate::notifications::Notifier;
use crate::settings::Settings;
use crate::state::{AppEvent, AppState};
use crate::theme;
use crate::types::*;
use eframe::egui;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

// ============================================================================
// APP STATE
// ============================================================================

pub struct App {
    pub(crate) state: AppState,
    pub(crate) api: ApiClient,
    pub(crate) notifier: Notifier,
    pub(crate) ctx: egui::Context,
    pub(crate) runtime: tokio::runtime::Runtime,
    pub(crate) events_tx: mpsc::UnboundedSender<AppEvent>,
    pub(crate) events_rx: mpsc::UnboundedReceiver<AppEvent>,
    // In-flight section load, cancelled when the next one starts
    pub(crate) load_token: Option<CancellationToken>,
    // Modals
    pub(crate) form: Option<FormState>,
    pub(crate) pending_delete: Option<(EntityKind, i64)>,
    pub(crate) logo_texture: Option<egui::TextureHandle>,
    // Settings
    pub(crate) settings: Settings,
    pub(crate) window_pos: Option<egui::Pos2>,
    pub(crate) window_size: Option<egui::Vec2>,
    pub(crate) needs_center: bool,
    pub(crate) first_frame: bool,
    pub(crate) data_dir: PathBuf,
}

// ============================================================================
// APP INITIALIZATION & HELPERS
// ============================================================================

impl App {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        settings: Settings,
        data_dir: PathBuf,
    ) -> std::io::Result<Self> {
        // Force dark theme
        cc.egui_ctx.set_theme(egui::Theme::Dark);

        // Phosphor icons as a proportional fallback
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        theme::apply_visuals(&cc.egui_ctx);

        let api_base = settings.resolve_api_base();
        info!(api_base = %api_base, "Using API root");

        let notifier = Notifier::new().with_context(cc.egui_ctx.clone());
        let api = ApiClient::new(&api_base, notifier.clone());
        let runtime = tokio::runtime::Runtime::new()?;
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        Ok(Self {
            state: AppState::new(settings.last_section),
            api,
            notifier,
            ctx: cc.egui_ctx.clone(),
            runtime,
            events_tx,
            events_rx,
            load_token: None,
            form: None,
            pending_delete: None,
            logo_texture: None,
            needs_center: settings.window_x.is_none() || settings.window_y.is_none(),
            settings,
            window_pos: None,
            window_size: None,
            first_frame: true,
            data_dir,
        })
    }

    pub fn save_settings(&self) {
        let settings = Settings {
            window_x: self.window_pos.map(|p| p.x),
            window_y: self.window_pos.map(|p| p.y),
            window_w: self.window_size.map(|s| s.x),
            window_h: self.window_size.map(|s| s.y),
            api_base_url: self.settings.api_base_url.clone(),
            last_section: self.state.active,
        };
        settings.save(&self.data_dir);
    }
}
