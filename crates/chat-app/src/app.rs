//! Main egui application — composes the panels and manages the chat session.

use std::cell::RefCell;
use std::rc::Rc;

use egui::{self, CentralPanel, SidePanel};

use chat_core::archive::{export_as_document, ConversationArchive};
use chat_core::event_bus::EventBus;
use chat_core::ports::StorePort;
use chat_core::session::{drive_turn, ChatSession};
use chat_platform::download::download_document;
use chat_platform::llm::OpenAiCompatClient;
use chat_platform::store::auto_detect_store;
use chat_types::archive::ArchivedConversation;
use chat_types::config::{ChatConfig, DEFAULT_SYSTEM_INSTRUCTION};
use chat_types::event::SessionEvent;
use chat_ui::panels::{chat, history, save_dialog, settings};
use chat_ui::state::UiState;
use chat_ui::theme;

/// Store key holding the persisted `ChatConfig` record.
const CONFIG_KEY: &str = "chat.config";
/// Store key holding the durable system instruction, watched for
/// cross-tab changes.
const INSTRUCTION_KEY: &str = "chat.instruction";

/// The main application state
pub struct ChatApp {
    ui_state: UiState,
    /// Settings panel drafts; applied to the session on explicit save.
    config_draft: ChatConfig,
    instruction_draft: String,
    save_feedback: Option<settings::SaveFeedback>,
    event_bus: EventBus,
    session: Rc<RefCell<ChatSession>>,
    client: Rc<OpenAiCompatClient>,
    store: Rc<dyn StorePort>,
    archive: ConversationArchive,
    archive_entries: Vec<ArchivedConversation>,
    /// Durable-instruction updates arriving from another tab, delivered
    /// by the store's change listener and drained once per frame.
    external_instruction: Rc<RefCell<Option<String>>>,
    first_frame: bool,
}

impl ChatApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let store = auto_detect_store();
        log::info!("Using store backend: {}", store.backend_name());

        let config = Self::restore_config(store.as_ref());
        let instruction = Self::restore_instruction(store.as_ref());

        let event_bus = EventBus::new();
        let session = Rc::new(RefCell::new(ChatSession::new(
            config.clone(),
            &instruction,
            event_bus.clone(),
        )));
        let client = Rc::new(OpenAiCompatClient::new(config.clone()));
        let archive = ConversationArchive::new(store.clone());
        let archive_entries = archive.list();

        // Cross-tab watch on the durable instruction. The callback runs
        // outside the frame loop, so it only fills a slot the app drains
        // at the top of each update.
        let external_instruction = Rc::new(RefCell::new(None));
        let slot = external_instruction.clone();
        store.on_external_change(
            INSTRUCTION_KEY,
            Box::new(move |value| {
                let text =
                    value.unwrap_or_else(|| DEFAULT_SYSTEM_INSTRUCTION.to_string());
                *slot.borrow_mut() = Some(text);
            }),
        );

        Self {
            ui_state: UiState::new(),
            config_draft: config,
            instruction_draft: instruction,
            save_feedback: None,
            event_bus,
            session,
            client,
            store,
            archive,
            archive_entries,
            external_instruction,
            first_frame: true,
        }
    }

    fn restore_config(store: &dyn StorePort) -> ChatConfig {
        match store.get(CONFIG_KEY) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("stored config unreadable, using defaults: {}", e);
                    ChatConfig::default()
                }
            },
            Ok(None) => ChatConfig::default(),
            Err(e) => {
                log::warn!("config read failed: {}", e);
                ChatConfig::default()
            }
        }
    }

    fn restore_instruction(store: &dyn StorePort) -> String {
        match store.get(INSTRUCTION_KEY) {
            Ok(Some(text)) if !text.trim().is_empty() => text,
            _ => DEFAULT_SYSTEM_INSTRUCTION.to_string(),
        }
    }

    fn rebuild_client(&mut self) {
        self.client = Rc::new(OpenAiCompatClient::new(self.config_draft.clone()));
    }

    fn refresh_archive(&mut self) {
        self.archive_entries = self.archive.list();
    }

    /// Apply a durable-instruction change made in another tab.
    fn apply_external_instruction(&mut self) {
        let Some(text) = self.external_instruction.borrow_mut().take() else {
            return;
        };
        log::info!("durable instruction updated from another tab");
        self.session.borrow_mut().set_durable_instruction(&text);
        self.instruction_draft = text.clone();
        self.event_bus.emit(SessionEvent::InstructionChanged { text });
    }

    /// Dispatch a user message to the session (async turn).
    fn dispatch_send(&mut self, text: String, ctx: &egui::Context) {
        if !self.session.borrow().config().has_credential() {
            self.ui_state.error =
                Some("API key is not set. Open Settings to add one.".to_string());
            return;
        }

        let session = self.session.clone();
        let client = self.client.clone();
        let ctx = ctx.clone();

        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = drive_turn(&session, client.as_ref(), &text).await {
                log::error!("turn failed: {}", e);
            }
            ctx.request_repaint();
        });
    }

    fn handle_chat_action(&mut self, action: chat::ChatAction, ctx: &egui::Context) {
        match action {
            chat::ChatAction::Send(text) => self.dispatch_send(text, ctx),
            chat::ChatAction::NewConversation => {
                if let Err(e) = self.session.borrow_mut().new_conversation() {
                    self.ui_state.error = Some(e.to_string());
                }
            }
            chat::ChatAction::OpenSaveDialog => {
                self.ui_state.save_name = chrono::Local::now()
                    .format("Conversation %Y-%m-%d %H:%M")
                    .to_string();
                self.ui_state.save_dialog_open = true;
            }
            chat::ChatAction::Export => self.export_conversation(),
        }
    }

    fn save_conversation(&mut self, name: &str) {
        let result = {
            let session = self.session.borrow();
            let captured = if session.instruction().has_override() {
                Some(session.instruction().active().to_string())
            } else {
                None
            };
            self.archive
                .save(session.conversation().messages(), name, captured)
        };
        match result {
            Ok(entry) => {
                log::info!("saved conversation {:?}", entry.name);
                self.ui_state.status_text = "Conversation saved".to_string();
                self.refresh_archive();
            }
            Err(e) => self.ui_state.error = Some(e.to_string()),
        }
    }

    fn export_conversation(&mut self) {
        let (name, messages) = {
            let session = self.session.borrow();
            let name = session
                .active_archive_id()
                .and_then(|id| {
                    self.archive_entries
                        .iter()
                        .find(|entry| entry.id == id)
                        .map(|entry| entry.name.clone())
                })
                .unwrap_or_else(|| "conversation".to_string());
            (name, session.conversation().messages().to_vec())
        };
        let document = export_as_document(&name, &messages);
        let filename = format!("chat-{}.json", chrono::Local::now().format("%Y-%m-%d"));
        if let Err(e) = download_document(&filename, &document) {
            log::error!("export failed: {}", e);
            self.ui_state.error = Some(format!("Export failed: {}", e));
        }
    }

    fn handle_history_action(&mut self, action: history::HistoryAction) {
        match action {
            history::HistoryAction::Select(id) => {
                let entry = self
                    .archive_entries
                    .iter()
                    .find(|entry| entry.id == id)
                    .cloned();
                if let Some(entry) = entry {
                    if let Err(e) = self.session.borrow_mut().select_archived(&entry) {
                        self.ui_state.error = Some(e.to_string());
                    } else {
                        self.ui_state.show_history = false;
                    }
                }
            }
            history::HistoryAction::Delete(id) => {
                if let Err(e) = self.archive.delete(&id) {
                    self.ui_state.error = Some(e.to_string());
                } else {
                    self.session.borrow_mut().archive_entry_deleted(&id);
                    self.refresh_archive();
                }
            }
            history::HistoryAction::Close => {
                self.ui_state.show_history = false;
            }
        }
    }

    fn apply_settings(&mut self) {
        let mut success = true;

        match serde_json::to_string(&self.config_draft) {
            Ok(json) => {
                if let Err(e) = self.store.set(CONFIG_KEY, &json) {
                    log::error!("config save failed: {}", e);
                    success = false;
                }
            }
            Err(e) => {
                log::error!("config encode failed: {}", e);
                success = false;
            }
        }
        if let Err(e) = self.store.set(INSTRUCTION_KEY, &self.instruction_draft) {
            log::error!("instruction save failed: {}", e);
            success = false;
        }

        {
            let mut session = self.session.borrow_mut();
            session.set_config(self.config_draft.clone());
            session.set_durable_instruction(&self.instruction_draft);
        }
        self.rebuild_client();

        self.save_feedback = Some(settings::SaveFeedback {
            message: if success {
                "Saved".to_string()
            } else {
                "Save failed — see console".to_string()
            },
            success,
        });
    }
}

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.first_frame {
            theme::apply_theme(ctx);
            self.first_frame = false;
        }

        self.apply_external_instruction();

        // Drain events from the session
        let events = self.event_bus.drain();
        if !events.is_empty() {
            self.ui_state.process_events(events);
            ctx.request_repaint();
        }

        // Keep repainting while a reply is streaming
        if self.ui_state.is_busy() {
            ctx.request_repaint();
        }

        // ── Settings side panel ──────────────────────────────
        if self.ui_state.show_settings {
            SidePanel::right("settings_panel")
                .min_width(280.0)
                .max_width(350.0)
                .show(ctx, |ui| {
                    match settings::settings_panel(
                        ui,
                        &mut self.config_draft,
                        &mut self.instruction_draft,
                        self.save_feedback.as_ref(),
                    ) {
                        settings::SettingsAction::SaveClicked => self.apply_settings(),
                        settings::SettingsAction::Changed => {
                            self.save_feedback = None;
                        }
                        settings::SettingsAction::None => {}
                    }
                });
        }

        // ── History drawer ───────────────────────────────────
        if self.ui_state.show_history {
            SidePanel::left("history_panel")
                .min_width(260.0)
                .max_width(340.0)
                .show(ctx, |ui| {
                    if let Some(action) = history::history_panel(ui, &self.archive_entries) {
                        self.handle_history_action(action);
                    }
                });
        }

        // ── Main content ─────────────────────────────────────
        CentralPanel::default().show(ctx, |ui| {
            let action = {
                let session = self.session.borrow();
                let messages = session.conversation().visible_messages().to_vec();
                chat::chat_panel(ui, &mut self.ui_state, &messages)
            };
            if let Some(action) = action {
                self.handle_chat_action(action, ctx);
            }
        });

        // ── Save dialog ──────────────────────────────────────
        if self.ui_state.save_dialog_open {
            if let Some(action) = save_dialog::save_dialog(ctx, &mut self.ui_state.save_name)
            {
                match action {
                    save_dialog::SaveDialogAction::Confirm(name) => {
                        self.save_conversation(&name);
                        self.ui_state.save_dialog_open = false;
                    }
                    save_dialog::SaveDialogAction::Cancel => {
                        self.ui_state.save_dialog_open = false;
                    }
                }
            }
        }
    }
}
