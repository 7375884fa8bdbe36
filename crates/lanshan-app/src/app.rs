//! The JS-facing chat handle: owns the store, pipeline and event bus.
//!
//! Long-running calls (`send`, `regenerate`, model listing) return a
//! `Promise`; everything else is a synchronous read or mutation. The page
//! polls `drain_events` to learn what changed.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_utils::format::JsValueSerdeExt;
use js_sys::Promise;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use lanshan_core::event_bus::EventBus;
use lanshan_core::orchestrator::AnswerOrchestrator;
use lanshan_core::ports::SessionRepository;
use lanshan_core::sender::MessageSender;
use lanshan_core::store::SessionStore;
use lanshan_platform::storage::auto_detect_storage;
use lanshan_platform::{FetchHttp, GlooTimer, StorageRepository};
use lanshan_types::{ChatError, config::ChatSettings, event::ChatEvent};

#[wasm_bindgen]
pub struct ChatApp {
    store: Rc<RefCell<SessionStore>>,
    orchestrator: Rc<AnswerOrchestrator>,
    sender: MessageSender,
    repository: Rc<StorageRepository>,
    bus: EventBus,
}

#[wasm_bindgen]
impl ChatApp {
    /// Open storage, restore sessions and settings, and wire the pipeline.
    pub async fn create() -> ChatApp {
        let repository = Rc::new(StorageRepository::new(auto_detect_storage().await));

        let settings = match repository.load_settings().await {
            Ok(Some(settings)) => settings,
            Ok(None) => ChatSettings::default(),
            Err(e) => {
                log::warn!("stored settings unreadable ({}), using defaults", e);
                ChatSettings::default()
            }
        };
        let store = Rc::new(RefCell::new(SessionStore::open(repository.clone()).await));
        let orchestrator = Rc::new(AnswerOrchestrator::new(
            settings,
            Rc::new(FetchHttp::new()),
            Rc::new(GlooTimer::new()),
        ));
        let bus = EventBus::new();
        let sender = MessageSender::new(store.clone(), orchestrator.clone(), bus.clone());

        log::info!(
            "restored {} session(s) from {}",
            store.borrow().sessions().len(),
            repository.backend_name()
        );
        ChatApp { store, orchestrator, sender, repository, bus }
    }

    // ─── Asking ──────────────────────────────────────────────

    pub fn send(&self, question: String) -> Promise {
        let sender = self.sender.clone();
        future_to_promise(async move {
            sender.send(&question).await.map_err(to_js)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    pub fn regenerate(&self, index: usize) -> Promise {
        let sender = self.sender.clone();
        future_to_promise(async move {
            sender.regenerate(index).await.map_err(to_js)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Send a preset message, or the default greeting when none is given.
    pub fn send_quick_message(&self, message: Option<String>) -> Promise {
        let sender = self.sender.clone();
        future_to_promise(async move {
            sender
                .send_quick_message(message.as_deref())
                .await
                .map_err(to_js)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    pub fn is_loading(&self) -> bool {
        self.store.borrow().is_generating()
    }

    // ─── Sessions ────────────────────────────────────────────

    /// Start a new empty chat; returns its id.
    pub fn new_chat(&self) -> String {
        let id = self.store.borrow_mut().create_session();
        self.bus.emit(ChatEvent::SessionsChanged);
        id
    }

    pub fn switch_session(&self, index: usize) -> Result<(), JsValue> {
        self.store.borrow_mut().switch_session(index).map_err(to_js)?;
        self.bus.emit(ChatEvent::SessionsChanged);
        Ok(())
    }

    pub fn delete_session(&self, index: usize) -> Result<(), JsValue> {
        self.store.borrow_mut().delete_session(index).map_err(to_js)?;
        self.bus.emit(ChatEvent::SessionsChanged);
        Ok(())
    }

    pub fn clear_current(&self) -> Result<(), JsValue> {
        self.store.borrow_mut().clear_current_messages().map_err(to_js)?;
        self.bus.emit(ChatEvent::SessionsChanged);
        Ok(())
    }

    pub fn sessions(&self) -> Result<JsValue, JsValue> {
        to_value(&self.store.borrow().summaries())
    }

    pub fn current_index(&self) -> usize {
        self.store.borrow().current_index()
    }

    pub fn current_session(&self) -> Result<JsValue, JsValue> {
        to_value(self.store.borrow().current_session())
    }

    /// Pending change notifications, oldest first.
    pub fn drain_events(&self) -> Result<JsValue, JsValue> {
        to_value(&self.bus.drain())
    }

    // ─── Settings ────────────────────────────────────────────

    pub fn settings(&self) -> Result<JsValue, JsValue> {
        to_value(&self.orchestrator.settings())
    }

    pub fn settings_json(&self) -> Result<String, JsValue> {
        serde_json::to_string_pretty(&self.orchestrator.settings())
            .map_err(|e| to_js(ChatError::from(e)))
    }

    /// Validate, persist and apply new settings. Runs already in flight
    /// finish with the settings they started with.
    pub fn update_settings(&self, value: JsValue) -> Result<(), JsValue> {
        let settings: ChatSettings = value
            .into_serde()
            .map_err(|e| to_js(ChatError::from(e)))?;
        self.apply_settings(settings)
    }

    pub fn reset_settings(&self) -> Result<(), JsValue> {
        self.apply_settings(ChatSettings::default())
    }

    /// Model names installed on the local inference server.
    pub fn list_local_models(&self) -> Promise {
        let adapter = self.orchestrator.local_adapter();
        future_to_promise(async move {
            let models = adapter.list_models().await.map_err(to_js)?;
            to_value(&models)
        })
    }
}

impl ChatApp {
    fn apply_settings(&self, settings: ChatSettings) -> Result<(), JsValue> {
        settings.validate().map_err(to_js)?;
        self.repository.save_settings(&settings).map_err(to_js)?;
        self.orchestrator.update_settings(settings);
        log::info!("settings updated (model: {})", self.orchestrator.settings().active_model());
        Ok(())
    }
}

fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    JsValue::from_serde(value).map_err(|e| to_js(ChatError::from(e)))
}

fn to_js(error: ChatError) -> JsValue {
    js_sys::Error::new(&error.to_string()).into()
}
