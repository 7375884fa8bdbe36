//! Answer orchestrator: the fallback state machine.
//!
//! knowledge base (when enabled) → local model or remote model:
//! 1. Retrieve from the knowledge base; on a hit, stream the formatted
//!    documents and stop
//! 2. On a miss (or retrieval failure) build the bounded context
//! 3. Stream from the configured model backend
//!
//! Every run produces exactly one update stream ending in `Done` or `Error`.

use std::cell::RefCell;
use std::rc::Rc;
use futures::channel::mpsc;
use futures::stream::{self, LocalBoxStream};
use futures::{future, FutureExt, StreamExt};

use lanshan_types::{
    ChatError,
    config::ChatSettings,
    event::UpdateEvent,
    message::Message,
};
use crate::context::build_context;
use crate::knowledge::{KnowledgeRetriever, Retrieval};
use crate::ports::{HttpPort, TimerPort};
use crate::provider::{LocalAdapter, ProviderAdapter, RemoteAdapter};
use crate::sink::UpdateSink;
use crate::store::SendMode;

pub const STATUS_SEARCHING: &str = "Searching knowledge base...";
pub const STATUS_KNOWLEDGE_MISS: &str = "No knowledge base match, calling language model...";
pub const STATUS_CALLING_MODEL: &str = "Calling language model...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    RetrievingKnowledge,
    StreamingFromKnowledge,
    BuildingContext,
    StreamingFromModel,
    Done,
    Failed,
}

pub struct AnswerOrchestrator {
    settings: RefCell<ChatSettings>,
    http: Rc<dyn HttpPort>,
    timer: Rc<dyn TimerPort>,
}

impl AnswerOrchestrator {
    pub fn new(settings: ChatSettings, http: Rc<dyn HttpPort>, timer: Rc<dyn TimerPort>) -> Self {
        Self {
            settings: RefCell::new(settings),
            http,
            timer,
        }
    }

    /// Replace the settings used by subsequent runs. Runs already in flight
    /// keep the snapshot they started with.
    pub fn update_settings(&self, settings: ChatSettings) {
        *self.settings.borrow_mut() = settings;
    }

    pub fn settings(&self) -> ChatSettings {
        self.settings.borrow().clone()
    }

    /// Local adapter for the current settings (model listing, probes).
    pub fn local_adapter(&self) -> LocalAdapter {
        LocalAdapter::new(self.http.clone(), &self.settings.borrow())
    }

    /// Run the pipeline as a stream of updates.
    ///
    /// `history` must be the session messages including the placeholder the
    /// answer will stream into. The stream ends after the terminal event.
    pub fn answer_stream<'a>(
        &'a self,
        question: &'a str,
        history: &'a [Message],
        mode: SendMode,
    ) -> LocalBoxStream<'a, UpdateEvent> {
        let (tx, rx) = mpsc::unbounded();
        let producer = async move {
            let mut sink = UpdateSink::new(tx);
            self.run(question, history, mode, &mut sink).await;
        };
        stream::select(rx.map(Some), producer.into_stream().map(|()| None))
            .filter_map(future::ready)
            .boxed_local()
    }

    /// Drive one run into `sink`; returns the phases visited, in order.
    pub async fn run(
        &self,
        question: &str,
        history: &[Message],
        mode: SendMode,
        sink: &mut UpdateSink,
    ) -> Vec<Phase> {
        let settings = self.settings();
        let mut trail = vec![Phase::Idle];

        if settings.use_knowledge_base {
            enter(&mut trail, Phase::RetrievingKnowledge);
            sink.emit(UpdateEvent::Thinking(STATUS_SEARCHING.to_string()));

            let retriever = KnowledgeRetriever::new(self.http.clone(), self.timer.clone(), &settings);
            if let Retrieval::Found(documents) = retriever.retrieve(question).await {
                enter(&mut trail, Phase::StreamingFromKnowledge);
                retriever.stream_answer(question, &documents, sink).await;
                enter(&mut trail, Phase::Done);
                return trail;
            }
        }

        enter(&mut trail, Phase::BuildingContext);
        let status = if settings.use_knowledge_base {
            STATUS_KNOWLEDGE_MISS
        } else {
            STATUS_CALLING_MODEL
        };
        sink.emit(UpdateEvent::Thinking(status.to_string()));

        if let Err(e) = settings.validate() {
            sink.emit(UpdateEvent::Error(describe_failure(settings.use_local_model, &e)));
            enter(&mut trail, Phase::Failed);
            return trail;
        }

        let context = build_context(&settings.system_prompt, history, question, mode);
        let adapter: Box<dyn ProviderAdapter> = if settings.use_local_model {
            Box::new(LocalAdapter::new(self.http.clone(), &settings))
        } else {
            Box::new(RemoteAdapter::new(self.http.clone(), &settings))
        };
        log::info!(
            "streaming from {} with {} context message(s)",
            adapter.method(),
            context.len()
        );

        enter(&mut trail, Phase::StreamingFromModel);
        match adapter.stream_answer(context, sink).await {
            Ok(()) => {
                if !sink.is_finished() {
                    sink.emit(UpdateEvent::Done);
                }
                enter(&mut trail, Phase::Done);
            }
            Err(e) => {
                log::warn!("{} failed: {}", adapter.method(), e);
                sink.emit(UpdateEvent::Error(describe_failure(settings.use_local_model, &e)));
                enter(&mut trail, Phase::Failed);
            }
        }
        trail
    }
}

fn enter(trail: &mut Vec<Phase>, phase: Phase) {
    log::debug!("orchestrator: {:?} -> {:?}", trail.last(), phase);
    trail.push(phase);
}

/// Text shown as the failed answer.
pub fn describe_failure(local: bool, error: &ChatError) -> String {
    match error {
        ChatError::Auth(message) => message.clone(),
        _ if local => format!("Local model call failed: {}", error),
        _ => format!("Remote model call failed: {}", error),
    }
}
