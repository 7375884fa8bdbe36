//! Message sender: joins the session store and the orchestrator.
//!
//! One send: open a generation in the store, consume the orchestrator's
//! update stream applying each event in arrival order, then close the
//! generation. The store flag is cleared on every path out of a run.
//!
//! There is no cancellation: once started, a run lasts until the transport
//! completes or fails.

use std::cell::RefCell;
use std::rc::Rc;
use futures::StreamExt;

use lanshan_types::{Result, event::ChatEvent};
use crate::event_bus::EventBus;
use crate::orchestrator::AnswerOrchestrator;
use crate::store::{Generation, SessionStore};

pub const DEFAULT_GREETING: &str = "Hello, I'm Lanshan AI. What can I help you with?";

#[derive(Clone)]
pub struct MessageSender {
    store: Rc<RefCell<SessionStore>>,
    orchestrator: Rc<AnswerOrchestrator>,
    bus: EventBus,
}

impl MessageSender {
    pub fn new(
        store: Rc<RefCell<SessionStore>>,
        orchestrator: Rc<AnswerOrchestrator>,
        bus: EventBus,
    ) -> Self {
        Self { store, orchestrator, bus }
    }

    /// Ask `question` in the current session.
    ///
    /// Errors only for rejected input (empty question, generation already in
    /// flight). Backend failures end up as the answer text instead.
    pub async fn send(&self, question: &str) -> Result<()> {
        let generation = self.store.borrow_mut().begin_generation(question)?;
        self.drive(generation).await;
        Ok(())
    }

    /// Re-answer the question preceding the assistant message at `index`.
    pub async fn regenerate(&self, index: usize) -> Result<()> {
        let generation = self.store.borrow_mut().begin_regeneration(index)?;
        self.drive(generation).await;
        Ok(())
    }

    pub async fn send_quick_message(&self, message: Option<&str>) -> Result<()> {
        self.send(message.unwrap_or(DEFAULT_GREETING)).await
    }

    async fn drive(&self, mut generation: Generation) {
        let session_id = generation.session_id.clone();
        let message_index = generation.message_index;
        let question = generation.question.clone();
        let history = std::mem::take(&mut generation.history);
        log::info!("generating answer in session {}", session_id);

        self.bus.emit(ChatEvent::GenerationStarted {
            session_id: session_id.clone(),
            message_index,
        });

        let mut updates = self.orchestrator.answer_stream(&question, &history, generation.mode);
        while let Some(event) = updates.next().await {
            let terminal = event.is_terminal();
            let applied = self
                .store
                .borrow_mut()
                .apply_update(&mut generation, event.clone());
            if applied {
                self.bus.emit(ChatEvent::Update {
                    session_id: session_id.clone(),
                    message_index,
                    event,
                });
            }
            if terminal {
                break;
            }
        }
        drop(updates);

        self.store.borrow_mut().finish_generation(&generation);
        self.bus.emit(ChatEvent::GenerationFinished { session_id });
    }
}
