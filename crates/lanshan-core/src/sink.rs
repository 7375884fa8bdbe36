//! Ordered update channel with the event-protocol invariants enforced.

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use lanshan_types::event::UpdateEvent;

/// Write side of one generation's update stream.
///
/// - `AnswerStart` passes at most once, and only before any answer or
///   terminal event.
/// - Nothing passes after `Done` or `Error`.
pub struct UpdateSink {
    tx: UnboundedSender<UpdateEvent>,
    started: bool,
    answering: bool,
    finished: bool,
}

impl UpdateSink {
    pub fn new(tx: UnboundedSender<UpdateEvent>) -> Self {
        Self {
            tx,
            started: false,
            answering: false,
            finished: false,
        }
    }

    /// A sink and the receiver its events arrive on.
    pub fn channel() -> (Self, UnboundedReceiver<UpdateEvent>) {
        let (tx, rx) = mpsc::unbounded();
        (Self::new(tx), rx)
    }

    /// Emit `AnswerStart(method)` unless one was already sent.
    pub fn start(&mut self, method: &str) {
        if !self.started {
            self.emit(UpdateEvent::AnswerStart(method.to_string()));
        }
    }

    /// Forward an event; returns false when the protocol drops it.
    pub fn emit(&mut self, event: UpdateEvent) -> bool {
        if self.finished {
            log::debug!("dropping {:?} after terminal event", event);
            return false;
        }
        match &event {
            UpdateEvent::AnswerStart(_) => {
                if self.started || self.answering {
                    log::debug!("dropping late {:?}", event);
                    return false;
                }
                self.started = true;
            }
            UpdateEvent::Answer(_) | UpdateEvent::ReplaceAnswer(_) => self.answering = true,
            UpdateEvent::Done | UpdateEvent::Error(_) => self.finished = true,
            UpdateEvent::Thinking(_) | UpdateEvent::Sources(_) => {}
        }
        if self.tx.unbounded_send(event).is_err() {
            // Receiver gone: the consumer stopped listening.
            self.finished = true;
            return false;
        }
        true
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}
