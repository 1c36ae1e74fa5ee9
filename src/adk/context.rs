// SPDX-License-Identifier: MIT

//! Invocation context handed to every agent and tool during a run

use crate::adk::agent::AgentEvent;
use crate::adk::state::SessionState;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Signal raised by a step to tell the enclosing loop whether to keep going
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoopControl {
    #[default]
    Continue,
    Stop,
}

/// Mutable per-run context: session state, loop signal and event sink
#[derive(Debug, Clone)]
pub struct InvocationContext {
    pub session_id: String,
    pub state: SessionState,
    control: LoopControl,
    events: Option<mpsc::Sender<AgentEvent>>,
}

impl InvocationContext {
    pub fn new(session_id: impl Into<String>, state: SessionState) -> Self {
        Self {
            session_id: session_id.into(),
            state,
            control: LoopControl::Continue,
            events: None,
        }
    }

    pub fn with_events(mut self, tx: mpsc::Sender<AgentEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    /// Ask the enclosing loop to stop after the current step
    pub fn escalate(&mut self) {
        self.control = LoopControl::Stop;
    }

    pub fn control(&self) -> LoopControl {
        self.control
    }

    /// Read and reset the loop signal
    pub fn take_control(&mut self) -> LoopControl {
        std::mem::take(&mut self.control)
    }

    /// Forward an event to the listener, if any. A closed receiver is ignored.
    pub async fn emit(&self, event: AgentEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_control_resets() {
        let mut ctx = InvocationContext::new("s1", SessionState::new());
        assert_eq!(ctx.control(), LoopControl::Continue);

        ctx.escalate();
        assert_eq!(ctx.take_control(), LoopControl::Stop);
        assert_eq!(ctx.take_control(), LoopControl::Continue);
    }

    #[tokio::test]
    async fn test_emit_without_listener_is_noop() {
        let ctx = InvocationContext::new("s1", SessionState::new());
        ctx.emit(AgentEvent::Log {
            author: "test".to_string(),
            message: "nobody hears this".to_string(),
        })
        .await;
    }

    #[tokio::test]
    async fn test_emit_forwards_to_listener() {
        let (tx, mut rx) = mpsc::channel(4);
        let ctx = InvocationContext::new("s1", SessionState::new()).with_events(tx);

        ctx.emit(AgentEvent::Log {
            author: "test".to_string(),
            message: "hello".to_string(),
        })
        .await;
        match rx.recv().await {
            Some(AgentEvent::Log { message, .. }) => assert_eq!(message, "hello"),
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
