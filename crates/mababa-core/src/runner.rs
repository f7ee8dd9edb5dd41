//! In-memory runner session
//!
//! A [`Session`] keeps the turns of one conversation; [`Runner`] feeds each
//! new request to the orchestrator together with the recent turns as
//! history. Nothing is persisted.

use crate::error::Result;
use crate::orchestrator::{ConsultancyResponse, Orchestrator};
use chrono::{DateTime, Utc};
use mababa_llm::Message;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Turns of history handed to agents by default
pub const DEFAULT_HISTORY_TURNS: usize = 5;

/// One request and the reply shown for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// User request
    pub request: String,
    /// Rendered reply
    pub reply: String,
    /// When the reply was produced
    pub at: DateTime<Utc>,
}

/// A conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Session id
    pub id: Uuid,
    /// Completed turns, oldest first
    pub turns: Vec<Turn>,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            turns: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

impl Session {
    /// Fresh session
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The last `limit` turns as alternating user/assistant messages
    #[must_use]
    pub fn history(&self, limit: usize) -> Vec<Message> {
        let skip = self.turns.len().saturating_sub(limit);
        self.turns
            .iter()
            .skip(skip)
            .flat_map(|turn| [Message::user(&turn.request), Message::assistant(&turn.reply)])
            .collect()
    }
}

/// Drives sessions through an orchestrator
pub struct Runner {
    orchestrator: Arc<Orchestrator>,
    history_turns: usize,
}

impl Runner {
    /// Runner over `orchestrator`
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self {
            orchestrator,
            history_turns: DEFAULT_HISTORY_TURNS,
        }
    }

    /// Set how many earlier turns agents see
    #[must_use]
    pub fn with_history_turns(mut self, turns: usize) -> Self {
        self.history_turns = turns;
        self
    }

    /// Start a session
    #[must_use]
    pub fn new_session(&self) -> Session {
        let session = Session::new();
        debug!(session_id = %session.id, "Session started");
        session
    }

    /// Run one turn; the turn is recorded only when the orchestrator answers
    pub async fn run(&self, session: &mut Session, request: &str) -> Result<ConsultancyResponse> {
        let history = session.history(self.history_turns);
        let response = self.orchestrator.respond(request, &history).await?;

        session.turns.push(Turn {
            request: request.to_string(),
            reply: response.text.clone(),
            at: Utc::now(),
        });
        debug!(session_id = %session.id, turns = session.turns.len(), "Turn recorded");
        Ok(response)
    }

    /// The orchestrator behind this runner
    #[must_use]
    pub fn orchestrator(&self) -> &Arc<Orchestrator> {
        &self.orchestrator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{AgentCatalog, ModelSettings};
    use crate::artifacts::ProductPolicy;
    use crate::orchestrator::{OrchestratorConfig, IDENTITY_RESPONSE};
    use mababa_llm::{MessageRole, MockProvider, ScriptedReply};
    use mababa_tools::ToolRegistry;

    fn runner(mock: &Arc<MockProvider>) -> Runner {
        let catalog =
            AgentCatalog::builtin(&ModelSettings::default(), &ProductPolicy::default()).unwrap();
        let orchestrator = Orchestrator::new(
            mock.clone(),
            Arc::new(ToolRegistry::new()),
            catalog,
            OrchestratorConfig::default(),
        )
        .unwrap();
        Runner::new(Arc::new(orchestrator))
    }

    #[test]
    fn test_history_keeps_last_turns() {
        let mut session = Session::new();
        for i in 0..3 {
            session.turns.push(Turn {
                request: format!("q{i}"),
                reply: format!("a{i}"),
                at: Utc::now(),
            });
        }

        let history = session.history(2);
        let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["q1", "a1", "q2", "a2"]);
        assert_eq!(history[0].role, MessageRole::User);
        assert_eq!(history[1].role, MessageRole::Assistant);
        assert!(session.history(0).is_empty());
    }

    #[tokio::test]
    async fn test_turns_feed_later_history() {
        let mock = Arc::new(MockProvider::new().with_reply_for(
            "cope with the everyday challenges",
            ScriptedReply::text("## After Pregnancy\nAsk for help."),
        ));
        let runner = runner(&mock);
        let mut session = runner.new_session();

        let first = runner.run(&mut session, "what is your name").await.unwrap();
        assert_eq!(first.text, IDENTITY_RESPONSE);

        runner
            .run(&mut session, "How do I cope with sleepless nights")
            .await
            .unwrap();

        assert_eq!(session.turns.len(), 2);
        assert_eq!(session.turns[0].reply, IDENTITY_RESPONSE);
        // system + earlier turn (user, assistant) + request
        assert_eq!(mock.requests()[0].message_count, 4);
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let mock = Arc::new(MockProvider::new());
        let runner = runner(&mock);
        let mut a = runner.new_session();
        let b = runner.new_session();

        runner.run(&mut a, "who are you").await.unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(a.turns.len(), 1);
        assert!(b.turns.is_empty());
    }
}
