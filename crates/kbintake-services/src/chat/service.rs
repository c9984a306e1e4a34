use super::conversation::{build_conversation_context, conversation_summary, ConversationSummary};
use crate::agent::AgentRuntime;
use kbintake_core::format::text_preview;
use kbintake_core::models::{AgentReply, AgentTarget, ChatMessage, ChatSession};
use kbintake_core::{
    mask_for_log, sanitize_text_input, AppError, ContentSanitizer, TextInputPolicy,
};
use std::sync::Arc;

const LOG_PREVIEW_CHARS: usize = 100;

/// One answered question.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    /// The cleaned input as stored in the session history.
    pub input: String,
    pub reply: AgentReply,
    /// PII matches masked out of the prompt before it was sent.
    pub prompt_redactions: usize,
}

#[derive(Clone)]
pub struct ChatService {
    agent: Arc<dyn AgentRuntime>,
    target: AgentTarget,
    text_policy: TextInputPolicy,
    sanitizer: ContentSanitizer,
    mask_outgoing_pii: bool,
}

impl ChatService {
    pub fn new(
        agent: Arc<dyn AgentRuntime>,
        target: AgentTarget,
        text_policy: TextInputPolicy,
    ) -> Self {
        Self {
            agent,
            target,
            text_policy,
            sanitizer: ContentSanitizer::new(),
            mask_outgoing_pii: true,
        }
    }

    /// Whether PII is masked in the prompt before it is sent to the agent.
    pub fn with_outgoing_pii_masking(mut self, enabled: bool) -> Self {
        self.mask_outgoing_pii = enabled;
        self
    }

    pub fn with_sanitizer(mut self, sanitizer: ContentSanitizer) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    pub fn target(&self) -> &AgentTarget {
        &self.target
    }

    /// Ask the agent a question within `session`.
    ///
    /// The input is cleaned, recorded in the history, rendered together with
    /// the recent history into a prompt and sent with the session id. The
    /// reply is recorded as well. When the agent call fails the question stays
    /// in the history and the error is returned.
    pub async fn ask(
        &self,
        session: &mut ChatSession,
        raw_input: &str,
    ) -> Result<ChatTurn, AppError> {
        let mut input = sanitize_text_input(raw_input, &self.text_policy)?;
        let mut prompt_redactions = 0;
        if self.mask_outgoing_pii {
            let masked = self.sanitizer.sanitize(&input);
            prompt_redactions += masked.redaction_count();
            input = masked.into_string();
        }

        let prior = session.messages.len();
        session.messages.push(ChatMessage::user(input.clone()));

        // History may hold replies or context messages that were never masked.
        let context = build_conversation_context(&session.messages[..prior], &input);
        let prompt = if self.mask_outgoing_pii {
            let masked = self.sanitizer.sanitize(&context);
            prompt_redactions += masked.redaction_count();
            masked.into_string()
        } else {
            context
        };

        tracing::info!(
            session_id = %session.session_id,
            agent_id = %self.target.agent_id,
            history_messages = prior,
            prompt_redactions,
            input = %text_preview(&mask_for_log(&input), LOG_PREVIEW_CHARS),
            "Invoking agent"
        );

        let reply = self
            .agent
            .invoke(&self.target, &session.session_id, &prompt)
            .await
            .inspect_err(|e| {
                tracing::error!(
                    error = %e,
                    session_id = %session.session_id,
                    "Agent invocation failed"
                )
            })?;

        tracing::info!(
            session_id = %session.session_id,
            citations = reply.citations.len(),
            reply = %text_preview(&mask_for_log(&reply.text), LOG_PREVIEW_CHARS),
            "Agent replied"
        );

        session.messages.push(ChatMessage::assistant(reply.text.clone()));

        Ok(ChatTurn {
            input,
            reply,
            prompt_redactions,
        })
    }

    pub fn summary(&self, session: &ChatSession) -> ConversationSummary {
        conversation_summary(&session.messages)
    }
}
