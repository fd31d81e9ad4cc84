//! Chat widget controller.
//!
//! Models the browser chat bubble: an open/closed surface, a rendered
//! transcript and one [`ChatSession`] holding the history sent to the proxy.
//! Every `open()` starts a fresh session. A session allows one exchange in
//! flight at a time; replies that arrive for a replaced session are dropped.

mod transport;

pub use transport::{ChatTransport, HttpChatTransport, TransportError};

use log::{debug, warn};
use thiserror::Error;
use uuid::Uuid;

use crate::web::models::{ChatProxyRequest, ChatProxyResponse, ChatTurn, Message};

pub const GREETING: &str = "Hi, I’m Twekee. How can I help you today?";
pub const LOADING: &str = "…";
pub const EMPTY_REPLY: &str =
    "I’m Twekee. I couldn’t generate a proper response just now. Please try again.";
pub const STATUS_APOLOGY: &str =
    "Sorry, I had trouble connecting to Twekee's brain right now. Please try again in a moment.";
pub const NETWORK_APOLOGY: &str =
    "Network error while talking to Twekee. Please check your connection and try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetState {
    Closed,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Author {
    User,
    Bot,
}

/// One rendered bubble in the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub author: Author,
    pub text: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WidgetError {
    #[error("message is empty")]
    EmptyMessage,
    #[error("chat window is closed")]
    Closed,
    #[error("a message is already being answered")]
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Replied(String),
    Failed(String),
    /// The session was replaced while the request was in flight.
    Discarded,
}

#[derive(Debug)]
pub struct ChatSession {
    id: Uuid,
    history: Vec<Message>,
    in_flight: bool,
}

impl ChatSession {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            history: vec![Message::assistant(GREETING)],
            in_flight: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight
    }
}

/// A send that has been rendered and is waiting for the proxy.
#[derive(Debug)]
pub struct PendingExchange {
    session_id: Uuid,
    placeholder: usize,
    pub request: ChatProxyRequest,
}

pub struct ChatWidget<T> {
    transport: T,
    state: WidgetState,
    session: Option<ChatSession>,
    transcript: Vec<Entry>,
}

impl<T: ChatTransport> ChatWidget<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            state: WidgetState::Closed,
            session: None,
            transcript: Vec::new(),
        }
    }

    pub fn state(&self) -> WidgetState {
        self.state
    }

    pub fn session(&self) -> Option<&ChatSession> {
        self.session.as_ref()
    }

    pub fn history(&self) -> &[Message] {
        self.session.as_ref().map(ChatSession::history).unwrap_or(&[])
    }

    pub fn transcript(&self) -> &[Entry] {
        &self.transcript
    }

    pub fn open(&mut self) {
        let session = ChatSession::new();
        debug!("Opening chat session {}", session.id);
        self.state = WidgetState::Open;
        self.transcript.clear();
        self.transcript.push(Entry { author: Author::Bot, text: GREETING.to_string() });
        self.session = Some(session);
    }

    pub fn close(&mut self) {
        self.state = WidgetState::Closed;
    }

    /// Renders the user turn and a loading bubble, and marks the session busy.
    pub fn begin_send(&mut self, input: &str) -> Result<PendingExchange, WidgetError> {
        let text = input.trim();
        if text.is_empty() {
            return Err(WidgetError::EmptyMessage);
        }
        if self.state == WidgetState::Closed {
            return Err(WidgetError::Closed);
        }
        let session = self.session.as_mut().ok_or(WidgetError::Closed)?;
        if session.in_flight {
            return Err(WidgetError::Busy);
        }
        session.in_flight = true;

        let request = ChatProxyRequest {
            message: text.to_string(),
            history: session.history.iter().cloned().map(ChatTurn::from).collect(),
        };
        let session_id = session.id;

        self.transcript.push(Entry { author: Author::User, text: text.to_string() });
        self.transcript.push(Entry { author: Author::Bot, text: LOADING.to_string() });

        Ok(PendingExchange {
            session_id,
            placeholder: self.transcript.len() - 1,
            request,
        })
    }

    /// Applies the proxy's answer. History only changes on success.
    pub fn complete_send(
        &mut self,
        pending: PendingExchange,
        result: Result<ChatProxyResponse, TransportError>,
    ) -> SendOutcome {
        let session = match self.session.as_mut() {
            Some(session) if session.id == pending.session_id => session,
            _ => {
                debug!("Dropping reply for replaced session {}", pending.session_id);
                return SendOutcome::Discarded;
            }
        };
        session.in_flight = false;

        let outcome = match result {
            Ok(response) => {
                let reply = if response.reply.is_empty() {
                    EMPTY_REPLY.to_string()
                } else {
                    response.reply
                };
                session.history.push(Message::user(pending.request.message));
                session.history.push(Message::assistant(reply.clone()));
                SendOutcome::Replied(reply)
            }
            Err(TransportError::Status(status)) => {
                warn!("Chat proxy answered {}", status);
                SendOutcome::Failed(STATUS_APOLOGY.to_string())
            }
            Err(e) => {
                warn!("Twekee widget error: {}", e);
                SendOutcome::Failed(NETWORK_APOLOGY.to_string())
            }
        };

        if let Some(entry) = self.transcript.get_mut(pending.placeholder) {
            entry.text = match &outcome {
                SendOutcome::Replied(text) | SendOutcome::Failed(text) => text.clone(),
                SendOutcome::Discarded => LOADING.to_string(),
            };
        }
        outcome
    }

    pub async fn send(&mut self, input: &str) -> Result<SendOutcome, WidgetError> {
        let pending = self.begin_send(input)?;
        let result = self.transport.post_chat(&pending.request).await;
        Ok(self.complete_send(pending, result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeTransport {
        replies: Mutex<VecDeque<Result<ChatProxyResponse, TransportError>>>,
        requests: Mutex<Vec<(String, Vec<ChatTurn>)>>,
    }

    impl FakeTransport {
        fn with(replies: Vec<Result<ChatProxyResponse, TransportError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::default(),
            }
        }
    }

    #[async_trait]
    impl ChatTransport for FakeTransport {
        async fn post_chat(
            &self,
            request: &ChatProxyRequest,
        ) -> Result<ChatProxyResponse, TransportError> {
            self.requests
                .lock()
                .unwrap()
                .push((request.message.clone(), request.history.clone()));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::Network("no reply scripted".into())))
        }
    }

    fn reply(text: &str) -> Result<ChatProxyResponse, TransportError> {
        Ok(ChatProxyResponse { reply: text.to_string() })
    }

    fn texts(widget: &ChatWidget<FakeTransport>) -> Vec<&str> {
        widget.transcript().iter().map(|e| e.text.as_str()).collect()
    }

    #[test]
    fn open_starts_with_greeting() {
        let mut widget = ChatWidget::new(FakeTransport::default());
        assert_eq!(widget.state(), WidgetState::Closed);
        assert!(widget.history().is_empty());

        widget.open();
        assert_eq!(widget.state(), WidgetState::Open);
        assert_eq!(widget.history(), &[Message::assistant(GREETING)]);
        assert_eq!(texts(&widget), vec![GREETING]);
    }

    #[tokio::test]
    async fn round_trip_records_user_and_assistant_turns() {
        let mut widget = ChatWidget::new(FakeTransport::with(vec![reply("Hello!"), reply("Sure.")]));
        widget.open();

        let outcome = widget.send("  hi  ").await.unwrap();
        assert_eq!(outcome, SendOutcome::Replied("Hello!".to_string()));
        assert_eq!(texts(&widget), vec![GREETING, "hi", "Hello!"]);
        assert_eq!(widget.transcript()[1].author, Author::User);
        assert_eq!(
            widget.history(),
            &[
                Message::assistant(GREETING),
                Message::user("hi"),
                Message::assistant("Hello!"),
            ]
        );

        widget.send("more").await.unwrap();
        let requests = widget.transport.requests.lock().unwrap();
        assert_eq!(
            requests[0],
            ("hi".to_string(), vec![ChatTurn::from(Message::assistant(GREETING))])
        );
        assert_eq!(requests[1].0, "more");
        assert_eq!(requests[1].1.len(), 3);
    }

    #[tokio::test]
    async fn empty_input_never_reaches_transport() {
        let mut widget = ChatWidget::new(FakeTransport::default());
        widget.open();
        assert_eq!(widget.send("   ").await, Err(WidgetError::EmptyMessage));
        assert!(widget.transport.requests.lock().unwrap().is_empty());
        assert_eq!(widget.transcript().len(), 1);
    }

    #[tokio::test]
    async fn closed_widget_rejects_send() {
        let mut widget = ChatWidget::new(FakeTransport::default());
        assert_eq!(widget.send("hi").await, Err(WidgetError::Closed));
        widget.open();
        widget.close();
        assert_eq!(widget.send("hi").await, Err(WidgetError::Closed));
    }

    #[tokio::test]
    async fn network_failure_shows_apology_and_keeps_history() {
        let mut widget = ChatWidget::new(FakeTransport::with(vec![Err(TransportError::Network(
            "connection refused".into(),
        ))]));
        widget.open();
        let before = widget.history().len();

        let outcome = widget.send("hi").await.unwrap();
        assert_eq!(outcome, SendOutcome::Failed(NETWORK_APOLOGY.to_string()));
        assert_eq!(texts(&widget), vec![GREETING, "hi", NETWORK_APOLOGY]);
        assert_eq!(widget.history().len(), before);
        assert!(!widget.session().unwrap().is_busy());
    }

    #[tokio::test]
    async fn error_status_shows_connection_apology() {
        let mut widget = ChatWidget::new(FakeTransport::with(vec![Err(TransportError::Status(502))]));
        widget.open();
        let outcome = widget.send("hi").await.unwrap();
        assert_eq!(outcome, SendOutcome::Failed(STATUS_APOLOGY.to_string()));
        assert_eq!(widget.history().len(), 1);
    }

    #[tokio::test]
    async fn empty_reply_uses_fallback_text() {
        let mut widget = ChatWidget::new(FakeTransport::with(vec![reply("")]));
        widget.open();
        let outcome = widget.send("hi").await.unwrap();
        assert_eq!(outcome, SendOutcome::Replied(EMPTY_REPLY.to_string()));
        assert_eq!(widget.history().last(), Some(&Message::assistant(EMPTY_REPLY)));
    }

    #[test]
    fn overlapping_sends_are_rejected() {
        let mut widget = ChatWidget::new(FakeTransport::default());
        widget.open();

        let pending = widget.begin_send("first").unwrap();
        assert_eq!(texts(&widget), vec![GREETING, "first", LOADING]);
        assert_eq!(widget.begin_send("second").unwrap_err(), WidgetError::Busy);

        widget.complete_send(pending, reply("one"));
        assert!(widget.begin_send("second").is_ok());
    }

    #[test]
    fn reopen_discards_history_and_stale_replies() {
        let mut widget = ChatWidget::new(FakeTransport::default());
        widget.open();
        let first_session = widget.session().unwrap().id();
        let pending = widget.begin_send("hi").unwrap();

        widget.close();
        widget.open();
        assert_ne!(widget.session().unwrap().id(), first_session);
        assert_eq!(widget.history(), &[Message::assistant(GREETING)]);

        assert_eq!(widget.complete_send(pending, reply("late")), SendOutcome::Discarded);
        assert_eq!(texts(&widget), vec![GREETING]);
        assert_eq!(widget.history().len(), 1);
        assert!(!widget.session().unwrap().is_busy());
    }

    #[test]
    fn close_keeps_transcript_until_next_open() {
        let mut widget = ChatWidget::new(FakeTransport::default());
        widget.open();
        let pending = widget.begin_send("hi").unwrap();
        widget.complete_send(pending, reply("hey"));

        widget.close();
        assert_eq!(widget.state(), WidgetState::Closed);
        assert_eq!(widget.history().len(), 3);
        assert_eq!(widget.transcript().len(), 3);
    }
}
