//! The transcript store.
//!
//! The store owns the ordered list of messages and the session status.  It is
//! mutated only through the operations below, each of which notifies the
//! subscribed observers synchronously and in mutation order.  Rendering is an
//! observer concern; the store knows nothing about it.

use std::fmt;

use crate::types::{Message, MessageId, SessionStatus};

/// A change applied to the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEvent {
    /// A message was added at the end.
    Appended(Message),

    /// A model message's text was replaced with a new cumulative value.
    TextUpdated {
        /// The message that changed.
        id: MessageId,
        /// The full text after the change.
        text: String,
    },

    /// A model message was turned into an error message.
    Errored {
        /// The message that changed.
        id: MessageId,
        /// The error text now shown in its place.
        text: String,
    },

    /// The transcript was reset to a single greeting.
    Cleared {
        /// The fresh greeting.
        greeting: Message,
    },

    /// The session status changed.
    StatusChanged {
        /// The previous status.
        from: SessionStatus,
        /// The new status.
        to: SessionStatus,
    },
}

/// Receives every transcript mutation.
pub trait TranscriptObserver: Send {
    /// Called after the mutation has been applied.
    fn on_event(&mut self, event: &TranscriptEvent);
}

impl<F> TranscriptObserver for F
where
    F: FnMut(&TranscriptEvent) + Send,
{
    fn on_event(&mut self, event: &TranscriptEvent) {
        self(event)
    }
}

/// Handle returned by [`TranscriptStore::subscribe`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Ordered conversation plus its session status.
pub struct TranscriptStore {
    messages: Vec<Message>,
    status: SessionStatus,
    observers: Vec<(SubscriptionId, Box<dyn TranscriptObserver>)>,
    next_subscription: u64,
}

impl TranscriptStore {
    /// Creates a transcript holding only the greeting, with status `Idle`.
    pub fn new() -> Self {
        Self {
            messages: vec![Message::greeting()],
            status: SessionStatus::Idle,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Registers an observer for all future mutations.
    pub fn subscribe(&mut self, observer: impl TranscriptObserver + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Removes an observer.  Returns false if it was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    /// Adds a message at the end of the transcript.
    pub fn append(&mut self, message: Message) -> MessageId {
        let id = message.id();
        self.messages.push(message.clone());
        self.notify(&TranscriptEvent::Appended(message));
        id
    }

    /// Replaces the text of the model message `id` with `text`.
    ///
    /// `text` is the full accumulated value, not a delta.  Unknown ids and
    /// user messages are left alone and false is returned; a response that
    /// outlives a `clear` lands here.
    pub fn update_text(&mut self, id: MessageId, text: impl Into<String>) -> bool {
        let Some(message) = self.mutable_message(id) else {
            return false;
        };
        let text = text.into();
        message.text.clone_from(&text);
        self.notify(&TranscriptEvent::TextUpdated { id, text });
        true
    }

    /// Replaces the model message `id` with an error message.
    ///
    /// Same targeting rules as [`TranscriptStore::update_text`].
    pub fn mark_error(&mut self, id: MessageId, error_text: impl Into<String>) -> bool {
        let Some(message) = self.mutable_message(id) else {
            return false;
        };
        let text = error_text.into();
        message.text.clone_from(&text);
        message.is_error = true;
        self.notify(&TranscriptEvent::Errored { id, text });
        true
    }

    /// Resets the transcript to a single fresh greeting and returns its id.
    ///
    /// Confirmation is the caller's job.
    pub fn clear(&mut self) -> MessageId {
        let greeting = Message::greeting();
        let id = greeting.id();
        self.messages = vec![greeting.clone()];
        self.notify(&TranscriptEvent::Cleared { greeting });
        id
    }

    /// Moves the session to `status`, notifying only on change.
    pub fn set_status(&mut self, status: SessionStatus) {
        if self.status == status {
            return;
        }
        let from = std::mem::replace(&mut self.status, status);
        self.notify(&TranscriptEvent::StatusChanged { from, to: status });
    }

    /// The current session status.
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// The messages in conversation order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// An owned copy of the messages, for handing to the driver.
    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.clone()
    }

    /// Looks up a message by id.
    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|message| message.id() == id)
    }

    /// The number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True if there are no messages.  Never the case after construction.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn mutable_message(&mut self, id: MessageId) -> Option<&mut Message> {
        self.messages
            .iter_mut()
            .find(|message| message.id() == id)
            .filter(|message| message.is_mutable())
    }

    fn notify(&mut self, event: &TranscriptEvent) {
        for (_, observer) in self.observers.iter_mut() {
            observer.on_event(event);
        }
    }
}

impl Default for TranscriptStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TranscriptStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranscriptStore")
            .field("messages", &self.messages)
            .field("status", &self.status)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::persona::INITIAL_GREETING;
    use crate::types::Role;

    fn recording(store: &mut TranscriptStore) -> Arc<Mutex<Vec<TranscriptEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        store.subscribe(move |event: &TranscriptEvent| {
            sink.lock().unwrap().push(event.clone());
        });
        events
    }

    #[test]
    fn new_store_has_greeting() {
        let store = TranscriptStore::new();
        assert_eq!(store.len(), 1);
        assert_eq!(store.status(), SessionStatus::Idle);
        let greeting = &store.messages()[0];
        assert_eq!(greeting.role(), Role::Model);
        assert_eq!(greeting.text, INITIAL_GREETING);
        assert!(!greeting.is_error);
    }

    #[test]
    fn append_preserves_order() {
        let mut store = TranscriptStore::new();
        let first = store.append(Message::user("What is 2+2?"));
        let second = store.append(Message::placeholder());
        let ids: Vec<_> = store.messages().iter().map(Message::id).collect();
        assert_eq!(&ids[1..], &[first, second]);
    }

    #[test]
    fn update_text_replaces_not_appends() {
        let mut store = TranscriptStore::new();
        let id = store.append(Message::placeholder());
        assert!(store.update_text(id, "2"));
        assert!(store.update_text(id, "2+2=22"));
        assert_eq!(store.get(id).unwrap().text, "2+2=22");
    }

    #[test]
    fn update_text_unknown_id_is_noop() {
        let mut store = TranscriptStore::new();
        store.append(Message::user("hi"));
        let before = store.snapshot();
        let events = recording(&mut store);

        assert!(!store.update_text(MessageId::new(), "late chunk"));
        assert!(!store.mark_error(MessageId::new(), "late failure"));

        assert_eq!(store.snapshot(), before);
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn user_messages_cannot_be_mutated() {
        let mut store = TranscriptStore::new();
        let id = store.append(Message::user("explain gravity"));
        assert!(!store.update_text(id, "rewritten"));
        assert!(!store.mark_error(id, "broken"));
        let message = store.get(id).unwrap();
        assert_eq!(message.text, "explain gravity");
        assert!(!message.is_error);
    }

    #[test]
    fn mark_error_sets_flag_and_text() {
        let mut store = TranscriptStore::new();
        let id = store.append(Message::placeholder());
        store.update_text(id, "half an ans");
        assert!(store.mark_error(id, "it broke"));
        let message = store.get(id).unwrap();
        assert!(message.is_error);
        assert_eq!(message.text, "it broke");
    }

    #[test]
    fn clear_leaves_single_fresh_greeting() {
        let mut store = TranscriptStore::new();
        let mut seen: Vec<MessageId> = store.messages().iter().map(Message::id).collect();
        seen.push(store.append(Message::user("hi")));
        let reply = store.append(Message::placeholder());
        store.mark_error(reply, "oops");
        seen.push(reply);

        let greeting = store.clear();
        assert_eq!(store.len(), 1);
        assert_eq!(store.messages()[0].id(), greeting);
        assert!(!store.messages()[0].is_error);
        assert_eq!(store.messages()[0].text, INITIAL_GREETING);
        assert!(!seen.contains(&greeting));

        // A chunk from before the clear targets an id that no longer exists.
        assert!(!store.update_text(reply, "stale"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn status_notifies_only_on_change() {
        let mut store = TranscriptStore::new();
        let events = recording(&mut store);
        store.set_status(SessionStatus::Idle);
        store.set_status(SessionStatus::AwaitingFirstToken);
        store.set_status(SessionStatus::Streaming);
        store.set_status(SessionStatus::Streaming);
        store.set_status(SessionStatus::Idle);
        assert_eq!(
            *events.lock().unwrap(),
            vec![
                TranscriptEvent::StatusChanged {
                    from: SessionStatus::Idle,
                    to: SessionStatus::AwaitingFirstToken,
                },
                TranscriptEvent::StatusChanged {
                    from: SessionStatus::AwaitingFirstToken,
                    to: SessionStatus::Streaming,
                },
                TranscriptEvent::StatusChanged {
                    from: SessionStatus::Streaming,
                    to: SessionStatus::Idle,
                },
            ]
        );
    }

    #[test]
    fn observers_see_mutations_in_order() {
        let mut store = TranscriptStore::new();
        let events = recording(&mut store);
        let user = Message::user("hi");
        store.append(user.clone());
        let reply = store.append(Message::placeholder());
        store.update_text(reply, "hello is a fish");
        let greeting_id = store.clear();

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 4);
        assert_eq!(events[0], TranscriptEvent::Appended(user));
        assert!(matches!(&events[1], TranscriptEvent::Appended(m) if m.id() == reply));
        assert_eq!(
            events[2],
            TranscriptEvent::TextUpdated {
                id: reply,
                text: "hello is a fish".to_string(),
            }
        );
        assert!(
            matches!(&events[3], TranscriptEvent::Cleared { greeting } if greeting.id() == greeting_id)
        );
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let mut store = TranscriptStore::new();
        let events = Arc::new(Mutex::new(0usize));
        let sink = Arc::clone(&events);
        let sub = store.subscribe(move |_: &TranscriptEvent| {
            *sink.lock().unwrap() += 1;
        });
        store.append(Message::user("one"));
        assert!(store.unsubscribe(sub));
        assert!(!store.unsubscribe(sub));
        store.append(Message::user("two"));
        assert_eq!(*events.lock().unwrap(), 1);
    }
}
