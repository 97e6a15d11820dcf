use uuid::Uuid;

use crate::models::Message;

/// Ordered message log plus the single-in-flight send guard. Insertion order
/// is display order.
#[derive(Default)]
pub struct Conversation {
    messages: Vec<Message>,
    in_flight: bool,
}

impl Conversation {
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Accepts a send: appends the immutable user message and the typing
    /// placeholder, and arms the guard. Returns the placeholder id, or
    /// `None` when the input is blank or another send is still pending.
    pub fn begin_send(&mut self, input: &str) -> Option<Uuid> {
        let trimmed = input.trim();
        if trimmed.is_empty() || self.in_flight {
            return None;
        }

        self.messages.push(Message::user(trimmed.to_string()));
        let placeholder = Message::typing_placeholder();
        let id = placeholder.id;
        self.messages.push(placeholder);
        self.in_flight = true;
        Some(id)
    }

    /// Resolves the pending turn: the placeholder is rewritten in place and
    /// the guard is released.
    pub fn resolve(&mut self, id: Uuid, text: String, citations: Vec<String>) {
        if let Some(msg) = self.messages.iter_mut().find(|m| m.id == id) {
            msg.content = text;
            msg.citations = citations;
            msg.is_typing = false;
        }
        self.in_flight = false;
    }

    /// Empties the log. Refused while a send is pending so the in-flight
    /// resolution cannot land on a vanished placeholder.
    pub fn clear(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        self.messages.clear();
        true
    }
}
