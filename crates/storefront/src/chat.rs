//! Scripted FAQ chat widget.
//!
//! Replies come from a fixed keyword script; nothing is sent anywhere.
//! The transcript lives in the session so the widget survives navigation.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::models::session_keys;

/// Maximum messages kept in a transcript; older ones are dropped.
pub const MAX_MESSAGES: usize = 50;

/// Longest visitor message kept, in characters. Longer input is cut.
pub const MAX_MESSAGE_CHARS: usize = 500;

/// First bot message of every transcript.
pub const WELCOME: &str = "Hi! How can we help you today? 😊";

const GREETING_WORDS: &[&str] = &["hello", "hi", "hey"];

/// Keyword rules after the greeting check, in priority order.
const RULES: &[(&[&str], &str)] = &[
    (
        &["book", "appointment"],
        "Great! You can book an appointment by clicking \"Book Now\" in our menu. We offer premium haircuts and grooming services! 📅",
    ),
    (
        &["price", "cost", "rates"],
        "Our services start from affordable rates! Check out our Services page for detailed pricing, or I can help you choose the perfect service. 💰",
    ),
    (
        &["hours", "open", "timing"],
        "We are open 7 days a week! Visit our shop or book online for your convenience. ⏰",
    ),
    (
        &["location", "where", "address"],
        "We have multiple locations! You can select your preferred location when booking an appointment. 📍",
    ),
    (
        &["service", "haircut", "grooming"],
        "We offer premium haircuts, beard grooming, hair styling, and much more! Check our Services page to explore all options. ✨",
    ),
    (
        &["product", "shop"],
        "Yes! We have premium grooming products available. Visit our Products section to browse our collection! 🛍️",
    ),
    (
        &["thank"],
        "You're welcome! Feel free to ask anything else. We're here to help! 😊",
    ),
];

const GREETING_REPLY: &str =
    "Hello! Welcome to DeLegends Barber Shop! How can I assist you today? ✂️";

const FALLBACK_REPLY: &str = "Thanks for your message! For specific inquiries, please check our website or contact us directly. We're here to help! 💬";

/// Scripted reply to a visitor message. The first matching rule wins.
///
/// Greetings only match whole words, so "shipping" is not a "hi".
#[must_use]
pub fn reply(message: &str) -> &'static str {
    let message = message.to_lowercase();

    let greets = message
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| GREETING_WORDS.contains(&word));
    if greets {
        return GREETING_REPLY;
    }

    RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| message.contains(k)))
        .map_or(FALLBACK_REPLY, |(_, reply)| reply)
}

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
}

impl ChatMessage {
    #[must_use]
    pub fn is_bot(&self) -> bool {
        self.sender == Sender::Bot
    }
}

/// Bounded chat history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTranscript {
    messages: Vec<ChatMessage>,
}

impl Default for ChatTranscript {
    fn default() -> Self {
        Self {
            messages: vec![ChatMessage {
                sender: Sender::Bot,
                text: WELCOME.to_string(),
            }],
        }
    }
}

impl ChatTranscript {
    /// Load the transcript, starting a new one when absent.
    pub async fn load(session: &Session) -> Self {
        crate::stores::load_or_default(session, session_keys::CHAT).await
    }

    /// Persist the transcript.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub async fn save(&self, session: &Session) -> Result<(), tower_sessions::session::Error> {
        crate::stores::store(session, session_keys::CHAT, self).await
    }

    /// Record a visitor message and the scripted reply.
    ///
    /// Blank input is ignored and long input is cut to
    /// [`MAX_MESSAGE_CHARS`]; returns whether anything was added.
    pub fn ask(&mut self, message: &str) -> bool {
        let message = message.trim();
        if message.is_empty() {
            return false;
        }

        let message: String = message.chars().take(MAX_MESSAGE_CHARS).collect();
        let answer = reply(&message);
        self.push(Sender::User, message);
        self.push(Sender::Bot, answer.to_string());
        true
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    fn push(&mut self, sender: Sender, text: String) {
        self.messages.push(ChatMessage { sender, text });
        if self.messages.len() > MAX_MESSAGES {
            let excess = self.messages.len() - MAX_MESSAGES;
            self.messages.drain(..excess);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::stores::test_session;

    #[test]
    fn test_greeting_matches_whole_words_only() {
        assert_eq!(reply("Hi there"), GREETING_REPLY);
        assert_eq!(reply("hey!"), GREETING_REPLY);
        assert_eq!(reply("Do you offer shipping?"), FALLBACK_REPLY);
        assert!(reply("Which products do you sell?").starts_with("Yes! We have premium"));
        assert_eq!(reply("this"), FALLBACK_REPLY);
    }

    #[test]
    fn test_rule_priority() {
        // "book" wins over "price"
        assert!(reply("How much to book a haircut, what's the price?").starts_with("Great!"));
        assert!(reply("What are your opening hours").starts_with("We are open"));
        assert!(reply("Where are you?").starts_with("We have multiple locations"));
        assert!(reply("thanks a lot").starts_with("You're welcome"));
        assert_eq!(reply("?"), FALLBACK_REPLY);
    }

    #[test]
    fn test_transcript_starts_with_welcome_and_ignores_blank() {
        let mut transcript = ChatTranscript::default();
        assert_eq!(transcript.messages().len(), 1);
        assert!(transcript.messages()[0].is_bot());

        assert!(!transcript.ask("   "));
        assert_eq!(transcript.messages().len(), 1);

        assert!(transcript.ask("hello"));
        assert_eq!(transcript.messages().len(), 3);
        assert_eq!(transcript.messages()[1].sender, Sender::User);
        assert_eq!(transcript.messages()[2].text, GREETING_REPLY);
    }

    #[test]
    fn test_transcript_is_capped() {
        let mut transcript = ChatTranscript::default();
        for i in 0..40 {
            transcript.ask(&format!("question {i}"));
        }
        assert_eq!(transcript.messages().len(), MAX_MESSAGES);
        assert_eq!(transcript.messages().last().unwrap().text, FALLBACK_REPLY);
    }

    #[test]
    fn test_long_message_is_cut() {
        let mut transcript = ChatTranscript::default();
        let long = "ą".repeat(MAX_MESSAGE_CHARS * 4);
        assert!(transcript.ask(&format!("  {long}  ")));

        let kept = &transcript.messages()[1].text;
        assert_eq!(kept.chars().count(), MAX_MESSAGE_CHARS);
        assert!(kept.chars().all(|c| c == 'ą'));
    }

    #[tokio::test]
    async fn test_transcript_persists() {
        let session = test_session();
        let mut transcript = ChatTranscript::load(&session).await;
        transcript.ask("where is the shop");
        transcript.save(&session).await.unwrap();

        assert_eq!(ChatTranscript::load(&session).await.messages().len(), 3);
    }
}
