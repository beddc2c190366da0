//! Keypad menu model and announcement.

use std::collections::HashSet;

use ivm_twiml::{Gather, Method, VoiceResponse};

use crate::action::Handler;
use crate::context::CallContext;
use crate::error::{MenuError, PromptError};
use crate::message::Message;

/// Seconds the provider waits for a keypress.
pub const GATHER_TIMEOUT_SECONDS: u32 = 120;

/// One menu option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    prompt: String,
    handler: Handler,
}

impl MenuEntry {
    /// `prompt` completes the sentence "Press 1 ...", e.g. "to play the
    /// message again". It is a template and may reference variables.
    pub fn new(prompt: impl Into<String>, handler: Handler) -> Self {
        Self {
            prompt: prompt.into(),
            handler,
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn handler(&self) -> Handler {
        self.handler
    }
}

/// Keypad keys mapped to entries, in the order they are read aloud.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu {
    entries: Vec<(String, MenuEntry)>,
}

impl Menu {
    /// Builds a menu, keeping the given order.
    ///
    /// # Errors
    ///
    /// Fails if a key is not a single keypad symbol or appears twice.
    pub fn new<K, I>(entries: I) -> Result<Self, MenuError>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, MenuEntry)>,
    {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for (key, entry) in entries {
            let key = key.into();
            if !is_keypad_key(&key) {
                return Err(MenuError::InvalidKey(key));
            }
            if !seen.insert(key.clone()) {
                return Err(MenuError::DuplicateKey(key));
            }
            out.push((key, entry));
        }
        Ok(Self { entries: out })
    }

    /// The menu offered on every call.
    pub fn standard() -> Self {
        let entries = [
            (
                "1",
                MenuEntry::new("to play the message again", Handler::SayMessage(Message::Main)),
            ),
            (
                "2",
                MenuEntry::new(
                    "for the sender's email address",
                    Handler::SayMessage(Message::EmailAddress),
                ),
            ),
            (
                "3",
                MenuEntry::new(
                    "to record a voice message to be sent back",
                    Handler::PromptVoiceReply,
                ),
            ),
        ];
        Self {
            entries: entries
                .into_iter()
                .map(|(key, entry)| (key.to_string(), entry))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&MenuEntry> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, entry)| entry)
    }

    /// The handler for `keypress`, or [`Handler::ReturnToMenu`] when no entry
    /// matches. Empty and multi-digit input never match.
    pub fn handler_for(&self, keypress: &str) -> Handler {
        self.get(keypress)
            .map(MenuEntry::handler)
            .unwrap_or(Handler::ReturnToMenu)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MenuEntry)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The spoken option list, one fragment per entry.
    pub fn option_lines(&self) -> Vec<String> {
        self.iter()
            .enumerate()
            .map(|(index, (key, entry))| {
                let prefix = if index == 0 { "Please press" } else { "Press" };
                format!("{prefix} {key} {}. ", entry.prompt())
            })
            .collect()
    }
}

fn is_keypad_key(key: &str) -> bool {
    let mut chars = key.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some('0'..='9' | '*' | '#'), None)
    )
}

/// Appends the menu to `response`: a one-digit gather speaking the options,
/// followed by a closing remark.
///
/// `external` selects the absolute callback address (for markup sent along
/// with the call placement) over the internal path (for webhook replies).
pub fn announce_menu(
    ctx: &CallContext,
    response: &mut VoiceResponse,
    external: bool,
) -> Result<(), PromptError> {
    let mut options = ctx.menu().option_lines();
    options.push("Press any other key to repeat the options. ".to_string());
    options.push("Or, please feel free to hang up now. ".to_string());
    options.push(format!(
        "I will wait for {} minutes before ending the call.",
        GATHER_TIMEOUT_SECONDS / 60
    ));

    response.gather(
        Gather::new()
            .num_digits(1)
            .action(ctx.callbacks().menu(external))
            .method(Method::Post)
            .timeout(GATHER_TIMEOUT_SECONDS)
            .say(ctx.say_as_machine(options)?.loop_count(1)),
    );
    response.say(ctx.say_as_machine("Okay, thank you very much!")?);
    Ok(())
}
