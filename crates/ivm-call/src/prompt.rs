//! Prompt rendering.
//!
//! A [`Prompt`] is an ordered list of pieces. Rendering merges runs of
//! literal text, substitutes `$name` variables in the merged text, and
//! attaches everything else unchanged, producing one `<Say>` stamped with
//! the chosen voice.

use ivm_twiml::{Say, SayNode};

use crate::context::{CallContext, Voice};
use crate::error::PromptError;
use crate::template::substitute;

/// A structured speech tag attached through its own `<Say>` child element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SsmlTag {
    SayAs { text: String, interpret_as: String },
    Break { time: String },
    Emphasis { text: String, level: String },
}

impl SsmlTag {
    /// Reads `text` out character by character.
    pub fn spell_out(text: impl Into<String>) -> Self {
        Self::SayAs {
            text: text.into(),
            interpret_as: "spell-out".to_string(),
        }
    }

    fn attach(self, say: Say) -> Say {
        match self {
            Self::SayAs { text, interpret_as } => say.say_as(text, interpret_as),
            Self::Break { time } => say.pause_break(time),
            Self::Emphasis { text, level } => say.emphasis(text, level),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptPiece {
    /// Template text; `$name` placeholders are substituted.
    Text(String),
    /// Structured tag; not substituted.
    Tag(SsmlTag),
    /// Pre-built node appended verbatim.
    Fragment(SayNode),
}

/// An ordered sequence of prompt pieces.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Prompt {
    pieces: Vec<PromptPiece>,
}

impl Prompt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.pieces.push(PromptPiece::Text(text.into()));
        self
    }

    pub fn tag(mut self, tag: SsmlTag) -> Self {
        self.pieces.push(PromptPiece::Tag(tag));
        self
    }

    pub fn fragment(mut self, node: SayNode) -> Self {
        self.pieces.push(PromptPiece::Fragment(node));
        self
    }

    pub fn pieces(&self) -> &[PromptPiece] {
        &self.pieces
    }

    /// Joins consecutive text pieces.
    ///
    /// Provider SDKs keep only the last of several bare text children on a
    /// `<Say>`, so text is always attached as a single run.
    pub fn merged(self) -> Self {
        let mut pieces: Vec<PromptPiece> = Vec::with_capacity(self.pieces.len());
        for piece in self.pieces {
            if let PromptPiece::Text(next) = &piece {
                if let Some(PromptPiece::Text(acc)) = pieces.last_mut() {
                    acc.push_str(next);
                    continue;
                }
            }
            pieces.push(piece);
        }
        Self { pieces }
    }
}

impl From<&str> for Prompt {
    fn from(text: &str) -> Self {
        Prompt::new().text(text)
    }
}

impl From<String> for Prompt {
    fn from(text: String) -> Self {
        Prompt::new().text(text)
    }
}

impl From<Vec<PromptPiece>> for Prompt {
    fn from(pieces: Vec<PromptPiece>) -> Self {
        Self { pieces }
    }
}

impl From<Vec<String>> for Prompt {
    fn from(texts: Vec<String>) -> Self {
        Self {
            pieces: texts.into_iter().map(PromptPiece::Text).collect(),
        }
    }
}

impl CallContext {
    /// Substitutes configured variables into `template`.
    pub fn render_template(&self, template: &str) -> Result<String, PromptError> {
        substitute(template, self.variables())
    }

    /// Renders `prompt` into a `<Say>` spoken in `voice`.
    pub fn say(&self, voice: Voice, prompt: impl Into<Prompt>) -> Result<Say, PromptError> {
        let mut say = Say::new().voice(self.voices().name(voice));
        for piece in prompt.into().merged().pieces {
            say = match piece {
                PromptPiece::Text(text) => say.text(self.render_template(&text)?),
                PromptPiece::Tag(tag) => tag.attach(say),
                PromptPiece::Fragment(node) => say.node(node),
            };
        }
        Ok(say)
    }

    pub fn say_as_machine(&self, prompt: impl Into<Prompt>) -> Result<Say, PromptError> {
        self.say(Voice::Machine, prompt)
    }

    pub fn say_as_human(&self, prompt: impl Into<Prompt>) -> Result<Say, PromptError> {
        self.say(Voice::Human, prompt)
    }
}
