//! Verb definitions.
//!
//! Each verb maps to one element of the markup document. Builders use
//! consuming `self` methods so a verb can be assembled in one expression and
//! then handed to [`VoiceResponse`](crate::VoiceResponse).

use crate::xml::XmlWriter;

/// HTTP method the provider uses when invoking a callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    Get,
    #[default]
    Post,
}

impl Method {
    /// Returns the attribute value for this method.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// A child of a `<Say>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SayNode {
    /// Character data spoken verbatim.
    Text(String),
    /// `<say-as interpret-as="...">`, e.g. `spell-out` for email addresses.
    SayAs { interpret_as: String, text: String },
    /// `<break time="..."/>`, e.g. `500ms`.
    Break { time: String },
    /// `<emphasis level="...">`.
    Emphasis { level: String, text: String },
}

impl SayNode {
    fn write(&self, w: &mut XmlWriter) {
        match self {
            Self::Text(text) => w.text(text),
            Self::SayAs { interpret_as, text } => {
                w.start("say-as", &[("interpret-as", Some(interpret_as.clone()))]);
                w.text(text);
                w.end("say-as");
            }
            Self::Break { time } => w.empty("break", &[("time", Some(time.clone()))]),
            Self::Emphasis { level, text } => {
                w.start("emphasis", &[("level", Some(level.clone()))]);
                w.text(text);
                w.end("emphasis");
            }
        }
    }
}

/// `<Say>`: speech rendered by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Say {
    voice: Option<String>,
    loop_count: Option<u32>,
    language: Option<String>,
    nodes: Vec<SayNode>,
}

impl Say {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the voice profile name, e.g. `Polly.Matthew-Neural`.
    pub fn voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }

    /// Number of times the provider repeats the speech.
    pub fn loop_count(mut self, count: u32) -> Self {
        self.loop_count = Some(count);
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Appends character data.
    pub fn text(self, text: impl Into<String>) -> Self {
        self.node(SayNode::Text(text.into()))
    }

    /// Appends a `<say-as>` child.
    pub fn say_as(self, text: impl Into<String>, interpret_as: impl Into<String>) -> Self {
        self.node(SayNode::SayAs {
            interpret_as: interpret_as.into(),
            text: text.into(),
        })
    }

    /// Appends a `<break>` child.
    pub fn pause_break(self, time: impl Into<String>) -> Self {
        self.node(SayNode::Break { time: time.into() })
    }

    /// Appends an `<emphasis>` child.
    pub fn emphasis(self, text: impl Into<String>, level: impl Into<String>) -> Self {
        self.node(SayNode::Emphasis {
            level: level.into(),
            text: text.into(),
        })
    }

    /// Appends an already-built child node.
    pub fn node(mut self, node: SayNode) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn voice_name(&self) -> Option<&str> {
        self.voice.as_deref()
    }

    pub fn nodes(&self) -> &[SayNode] {
        &self.nodes
    }

    fn write(&self, w: &mut XmlWriter) {
        w.start(
            "Say",
            &[
                ("loop", self.loop_count.map(|n| n.to_string())),
                ("voice", self.voice.clone()),
                ("language", self.language.clone()),
            ],
        );
        for node in &self.nodes {
            node.write(w);
        }
        w.end("Say");
    }
}

/// `<Gather>`: collects keypresses, nesting the prompt that is spoken while
/// the provider waits.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Gather {
    action: Option<String>,
    method: Option<Method>,
    num_digits: Option<u32>,
    timeout: Option<u32>,
    children: Vec<Verb>,
}

impl Gather {
    pub fn new() -> Self {
        Self::default()
    }

    /// URL the provider submits the digits to.
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn num_digits(mut self, digits: u32) -> Self {
        self.num_digits = Some(digits);
        self
    }

    /// Seconds of inactivity before the provider gives up waiting.
    pub fn timeout(mut self, seconds: u32) -> Self {
        self.timeout = Some(seconds);
        self
    }

    pub fn say(mut self, say: Say) -> Self {
        self.children.push(Verb::Say(say));
        self
    }

    pub fn pause(mut self, seconds: u32) -> Self {
        self.children.push(Verb::Pause { length: seconds });
        self
    }

    pub fn action_url(&self) -> Option<&str> {
        self.action.as_deref()
    }

    pub fn children(&self) -> &[Verb] {
        &self.children
    }

    fn write(&self, w: &mut XmlWriter) {
        w.start(
            "Gather",
            &[
                ("action", self.action.clone()),
                ("method", self.method.map(|m| m.as_str().to_string())),
                ("numDigits", self.num_digits.map(|n| n.to_string())),
                ("timeout", self.timeout.map(|n| n.to_string())),
            ],
        );
        for child in &self.children {
            child.write(w);
        }
        w.end("Gather");
    }
}

/// `<Record>`: records the caller's voice.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    action: Option<String>,
    method: Option<Method>,
    max_length: Option<u32>,
    play_beep: Option<bool>,
    transcribe_callback: Option<String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// URL invoked when the recording finishes.
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Maximum recording length in seconds.
    pub fn max_length(mut self, seconds: u32) -> Self {
        self.max_length = Some(seconds);
        self
    }

    pub fn play_beep(mut self, beep: bool) -> Self {
        self.play_beep = Some(beep);
        self
    }

    /// URL invoked once the provider has transcribed the recording.
    pub fn transcribe_callback(mut self, url: impl Into<String>) -> Self {
        self.transcribe_callback = Some(url.into());
        self
    }

    fn write(&self, w: &mut XmlWriter) {
        w.empty(
            "Record",
            &[
                ("action", self.action.clone()),
                ("method", self.method.map(|m| m.as_str().to_string())),
                ("maxLength", self.max_length.map(|n| n.to_string())),
                ("playBeep", self.play_beep.map(|b| b.to_string())),
                ("transcribeCallback", self.transcribe_callback.clone()),
            ],
        );
    }
}

/// A top-level instruction in a [`VoiceResponse`](crate::VoiceResponse).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verb {
    Say(Say),
    Pause { length: u32 },
    Gather(Gather),
    Record(Record),
    Hangup,
}

impl Verb {
    pub(crate) fn write(&self, w: &mut XmlWriter) {
        match self {
            Self::Say(say) => say.write(w),
            Self::Pause { length } => w.empty("Pause", &[("length", Some(length.to_string()))]),
            Self::Gather(gather) => gather.write(w),
            Self::Record(record) => record.write(w),
            Self::Hangup => w.empty("Hangup", &[]),
        }
    }
}
