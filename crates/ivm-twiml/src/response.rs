use std::fmt;

use crate::verb::{Gather, Record, Say, Verb};
use crate::xml::{XmlWriter, DECLARATION};

/// The root `<Response>` document.
///
/// Verbs are appended in the order the provider should execute them. A
/// response is built and serialized within a single webhook request and is
/// never shared.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VoiceResponse {
    verbs: Vec<Verb>,
}

impl VoiceResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn say(&mut self, say: Say) -> &mut Self {
        self.append(Verb::Say(say))
    }

    /// Appends `<Pause length="seconds"/>`.
    pub fn pause(&mut self, seconds: u32) -> &mut Self {
        self.append(Verb::Pause { length: seconds })
    }

    pub fn gather(&mut self, gather: Gather) -> &mut Self {
        self.append(Verb::Gather(gather))
    }

    pub fn record(&mut self, record: Record) -> &mut Self {
        self.append(Verb::Record(record))
    }

    pub fn hangup(&mut self) -> &mut Self {
        self.append(Verb::Hangup)
    }

    pub fn append(&mut self, verb: Verb) -> &mut Self {
        self.verbs.push(verb);
        self
    }

    pub fn verbs(&self) -> &[Verb] {
        &self.verbs
    }

    pub fn is_empty(&self) -> bool {
        self.verbs.is_empty()
    }

    /// Serializes the document, including the XML declaration.
    pub fn to_xml(&self) -> String {
        let mut w = XmlWriter::new();
        w.raw(DECLARATION);
        if self.verbs.is_empty() {
            w.empty("Response", &[]);
        } else {
            w.start("Response", &[]);
            for verb in &self.verbs {
                verb.write(&mut w);
            }
            w.end("Response");
        }
        w.finish()
    }
}

impl fmt::Display for VoiceResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_xml())
    }
}
