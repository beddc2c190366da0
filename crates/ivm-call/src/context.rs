//! Process-wide call context.
//!
//! Built once from validated configuration and passed explicitly into every
//! webhook turn. Nothing in it changes after construction.

use std::collections::HashMap;

use crate::menu::Menu;

/// Path the provider posts menu keypresses to.
pub const MENU_CALLBACK_PATH: &str = "/menu-callback";
/// Path the provider posts to once a voice reply has been recorded.
pub const VOICE_REPLY_CALLBACK_PATH: &str = "/voice-reply-callback";
/// Path the provider posts to once a recording has been transcribed.
pub const TRANSCRIBE_CALLBACK_PATH: &str = "/transcribe-callback";

/// Which configured voice profile a prompt is spoken in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Voice {
    /// Announcements and menus.
    Machine,
    /// Message content from the sender.
    Human,
}

/// The two voice profile names, e.g. `Polly.Matthew-Neural`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voices {
    pub machine: String,
    pub human: String,
}

impl Voices {
    pub fn name(&self, voice: Voice) -> &str {
        match voice {
            Voice::Machine => &self.machine,
            Voice::Human => &self.human,
        }
    }
}

/// Produces callback addresses embedded in markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Callbacks {
    public_base_url: String,
}

impl Callbacks {
    /// `public_base_url` is the address the provider can reach from the
    /// public network, e.g. `https://abc.ngrok.app`.
    pub fn new(public_base_url: impl Into<String>) -> Self {
        let mut public_base_url = public_base_url.into();
        while public_base_url.ends_with('/') {
            public_base_url.pop();
        }
        Self { public_base_url }
    }

    pub fn public_base_url(&self) -> &str {
        &self.public_base_url
    }

    /// Menu callback address. The external form is absolute and is used in
    /// markup uploaded with the call placement, which has no request to be
    /// relative to. The internal form is a path resolved by the provider
    /// against the webhook that returned it.
    pub fn menu(&self, external: bool) -> String {
        if external {
            format!("{}{}", self.public_base_url, MENU_CALLBACK_PATH)
        } else {
            MENU_CALLBACK_PATH.to_string()
        }
    }

    pub fn voice_reply(&self) -> String {
        VOICE_REPLY_CALLBACK_PATH.to_string()
    }

    pub fn transcribe(&self) -> String {
        TRANSCRIBE_CALLBACK_PATH.to_string()
    }
}

/// Everything a webhook turn needs to render prompts and dispatch handlers.
#[derive(Debug, Clone)]
pub struct CallContext {
    voices: Voices,
    variables: HashMap<String, String>,
    menu: Menu,
    callbacks: Callbacks,
}

impl CallContext {
    pub fn new(
        voices: Voices,
        variables: HashMap<String, String>,
        menu: Menu,
        callbacks: Callbacks,
    ) -> Self {
        Self {
            voices,
            variables,
            menu,
            callbacks,
        }
    }

    pub fn voices(&self) -> &Voices {
        &self.voices
    }

    pub fn variables(&self) -> &HashMap<String, String> {
        &self.variables
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    pub fn callbacks(&self) -> &Callbacks {
        &self.callbacks
    }
}
