//! Call script and menu engine for interactive voice messages.
//!
//! The provider drives the call and reports each event via a webhook. For
//! every event this crate appends instructions to an
//! [`ivm_twiml::VoiceResponse`]:
//!
//! | Event | Handled by | Resulting state |
//! |-------|-----------|-----------------|
//! | call placed | [`start_call`] | `AwaitingMenuChoice` |
//! | keypress | [`handle_keypress`] | depends on the [`Directive`] |
//! | recording finished | [`handle_recording_finished`] | `Terminated` |
//!
//! Menu entries bind keys to [`Handler`] references. Dispatching a handler
//! mutates the response and returns a [`Directive`], which
//! [`apply_directive`] turns into the follow-up: replaying the menu, hanging
//! up, or nothing.
//!
//! ```rust
//! use std::collections::HashMap;
//! use ivm_call::{handle_keypress, CallContext, CallState, Callbacks, Menu, Voices};
//! use ivm_twiml::VoiceResponse;
//!
//! let ctx = CallContext::new(
//!     Voices { machine: "Polly.Matthew-Neural".into(), human: "Polly.Salli-Neural".into() },
//!     HashMap::from([("main_message".to_string(), "Apples are red".to_string())]),
//!     Menu::standard(),
//!     Callbacks::new("https://example.com"),
//! );
//!
//! let mut response = VoiceResponse::new();
//! let state = handle_keypress(&ctx, "1", &mut response).unwrap();
//! assert_eq!(state, CallState::AwaitingMenuChoice);
//! assert!(response.to_xml().contains("Apples are red"));
//! ```

mod action;
mod context;
mod error;
mod flow;
mod menu;
mod message;
mod prompt;
pub mod template;

pub use action::{dispatch, Directive, Handler, PAUSE_SECONDS, RECORDING_MAX_LENGTH_SECONDS};
pub use context::{
    CallContext, Callbacks, Voice, Voices, MENU_CALLBACK_PATH, TRANSCRIBE_CALLBACK_PATH,
    VOICE_REPLY_CALLBACK_PATH,
};
pub use error::{MenuError, PromptError};
pub use flow::{
    apply_directive, handle_keypress, handle_recording_finished, start_call, CallEvent, CallState,
};
pub use menu::{announce_menu, Menu, MenuEntry, GATHER_TIMEOUT_SECONDS};
pub use message::Message;
pub use prompt::{Prompt, PromptPiece, SsmlTag};
