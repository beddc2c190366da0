//! Voice-response markup for Twilio-compatible call providers.
//!
//! A [`VoiceResponse`] is an append-only list of verbs assembled while
//! handling one webhook request. Once complete it is serialized with
//! [`VoiceResponse::to_xml`] (or `Display`) and returned to the provider,
//! which renders speech, collects digits, and records audio on our behalf.
//!
//! ```rust
//! use ivm_twiml::{Say, VoiceResponse};
//!
//! let mut response = VoiceResponse::new();
//! response.say(Say::new().voice("Polly.Salli-Neural").text("Hello"));
//! response.pause(1);
//! response.hangup();
//!
//! assert_eq!(
//!     response.to_xml(),
//!     "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response>\
//!      <Say voice=\"Polly.Salli-Neural\">Hello</Say>\
//!      <Pause length=\"1\"/><Hangup/></Response>"
//! );
//! ```

mod response;
mod verb;
mod xml;

pub use response::VoiceResponse;
pub use verb::{Gather, Method, Record, Say, SayNode, Verb};
