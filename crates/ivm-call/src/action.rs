//! Handler dispatch.
//!
//! Handlers append to the response for the current turn and report what the
//! call should do next as a [`Directive`]. Acting on the directive is the
//! caller's job (see [`crate::flow`]).

use ivm_twiml::{Method, Record, VoiceResponse};

use crate::context::CallContext;
use crate::error::PromptError;
use crate::message::Message;

/// Length of the pause after a spoken message, in seconds.
pub const PAUSE_SECONDS: u32 = 1;

/// Longest voice reply the provider records, in seconds.
pub const RECORDING_MAX_LENGTH_SECONDS: u32 = 120;

/// What the call does after a handler ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// Nothing further this turn.
    NoOp,
    /// Announce the menu again.
    ReturnToMenu,
    /// End the call.
    HangUp,
}

/// A reference to the action bound to a menu entry or callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    /// Speak a message, then return to the menu.
    SayMessage(Message),
    /// Speak a message, then hang up.
    SayMessageAndHangUp(Message),
    /// Ask the caller to record a reply and start recording.
    PromptVoiceReply,
    /// Touch nothing and return to the menu. Used for unmapped keypresses.
    ReturnToMenu,
}

impl Handler {
    /// Whether a [`Directive::NoOp`] from this handler leaves a recording in
    /// progress.
    pub fn awaits_recording(self) -> bool {
        matches!(self, Self::PromptVoiceReply)
    }
}

/// Runs `handler`, appending its instructions to `response`.
///
/// # Errors
///
/// Returns [`PromptError`] if a prompt references an unconfigured variable.
/// On error `response` may hold a partial turn and must be discarded.
pub fn dispatch(
    ctx: &CallContext,
    handler: Handler,
    response: &mut VoiceResponse,
) -> Result<Directive, PromptError> {
    match handler {
        Handler::SayMessage(message) => {
            say_message(ctx, message, response)?;
            Ok(Directive::ReturnToMenu)
        }
        Handler::SayMessageAndHangUp(message) => {
            say_message(ctx, message, response)?;
            Ok(Directive::HangUp)
        }
        Handler::PromptVoiceReply => {
            response.say(ctx.say_as_machine(
                "Please leave a reply after you hear a beep. Press the pound sign to finish recording.",
            )?);
            let callbacks = ctx.callbacks();
            response.record(
                Record::new()
                    .action(callbacks.voice_reply())
                    .method(Method::Post)
                    .max_length(RECORDING_MAX_LENGTH_SECONDS)
                    .play_beep(true)
                    .transcribe_callback(callbacks.transcribe()),
            );
            Ok(Directive::NoOp)
        }
        Handler::ReturnToMenu => Ok(Directive::ReturnToMenu),
    }
}

fn say_message(
    ctx: &CallContext,
    message: Message,
    response: &mut VoiceResponse,
) -> Result<(), PromptError> {
    response.say(message.render(ctx)?);
    response.pause(PAUSE_SECONDS);
    Ok(())
}
