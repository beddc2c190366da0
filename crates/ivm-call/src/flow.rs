//! Call progression.
//!
//! No state is stored between webhook requests. Each entry point below
//! handles one provider event, starting from the state the call must be in
//! for that event to occur, and reports the state the call ends up in.

use ivm_twiml::VoiceResponse;

use crate::action::{dispatch, Directive, Handler, PAUSE_SECONDS};
use crate::context::CallContext;
use crate::error::PromptError;
use crate::menu::announce_menu;
use crate::message::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    Greeting,
    AwaitingMenuChoice,
    AwaitingRecording,
    AwaitingTranscription,
    Terminated,
}

/// Something that moves a call along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallEvent {
    /// The outbound call was placed with the opening script.
    Placed,
    /// A keypress ran `handler`, which returned `directive`.
    Dispatched {
        handler: Handler,
        directive: Directive,
    },
    /// The recording-finished handler returned `directive`.
    RecordingFinished { directive: Directive },
    /// The provider delivered a transcription.
    TranscriptionFinished,
}

impl CallState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Greeting => "GREETING",
            Self::AwaitingMenuChoice => "AWAITING_MENU_CHOICE",
            Self::AwaitingRecording => "AWAITING_RECORDING",
            Self::AwaitingTranscription => "AWAITING_TRANSCRIPTION",
            Self::Terminated => "TERMINATED",
        }
    }

    /// The transition table.
    pub fn next(self, event: CallEvent) -> CallState {
        match (self, event) {
            (Self::Terminated, _) => Self::Terminated,
            (_, CallEvent::TranscriptionFinished) => self,
            (Self::Greeting, CallEvent::Placed) => Self::AwaitingMenuChoice,
            (_, CallEvent::Placed) => self,
            (_, CallEvent::Dispatched { directive, handler }) => match directive {
                Directive::ReturnToMenu => Self::AwaitingMenuChoice,
                Directive::HangUp => Self::Terminated,
                Directive::NoOp if handler.awaits_recording() => Self::AwaitingRecording,
                Directive::NoOp => self,
            },
            (_, CallEvent::RecordingFinished { directive }) => match directive {
                Directive::HangUp => Self::Terminated,
                Directive::ReturnToMenu => Self::AwaitingMenuChoice,
                Directive::NoOp => Self::AwaitingTranscription,
            },
        }
    }
}

/// Performs the follow-up a directive asks for. The menu is re-announced in
/// its internal callback form.
pub fn apply_directive(
    ctx: &CallContext,
    directive: Directive,
    response: &mut VoiceResponse,
) -> Result<(), PromptError> {
    match directive {
        Directive::ReturnToMenu => announce_menu(ctx, response, false)?,
        Directive::HangUp => {
            response.hangup();
        }
        Directive::NoOp => {}
    }
    Ok(())
}

/// Builds the opening script uploaded with the call placement.
pub fn start_call(ctx: &CallContext, response: &mut VoiceResponse) -> Result<CallState, PromptError> {
    response.say(Message::Intro.render(ctx)?);
    response.pause(PAUSE_SECONDS);
    response.say(Message::Main.render(ctx)?);
    response.say(Message::EmailAddress.render(ctx)?);
    response.pause(PAUSE_SECONDS);
    announce_menu(ctx, response, true)?;

    let state = CallState::Greeting.next(CallEvent::Placed);
    tracing::debug!(state = state.as_str(), "opening script built");
    Ok(state)
}

/// Handles the digits the caller pressed at the menu.
pub fn handle_keypress(
    ctx: &CallContext,
    digits: &str,
    response: &mut VoiceResponse,
) -> Result<CallState, PromptError> {
    let handler = ctx.menu().handler_for(digits);
    let directive = dispatch(ctx, handler, response)?;
    apply_directive(ctx, directive, response)?;

    let state = CallState::AwaitingMenuChoice.next(CallEvent::Dispatched { handler, directive });
    tracing::debug!(
        digits,
        handler = ?handler,
        directive = ?directive,
        state = state.as_str(),
        "menu keypress handled"
    );
    Ok(state)
}

/// Handles the end of a voice reply recording: parting words, then hang up.
pub fn handle_recording_finished(
    ctx: &CallContext,
    response: &mut VoiceResponse,
) -> Result<CallState, PromptError> {
    let directive = dispatch(ctx, Handler::SayMessageAndHangUp(Message::Parting), response)?;
    apply_directive(ctx, directive, response)?;

    let state = CallState::AwaitingRecording.next(CallEvent::RecordingFinished { directive });
    tracing::debug!(state = state.as_str(), "voice reply handled");
    Ok(state)
}
