use ivm_twiml::Say;

use crate::context::CallContext;
use crate::error::PromptError;
use crate::prompt::{Prompt, SsmlTag};

/// The scripted messages a call can speak.
///
/// Message text references the configured variables `from_name`, `subject`,
/// `main_message` and `email`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// Who the call is from and what it is about.
    Intro,
    /// The sender's message.
    Main,
    /// The sender's email address, spelled out.
    EmailAddress,
    /// Closing words after a voice reply was recorded.
    Parting,
}

impl Message {
    pub fn render(self, ctx: &CallContext) -> Result<Say, PromptError> {
        match self {
            Self::Intro => ctx
                .say_as_machine("Hello, this is a voice message from $from_name about $subject."),
            Self::Main => ctx.say_as_human("$main_message"),
            Self::EmailAddress => {
                let email = ctx.render_template("$email")?;
                ctx.say_as_human(
                    Prompt::new()
                        .text("My email address is,")
                        .tag(SsmlTag::spell_out(email)),
                )
            }
            Self::Parting => ctx.say_as_human(
                "Thank you. Your reply will be delivered to $from_name. I hope you have a nice day.",
            ),
        }
    }
}
