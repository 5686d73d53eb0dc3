//! Registration wizard
//!
//! Collects a name and a birthday, one message at a time.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::WizardConfig;
use crate::state::{Context, StepResult, Wizard};

/// Scene name of the registration wizard
pub const REGISTRATION_SCENE: &str = "registration";

const BIRTHDAY_FORMAT: &str = "%Y-%m-%d";

/// Answers collected by the registration wizard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub name: Option<String>,
    pub birthday: Option<NaiveDate>,
}

/// Build the registration wizard
pub fn registration_wizard(config: &WizardConfig) -> Wizard<Registration> {
    Wizard::new(REGISTRATION_SCENE)
        .step(ask_name)
        .step(ask_birthday)
        .with_cancel_config(config)
}

/// Text of the update, trimmed; commands count as no answer
fn answer(ctx: &Context<Registration>) -> Option<String> {
    ctx.text()
        .map(str::trim)
        .filter(|text| !text.is_empty() && !text.starts_with('/'))
        .map(str::to_owned)
}

fn ask_name(ctx: &mut Context<Registration>) -> StepResult<'_> {
    Box::pin(async move {
        let Some(name) = answer(ctx) else {
            ctx.reply("What is your name?").await?;
            return Ok(false);
        };

        ctx.data_mut().name = Some(name);
        ctx.reply("When is your birthday? (YYYY-MM-DD)").await?;
        Ok(true)
    })
}

fn ask_birthday(ctx: &mut Context<Registration>) -> StepResult<'_> {
    Box::pin(async move {
        let birthday = answer(ctx).and_then(|text| NaiveDate::parse_from_str(&text, BIRTHDAY_FORMAT).ok());
        let Some(birthday) = birthday else {
            ctx.reply("Please send your birthday as YYYY-MM-DD").await?;
            return Ok(false);
        };

        ctx.data_mut().birthday = Some(birthday);
        info!(chat_id = ctx.chat_id(), user_id = ctx.user_id(), "Registration completed");
        ctx.reply("Thank you!").await?;
        Ok(true)
    })
}
