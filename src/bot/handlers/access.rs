//! Role checks for slash commands.

use crate::{
    bot::BotData,
    core::user,
    entities::{UserRole, user as user_entity},
    errors::{Error, Result},
};

/// Resolves the invoking Discord user and checks their role.
///
/// Replies to the user and returns `Ok(None)` when access is refused, so commands can
/// simply return early.
pub async fn require_role(
    ctx: poise::Context<'_, BotData, Error>,
    required: UserRole,
) -> Result<Option<user_entity::Model>> {
    let username = ctx.author().id.to_string();

    match user::authorize(&ctx.data().database, &username, required).await {
        Ok(user) => Ok(Some(user)),
        Err(Error::InvalidCredentials { .. }) => {
            ctx.say("🔒 You are not registered. Ask an admin to add you with `/user_manage add`.")
                .await?;
            Ok(None)
        }
        Err(Error::PermissionDenied { .. }) => {
            ctx.say("🔒 This command is only available to admins.")
                .await?;
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
