//! User Discord commands - `user_manage` with `add` and `list`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::access},
        core::user,
        entities::UserRole,
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    /// Role offered as a slash command choice.
    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum RoleChoice {
        #[name = "Admin"]
        Admin,
        #[name = "Viewer"]
        Viewer,
    }

    impl From<RoleChoice> for UserRole {
        fn from(choice: RoleChoice) -> Self {
            match choice {
                RoleChoice::Admin => Self::Admin,
                RoleChoice::Viewer => Self::Viewer,
            }
        }
    }

    /// Parent command for registered users and their roles.
    #[poise::command(slash_command, subcommands("user_add", "user_list"))]
    pub async fn user_manage(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say(
            "User management command. Available subcommands:\n\
            `/user_manage add` - Register a Discord user with a role\n\
            `/user_manage list` - List registered users",
        )
        .await?;
        Ok(())
    }

    /// Registers a Discord user as an admin or a viewer.
    #[poise::command(slash_command, rename = "add")]
    pub async fn user_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Discord user to register"] member: serenity::User,
        #[description = "Access level"] role: RoleChoice,
        #[description = "Display name (defaults to their Discord name)"] name: Option<String>,
    ) -> Result<()> {
        if access::require_role(ctx, UserRole::Admin).await?.is_none() {
            return Ok(());
        }

        let display_name = name.unwrap_or_else(|| member.name.clone());
        let created = user::create_user(
            &ctx.data().database,
            member.id.to_string(),
            display_name,
            role.into(),
        )
        .await?;

        ctx.say(format!(
            "✅ Registered <@{}> as **{}** ({}).",
            created.username, created.name, created.role
        ))
        .await?;
        Ok(())
    }

    /// Lists registered users and their roles.
    #[poise::command(slash_command, rename = "list")]
    pub async fn user_list(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        if access::require_role(ctx, UserRole::Admin).await?.is_none() {
            return Ok(());
        }

        let users = user::get_all_users(&ctx.data().database).await?;
        let mut text = String::from("**Registered users**\n");
        for member in &users {
            writeln!(
                &mut text,
                "• {} (<@{}>) - {}",
                member.name, member.username, member.role
            )?;
        }

        ctx.say(text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
