//! Session commands: login, signup, logout, whoami.

use anyhow::{anyhow, bail, Result};
use dialoguer::{Confirm, Input, Password};
use serde_json::json;
use storefront_auth::{AuthError, AuthOutcome, LoginForm, SignupForm, UserRecord};

use super::{LoginArgs, SignupArgs, WhoamiArgs};
use crate::context::Context;

pub async fn login(args: LoginArgs, ctx: &Context) -> Result<()> {
    let (shop, mut events) = ctx.storefront()?;

    let email = match args.email {
        Some(email) => email,
        None => Input::<String>::new().with_prompt("Email").interact_text()?,
    };
    let password = Password::new().with_prompt("Password").interact()?;

    let spinner = ctx.output.spinner("Logging in...");
    let result = shop
        .auth()
        .login(&LoginForm::new(email, password), args.return_to.as_deref())
        .await;
    spinner.finish_and_clear();
    ctx.flush_toasts(&mut events);

    let outcome = result.map_err(|e| failure(ctx, e, "Login failed"))?;
    print_outcome(ctx, &outcome);
    Ok(())
}

pub async fn signup(args: SignupArgs, ctx: &Context) -> Result<()> {
    let (shop, mut events) = ctx.storefront()?;

    let username = match args.username {
        Some(username) => username,
        None => Input::<String>::new().with_prompt("Username").interact_text()?,
    };
    let email = match args.email {
        Some(email) => email,
        None => Input::<String>::new().with_prompt("Email").interact_text()?,
    };

    let spinner = ctx.output.spinner("Checking availability...");
    let username_free = shop.auth().check_username_available(username.trim()).await;
    let email_free = shop.auth().check_email_available(email.trim()).await;
    spinner.finish_and_clear();
    match (username_free, email_free) {
        (Ok(false), _) => bail!("Username {} is already taken", username.trim()),
        (_, Ok(false)) => bail!("An account with {} already exists", email.trim()),
        (Err(e), _) | (_, Err(e)) => ctx
            .output
            .debug(&format!("Availability check skipped: {}", e)),
        _ => {}
    }

    let password = Password::new().with_prompt("Password").interact()?;
    let confirmation = Password::new().with_prompt("Confirm password").interact()?;
    let accepted = args.accept_terms
        || Confirm::new()
            .with_prompt("Do you accept the terms and conditions?")
            .default(false)
            .interact()?;

    let form = SignupForm::new(username, email, password)
        .with_confirmation(confirmation)
        .with_terms_accepted(accepted);

    let spinner = ctx.output.spinner("Creating account...");
    let result = shop.auth().signup(&form, None).await;
    spinner.finish_and_clear();
    ctx.flush_toasts(&mut events);

    let outcome = result.map_err(|e| failure(ctx, e, "Signup failed"))?;
    print_outcome(ctx, &outcome);
    Ok(())
}

pub async fn logout(ctx: &Context) -> Result<()> {
    let (shop, mut events) = ctx.storefront()?;

    if shop.current_user().is_none() {
        ctx.output.info("Not logged in");
        return Ok(());
    }

    shop.auth().logout();
    ctx.flush_toasts(&mut events);
    Ok(())
}

pub async fn whoami(args: WhoamiArgs, ctx: &Context) -> Result<()> {
    let (shop, _events) = ctx.storefront()?;

    let Some(mut user) = shop.current_user() else {
        if ctx.output.is_json() {
            ctx.output.json(&serde_json::Value::Null);
        } else {
            ctx.output.info("Not logged in");
        }
        return Ok(());
    };

    if args.refresh {
        let spinner = ctx.output.spinner("Fetching profile...");
        let result = shop.auth().profile(&user.user_id).await;
        spinner.finish_and_clear();
        match result {
            Ok(profile) => user = profile,
            Err(e) => ctx
                .output
                .warn(&format!("Showing stored profile: {}", e.user_message())),
        }
    }

    if ctx.output.is_json() {
        ctx.output.json(&user);
        return Ok(());
    }
    print_user(ctx, &user);
    Ok(())
}

fn print_user(ctx: &Context, user: &UserRecord) {
    ctx.output.header(&user.username);
    ctx.output.kv("ID", user.user_id.as_str());
    if let Some(email) = &user.email {
        ctx.output.kv("Email", email);
    }
    ctx.output.kv("Role", user.role.as_str());
}

fn print_outcome(ctx: &Context, outcome: &AuthOutcome) {
    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "user": outcome.user,
            "redirect": outcome.redirect,
            "replayed": outcome.replayed.map(|r| json!({
                "requested": r.requested,
                "added": r.added,
                "guest": r.guest,
            })),
        }));
        return;
    }
    print_user(ctx, &outcome.user);
    ctx.output.kv("Next", &outcome.redirect);
}

/// Validation errors are listed per field; server failures were already
/// shown as toasts.
fn failure(ctx: &Context, error: AuthError, summary: &str) -> anyhow::Error {
    if let Some(fields) = error.field_errors() {
        for (field, message) in fields.iter() {
            ctx.output.list_item(&format!("{}: {}", field, message));
        }
        return anyhow!("{}: please fix the fields above", summary);
    }
    anyhow!("{}: {}", summary, error.user_message())
}
