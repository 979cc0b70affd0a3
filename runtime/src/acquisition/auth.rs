//! Portal sign-in through a render context.
//!
//! Fills the email/password form, submits it, and waits for the global
//! menu that only renders for signed-in users. Session cookies stay in
//! the context, so later page fetches on the same context are
//! authenticated.

use crate::config::{Credentials, PortalConfig};
use crate::renderer::{wait_for_selector, RenderContext};
use anyhow::{bail, Context, Result};
use std::time::Duration;
use tracing::{debug, info};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Sign into the portal on `context`.
pub async fn login(
    context: &mut dyn RenderContext,
    portal: &PortalConfig,
    credentials: &Credentials,
) -> Result<()> {
    let sign_in_url = portal.sign_in_url();
    context
        .navigate(&sign_in_url)
        .await
        .context("failed to open sign-in page")?;

    let selectors = &portal.login;
    let form_present = context
        .exists(&selectors.email)
        .await
        .context("failed to inspect sign-in page")?;
    if !form_present {
        bail!(
            "sign-in form not found at {sign_in_url} (no element matches `{}`)",
            selectors.email
        );
    }

    context
        .type_into(&selectors.email, &credentials.id)
        .await
        .context("failed to enter account id")?;
    context
        .type_into(&selectors.password, &credentials.password)
        .await
        .context("failed to enter password")?;
    context
        .click(&selectors.submit)
        .await
        .context("failed to submit sign-in form")?;
    debug!("sign-in form submitted");

    wait_for_selector(
        context,
        &selectors.signed_in_marker,
        Duration::from_millis(portal.login_wait_ms),
        POLL_INTERVAL,
    )
    .await
    .context("sign-in did not complete (wrong credentials or extra verification step?)")?;

    context
        .click(&selectors.signed_in_marker)
        .await
        .context("failed to open account menu after sign-in")?;

    info!(account = %credentials.id, "signed in");
    Ok(())
}
