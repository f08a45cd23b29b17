use anyhow::Result;
use ors_admin::NotificationController;

use crate::cli::{NotifyArgs, OutputFormat};
use crate::output::{print_form, print_roles};

/// Fill the form from the arguments and submit it.
pub async fn send(
    controller: &mut NotificationController,
    args: &NotifyArgs,
    format: OutputFormat,
) -> Result<bool> {
    if let Some(token) = &args.fcm_token {
        controller.draft_mut().fcm_token = token.clone();
    } else {
        controller.ensure_fcm_token();
    }

    let draft = controller.draft_mut();
    draft.kind = args.kind.into();
    draft.title = args.title.clone();
    draft.body = args.body.clone();
    for role in &args.roles {
        controller.set_role_selected(role, true);
    }

    controller.submit().await;
    Ok(print_form(controller.form(), format))
}

pub async fn roles(controller: &mut NotificationController, format: OutputFormat) -> Result<()> {
    controller.load_available_roles().await;
    print_roles(controller.available_roles(), format);
    Ok(())
}

