//! `send`: one notification to one recipient

use anyhow::{bail, Result};
use clap::Args;
use console::style;
use greencart_notify::config::NotifyServices;
use greencart_notify::directory::RecipientDirectory;
use greencart_notify::dispatch::{DispatchOutcome, NotificationKind, RecipientRef};
use greencart_notify::jobs::SendNotificationJob;

use super::{mark, INFO};

/// Which recipient to notify
#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct Target {
    /// Numeric user id
    #[arg(long, value_name = "N")]
    user_id: Option<i64>,

    /// Email address
    #[arg(long, value_name = "ADDR")]
    email: Option<String>,
}

/// Send one notification
#[derive(Debug, Args)]
pub struct SendCommand {
    #[command(flatten)]
    target: Target,

    /// Notification kind (welcome, verification-reminder)
    #[arg(short, long, default_value = "welcome")]
    pub kind: NotificationKind,

    /// Run through the job queue instead of dispatching inline
    #[arg(long = "async")]
    pub deferred: bool,
}

impl SendCommand {
    /// The recipient named on the command line
    #[must_use]
    pub fn target(&self) -> RecipientRef {
        self.target.user_id.map_or_else(
            || RecipientRef::from(self.target.email.clone().unwrap_or_default()),
            RecipientRef::Id,
        )
    }

    /// Execute the send command
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The recipient is not in the directory
    /// - The queued job is cancelled or panics
    /// - The dispatch ends in failure
    pub async fn execute(&self, services: &NotifyServices) -> Result<()> {
        let target = self.target();
        let Some(recipient) = services.directory.resolve(&target).await else {
            bail!("user {target} not found");
        };

        let outcome = if self.deferred {
            let handle = services
                .queue
                .enqueue(SendNotificationJob::new(recipient.id.clone(), self.kind));
            println!(
                "{} Queued {} for {} as job {}",
                INFO,
                style(self.kind).cyan(),
                recipient.address,
                style(handle.id()).dim()
            );
            handle.wait().await?
        } else {
            services.dispatcher.dispatch(&recipient.id, self.kind).await
        };

        report(&recipient.address, self.kind, &outcome);

        if outcome.is_failed() {
            bail!("{} to {} failed", self.kind, recipient.address);
        }
        Ok(())
    }
}

fn report(address: &str, kind: NotificationKind, outcome: &DispatchOutcome) {
    println!("{} {} to {}: {outcome}", mark(outcome), style(kind).bold(), address);
}
