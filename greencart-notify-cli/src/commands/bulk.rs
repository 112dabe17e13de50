//! `bulk`: one notification kind to many recipients

use std::convert::Infallible;

use anyhow::{bail, Result};
use clap::Args;
use console::style;
use greencart_notify::config::NotifyServices;
use greencart_notify::dispatch::{NotificationKind, RecipientRef};

use super::{mark, INFO};

/// Send a notification to many recipients at once
#[derive(Debug, Args)]
pub struct BulkCommand {
    /// Recipient ids or keys
    #[arg(required = true, value_name = "ID", value_parser = parse_recipient)]
    pub recipients: Vec<RecipientRef>,

    /// Notification kind (welcome, verification-reminder)
    #[arg(short, long, default_value = "welcome")]
    pub kind: NotificationKind,
}

fn parse_recipient(arg: &str) -> Result<RecipientRef, Infallible> {
    arg.parse()
}

impl BulkCommand {
    /// Execute the bulk command
    ///
    /// Every recipient is attempted; one failing does not stop the others.
    ///
    /// # Errors
    ///
    /// Returns an error if any recipient's dispatch failed.
    pub async fn execute(&self, services: &NotifyServices) -> Result<()> {
        let result = services
            .dispatcher
            .dispatch_bulk_with_kind(&self.recipients, self.kind)
            .await;

        println!(
            "\n{} Sent {} to {} recipient(s)",
            INFO,
            style(self.kind).cyan(),
            result.len()
        );
        println!();

        println!("   {:<24} {}", "Recipient", "Outcome");
        println!("{}", "─".repeat(72));
        for (recipient, outcome) in result.iter() {
            let name = recipient.to_string();
            println!("{}  {name:<24} {outcome}", mark(outcome));
        }
        println!("{}", "─".repeat(72));
        println!(
            "{} sent, {} skipped, {} failed",
            style(result.sent_count()).green(),
            style(result.skipped_count()).yellow(),
            style(result.failed_count()).red()
        );

        if result.failed_count() > 0 {
            bail!("{} of {} dispatches failed", result.failed_count(), result.len());
        }
        Ok(())
    }
}
