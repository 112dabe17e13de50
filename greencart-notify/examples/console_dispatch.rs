//! Dispatch both notification kinds to the console transport
//!
//! Builds a dispatcher by hand over an in-memory directory and prints every
//! rendered email instead of sending it.
//!
//! Run with:
//! ```bash
//! cargo run --example console_dispatch
//! ```

use std::sync::Arc;

use greencart_notify::prelude::*;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init()?;

    let directory = InMemoryDirectory::from_recipients([
        Recipient::new(1, "ada@example.com")
            .with_display_name("Ada")
            .verified(true),
        Recipient::new(2, "grace@example.com").with_verification_token("d41d8cd98f00"),
    ])?;

    let dispatcher = NotificationDispatcher::new(
        Arc::new(directory),
        Arc::new(TemplateRenderer::default().test_mode(true)),
        Arc::new(ConsoleBackend::verbose()),
        DispatchSettings::default(),
    );

    let welcome = dispatcher
        .dispatch(&RecipientRef::Id(1), NotificationKind::Welcome)
        .await;
    info!(%welcome, "welcome dispatched");

    let reminders = dispatcher
        .dispatch_bulk_with_kind(
            &[RecipientRef::Id(1), RecipientRef::Id(2), RecipientRef::Id(3)],
            NotificationKind::VerificationReminder,
        )
        .await;

    for (recipient, outcome) in reminders.iter() {
        println!("{recipient}: {outcome}");
    }

    Ok(())
}
