//! CLI command implementations

mod bulk;
mod send;

pub use bulk::BulkCommand;
pub use send::SendCommand;

use console::{style, Emoji, StyledObject};
use greencart_notify::dispatch::DispatchOutcome;

static SUCCESS: Emoji = Emoji("✓", "√");
static SKIPPED: Emoji = Emoji("→", "-");
static FAILURE: Emoji = Emoji("✗", "x");
static INFO: Emoji = Emoji("ℹ", "i");

fn mark(outcome: &DispatchOutcome) -> StyledObject<Emoji<'static, 'static>> {
    match outcome {
        DispatchOutcome::Sent { .. } => style(SUCCESS).green(),
        DispatchOutcome::Skipped { .. } => style(SKIPPED).yellow(),
        DispatchOutcome::Failed { .. } => style(FAILURE).red(),
    }
}
