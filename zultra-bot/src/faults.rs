//! Global fault reporter: the last stop for handler errors.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{error, warn};
use zultra_core::{Bot, BotError, Update};

/// Catches handler errors the dispatcher surfaces: logs the full context,
/// sends the user a generic apology, and notifies the admins. Faults never
/// propagate past this point.
pub struct FaultReporter {
    bot: Arc<dyn Bot>,
    admin_ids: Vec<i64>,
}

impl FaultReporter {
    pub fn new(bot: Arc<dyn Bot>, admin_ids: HashSet<i64>) -> Self {
        let mut admin_ids: Vec<i64> = admin_ids.into_iter().collect();
        admin_ids.sort_unstable();
        Self { bot, admin_ids }
    }

    pub async fn report(&self, update: &Update, fault: BotError) {
        error!(
            update_id = update.update_id,
            user_id = ?update.user_id(),
            chat_id = ?update.chat_id(),
            kind = update.kind_name(),
            error = %fault,
            "Handler failed"
        );

        if let Err(e) = self.bot.reply_to(update, fault.user_message()).await {
            warn!(error = %e, "Failed to send fault apology");
        }

        // Permission refusals are routine; don't page anyone.
        if matches!(fault, BotError::PermissionDenied) {
            return;
        }

        let note = format!("Handler error on update {}: {}", update.update_id, fault);
        for admin_id in &self.admin_ids {
            if let Err(e) = self.bot.send_message(*admin_id, &note).await {
                warn!(admin_id, error = %e, "Failed to notify admin of fault");
            }
        }
    }
}
