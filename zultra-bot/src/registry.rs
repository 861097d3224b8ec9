//! Command registry and the admin gate.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use zultra_core::{BotError, Result, UpdateHandler};

/// A registered command: its handler plus routing metadata.
#[derive(Clone)]
pub struct RegisteredCommand {
    pub handler: Arc<dyn UpdateHandler>,
    pub admin_only: bool,
    pub description: &'static str,
}

/// Command-name lookup table, validated as it is built: registering the same
/// name twice is a configuration bug and fails initialization.
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, RegisteredCommand>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    pub fn register(
        self,
        name: &str,
        description: &'static str,
        handler: Arc<dyn UpdateHandler>,
    ) -> Result<Self> {
        self.insert(name, description, handler, false)
    }

    /// Admin-only commands additionally pass through the [`AdminGate`]
    /// before the pipeline runs.
    pub fn register_admin(
        self,
        name: &str,
        description: &'static str,
        handler: Arc<dyn UpdateHandler>,
    ) -> Result<Self> {
        self.insert(name, description, handler, true)
    }

    fn insert(
        mut self,
        name: &str,
        description: &'static str,
        handler: Arc<dyn UpdateHandler>,
        admin_only: bool,
    ) -> Result<Self> {
        if self.commands.contains_key(name) {
            return Err(BotError::Config(format!(
                "duplicate command registration: /{}",
                name
            )));
        }
        self.commands.insert(
            name.to_string(),
            RegisteredCommand {
                handler,
                admin_only,
                description,
            },
        );
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredCommand> {
        self.commands.get(name)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Public commands with descriptions, sorted by name. Feeds `/help`.
    pub fn describe_public(&self) -> Vec<(String, &'static str)> {
        let mut rows: Vec<(String, &'static str)> = self
            .commands
            .iter()
            .filter(|(_, command)| !command.admin_only)
            .map(|(name, command)| (name.clone(), command.description))
            .collect();
        rows.sort();
        rows
    }
}

/// Pre-pipeline check for admin-only commands. Distinct from the permission
/// middleware, which only annotates context; the gate actively refuses.
pub struct AdminGate {
    privileged: HashSet<i64>,
}

impl AdminGate {
    pub fn new(owner_ids: &HashSet<i64>, admin_ids: &HashSet<i64>) -> Self {
        Self {
            privileged: owner_ids.union(admin_ids).copied().collect(),
        }
    }

    /// Owners and admins pass; unknown users and userless updates do not.
    pub fn permits(&self, user_id: Option<i64>) -> bool {
        user_id.is_some_and(|id| self.privileged.contains(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use zultra_core::{Update, UpdateContext};

    struct NullHandler;

    #[async_trait]
    impl UpdateHandler for NullHandler {
        async fn handle(&self, _update: &Update, _ctx: &UpdateContext) -> Result<()> {
            Ok(())
        }
    }

    fn handler() -> Arc<dyn UpdateHandler> {
        Arc::new(NullHandler)
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let result = CommandRegistry::new()
            .register("start", "a", handler())
            .and_then(|r| r.register("start", "b", handler()));
        assert!(matches!(result, Err(BotError::Config(_))));
    }

    #[test]
    fn test_lookup_and_admin_flag() {
        let registry = CommandRegistry::new()
            .register("start", "intro", handler())
            .and_then(|r| r.register_admin("health", "report", handler()))
            .expect("Failed to build registry");

        assert_eq!(registry.len(), 2);
        assert!(!registry.get("start").expect("missing /start").admin_only);
        assert!(registry.get("health").expect("missing /health").admin_only);
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_describe_public_sorts_and_skips_admin_commands() {
        let registry = CommandRegistry::new()
            .register("ping", "pong", handler())
            .and_then(|r| r.register("ask", "question", handler()))
            .and_then(|r| r.register_admin("health", "report", handler()))
            .expect("Failed to build registry");

        let rows = registry.describe_public();
        assert_eq!(
            rows,
            vec![("ask".to_string(), "question"), ("ping".to_string(), "pong")]
        );
    }

    #[test]
    fn test_gate_permits_owners_and_admins_only() {
        let gate = AdminGate::new(&HashSet::from([1000]), &HashSet::from([2000]));
        assert!(gate.permits(Some(1000)));
        assert!(gate.permits(Some(2000)));
        assert!(!gate.permits(Some(3000)));
        assert!(!gate.permits(None));
    }
}
