//! Notification permission backed by the config file.
//!
//! Like an OS permission prompt, the user is asked once; the answer is
//! remembered in config.toml and not asked again.

use std::io::IsTerminal;
use std::sync::Mutex;

use async_trait::async_trait;
use dialoguer::Confirm;
use showup_core::config::ShowUpConfig;
use showup_core::dispatch::PermissionGate;
use tracing::{info, warn};

pub struct PromptPermissionGate {
    config: Mutex<ShowUpConfig>,
}

impl PromptPermissionGate {
    pub fn new(config: ShowUpConfig) -> Self {
        PromptPermissionGate {
            config: Mutex::new(config),
        }
    }

    fn answer(&self) -> Option<bool> {
        self.config
            .lock()
            .map(|config| config.reminders_allowed)
            .unwrap_or(None)
    }
}

#[async_trait]
impl PermissionGate for PromptPermissionGate {
    async fn has_permission(&self) -> bool {
        self.answer() == Some(true)
    }

    async fn request_permission(&self) -> bool {
        if let Some(answer) = self.answer() {
            return answer;
        }

        if !std::io::stdin().is_terminal() {
            warn!("Not asking for reminder permission outside a terminal");
            return false;
        }

        let prompt = tokio::task::spawn_blocking(|| {
            Confirm::new()
                .with_prompt("  Allow showup to send you event reminders?")
                .default(true)
                .interact()
        })
        .await;

        let granted = match prompt {
            Ok(Ok(granted)) => granted,
            Ok(Err(e)) => {
                warn!("Permission prompt failed: {}", e);
                return false;
            }
            Err(e) => {
                warn!("Permission prompt failed: {}", e);
                return false;
            }
        };

        match self.config.lock() {
            Ok(mut config) => {
                if let Err(e) = config.set_reminders_allowed(granted) {
                    warn!("Could not remember permission answer: {}", e);
                }
            }
            Err(e) => warn!("Could not remember permission answer: {}", e),
        }

        info!(granted, "Reminder permission answered");
        granted
    }
}
