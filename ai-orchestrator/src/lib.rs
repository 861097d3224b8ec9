//! # AI orchestrator
//!
//! One front door over the optional AI providers. OpenAI is preferred when
//! configured and Gemini is the fallback; with neither key present `ask`
//! fails with an external-service error and the bot runs without AI
//! features.

mod gemini;
mod openai;

use std::collections::BTreeMap;

use tracing::{info, warn};
use zultra_core::{BotError, Result};

pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

pub struct AiOrchestrator {
    openai: Option<OpenAiProvider>,
    gemini: Option<GeminiProvider>,
}

impl AiOrchestrator {
    /// Builds a provider for each API key that is present.
    pub fn new(openai_api_key: Option<String>, gemini_api_key: Option<String>) -> Result<Self> {
        let openai = openai_api_key.map(|key| {
            info!("OpenAI provider configured");
            OpenAiProvider::new(key, DEFAULT_OPENAI_MODEL.to_string())
        });
        let gemini = match gemini_api_key {
            Some(key) => {
                info!("Gemini provider configured");
                Some(
                    GeminiProvider::new(key, DEFAULT_GEMINI_MODEL.to_string())
                        .map_err(|e| BotError::ExternalService(e.to_string()))?,
                )
            }
            None => None,
        };
        Ok(Self { openai, gemini })
    }

    pub fn is_configured(&self) -> bool {
        self.openai.is_some() || self.gemini.is_some()
    }

    /// Asks the preferred provider, falling back to the next one on failure.
    /// No internal timeout; callers wrap this with their own deadline.
    pub async fn ask(&self, prompt: &str) -> Result<String> {
        if let Some(openai) = &self.openai {
            match openai.ask(prompt).await {
                Ok(answer) => return Ok(answer),
                Err(e) => warn!(error = %e, "OpenAI request failed"),
            }
        }
        if let Some(gemini) = &self.gemini {
            match gemini.ask(prompt).await {
                Ok(answer) => return Ok(answer),
                Err(e) => warn!(error = %e, "Gemini request failed"),
            }
        }
        Err(BotError::ExternalService(
            "no AI provider available".to_string(),
        ))
    }

    /// Per-provider status map for the health report.
    pub fn health_check(&self) -> BTreeMap<String, String> {
        let status = |configured: bool| {
            if configured {
                "configured"
            } else {
                "not configured"
            }
            .to_string()
        };
        BTreeMap::from([
            ("openai".to_string(), status(self.openai.is_some())),
            ("gemini".to_string(), status(self.gemini.is_some())),
        ])
    }
}
