//! Bot response orchestration: remote completion with local fallback.

use std::ops::RangeInclusive;
use std::time::Duration;

use rand::Rng;
use tracing::warn;

use crate::ai::{fallback, GroqClient};
use crate::config::Config;

/// Pacing range (milliseconds) for the typing indicator. It is display
/// theatre: unrelated to how long the completion actually took.
pub const DEFAULT_DELAY_RANGE: RangeInclusive<u64> = 1500..=2500;

const APOLOGY: &str =
    "Desculpe, tive um problema para processar sua mensagem. Pode tentar novamente? 😅";
const APOLOGY_DELAY: Duration = Duration::from_millis(1000);

/// The assistant's reply for one turn, plus how long the UI should keep
/// the typing indicator up before showing it.
#[derive(Debug, Clone, PartialEq)]
pub struct BotReply {
    pub text: String,
    pub display_delay: Duration,
}

impl BotReply {
    /// Canned reply for turns that failed past every other safety net.
    pub fn apology() -> Self {
        Self {
            text: APOLOGY.to_string(),
            display_delay: APOLOGY_DELAY,
        }
    }
}

pub struct BotResponder {
    client: Option<GroqClient>,
    delay_range: RangeInclusive<u64>,
}

impl BotResponder {
    /// Assemble from configuration. A missing API key is not an error: the
    /// responder simply runs in canned-answer mode.
    pub fn from_config(config: &Config) -> Self {
        let client = config
            .api_key
            .as_deref()
            .map(|key| GroqClient::new(key, &config.model, config.base_url.as_deref()));
        if client.is_none() {
            warn!("no API key configured, using canned responses");
        }
        Self {
            client,
            delay_range: DEFAULT_DELAY_RANGE,
        }
    }

    /// Override the pacing range. Tests pin it to a single value.
    pub fn with_delay_range(mut self, delay_range: RangeInclusive<u64>) -> Self {
        self.delay_range = delay_range;
        self
    }

    /// Produce the reply for one turn. Any remote failure degrades to the
    /// keyword responder; this never errors.
    pub async fn respond(&self, user_text: &str) -> BotReply {
        let text = match &self.client {
            None => fallback::respond(user_text).to_string(),
            Some(client) => match client.complete(user_text).await {
                Ok(text) => text,
                Err(err) => {
                    warn!(error = %err, "completion failed, falling back");
                    fallback::respond(user_text).to_string()
                }
            },
        };

        BotReply {
            text,
            display_delay: self.suggest_delay(),
        }
    }

    fn suggest_delay(&self) -> Duration {
        Duration::from_millis(rand::thread_rng().gen_range(self.delay_range.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::fallback;

    fn offline_config() -> Config {
        Config {
            api_key: None,
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn no_credential_answers_from_the_fallback() {
        let responder = BotResponder::from_config(&offline_config());
        let reply = responder.respond("oi").await;
        assert_eq!(reply.text, fallback::GREETING);
    }

    #[tokio::test]
    async fn display_delay_stays_inside_the_configured_range() {
        let responder = BotResponder::from_config(&offline_config());
        for _ in 0..50 {
            let reply = responder.respond("oi").await;
            let millis = reply.display_delay.as_millis() as u64;
            assert!(DEFAULT_DELAY_RANGE.contains(&millis));
        }
    }

    #[tokio::test]
    async fn pinned_delay_range_is_honored() {
        let responder = BotResponder::from_config(&offline_config()).with_delay_range(7..=7);
        let reply = responder.respond("oi").await;
        assert_eq!(reply.display_delay, Duration::from_millis(7));
    }

    #[tokio::test]
    async fn transport_failure_still_yields_a_usable_reply() {
        // Nothing listens on this port; the request fails fast and the
        // responder must degrade to the fallback instead of erroring.
        let config = Config {
            api_key: Some("gsk_test".to_string()),
            base_url: Some("http://127.0.0.1:1/v1/chat/completions".to_string()),
            ..Config::default()
        };
        let responder = BotResponder::from_config(&config);

        let reply = responder.respond("qualquer coisa").await;
        assert!(!reply.text.is_empty());
        let millis = reply.display_delay.as_millis() as u64;
        assert!(DEFAULT_DELAY_RANGE.contains(&millis));
    }

    #[test]
    fn apology_is_fixed_and_short() {
        let apology = BotReply::apology();
        assert!(!apology.text.is_empty());
        assert_eq!(apology.display_delay, Duration::from_millis(1000));
    }
}
