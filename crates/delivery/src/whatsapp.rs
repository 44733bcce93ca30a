//! WhatsApp delivery via the Twilio Messages API.
//!
//! [`WhatsAppDispatcher`] posts one form-encoded request per message to
//! `POST /2010-04-01/Accounts/{sid}/Messages.json`. Every failure (transport,
//! non-2xx status, timeout) is logged and reported as `false`; nothing here
//! ever fails an SOS.

use std::time::Duration;

use async_trait::async_trait;
use beacon_core::sos::NotificationDispatcher;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Errors from the Twilio REST layer.
#[derive(Debug, thiserror::Error)]
pub enum TwilioError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Twilio returned a non-2xx status code.
    #[error("Twilio API error ({status}): {body}")]
    ApiError { status: u16, body: String },
}

// ---------------------------------------------------------------------------
// TwilioConfig
// ---------------------------------------------------------------------------

/// Production Twilio API host.
pub const DEFAULT_TWILIO_API_URL: &str = "https://api.twilio.com";

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(8);

/// Credentials and sender for the WhatsApp channel.
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Sender number, with or without the `whatsapp:` prefix.
    pub from: String,
    /// API host; overridable for testing.
    pub api_url: String,
    pub timeout: Duration,
}

impl TwilioConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` unless all three credentials are set, signalling that
    /// WhatsApp delivery is disabled.
    ///
    /// | Variable               | Required | Default                  |
    /// |------------------------|----------|--------------------------|
    /// | `TWILIO_ACCOUNT_SID`   | yes      |                          |
    /// | `TWILIO_AUTH_TOKEN`    | yes      |                          |
    /// | `TWILIO_WHATSAPP_FROM` | yes      |                          |
    /// | `TWILIO_API_URL`       | no       | `https://api.twilio.com` |
    pub fn from_env() -> Option<Self> {
        let account_sid = non_empty_var("TWILIO_ACCOUNT_SID")?;
        let auth_token = non_empty_var("TWILIO_AUTH_TOKEN")?;
        let from = non_empty_var("TWILIO_WHATSAPP_FROM")?;
        Some(Self {
            account_sid,
            auth_token,
            from,
            api_url: std::env::var("TWILIO_API_URL")
                .unwrap_or_else(|_| DEFAULT_TWILIO_API_URL.to_string()),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Prefix a phone number with the `whatsapp:` channel marker unless it
/// already carries one.
pub fn whatsapp_address(number: &str) -> String {
    let number = number.trim();
    if number.starts_with("whatsapp:") {
        number.to_string()
    } else {
        format!("whatsapp:{number}")
    }
}

// ---------------------------------------------------------------------------
// WhatsAppDispatcher
// ---------------------------------------------------------------------------

/// Subset of the Twilio message resource we log.
#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
}

/// Sends SOS alerts as WhatsApp messages.
pub struct WhatsAppDispatcher {
    client: reqwest::Client,
    config: TwilioConfig,
}

impl WhatsAppDispatcher {
    pub fn new(config: TwilioConfig) -> Result<Self, TwilioError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.config.api_url.trim_end_matches('/'),
            self.config.account_sid
        )
    }

    /// Send one message, returning the Twilio message SID.
    pub async fn send_message(
        &self,
        to: &str,
        body: &str,
        media_url: Option<&str>,
    ) -> Result<String, TwilioError> {
        let from = whatsapp_address(&self.config.from);
        let to = whatsapp_address(to);
        let mut form = vec![("From", from.as_str()), ("To", to.as_str()), ("Body", body)];
        if let Some(url) = media_url {
            form.push(("MediaUrl", url));
        }

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(TwilioError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let message: MessageResource = response.json().await?;
        Ok(message.sid)
    }
}

#[async_trait]
impl NotificationDispatcher for WhatsAppDispatcher {
    async fn send(&self, to: &str, message: &str, media_url: Option<&str>) -> bool {
        match self.send_message(to, message, media_url).await {
            Ok(sid) => {
                tracing::info!(to, sid = %sid, "WhatsApp message sent");
                true
            }
            Err(e) => {
                tracing::warn!(to, error = %e, "WhatsApp delivery failed");
                false
            }
        }
    }
}

/// Dispatcher used when Twilio is not configured. Every attempt is
/// reported as not delivered.
pub struct DisabledDispatcher;

#[async_trait]
impl NotificationDispatcher for DisabledDispatcher {
    async fn send(&self, to: &str, _message: &str, _media_url: Option<&str>) -> bool {
        tracing::warn!(to, "WhatsApp delivery is not configured, message dropped");
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_url: &str) -> TwilioConfig {
        TwilioConfig {
            account_sid: "AC123".to_string(),
            auth_token: "secret".to_string(),
            from: "+14155238886".to_string(),
            api_url: api_url.to_string(),
            timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn address_gets_channel_prefix() {
        assert_eq!(whatsapp_address("+15550001"), "whatsapp:+15550001");
        assert_eq!(whatsapp_address(" +15550001 "), "whatsapp:+15550001");
    }

    #[test]
    fn address_prefix_is_not_doubled() {
        assert_eq!(whatsapp_address("whatsapp:+15550001"), "whatsapp:+15550001");
    }

    #[test]
    fn messages_url_includes_account() {
        let dispatcher = WhatsAppDispatcher::new(config("https://api.twilio.com/")).unwrap();
        assert_eq!(
            dispatcher.messages_url(),
            "https://api.twilio.com/2010-04-01/Accounts/AC123/Messages.json"
        );
    }

    #[test]
    fn api_error_display() {
        let err = TwilioError::ApiError {
            status: 400,
            body: "invalid To".to_string(),
        };
        assert_eq!(err.to_string(), "Twilio API error (400): invalid To");
    }

    #[tokio::test]
    async fn unreachable_api_reports_not_delivered() {
        // Port 9 (discard) on loopback is not listening in test environments.
        let dispatcher = WhatsAppDispatcher::new(config("http://127.0.0.1:9")).unwrap();
        assert!(!dispatcher.send("+15550001", "hello", None).await);
    }

    #[tokio::test]
    async fn disabled_dispatcher_never_delivers() {
        assert!(!DisabledDispatcher.send("+15550001", "hello", None).await);
    }
}
