//! Outbound delivery channels.
//!
//! - [`whatsapp`] -- WhatsApp messages through the Twilio REST API; the
//!   production [`NotificationDispatcher`](beacon_core::sos::NotificationDispatcher).
//! - [`email`] -- one-time-password emails over SMTP.

pub mod email;
pub mod whatsapp;

pub use email::{EmailConfig, EmailError, OtpMailer};
pub use whatsapp::{DisabledDispatcher, TwilioConfig, TwilioError, WhatsAppDispatcher};
