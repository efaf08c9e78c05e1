// src/models/messages.rs
use std::fmt;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};

/// Characters left untouched by JavaScript's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageChannel {
    WhatsApp,
    Sms,
}

impl fmt::Display for MessageChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageChannel::WhatsApp => write!(f, "whatsapp"),
            MessageChannel::Sms => write!(f, "sms"),
        }
    }
}

/// A URL that opens an external messaging composer for one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeepLink {
    pub channel: MessageChannel,
    pub recipient: String,
    pub url: String,
}

impl DeepLink {
    /// `https://wa.me/<digits>?text=<message>`; a leading `+` is dropped from the number.
    pub fn whatsapp(number: &str, message: &str) -> Self {
        let digits = number.strip_prefix('+').unwrap_or(number);
        Self {
            channel: MessageChannel::WhatsApp,
            recipient: number.to_string(),
            url: format!("https://wa.me/{}?text={}", digits, encode_uri_component(message)),
        }
    }

    /// `sms:<number>?body=<message>` with the number exactly as given.
    pub fn sms(number: &str, message: &str) -> Self {
        Self {
            channel: MessageChannel::Sms,
            recipient: number.to_string(),
            url: format!("sms:{}?body={}", number, encode_uri_component(message)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for DeepLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

pub fn encode_uri_component(input: &str) -> String {
    utf8_percent_encode(input, URI_COMPONENT).to_string()
}
