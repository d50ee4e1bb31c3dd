//! Client Contact Details
//!
//! The customer types their details into a form next to the chat. The
//! `CollectClientInfo` tool only reads the form; filling it is the job of
//! whoever owns the session.

use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

/// Name, email and phone as typed by the customer
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl ClientInfo {
    pub fn new(name: impl Into<String>, email: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }

    /// All three fields hold something other than whitespace
    pub fn is_complete(&self) -> bool {
        [&self.name, &self.email, &self.phone]
            .iter()
            .all(|field| !field.trim().is_empty())
    }
}

/// Render complete contact details, or `None` while any field is missing
pub fn format_client_info(info: &ClientInfo) -> Option<String> {
    if !info.is_complete() {
        return None;
    }

    Some(format!(
        "Client info: Name: {}, Email: {}, Phone: {}",
        info.name.trim(),
        info.email.trim(),
        info.phone.trim()
    ))
}

/// Where the current contact details come from
pub trait ClientInfoSource: Send + Sync {
    fn current(&self) -> ClientInfo;
}

impl ClientInfoSource for ClientInfo {
    fn current(&self) -> ClientInfo {
        self.clone()
    }
}

/// Partial form update; `None` leaves a field untouched
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ContactUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Shared, mutable contact form for one session
///
/// Clones share the same fields.
#[derive(Clone, Debug, Default)]
pub struct ContactForm {
    fields: Arc<RwLock<ClientInfo>>,
}

impl ContactForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every field
    pub fn set(&self, info: ClientInfo) {
        *self.fields.write().unwrap_or_else(PoisonError::into_inner) = info;
    }

    /// Apply the fields present in `update`
    pub fn update(&self, update: ContactUpdate) {
        let mut fields = self.fields.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(name) = update.name {
            fields.name = name;
        }
        if let Some(email) = update.email {
            fields.email = email;
        }
        if let Some(phone) = update.phone {
            fields.phone = phone;
        }
    }

    pub fn snapshot(&self) -> ClientInfo {
        self.fields.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn is_complete(&self) -> bool {
        self.snapshot().is_complete()
    }

    pub fn clear(&self) {
        self.set(ClientInfo::default());
    }
}

impl ClientInfoSource for ContactForm {
    fn current(&self) -> ClientInfo {
        self.snapshot()
    }
}
