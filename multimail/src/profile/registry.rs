use std::collections::HashMap;
use std::sync::Arc;

use lettre::message::Mailbox;

use super::{ConnectionProperties, Profile, DEFAULT_PROFILE};
use crate::config::MailSettings;
use crate::error::{ProfileError, TransportError};
use crate::mail::{SmtpTransport, Transport};

/// Maps profile names to their connection settings and transport.
///
/// Built once at startup through [`ProfileRegistryBuilder`] and never mutated
/// afterwards, so it can be shared behind an `Arc` and read without locking.
pub struct ProfileRegistry {
    profiles: HashMap<String, Profile>,
    default: String,
}

impl ProfileRegistry {
    pub fn builder() -> ProfileRegistryBuilder {
        ProfileRegistryBuilder::default()
    }

    /// Build an SMTP transport for every configured profile.
    ///
    /// Profile names read from the environment arrive lowercased, so the
    /// default name is matched ignoring ASCII case when no profile carries it
    /// verbatim. A default that names no configured profile is an error.
    pub fn from_settings(settings: &MailSettings) -> Result<Self, ProfileError> {
        let default = configured_default(settings)?;

        let mut builder = Self::builder().default_profile(default);
        for (name, properties) in &settings.profiles {
            let transport =
                SmtpTransport::from_properties(properties).map_err(|e| smtp_error(name, &e))?;
            builder = builder.register(name, properties.clone(), transport)?;
        }
        Ok(builder.build())
    }

    /// Look up a profile by name. Never falls back to the default profile.
    pub fn resolve(&self, name: &str) -> Result<&Profile, ProfileError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ProfileError::NotFound(name.to_string()))
    }

    pub fn resolve_default(&self) -> Result<&Profile, ProfileError> {
        self.profiles
            .get(&self.default)
            .ok_or(ProfileError::NoDefault)
    }

    /// The selected profile, or the default one when `name` is `None`.
    pub fn resolve_or_default(&self, name: Option<&str>) -> Result<&Profile, ProfileError> {
        match name {
            Some(name) => self.resolve(name),
            None => self.resolve_default(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }

    pub fn default_name(&self) -> &str {
        &self.default
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

fn configured_default(settings: &MailSettings) -> Result<&str, ProfileError> {
    let wanted = settings.default_profile.as_str();
    if settings.profiles.contains_key(wanted) {
        return Ok(wanted);
    }

    let name = settings
        .profiles
        .keys()
        .map(String::as_str)
        .find(|name| name.eq_ignore_ascii_case(wanted))
        .ok_or(ProfileError::NoDefault)?;
    tracing::debug!(configured = wanted, profile = %name, "matched default profile ignoring case");
    Ok(name)
}

fn smtp_error(profile: &str, error: &TransportError) -> ProfileError {
    ProfileError::Smtp {
        profile: profile.to_string(),
        message: error.to_string(),
    }
}

/// Collects profiles before the registry is frozen.
pub struct ProfileRegistryBuilder {
    profiles: HashMap<String, Profile>,
    default: String,
}

impl Default for ProfileRegistryBuilder {
    fn default() -> Self {
        Self {
            profiles: HashMap::new(),
            default: DEFAULT_PROFILE.to_string(),
        }
    }
}

impl ProfileRegistryBuilder {
    /// Register a profile. Duplicate names and unparseable sender addresses
    /// are configuration errors.
    pub fn register<T: Transport>(
        mut self,
        name: impl Into<String>,
        properties: ConnectionProperties,
        transport: T,
    ) -> Result<Self, ProfileError> {
        let name = name.into();
        if self.profiles.contains_key(&name) {
            return Err(ProfileError::Duplicate(name));
        }

        let address = properties.sender_address().unwrap_or_default().to_string();
        let sender: Mailbox = address.parse().map_err(|_| ProfileError::InvalidSender {
            profile: name.clone(),
            address: address.clone(),
        })?;

        tracing::debug!(profile = %name, host = %properties.host, "registered mail profile");
        let profile = Profile {
            name: name.clone(),
            properties,
            sender,
            transport: Arc::new(transport),
        };
        self.profiles.insert(name, profile);
        Ok(self)
    }

    /// Name of the profile used when a call selects none (default: `"default"`).
    pub fn default_profile(mut self, name: impl Into<String>) -> Self {
        self.default = name.into();
        self
    }

    pub fn build(self) -> ProfileRegistry {
        if !self.profiles.contains_key(&self.default) {
            tracing::warn!(default = %self.default, "no default mail profile registered");
        }
        ProfileRegistry {
            profiles: self.profiles,
            default: self.default,
        }
    }
}
