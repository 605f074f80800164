use multimail::config::EnvConfig;
use multimail::{MailSettings, ProfileRegistry, TlsMode};

#[test]
fn settings_load_profiles_from_environment() {
    std::env::set_var("MMCFG__DEFAULT_PROFILE", "primary");
    std::env::set_var("MMCFG__CONCURRENCY", "8");
    std::env::set_var("MMCFG__PROFILES__PRIMARY__HOST", "smtp.primary.example.com");
    std::env::set_var("MMCFG__PROFILES__PRIMARY__USERNAME", "me@example.com");
    std::env::set_var("MMCFG__PROFILES__PRIMARY__PASSWORD", "secret");
    std::env::set_var("MMCFG__PROFILES__OFFICE365__HOST", "smtp.office365.com");
    std::env::set_var("MMCFG__PROFILES__OFFICE365__PORT", "2525");
    std::env::set_var("MMCFG__PROFILES__OFFICE365__FROM", "noreply@example.com");
    std::env::set_var("MMCFG__PROFILES__OFFICE365__TLS", "tls");

    let settings = MailSettings::from_env_with_prefix("MMCFG").unwrap();

    assert_eq!(settings.default_profile, "primary");
    assert_eq!(settings.concurrency, 8);
    assert_eq!(settings.profiles.len(), 2);

    let office = &settings.profiles["office365"];
    assert_eq!(office.port, 2525);
    assert_eq!(office.tls, TlsMode::Tls);
    assert_eq!(office.sender_address(), Some("noreply@example.com"));

    let primary = &settings.profiles["primary"];
    assert_eq!(primary.port, 587);
    assert_eq!(primary.tls, TlsMode::StartTls);
    assert_eq!(primary.sender_address(), Some("me@example.com"));

    for key in [
        "MMCFG__DEFAULT_PROFILE",
        "MMCFG__CONCURRENCY",
        "MMCFG__PROFILES__PRIMARY__HOST",
        "MMCFG__PROFILES__PRIMARY__USERNAME",
        "MMCFG__PROFILES__PRIMARY__PASSWORD",
        "MMCFG__PROFILES__OFFICE365__HOST",
        "MMCFG__PROFILES__OFFICE365__PORT",
        "MMCFG__PROFILES__OFFICE365__FROM",
        "MMCFG__PROFILES__OFFICE365__TLS",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn settings_default_without_environment() {
    let settings = MailSettings::from_env_with_prefix("MMCFG_EMPTY").unwrap();

    assert_eq!(settings.default_profile, "default");
    assert_eq!(settings.concurrency, 4);
    assert!(settings.profiles.is_empty());
}

#[test]
fn registry_from_settings() {
    let settings: MailSettings = serde_json::from_value(serde_json::json!({
        "profiles": {
            "default": {
                "host": "smtp.a.example.com",
                "username": "a@example.com",
                "password": "pw"
            },
            "EmailOffice365": {
                "host": "smtp.office365.com",
                "from": "b@example.com",
                "tls": "starttls"
            }
        }
    }))
    .unwrap();

    let registry = ProfileRegistry::from_settings(&settings).unwrap();

    assert_eq!(registry.len(), 2);
    assert_eq!(
        registry.resolve_default().unwrap().sender().email.to_string(),
        "a@example.com"
    );
    assert_eq!(
        registry.resolve("EmailOffice365").unwrap().sender().email.to_string(),
        "b@example.com"
    );
}

#[test]
fn mixed_case_default_profile_resolves_from_environment() {
    std::env::set_var("MMCASE__DEFAULT_PROFILE", "EmailOffice365");
    std::env::set_var("MMCASE__PROFILES__EmailOffice365__HOST", "smtp.office.com");
    std::env::set_var("MMCASE__PROFILES__EmailOffice365__FROM", "b@example.com");
    std::env::set_var("MMCASE__PROFILES__EmailOffice365__TLS", "none");

    let settings = MailSettings::from_env_with_prefix("MMCASE").unwrap();

    for key in [
        "MMCASE__DEFAULT_PROFILE",
        "MMCASE__PROFILES__EmailOffice365__HOST",
        "MMCASE__PROFILES__EmailOffice365__FROM",
        "MMCASE__PROFILES__EmailOffice365__TLS",
    ] {
        std::env::remove_var(key);
    }

    assert_eq!(settings.default_profile, "EmailOffice365");
    assert!(settings.profiles.contains_key("emailoffice365"));

    let registry = ProfileRegistry::from_settings(&settings).unwrap();
    assert_eq!(registry.default_name(), "emailoffice365");
    let default = registry.resolve_default().unwrap();
    assert_eq!(default.sender().email.to_string(), "b@example.com");
}

#[test]
fn registry_rejects_default_without_profile() {
    let settings: MailSettings = serde_json::from_value(serde_json::json!({
        "default_profile": "primary",
        "profiles": { "other": { "host": "smtp.a.example.com", "from": "a@example.com" } }
    }))
    .unwrap();

    let result = ProfileRegistry::from_settings(&settings);
    assert!(matches!(result, Err(multimail::ProfileError::NoDefault)));
}

#[test]
fn registry_rejects_profile_without_sender() {
    let settings: MailSettings = serde_json::from_value(serde_json::json!({
        "profiles": { "default": { "host": "smtp.a.example.com" } }
    }))
    .unwrap();

    assert!(matches!(
        ProfileRegistry::from_settings(&settings),
        Err(multimail::ProfileError::InvalidSender { .. })
    ));
}
