//! Tests for TOML configuration parsing.

use crate::prefs::ConfigField;

use super::toml::{TomlConfig, default_config_template};

mod parsing {
    use super::*;

    #[test]
    fn parse_empty_config() {
        let config = TomlConfig::parse("").unwrap();
        assert!(config.storage.path.is_none());
        assert!(config.storage.section.is_none());
        assert!(config.defaults.ssid.is_none());
    }

    #[test]
    fn parse_storage_section() {
        let toml = r#"
            [storage]
            path = "/var/lib/cam/prefs.json"
            section = "Camera01"
        "#;

        let config = TomlConfig::parse(toml).unwrap();
        assert_eq!(
            config.storage.path.as_deref(),
            Some("/var/lib/cam/prefs.json")
        );
        assert_eq!(config.storage.section.as_deref(), Some("Camera01"));
    }

    #[test]
    fn parse_defaults_section() {
        let toml = r#"
            [defaults]
            ssid = "Workshop"
            passphrase = "s3cret"
            ip_address = "10.0.0.50"
            gateway = "10.0.0.1"
            netmask = "255.255.255.0"
            module_type = "ESP32-S3-CAM"
        "#;

        let config = TomlConfig::parse(toml).unwrap();
        let defaults = &config.defaults;

        assert_eq!(defaults.get(ConfigField::Ssid), Some("Workshop"));
        assert_eq!(defaults.get(ConfigField::Passphrase), Some("s3cret"));
        assert_eq!(defaults.get(ConfigField::IpAddress), Some("10.0.0.50"));
        assert_eq!(defaults.get(ConfigField::Gateway), Some("10.0.0.1"));
        assert_eq!(defaults.get(ConfigField::NetMask), Some("255.255.255.0"));
        assert_eq!(defaults.get(ConfigField::ModuleType), Some("ESP32-S3-CAM"));
    }

    #[test]
    fn partial_defaults_leave_others_unset() {
        let config = TomlConfig::parse("[defaults]\nssid = \"Lab\"\n").unwrap();
        assert_eq!(config.defaults.get(ConfigField::Ssid), Some("Lab"));
        assert_eq!(config.defaults.get(ConfigField::Gateway), None);
    }
}

mod errors {
    use super::*;

    #[test]
    fn unknown_section_is_rejected() {
        assert!(TomlConfig::parse("[wifi]\nssid = \"x\"\n").is_err());
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert!(TomlConfig::parse("[defaults]\nhostname = \"cam\"\n").is_err());
    }

    #[test]
    fn wrong_type_is_rejected() {
        assert!(TomlConfig::parse("[storage]\npath = 5\n").is_err());
    }

    #[test]
    fn load_missing_file_reports_path() {
        let err = TomlConfig::load(std::path::Path::new("/nonexistent/cam-prefs.toml"))
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/cam-prefs.toml"));
    }
}

mod template {
    use super::*;

    #[test]
    fn template_parses() {
        let config = TomlConfig::parse(&default_config_template()).unwrap();
        assert!(config.storage.path.is_none());
        assert!(config.defaults.ssid.is_none());
    }

    #[test]
    fn template_documents_every_default() {
        let template = default_config_template();
        for key in [
            "ssid",
            "passphrase",
            "ip_address",
            "gateway",
            "netmask",
            "module_type",
        ] {
            assert!(template.contains(&format!("# {key} = ")), "{key}");
        }
    }
}
