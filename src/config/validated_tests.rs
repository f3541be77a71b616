//! Tests for validated configuration.

use std::path::PathBuf;

use crate::prefs::{ConfigField, defaults as factory};

use super::ConfigError;
use super::cli::Cli;
use super::toml::TomlConfig;
use super::validated::{ValidatedConfig, write_default_config};

/// Helper to create CLI args from a slice
fn cli(args: &[&str]) -> Cli {
    let mut full_args = vec!["cam-prefs"];
    full_args.extend(args);
    Cli::parse_from_iter(full_args)
}

/// Helper to parse TOML config
fn toml(content: &str) -> TomlConfig {
    TomlConfig::parse(content).unwrap()
}

mod storage {
    use super::*;

    #[test]
    fn built_in_defaults() {
        let config = ValidatedConfig::from_raw(&cli(&[]), None).unwrap();

        assert_eq!(config.storage_path, PathBuf::from("cam-prefs.json"));
        assert_eq!(config.section, "Common");
        assert!(!config.verbose);
    }

    #[test]
    fn toml_overrides_built_ins() {
        let toml = toml("[storage]\npath = \"/data/prefs.json\"\nsection = \"Cam\"\n");
        let config = ValidatedConfig::from_raw(&cli(&[]), Some(&toml)).unwrap();

        assert_eq!(config.storage_path, PathBuf::from("/data/prefs.json"));
        assert_eq!(config.section, "Cam");
    }

    #[test]
    fn cli_overrides_toml() {
        let toml = toml("[storage]\npath = \"/data/prefs.json\"\nsection = \"Cam\"\n");
        let cli = cli(&["--storage", "local.json", "--section", "Bench"]);
        let config = ValidatedConfig::from_raw(&cli, Some(&toml)).unwrap();

        assert_eq!(config.storage_path, PathBuf::from("local.json"));
        assert_eq!(config.section, "Bench");
    }

    #[test]
    fn empty_section_is_rejected() {
        let result = ValidatedConfig::from_raw(&cli(&["--section", ""]), None);
        assert!(matches!(result, Err(ConfigError::InvalidSection { .. })));
    }

    #[test]
    fn long_section_is_rejected() {
        let result = ValidatedConfig::from_raw(&cli(&["--section", "ABCDEFGHIJKLMNOP"]), None);
        assert!(matches!(result, Err(ConfigError::InvalidSection { .. })));
    }

    #[test]
    fn fifteen_character_section_is_accepted() {
        let config =
            ValidatedConfig::from_raw(&cli(&["--section", "ABCDEFGHIJKLMNO"]), None).unwrap();
        assert_eq!(config.section, "ABCDEFGHIJKLMNO");
    }

    #[test]
    fn verbose_flag_is_carried() {
        let config = ValidatedConfig::from_raw(&cli(&["-v"]), None).unwrap();
        assert!(config.verbose);
    }
}

mod factory_defaults {
    use super::*;

    #[test]
    fn without_toml_uses_built_ins() {
        let config = ValidatedConfig::from_raw(&cli(&[]), None).unwrap();

        assert_eq!(*config.defaults.get(ConfigField::Ssid), factory::SSID);
        assert_eq!(*config.defaults.get(ConfigField::NetMask), factory::NETMASK);
    }

    #[test]
    fn toml_overrides_single_fields() {
        let toml = toml("[defaults]\nssid = \"Workshop\"\ngateway = \"10.0.0.1\"\n");
        let config = ValidatedConfig::from_raw(&cli(&[]), Some(&toml)).unwrap();
        let defaults = &config.defaults;

        assert_eq!(*defaults.get(ConfigField::Ssid), "Workshop");
        assert_eq!(*defaults.get(ConfigField::Gateway), "10.0.0.1");
        assert_eq!(*defaults.get(ConfigField::IpAddress), factory::IP_ADDRESS);
        assert_eq!(*defaults.get(ConfigField::ModuleType), factory::MODULE_TYPE);
    }

    #[test]
    fn empty_ssid_is_rejected() {
        let toml = toml("[defaults]\nssid = \"\"\n");
        let result = ValidatedConfig::from_raw(&cli(&[]), Some(&toml));

        assert!(matches!(
            result,
            Err(ConfigError::InvalidDefault {
                field: "Net_SSID",
                ..
            })
        ));
    }

    #[test]
    fn empty_passphrase_is_accepted() {
        let toml = toml("[defaults]\npassphrase = \"\"\n");
        let config = ValidatedConfig::from_raw(&cli(&[]), Some(&toml)).unwrap();
        assert!(config.defaults.get(ConfigField::Passphrase).is_empty());
    }

    #[test]
    fn overlong_value_is_rejected() {
        let long = "x".repeat(64);
        let toml = toml(&format!("[defaults]\nmodule_type = \"{long}\"\n"));
        let result = ValidatedConfig::from_raw(&cli(&[]), Some(&toml));

        assert!(matches!(
            result,
            Err(ConfigError::InvalidDefault {
                field: "Module_Type",
                ..
            })
        ));
    }

    #[test]
    fn malformed_address_is_rejected() {
        let toml = toml("[defaults]\nnetmask = \"255.255.0\"\n");
        let result = ValidatedConfig::from_raw(&cli(&[]), Some(&toml));

        assert!(matches!(
            result,
            Err(ConfigError::InvalidDefault {
                field: "Net_Mask",
                ..
            })
        ));
    }

    #[test]
    fn out_of_range_address_is_rejected() {
        let toml = toml("[defaults]\nip_address = \"10.0.0.256\"\n");
        let result = ValidatedConfig::from_raw(&cli(&[]), Some(&toml));
        assert!(result.is_err());
    }
}

mod display {
    use super::*;

    #[test]
    fn shows_storage_and_identity() {
        let config = ValidatedConfig::from_raw(&cli(&["--storage", "p.json"]), None).unwrap();
        let text = config.to_string();

        assert!(text.contains("storage: p.json"));
        assert!(text.contains("section: Common"));
        assert!(text.contains(factory::MODULE_TYPE));
    }

    #[test]
    fn does_not_show_passphrase() {
        let toml = toml("[defaults]\npassphrase = \"hunter2\"\n");
        let config = ValidatedConfig::from_raw(&cli(&[]), Some(&toml)).unwrap();
        assert!(!config.to_string().contains("hunter2"));
    }
}

mod load {
    use super::*;

    #[test]
    fn load_without_config_file() {
        let config = ValidatedConfig::load(&cli(&[])).unwrap();
        assert_eq!(config.section, "Common");
    }

    #[test]
    fn load_reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cam.toml");
        std::fs::write(&path, "[storage]\nsection = \"FromFile\"\n").unwrap();

        let cli = cli(&["--config", path.to_str().unwrap()]);
        let config = ValidatedConfig::load(&cli).unwrap();

        assert_eq!(config.section, "FromFile");
    }

    #[test]
    fn load_missing_config_file_fails() {
        let cli = cli(&["--config", "/nonexistent/cam.toml"]);
        let result = ValidatedConfig::load(&cli);
        assert!(matches!(result, Err(ConfigError::FileRead { .. })));
    }

    #[test]
    fn written_template_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cam-prefs.toml");
        write_default_config(&path).unwrap();

        let cli = cli(&["--config", path.to_str().unwrap()]);
        let config = ValidatedConfig::load(&cli).unwrap();

        assert_eq!(config.storage_path, PathBuf::from("cam-prefs.json"));
    }

    #[test]
    fn write_to_missing_directory_fails() {
        let result = write_default_config(std::path::Path::new("/nonexistent/dir/cam.toml"));
        assert!(matches!(result, Err(ConfigError::FileWrite { .. })));
    }
}
