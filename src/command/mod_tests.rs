//! Tests for command parsing and dispatch.

use std::cell::RefCell;
use std::rc::Rc;

use crate::namespace::MemoryNamespace;
use crate::prefs::{COMMON_SECTION, ConfigField, FactoryDefaults, PrefsStore};

use super::*;

fn loaded_store() -> PrefsStore<MemoryNamespace> {
    let mut store = PrefsStore::new(MemoryNamespace::new(), FactoryDefaults::default());
    store.load(false);
    store
}

/// Records every command it sees and claims those with a given prefix.
struct RecordingHandler {
    prefix: &'static str,
    seen: Rc<RefCell<Vec<String>>>,
}

impl CommandHandler for RecordingHandler {
    fn handle(&mut self, key: &str, _value: &str) -> bool {
        self.seen.borrow_mut().push(key.to_string());
        key.starts_with(self.prefix)
    }
}

mod parsing {
    use super::*;

    #[test]
    fn var_val_pair_is_one_command() {
        let commands = parse_request_target("/control?var=net_ssid&val=Workshop").unwrap();
        assert_eq!(commands, [Command::new("net_ssid", "Workshop")]);
    }

    #[test]
    fn decodes_percent_and_plus() {
        let commands = parse_request_target("/control?var=net_pass&val=a%26b+c").unwrap();
        assert_eq!(commands, [Command::new("net_pass", "a&b c")]);
    }

    #[test]
    fn plain_pairs_are_commands() {
        let commands =
            parse_request_target("/control?net_ip_address=10.0.0.2&net_mask=255.0.0.0").unwrap();
        assert_eq!(
            commands,
            [
                Command::new("net_ip_address", "10.0.0.2"),
                Command::new("net_mask", "255.0.0.0"),
            ]
        );
    }

    #[test]
    fn var_without_val_has_empty_value() {
        let commands = parse_request_target("/control?var=reboot").unwrap();
        assert_eq!(commands, [Command::new("reboot", "")]);
    }

    #[test]
    fn commands_keep_query_order() {
        let commands = parse_request_target("/control?quality=10&var=net_ssid&val=X").unwrap();
        assert_eq!(
            commands,
            [
                Command::new("quality", "10"),
                Command::new("net_ssid", "X"),
            ]
        );
    }

    #[test]
    fn every_var_val_pair_is_kept() {
        let commands =
            parse_request_target("/control?var=net_ssid&val=A&var=net_pass&val=B").unwrap();
        assert_eq!(
            commands,
            [Command::new("net_ssid", "A"), Command::new("net_pass", "B")]
        );
    }

    #[test]
    fn var_followed_by_var_has_empty_value() {
        let commands = parse_request_target("/control?var=reboot&var=net_ssid&val=A").unwrap();
        assert_eq!(
            commands,
            [Command::new("reboot", ""), Command::new("net_ssid", "A")]
        );
    }

    #[test]
    fn var_followed_by_plain_pair_has_empty_value() {
        let commands = parse_request_target("/control?var=reboot&quality=10").unwrap();
        assert_eq!(
            commands,
            [Command::new("reboot", ""), Command::new("quality", "10")]
        );
    }

    #[test]
    fn val_without_var_is_ignored() {
        let commands = parse_request_target("/control?val=X&net_mask=255.0.0.0").unwrap();
        assert_eq!(commands, [Command::new("net_mask", "255.0.0.0")]);
    }

    #[test]
    fn target_without_query_has_no_commands() {
        assert!(parse_request_target("/control").unwrap().is_empty());
    }

    #[test]
    fn absolute_uri_is_accepted() {
        let commands =
            parse_request_target("http://192.168.1.254/control?var=net_gateway&val=10.0.0.1")
                .unwrap();
        assert_eq!(commands, [Command::new("net_gateway", "10.0.0.1")]);
    }

    #[test]
    fn invalid_target_is_an_error() {
        let result = parse_request_target("/control?var=a b");
        assert!(matches!(result, Err(CommandError::InvalidTarget { .. })));
    }
}

mod dispatch {
    use super::*;

    #[test]
    fn preference_commands_are_staged() {
        let mut dispatcher = Dispatcher::new(loaded_store());

        let outcome = dispatcher.dispatch("net_ssid", "Workshop").unwrap();

        assert_eq!(outcome, DispatchOutcome::Handled);
        assert_eq!(
            dispatcher.store().pending(ConfigField::Ssid),
            Some("Workshop")
        );
    }

    #[test]
    fn staged_commands_are_not_durable_before_reboot() {
        let mut dispatcher = Dispatcher::new(loaded_store());
        dispatcher.dispatch("net_ssid", "Workshop").unwrap();

        assert_eq!(
            dispatcher
                .store()
                .namespace()
                .value(COMMON_SECTION, "Net_SSID"),
            Some(crate::prefs::defaults::SSID)
        );
        assert!(!dispatcher.restart_requested());
    }

    #[test]
    fn reboot_commits_staged_changes() {
        let mut dispatcher = Dispatcher::new(loaded_store());
        dispatcher.dispatch("net_ssid", "Workshop").unwrap();
        dispatcher.dispatch("net_mask", "255.0.0.0").unwrap();

        let outcome = dispatcher.dispatch(REBOOT_COMMAND, "").unwrap();

        assert_eq!(outcome, DispatchOutcome::Reboot { committed: 2 });
        assert!(dispatcher.restart_requested());
        let store = dispatcher.into_store();
        assert_eq!(
            store.namespace().value(COMMON_SECTION, "Net_SSID"),
            Some("Workshop")
        );
        assert!(!store.has_pending());
    }

    #[test]
    fn reboot_commit_failure_is_reported() {
        let mut dispatcher = Dispatcher::new(loaded_store());
        dispatcher.dispatch("net_ssid", "Workshop").unwrap();
        dispatcher.store_mut().namespace_mut().set_unavailable(true);

        let result = dispatcher.dispatch(REBOOT_COMMAND, "");

        assert!(matches!(result, Err(CommandError::Commit(_))));
        assert!(!dispatcher.restart_requested());
    }

    #[test]
    fn unrecognized_commands_fall_through_to_other_handlers() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut dispatcher = Dispatcher::new(loaded_store()).with_handler(RecordingHandler {
            prefix: "cam_",
            seen: Rc::clone(&seen),
        });

        assert_eq!(
            dispatcher.dispatch("cam_quality", "10").unwrap(),
            DispatchOutcome::Handled
        );
        assert_eq!(
            dispatcher.dispatch("led_intensity", "5").unwrap(),
            DispatchOutcome::Unhandled
        );
        assert_eq!(*seen.borrow(), ["cam_quality", "led_intensity"]);
    }

    #[test]
    fn handled_preference_commands_skip_other_handlers() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut dispatcher = Dispatcher::new(loaded_store()).with_handler(RecordingHandler {
            prefix: "",
            seen: Rc::clone(&seen),
        });

        dispatcher.dispatch("net_gateway", "10.0.0.1").unwrap();
        // Rejected values are still handled by the store.
        dispatcher.dispatch("net_gateway", "not-an-address").unwrap();

        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn module_type_is_left_to_other_handlers() {
        let mut dispatcher = Dispatcher::new(loaded_store());
        assert_eq!(
            dispatcher.dispatch("module_type", "ESP32-S3").unwrap(),
            DispatchOutcome::Unhandled
        );
    }

    #[test]
    fn dispatch_request_routes_every_command() {
        let mut dispatcher = Dispatcher::new(loaded_store());

        let outcomes = dispatcher
            .dispatch_request("/control?net_ip_address=10.0.0.2&unknown=1&reboot=")
            .unwrap();

        assert_eq!(
            outcomes,
            [
                DispatchOutcome::Handled,
                DispatchOutcome::Unhandled,
                DispatchOutcome::Reboot { committed: 1 },
            ]
        );
        assert_eq!(
            dispatcher.store().snapshot().ip_address(),
            Some([10, 0, 0, 2])
        );
    }

    #[test]
    fn changes_after_reboot_are_not_committed() {
        let mut dispatcher = Dispatcher::new(loaded_store());

        let outcomes = dispatcher
            .dispatch_request("/control?reboot=&var=net_ssid&val=Later")
            .unwrap();

        assert_eq!(
            outcomes,
            [DispatchOutcome::Reboot { committed: 0 }, DispatchOutcome::Handled]
        );
        let store = dispatcher.store();
        assert_eq!(store.snapshot().ssid(), crate::prefs::defaults::SSID);
        assert_eq!(store.pending(ConfigField::Ssid), Some("Later"));
        assert_eq!(
            store.namespace().value(COMMON_SECTION, "Net_SSID"),
            Some(crate::prefs::defaults::SSID)
        );
    }

    #[test]
    fn store_is_a_command_handler() {
        let mut store = loaded_store();
        assert!(store.handle("net_ssid", "Workshop"));
        assert!(!store.handle("framesize", "5"));
    }
}
