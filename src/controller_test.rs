use super::*;
use crate::memory::MemoryPlatform;
use crate::platform::Headless;

const KEY: &str = "hashprep-theme";
const ATTR: &str = "data-theme";

fn controller(platform: &MemoryPlatform) -> ThemeController<MemoryPlatform> {
    ThemeController::new(platform.clone())
}

// =============================================================
// Loading
// =============================================================

#[test]
fn empty_storage_loads_system() {
    let platform = MemoryPlatform::new();
    assert_eq!(controller(&platform).preference(), Preference::System);
}

#[test]
fn stored_value_is_loaded() {
    let platform = MemoryPlatform::new().with_stored(KEY, "dark");
    assert_eq!(controller(&platform).preference(), Preference::Dark);
}

#[test]
fn corrupted_stored_value_loads_system() {
    for raw in ["", "DARK", "blue", "\"dark\""] {
        let platform = MemoryPlatform::new().with_stored(KEY, raw);
        assert_eq!(controller(&platform).preference(), Preference::System, "raw = {raw:?}");
    }
}

#[test]
fn load_does_not_touch_document() {
    let platform = MemoryPlatform::new().with_stored(KEY, "dark");
    let _theme = controller(&platform);
    assert_eq!(platform.attribute(ATTR), None);
    assert_eq!(platform.storage_writes(), 0);
}

#[test]
fn custom_config_reads_and_writes_its_own_names() {
    let platform = MemoryPlatform::new().with_stored("site", "light");
    let config = ThemeConfig {
        storage_key: "site".to_owned(),
        attribute: "data-mode".to_owned(),
        ..ThemeConfig::default()
    };
    let theme = ThemeController::load(platform.clone(), config);
    assert_eq!(theme.preference(), Preference::Light);

    theme.set_preference(Preference::Dark);
    assert_eq!(platform.stored("site").as_deref(), Some("dark"));
    assert_eq!(platform.attribute("data-mode").as_deref(), Some("dark"));
    assert_eq!(platform.stored(KEY), None);
    assert_eq!(platform.attribute(ATTR), None);
}

// =============================================================
// set_preference / resolved
// =============================================================

#[test]
fn resolved_follows_explicit_preference() {
    let platform = MemoryPlatform::new().with_system_theme(ResolvedTheme::Dark);
    let theme = controller(&platform);

    theme.set_preference(Preference::Light);
    assert_eq!(theme.resolved(), ResolvedTheme::Light);
    theme.set_preference(Preference::Dark);
    assert_eq!(theme.resolved(), ResolvedTheme::Dark);
}

#[test]
fn resolved_follows_system_when_preference_is_system() {
    for system in [ResolvedTheme::Light, ResolvedTheme::Dark] {
        let platform = MemoryPlatform::new().with_system_theme(system);
        let theme = controller(&platform);
        theme.set_preference(Preference::System);
        assert_eq!(theme.resolved(), system);
        assert_eq!(platform.attribute(ATTR).as_deref(), Some(system.as_str()));
    }
}

#[test]
fn resolved_is_recomputed_on_read() {
    let platform = MemoryPlatform::new();
    let theme = controller(&platform);
    assert_eq!(theme.resolved(), ResolvedTheme::Light);
    platform.set_system_theme(ResolvedTheme::Dark);
    assert_eq!(theme.resolved(), ResolvedTheme::Dark);
}

#[test]
fn set_preference_persists_and_applies() {
    let platform = MemoryPlatform::new();
    let theme = controller(&platform);
    theme.set_preference(Preference::Dark);
    assert_eq!(platform.stored(KEY).as_deref(), Some("dark"));
    assert_eq!(platform.attribute(ATTR).as_deref(), Some("dark"));
}

#[test]
fn set_preference_system_persists_system_string() {
    let platform = MemoryPlatform::new().with_system_theme(ResolvedTheme::Dark);
    let theme = controller(&platform);
    theme.set_preference(Preference::System);
    assert_eq!(platform.stored(KEY).as_deref(), Some("system"));
    assert_eq!(platform.attribute(ATTR).as_deref(), Some("dark"));
}

#[test]
fn set_preference_is_idempotent() {
    let once = MemoryPlatform::new();
    controller(&once).set_preference(Preference::Dark);

    let twice = MemoryPlatform::new();
    let theme = controller(&twice);
    theme.set_preference(Preference::Dark);
    theme.set_preference(Preference::Dark);

    assert_eq!(once.stored(KEY), twice.stored(KEY));
    assert_eq!(once.attribute(ATTR), twice.attribute(ATTR));
    assert_eq!(theme.preference(), Preference::Dark);
}

#[test]
fn preference_survives_reload_from_same_storage() {
    let platform = MemoryPlatform::new();
    controller(&platform).set_preference(Preference::Dark);

    let reloaded = controller(&platform);
    assert_eq!(reloaded.preference(), Preference::Dark);
}

#[test]
fn clones_share_preference() {
    let platform = MemoryPlatform::new();
    let theme = controller(&platform);
    let handle = theme.clone();
    theme.set_preference(Preference::Light);
    assert_eq!(handle.preference(), Preference::Light);
}

// =============================================================
// toggle
// =============================================================

#[test]
fn toggle_from_light_goes_dark() {
    let platform = MemoryPlatform::new();
    let theme = controller(&platform);
    theme.set_preference(Preference::Light);
    assert_eq!(theme.toggle(), ResolvedTheme::Dark);
    assert_eq!(theme.preference(), Preference::Dark);
    assert_eq!(theme.resolved(), ResolvedTheme::Dark);
}

#[test]
fn toggle_from_dark_goes_light() {
    let platform = MemoryPlatform::new();
    let theme = controller(&platform);
    theme.set_preference(Preference::Dark);
    assert_eq!(theme.toggle(), ResolvedTheme::Light);
    assert_eq!(theme.preference(), Preference::Light);
}

#[test]
fn toggle_from_system_uses_resolved_theme_and_leaves_system() {
    let platform = MemoryPlatform::new().with_system_theme(ResolvedTheme::Dark);
    let theme = controller(&platform);
    assert_eq!(theme.preference(), Preference::System);

    assert_eq!(theme.toggle(), ResolvedTheme::Light);
    assert_eq!(theme.preference(), Preference::Light);
    assert_eq!(platform.stored(KEY).as_deref(), Some("light"));
}

#[test]
fn toggle_never_yields_system() {
    let platform = MemoryPlatform::new();
    let theme = controller(&platform);
    for _ in 0..4 {
        let now = theme.toggle();
        assert_eq!(theme.resolved(), now);
        assert_ne!(theme.preference(), Preference::System);
    }
}

// =============================================================
// init and system-driven updates
// =============================================================

#[test]
fn init_applies_stored_preference_before_any_set() {
    let platform = MemoryPlatform::new().with_stored(KEY, "dark");
    let theme = controller(&platform);
    theme.init();
    assert_eq!(platform.attribute(ATTR).as_deref(), Some("dark"));
    assert_eq!(platform.storage_writes(), 0);
}

#[test]
fn init_subscribes_once() {
    let platform = MemoryPlatform::new();
    let theme = controller(&platform);
    theme.init();
    theme.init();
    assert_eq!(platform.listener_count(), 1);
    assert_eq!(platform.attribute_writes(), 2);
}

#[test]
fn init_retries_subscription_after_refusal() {
    let platform = MemoryPlatform::new();
    platform.set_refuse_subscriptions(true);
    let theme = controller(&platform);
    theme.init();
    assert_eq!(platform.listener_count(), 0);
    assert!(format!("{theme:?}").contains("subscribed: false"));

    platform.set_refuse_subscriptions(false);
    theme.init();
    assert_eq!(platform.listener_count(), 1);
    theme.init();
    assert_eq!(platform.listener_count(), 1);

    platform.set_system_theme(ResolvedTheme::Dark);
    assert_eq!(platform.attribute(ATTR).as_deref(), Some("dark"));
}

#[test]
fn system_change_updates_attribute_when_following_system() {
    let platform = MemoryPlatform::new();
    let theme = controller(&platform);
    theme.init();
    assert_eq!(platform.attribute(ATTR).as_deref(), Some("light"));

    platform.set_system_theme(ResolvedTheme::Dark);
    assert_eq!(platform.attribute(ATTR).as_deref(), Some("dark"));
    assert_eq!(theme.preference(), Preference::System);
    assert_eq!(platform.storage_writes(), 0);
}

#[test]
fn system_change_is_ignored_with_explicit_preference() {
    let platform = MemoryPlatform::new();
    let theme = controller(&platform);
    theme.init();
    theme.set_preference(Preference::Light);
    let writes = platform.attribute_writes();

    platform.set_system_theme(ResolvedTheme::Dark);
    assert_eq!(platform.attribute(ATTR).as_deref(), Some("light"));
    assert_eq!(platform.attribute_writes(), writes);
}

#[test]
fn last_write_wins_between_setter_and_system_change() {
    let platform = MemoryPlatform::new();
    let theme = controller(&platform);
    theme.init();

    platform.set_system_theme(ResolvedTheme::Dark);
    theme.set_preference(Preference::Light);
    assert_eq!(platform.attribute(ATTR).as_deref(), Some("light"));

    theme.set_preference(Preference::System);
    platform.set_system_theme(ResolvedTheme::Light);
    assert_eq!(platform.attribute(ATTR).as_deref(), Some("light"));
    platform.set_system_theme(ResolvedTheme::Dark);
    assert_eq!(platform.attribute(ATTR).as_deref(), Some("dark"));
}

#[test]
fn subscription_goes_quiet_after_controller_is_dropped() {
    let platform = MemoryPlatform::new();
    {
        let theme = controller(&platform);
        theme.init();
    }
    let writes = platform.attribute_writes();
    platform.set_system_theme(ResolvedTheme::Dark);
    assert_eq!(platform.attribute_writes(), writes);
}

// =============================================================
// Unavailable environment
// =============================================================

#[test]
fn unavailable_environment_performs_no_side_effects() {
    let platform = MemoryPlatform::unavailable()
        .with_stored(KEY, "dark")
        .with_system_theme(ResolvedTheme::Dark);
    let theme = controller(&platform);

    assert_eq!(theme.preference(), Preference::System);
    theme.init();
    theme.set_preference(Preference::Dark);
    assert_eq!(theme.resolved(), ResolvedTheme::Dark);
    theme.set_preference(Preference::System);
    assert_eq!(theme.resolved(), ResolvedTheme::Light);
    assert_eq!(theme.toggle(), ResolvedTheme::Dark);

    assert_eq!(platform.storage_writes(), 0);
    assert_eq!(platform.attribute_writes(), 0);
    assert_eq!(platform.listener_count(), 0);
    assert_eq!(platform.stored(KEY).as_deref(), Some("dark"));
}

#[test]
fn headless_controller_runs_every_operation() {
    let theme = ThemeController::new(Headless);
    theme.init();
    theme.set_preference(Preference::Dark);
    assert_eq!(theme.preference(), Preference::Dark);
    assert_eq!(theme.toggle(), ResolvedTheme::Light);
    assert_eq!(theme.resolved(), ResolvedTheme::Light);
}

#[test]
fn debug_output_shows_state() {
    let platform = MemoryPlatform::new();
    let theme = controller(&platform);
    let rendered = format!("{theme:?}");
    assert!(rendered.contains("System"));
    assert!(rendered.contains("subscribed: false"));
}
