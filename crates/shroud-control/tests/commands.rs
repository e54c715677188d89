// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

mod common;

use common::{admin, config, Fixture, COMBAT, HEALTH, OTHER};
use shroud_control::dashboard::LAYOUT;
use shroud_core::{HideConfig, ADMIN_PERMISSION};
use shroud_infra::MemorySender;

#[test]
fn test_empty_and_unknown_subcommands_print_help() {
    // --- 1. ARRANGE ---
    let fixture = Fixture::with_config(HideConfig::default());
    let sender = MemorySender::player("Alice");

    // --- 2. ACT ---
    assert!(fixture.server.dispatch_command(&sender, "/hid"));
    assert!(fixture.server.dispatch_command(&sender, "/hid frobnicate"));

    // --- 3. ASSERT ---
    let messages = sender.messages();
    assert_eq!(messages.len(), 8, "help is four lines: {messages:?}");
    assert_eq!(messages[0], "Server Hide Settings commands:");
    assert_eq!(messages[4], messages[0]);
    assert!(messages.iter().any(|line| line.contains("/hid reload")));
}

#[test]
fn test_info_prints_normalized_settings() {
    // --- 1. ARRANGE ---
    let fixture = Fixture::with_config(config(|c| {
        c.players.hide_nameplate = true;
        c.debug.baseline_gc.interval_seconds = 3;
    }));
    let sender = MemorySender::player("Alice");

    // --- 2. ACT ---
    fixture.server.dispatch_command(&sender, "/hid INFO");

    // --- 3. ASSERT ---
    let messages = sender.messages();
    assert!(messages.contains(&"  players.hideNameplate: true".to_owned()));
    assert!(messages.contains(&"  debug.baselineGc: enabled=false intervalSeconds=30".to_owned()));
    assert!(messages.contains(&format!("  admin permission: {ADMIN_PERMISSION}")));
    assert_eq!(messages.last().map(String::as_str), Some("  open UI: /hid ui"));
}

#[test]
fn test_reload_requires_permission() {
    // --- 1. ARRANGE ---
    let fixture = Fixture::with_config(HideConfig::default());
    fixture.write_config(&config(|c| c.enabled = false));
    let sender = MemorySender::player("Alice");

    // --- 2. ACT ---
    fixture.server.dispatch_command(&sender, "/hid reload");

    // --- 3. ASSERT ---
    assert_eq!(
        sender.last_message().as_deref(),
        Some("No permission (serverhidesettings.admin)")
    );
    assert!(fixture.plugin.config().enabled, "nothing was reloaded");
}

#[test]
fn test_reload_rereads_file_and_refreshes_entities() {
    // --- 1. ARRANGE ---
    let fixture = Fixture::with_config(HideConfig::default());
    let world = fixture.server.add_world("overworld").unwrap();
    let player = world.spawn_player("Alice", &[OTHER, HEALTH, COMBAT], None);
    assert_eq!(world.store().ui_ids(player), Some(vec![OTHER, COMBAT]));
    fixture.write_config(&config(|c| c.players.hide_health_bar = false));
    let sender = admin();

    // --- 2. ACT ---
    fixture.server.dispatch_command(&sender, "/hid reload");

    // --- 3. ASSERT ---
    assert_eq!(sender.last_message().as_deref(), Some("Config reloaded and applied."));
    assert!(!fixture.plugin.config().players.hide_health_bar);
    assert_eq!(world.store().ui_ids(player), Some(vec![OTHER, HEALTH, COMBAT]));
}

#[test]
fn test_ui_aliases_open_the_dashboard_for_admins() {
    // --- 1. ARRANGE ---
    let fixture = Fixture::with_config(HideConfig::default());

    for alias in ["ui", "dashboard", "gui"] {
        let sender = admin();

        // --- 2. ACT ---
        fixture.server.dispatch_command(&sender, &format!("/hid {alias}"));

        // --- 3. ASSERT ---
        let page = sender.last_page().unwrap_or_else(|| panic!("'{alias}' opens a page"));
        assert_eq!(page.layout(), LAYOUT);
        assert!(sender.messages().is_empty());
    }
}

#[test]
fn test_ui_is_refused_without_permission_or_player() {
    // --- 1. ARRANGE ---
    let fixture = Fixture::with_config(HideConfig::default());
    let player = MemorySender::player("Alice");
    let console = MemorySender::console();

    // --- 2. ACT ---
    fixture.server.dispatch_command(&player, "/hid ui");
    fixture.server.dispatch_command(&console, "/hid ui");

    // --- 3. ASSERT ---
    assert!(player.last_page().is_none());
    assert_eq!(
        player.last_message().as_deref(),
        Some("No permission (serverhidesettings.admin)")
    );
    assert_eq!(
        console.last_message().as_deref(),
        Some("Only players can open the dashboard.")
    );
}

#[test]
fn test_commands_report_when_plugin_is_shut_down() {
    // --- 1. ARRANGE ---
    let fixture = Fixture::with_config(HideConfig::default());
    fixture.plugin.shutdown();
    let sender = admin();

    // --- 2. ACT ---
    fixture.server.dispatch_command(&sender, "/hid info");

    // --- 3. ASSERT ---
    assert_eq!(
        sender.last_message().as_deref(),
        Some("Server Hide Settings is not running.")
    );
}
