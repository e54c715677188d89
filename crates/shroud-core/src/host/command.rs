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

//! Commands and custom UI pages.

use std::sync::Arc;

use crate::HostError;

/// Visual style of an in-game notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationStyle {
    /// Neutral information.
    Default,
    /// Operation succeeded.
    Success,
    /// Operation refused or failed.
    Warning,
}

/// Whoever invoked a command or a page action: a player or the console.
pub trait CommandSender: Send + Sync {
    /// Sender name.
    fn name(&self) -> String;

    /// Returns `true` if the sender holds `permission`.
    fn has_permission(&self, permission: &str) -> bool;

    /// Sends a chat line to the sender.
    fn send_message(&self, message: &str);

    /// Shows a toast notification. Console senders fall back to a message.
    fn notify(&self, title: &str, body: &str, style: NotificationStyle);

    /// Opens a custom page for the sender. `Unsupported` for non-player senders.
    fn open_page(&self, page: Arc<dyn CustomPage>) -> Result<(), HostError>;
}

/// A root command with its own subcommand dispatch.
pub trait CommandHandler: Send + Sync {
    /// Root name, without the slash.
    fn name(&self) -> &str;

    /// One-line description.
    fn description(&self) -> &str;

    /// Runs the command with the words that followed the root name.
    fn execute(&self, sender: &dyn CommandSender, args: &[&str]);
}

/// The labels of a page: `(selector, text)` pairs, in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageView {
    entries: Vec<(String, String)>,
}

impl PageView {
    /// An empty view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `selector` to `text`, replacing an earlier value.
    pub fn set(&mut self, selector: &str, text: impl Into<String>) -> &mut Self {
        let text = text.into();
        match self.entries.iter_mut().find(|(s, _)| s == selector) {
            Some(entry) => entry.1 = text,
            None => self.entries.push((selector.to_owned(), text)),
        }
        self
    }

    /// Current text of `selector`.
    pub fn get(&self, selector: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(s, _)| s == selector)
            .map(|(_, text)| text.as_str())
    }

    /// Every `(selector, text)` pair.
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }
}

/// What the host should do after a page handled an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageUpdate {
    /// Nothing changed.
    None,
    /// Apply these label changes.
    Update(PageView),
    /// Dismiss the page.
    Close,
}

/// A server-driven in-game page.
pub trait CustomPage: Send + Sync {
    /// Layout asset the client loads.
    fn layout(&self) -> &str;

    /// The `(selector, action)` bindings the client reports back.
    fn bindings(&self) -> Vec<(&'static str, &'static str)>;

    /// Initial labels.
    fn build(&self) -> PageView;

    /// Handles one tagged event sent by the client.
    fn handle_event(&self, sender: &dyn CommandSender, action: &str) -> PageUpdate;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_view_set_replaces() {
        let mut view = PageView::new();
        view.set("#A.Text", "ON").set("#B.Text", "OFF");
        view.set("#A.Text", "OFF");
        assert_eq!(view.get("#A.Text"), Some("OFF"));
        assert_eq!(view.entries().len(), 2);
        assert_eq!(view.get("#C.Text"), None);
    }
}
