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

//! Recording command sender.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use shroud_core::host::{CommandSender, CustomPage, NotificationStyle};
use shroud_core::HostError;

/// A notification as shown to the sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Title line.
    pub title: String,
    /// Body line.
    pub body: String,
    /// Visual style.
    pub style: NotificationStyle,
}

/// A sender that records everything sent to it.
pub struct MemorySender {
    name: String,
    player: bool,
    permissions: HashSet<String>,
    messages: Mutex<Vec<String>>,
    notifications: Mutex<Vec<Notification>>,
    pages: Mutex<Vec<Arc<dyn CustomPage>>>,
}

impl MemorySender {
    /// A player without permissions.
    pub fn player(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            player: true,
            permissions: HashSet::new(),
            messages: Mutex::new(Vec::new()),
            notifications: Mutex::new(Vec::new()),
            pages: Mutex::new(Vec::new()),
        }
    }

    /// The server console. It holds every permission but cannot open pages.
    pub fn console() -> Self {
        Self {
            player: false,
            ..Self::player("Console")
        }
    }

    /// Grants `permission`.
    #[must_use]
    pub fn with_permission(mut self, permission: &str) -> Self {
        self.permissions.insert(permission.to_owned());
        self
    }

    /// Every chat line received so far.
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// The last chat line received.
    pub fn last_message(&self) -> Option<String> {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
    }

    /// Every notification received so far.
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// The last page opened for this sender.
    pub fn last_page(&self) -> Option<Arc<dyn CustomPage>> {
        self.pages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
    }
}

impl CommandSender for MemorySender {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn has_permission(&self, permission: &str) -> bool {
        !self.player || self.permissions.contains(permission)
    }

    fn send_message(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(message.to_owned());
    }

    fn notify(&self, title: &str, body: &str, style: NotificationStyle) {
        if !self.player {
            self.send_message(&format!("{title}: {body}"));
            return;
        }
        self.notifications
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Notification {
                title: title.to_owned(),
                body: body.to_owned(),
                style,
            });
    }

    fn open_page(&self, page: Arc<dyn CustomPage>) -> Result<(), HostError> {
        if !self.player {
            return Err(HostError::Unsupported("CommandSender::openPage"));
        }
        self.pages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(page);
        Ok(())
    }
}
