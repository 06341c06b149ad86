//! App catalog and the built-in placeholder apps mounted by the window manager.

mod arcade;
mod document;
mod terminal;

use std::{collections::HashMap, rc::Rc};

use cover_app_contract::{AppFactory, AppHost, ApplicationId};

use crate::{
    config::DesktopConfig,
    model::{DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_WIDTH},
};

pub use arcade::{ArcadeApp, ARCADE_TICK_MS};
pub use document::DocumentApp;
pub use terminal::TerminalApp;

#[derive(Clone)]
pub struct AppDescriptor {
    pub app_id: ApplicationId,
    pub title: String,
    pub icon: String,
    pub width: i32,
    pub height: i32,
    pub pinned: bool,
    pub factory: AppFactory,
}

impl AppDescriptor {
    fn fallback(app_id: ApplicationId) -> Self {
        Self {
            app_id,
            title: "App".to_string(),
            icon: "window".to_string(),
            width: DEFAULT_WINDOW_WIDTH,
            height: DEFAULT_WINDOW_HEIGHT,
            pinned: false,
            factory: Rc::new(|| Box::new(DocumentApp::default()) as Box<dyn AppHost>),
        }
    }
}

impl std::fmt::Debug for AppDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppDescriptor")
            .field("app_id", &self.app_id)
            .field("title", &self.title)
            .field("pinned", &self.pinned)
            .finish_non_exhaustive()
    }
}

/// Maps application ids to descriptors and app factories.
#[derive(Debug, Clone, Default)]
pub struct AppCatalog {
    entries: Vec<AppDescriptor>,
    index: HashMap<ApplicationId, usize>,
}

impl AppCatalog {
    /// Builds the catalog from config entries with the built-in placeholder apps.
    ///
    /// Entries with malformed ids are skipped; [`DesktopConfig::validate`] reports them.
    pub fn from_config(config: &DesktopConfig) -> Self {
        let mut catalog = Self::default();
        for entry in &config.apps {
            let Ok(app_id) = ApplicationId::new(entry.id.as_str()) else {
                continue;
            };
            catalog.insert(AppDescriptor {
                factory: builtin_factory(&app_id),
                app_id,
                title: entry.title.clone(),
                icon: entry.icon.clone(),
                width: entry.width,
                height: entry.height,
                pinned: entry.pinned,
            });
        }
        catalog
    }

    /// Adds or replaces a descriptor.
    pub fn insert(&mut self, descriptor: AppDescriptor) {
        match self.index.get(&descriptor.app_id) {
            Some(&idx) => self.entries[idx] = descriptor,
            None => {
                self.index
                    .insert(descriptor.app_id.clone(), self.entries.len());
                self.entries.push(descriptor);
            }
        }
    }

    /// Replaces the factory for a catalog app, letting the host mount its real implementation.
    /// Returns `false` when the app is not in the catalog.
    pub fn set_factory(&mut self, app_id: &ApplicationId, factory: AppFactory) -> bool {
        match self.index.get(app_id) {
            Some(&idx) => {
                self.entries[idx].factory = factory;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, app_id: &ApplicationId) -> Option<&AppDescriptor> {
        self.index.get(app_id).map(|&idx| &self.entries[idx])
    }

    /// Descriptor for `app_id`, or a generic one for apps missing from the catalog.
    pub fn resolve(&self, app_id: &ApplicationId) -> AppDescriptor {
        self.get(app_id)
            .cloned()
            .unwrap_or_else(|| AppDescriptor::fallback(app_id.clone()))
    }

    pub fn entries(&self) -> &[AppDescriptor] {
        &self.entries
    }

    pub fn pinned(&self) -> impl Iterator<Item = &AppDescriptor> {
        self.entries.iter().filter(|entry| entry.pinned)
    }
}

fn builtin_factory(app_id: &ApplicationId) -> AppFactory {
    match app_id.as_str() {
        "terminal" => Rc::new(|| Box::new(TerminalApp::default()) as Box<dyn AppHost>),
        "minesweeper" | "snake" => Rc::new(|| Box::new(ArcadeApp::default()) as Box<dyn AppHost>),
        _ => Rc::new(|| Box::new(DocumentApp::default()) as Box<dyn AppHost>),
    }
}
