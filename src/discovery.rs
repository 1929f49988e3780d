//! Route module discovery.
//!
//! Route modules live under `src/routers/`. Each one exports a `MODULE` value
//! implementing [`RouteModule`] and is listed once in the `route_modules!`
//! invocation there, which builds the catalog this module scans.
//!
//! Discovery walks the catalog in lexicographic name order, skips the
//! catalog's own initializer ([`INITIALIZER_MODULE`]), loads every other
//! module exactly once and keeps the routers the modules export. Modules that
//! export no router are loaded for their side effects and otherwise skipped.
//! A module that fails to load fails the whole discovery.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::thread::{self, ThreadId};

use axum::Router;
use once_cell::sync::Lazy;
use tracing::{debug, info, instrument, warn};
use utoipa::openapi::OpenApi;

use crate::error::{DiscoveryError, ModuleError};
use crate::metrics;
use crate::routers;

/// Name reserved for the catalog's own initializer. Never loaded as a route module.
pub const INITIALIZER_MODULE: &str = "mod";

/// A unit of route code that may export a router.
pub trait RouteModule: Sync {
    /// Run the module's setup and return its router, if it exports one.
    ///
    /// Called at most once per [`RouterDiscovery`] unless it fails.
    fn load(&self) -> Result<Option<Router>, ModuleError>;

    /// OpenAPI fragment describing the module's routes.
    fn openapi(&self) -> Option<OpenApi> {
        None
    }
}

/// A named entry in a route module catalog.
#[derive(Clone, Copy)]
pub struct ModuleEntry {
    name: &'static str,
    module: &'static dyn RouteModule,
}

impl ModuleEntry {
    /// Create a catalog entry.
    pub const fn new(name: &'static str, module: &'static dyn RouteModule) -> Self {
        Self { name, module }
    }

    /// Module name.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for ModuleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleEntry").field("name", &self.name).finish()
    }
}

/// A router exported by a route module.
#[derive(Clone)]
pub struct DiscoveredRouter {
    /// Module that exported the router.
    pub module: &'static str,
    /// The router to mount.
    pub router: Router,
    /// The module's OpenAPI fragment.
    pub openapi: Option<OpenApi>,
}

impl fmt::Debug for DiscoveredRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscoveredRouter")
            .field("module", &self.module)
            .field("has_openapi", &self.openapi.is_some())
            .finish()
    }
}

/// Outcome of loading one module.
#[derive(Clone)]
struct LoadedModule {
    router: Option<Router>,
    openapi: Option<OpenApi>,
}

/// Scans a route module catalog and caches every loaded module.
pub struct RouterDiscovery {
    entries: Vec<ModuleEntry>,
    loaded: Mutex<HashMap<&'static str, LoadedModule>>,
    /// Thread running `discover` and the module it is loading.
    active: Mutex<Option<(ThreadId, &'static str)>>,
}

/// Clears the active marker when a discovery pass ends, including on error.
struct ActiveGuard<'a> {
    active: &'a Mutex<Option<(ThreadId, &'static str)>>,
}

impl ActiveGuard<'_> {
    fn loading(&self, module: &'static str) {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        *active = Some((thread::current().id(), module));
    }
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        *self.active.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

static GLOBAL: Lazy<RouterDiscovery> =
    Lazy::new(|| RouterDiscovery::new(routers::CATALOG.iter().copied()));

impl RouterDiscovery {
    /// Create a discovery over the given catalog.
    pub fn new(entries: impl IntoIterator<Item = ModuleEntry>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
            loaded: Mutex::new(HashMap::new()),
            active: Mutex::new(None),
        }
    }

    /// The process-wide discovery over the built-in `routers` catalog.
    pub fn global() -> &'static RouterDiscovery {
        &GLOBAL
    }

    /// Candidate module names in the order they are loaded.
    pub fn candidates(&self) -> Vec<&'static str> {
        self.ordered_entries().iter().map(ModuleEntry::name).collect()
    }

    /// Names of modules loaded so far.
    pub fn loaded_modules(&self) -> Vec<&'static str> {
        let loaded = self.loaded.lock().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<_> = loaded.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Load every candidate module and return the routers they export.
    ///
    /// Modules already loaded by an earlier call are not loaded again. A
    /// module that calls back into the same discovery from its `load` gets
    /// [`DiscoveryError::Reentrant`].
    #[instrument(skip(self), fields(candidates = self.entries.len()))]
    pub fn discover(&self) -> Result<Vec<DiscoveredRouter>, DiscoveryError> {
        self.check_reentry()?;

        let mut loaded = self.loaded.lock().unwrap_or_else(PoisonError::into_inner);
        let guard = ActiveGuard {
            active: &self.active,
        };
        let mut routers = Vec::new();

        for entry in self.ordered_entries() {
            let module = match loaded.get(entry.name) {
                Some(module) => {
                    debug!(module = entry.name, "Route module already loaded");
                    module.clone()
                }
                None => {
                    guard.loading(entry.name);
                    let module = load_module(entry)?;
                    loaded.insert(entry.name, module.clone());
                    module
                }
            };

            match module.router {
                Some(router) => routers.push(DiscoveredRouter {
                    module: entry.name,
                    router,
                    openapi: module.openapi,
                }),
                None => debug!(module = entry.name, "Route module exports no router, skipping"),
            }
        }

        info!(routers = routers.len(), "Router discovery complete");
        Ok(routers)
    }

    /// Fail if this thread is already inside `discover` on this instance.
    fn check_reentry(&self) -> Result<(), DiscoveryError> {
        let active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        match *active {
            Some((owner, module)) if owner == thread::current().id() => {
                warn!(module, "Route module re-entered discovery while loading");
                Err(DiscoveryError::Reentrant { module })
            }
            _ => Ok(()),
        }
    }

    /// Catalog entries minus the initializer and duplicates, sorted by name.
    fn ordered_entries(&self) -> Vec<ModuleEntry> {
        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(self.entries.len());

        for entry in &self.entries {
            if entry.name == INITIALIZER_MODULE {
                continue;
            }
            if !seen.insert(entry.name) {
                warn!(module = entry.name, "Duplicate route module name, keeping the first");
                continue;
            }
            entries.push(*entry);
        }

        entries.sort_by_key(|entry| entry.name);
        entries
    }
}

impl fmt::Debug for RouterDiscovery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterDiscovery")
            .field("entries", &self.entries)
            .field("loaded", &self.loaded_modules())
            .finish()
    }
}

/// Discover routers from the built-in catalog.
pub fn discover_routers() -> Result<Vec<DiscoveredRouter>, DiscoveryError> {
    RouterDiscovery::global().discover()
}

fn load_module(entry: ModuleEntry) -> Result<LoadedModule, DiscoveryError> {
    let timer = metrics::timer_module_load(entry.name);

    let router = entry.module.load().map_err(|source| {
        warn!(module = entry.name, error = %source, "Route module failed to load");
        DiscoveryError::Import {
            module: entry.name,
            source,
        }
    })?;
    let openapi = router.as_ref().and_then(|_| entry.module.openapi());

    debug!(
        module = entry.name,
        exports_router = router.is_some(),
        elapsed_ms = timer.elapsed_ms(),
        "Loaded route module"
    );
    metrics::inc_modules_loaded(entry.name);

    Ok(LoadedModule { router, openapi })
}
