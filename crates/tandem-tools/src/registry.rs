//! Concurrent tool registry

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};
use tandem_llm::ToolDefinition;

use crate::categories::ToolCategory;
use crate::error::RegistryError;
use crate::handler::ToolHandler;
use crate::schema::{Permission, ToolSchema};

/// A tool as stored in the registry
pub struct RegisteredTool {
    pub schema: ToolSchema,
    pub handler: Arc<dyn ToolHandler>,
    /// Listing position, kept across overwrites
    slot: u64,
}

impl RegisteredTool {
    pub fn name(&self) -> &str {
        &self.schema.name
    }

    pub const fn permission(&self) -> Permission {
        self.schema.permission
    }
}

impl fmt::Debug for RegisteredTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredTool")
            .field("name", &self.schema.name)
            .field("permission", &self.schema.permission)
            .finish_non_exhaustive()
    }
}

/// Outcome of [`ToolRegistry::register`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// The name was new
    Inserted,
    /// An existing tool with the same name was overwritten
    Replaced,
}

/// Name to tool map shared by the dispatcher and the permission gate
///
/// Registering an existing name replaces its schema and handler entirely.
/// Overwrites are logged and counted so accidental collisions between
/// categories stay visible.
#[derive(Default)]
pub struct ToolRegistry {
    tools: DashMap<String, Arc<RegisteredTool>>,
    loaded: DashSet<ToolCategory>,
    next_slot: AtomicU64,
    overwrites: AtomicUsize,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register<H>(&self, schema: ToolSchema, handler: H) -> Registration
    where
        H: ToolHandler + 'static,
    {
        self.register_shared(schema, Arc::new(handler))
    }

    /// Register a tool whose handler is already shared
    pub fn register_shared(&self, schema: ToolSchema, handler: Arc<dyn ToolHandler>) -> Registration {
        let name = schema.name.clone();
        let permission = schema.permission;

        let outcome = match self.tools.entry(name.clone()) {
            Entry::Occupied(mut entry) => {
                let slot = entry.get().slot;
                entry.insert(Arc::new(RegisteredTool { schema, handler, slot }));
                Registration::Replaced
            }
            Entry::Vacant(entry) => {
                let slot = self.next_slot.fetch_add(1, Ordering::Relaxed);
                entry.insert(Arc::new(RegisteredTool { schema, handler, slot }));
                Registration::Inserted
            }
        };

        if outcome == Registration::Replaced {
            let total = self.overwrites.fetch_add(1, Ordering::Relaxed) + 1;
            tracing::warn!(tool = %name, %permission, overwrites = total, "tool registration overwritten");
        } else {
            tracing::debug!(tool = %name, %permission, "tool registered");
        }

        outcome
    }

    /// Look up a tool by name
    pub fn get(&self, name: &str) -> Result<Arc<RegisteredTool>, RegistryError> {
        self.tools
            .get(name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| RegistryError::NotFound { tool: name.to_owned() })
    }

    /// Permission tier of a registered tool
    pub fn permission(&self, name: &str) -> Result<Permission, RegistryError> {
        self.get(name).map(|tool| tool.permission())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Registered tools in registration order
    fn ordered(&self) -> Vec<Arc<RegisteredTool>> {
        let mut tools: Vec<_> = self.tools.iter().map(|entry| Arc::clone(entry.value())).collect();
        tools.sort_by_key(|tool| tool.slot);
        tools
    }

    /// Tool names in registration order
    pub fn names(&self) -> Vec<String> {
        self.ordered().iter().map(|tool| tool.schema.name.clone()).collect()
    }

    /// Tool schemas in registration order
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.ordered().iter().map(|tool| tool.schema.clone()).collect()
    }

    /// Definitions to advertise to a backend, in registration order
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.ordered().iter().map(|tool| tool.schema.to_definition()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// How many registrations replaced an existing tool
    pub fn overwrite_count(&self) -> usize {
        self.overwrites.load(Ordering::Relaxed)
    }

    /// Register a category's tools unless it was already loaded
    ///
    /// Returns whether the category was registered by this call.
    pub fn ensure_category(&self, category: ToolCategory) -> bool {
        if !self.loaded.insert(category) {
            return false;
        }
        category.register(self);
        tracing::debug!(%category, tools = self.len(), "tool category loaded");
        true
    }

    /// Whether a category has been loaded
    pub fn is_loaded(&self, category: ToolCategory) -> bool {
        self.loaded.contains(&category)
    }

    /// Drop every tool, loaded category and counter
    pub fn reset(&self) {
        self.tools.clear();
        self.loaded.clear();
        self.next_slot.store(0, Ordering::Relaxed);
        self.overwrites.store(0, Ordering::Relaxed);
    }
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .field("overwrites", &self.overwrite_count())
            .finish_non_exhaustive()
    }
}
