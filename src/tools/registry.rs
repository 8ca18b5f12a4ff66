//! Fixed name -> tool mapping, frozen at startup.

use crate::error::RegistryError;
use crate::tools::{Tool, ToolArgs, ToolDescriptor};
use anyhow::{anyhow, Result};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

struct Entry {
    descriptor: ToolDescriptor,
    tool: Arc<dyn Tool>,
}

/// Registered tools in registration order.
pub struct ToolRegistry {
    entries: Vec<Entry>,
    by_name: HashMap<String, usize>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

impl ToolRegistry {
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::default()
    }

    /// Descriptors of every tool, in registration order.
    pub fn describe(&self) -> Vec<ToolDescriptor> {
        self.entries.iter().map(|e| e.descriptor.clone()).collect()
    }

    pub fn descriptor(&self, name: &str) -> Option<&ToolDescriptor> {
        self.by_name.get(name).map(|&i| &self.entries[i].descriptor)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.by_name.get(name).map(|&i| self.entries[i].tool.clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|e| e.descriptor.name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Invoke a tool directly. Unknown names are an error here; the executor
    /// decides what an unknown name means for a conversation.
    pub async fn invoke(&self, name: &str, args: ToolArgs) -> Result<String> {
        let tool = self.get(name).ok_or_else(|| anyhow!("Unknown tool: {}", name))?;
        tool.execute(args).await
    }
}

/// Collects tools and validates the set once in [`ToolRegistryBuilder::build`].
#[derive(Default)]
pub struct ToolRegistryBuilder {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistryBuilder {
    pub fn register(mut self, tool: impl Tool + 'static) -> Self {
        self.tools.push(Arc::new(tool));
        self
    }

    pub fn extend(mut self, tools: impl IntoIterator<Item = Arc<dyn Tool>>) -> Self {
        self.tools.extend(tools);
        self
    }

    /// Freeze the set. A name registered twice is an error rather than a
    /// silent overwrite.
    pub fn build(self) -> Result<ToolRegistry, RegistryError> {
        let mut entries = Vec::with_capacity(self.tools.len());
        let mut by_name = HashMap::with_capacity(self.tools.len());

        for tool in self.tools {
            let descriptor = tool.descriptor();
            if descriptor.name.is_empty() {
                return Err(RegistryError::EmptyName);
            }
            if by_name.contains_key(&descriptor.name) {
                return Err(RegistryError::DuplicateTool(descriptor.name));
            }
            let duplicate = {
                let mut seen = HashSet::new();
                descriptor
                    .parameters
                    .iter()
                    .find(|p| !seen.insert(p.name.as_str()))
                    .map(|p| p.name.clone())
            };
            if let Some(parameter) = duplicate {
                return Err(RegistryError::DuplicateParameter {
                    tool: descriptor.name,
                    parameter,
                });
            }
            by_name.insert(descriptor.name.clone(), entries.len());
            entries.push(Entry { descriptor, tool });
        }

        Ok(ToolRegistry { entries, by_name })
    }
}
