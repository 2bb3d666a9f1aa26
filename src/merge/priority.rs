//! Tool priority order and merge options.

use crate::extract::ToolKind;

/// Fixed ranking used to pick page text when several tools cover a page.
///
/// Tools are matched by name first, then by the default name of their kind.
/// Tools that match nothing rank after every listed tool and among
/// themselves by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPriority {
    order: Vec<String>,
}

impl ToolPriority {
    /// Create a priority order from tool names, highest priority first.
    ///
    /// Repeated names keep their first position.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut order: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if !order.contains(&name) {
                order.push(name);
            }
        }
        Self { order }
    }

    /// Names in priority order.
    pub fn names(&self) -> &[String] {
        &self.order
    }

    /// Rank of a tool; lower ranks win.
    pub fn rank(&self, tool: &str, kind: ToolKind) -> usize {
        self.position(tool)
            .or_else(|| self.position(kind.as_str()))
            .unwrap_or(usize::MAX)
    }

    /// Sort key giving a total, deterministic order over tools.
    pub fn sort_key<'a>(&self, tool: &'a str, kind: ToolKind) -> (usize, &'a str) {
        (self.rank(tool, kind), tool)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.order.iter().position(|n| n == name)
    }
}

impl Default for ToolPriority {
    fn default() -> Self {
        Self::new(ToolKind::ALL.iter().map(|k| k.as_str()))
    }
}

/// Options for the merge engine.
#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    /// Tool priority order
    pub priority: ToolPriority,
}

impl MergeOptions {
    /// Create new merge options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tool priority order.
    pub fn with_priority(mut self, priority: ToolPriority) -> Self {
        self.priority = priority;
        self
    }
}
