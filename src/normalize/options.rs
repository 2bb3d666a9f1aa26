//! Normalization options and configuration.

/// Options for normalizing native payloads.
#[derive(Debug, Clone, Default)]
pub struct NormalizeOptions {
    /// What to do with malformed fragments
    pub fragment_policy: FragmentPolicy,

    /// How text block identifiers are generated
    pub id_strategy: IdStrategy,
}

impl NormalizeOptions {
    /// Create new normalize options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fragment policy.
    pub fn with_fragment_policy(mut self, policy: FragmentPolicy) -> Self {
        self.fragment_policy = policy;
        self
    }

    /// Fail on the first malformed fragment.
    pub fn strict(mut self) -> Self {
        self.fragment_policy = FragmentPolicy::Strict;
        self
    }

    /// Drop malformed fragments and continue.
    pub fn lenient(mut self) -> Self {
        self.fragment_policy = FragmentPolicy::Lenient;
        self
    }

    /// Set the identifier strategy.
    pub fn with_id_strategy(mut self, strategy: IdStrategy) -> Self {
        self.id_strategy = strategy;
        self
    }

    /// Derive block identifiers from tool, page and ordinal.
    pub fn deterministic_ids(mut self) -> Self {
        self.id_strategy = IdStrategy::Deterministic;
        self
    }
}

/// Handling of native fragments that lack required fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FragmentPolicy {
    /// Drop the fragment, log it, and keep going
    #[default]
    Lenient,
    /// Fail normalization with `Error::MalformedFragment`
    Strict,
}

/// Identifier scheme for text blocks. Tables are always deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdStrategy {
    /// Fresh random UUID per block
    #[default]
    Random,
    /// `{tool}_p{page}_b{ordinal}`, stable across runs on the same input
    Deterministic,
}
