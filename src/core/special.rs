//! Special-token registry and decode policy.
//!
//! Tekken reserves the low end of the id space for control tokens: ids in
//! `[0, num_special_tokens)` are special, and ordinary token ids are offset
//! past them. The registry is plain data injected at construction, with the
//! canonical Tekken name list as the default, so the name list and the
//! active count are independent parameters. An id can be inside the special
//! range without having a canonical name; it still counts as special and
//! decodes to a generic placeholder.

/// Canonical Tekken control-token names at their fixed ordinals.
pub const CANONICAL_SPECIAL_TOKENS: [&str; 20] = [
    "<unk>",
    "<s>",
    "</s>",
    "[INST]",
    "[/INST]",
    "[AVAILABLE_TOOLS]",
    "[/AVAILABLE_TOOLS]",
    "[TOOL_RESULTS]",
    "[/TOOL_RESULTS]",
    "[TOOL_CALLS]",
    "[IMG]",
    "<pad>",
    "[IMG_BREAK]",
    "[IMG_END]",
    "[PREFIX]",
    "[MIDDLE]",
    "[SUFFIX]",
    "[SYSTEM_PROMPT]",
    "[/SYSTEM_PROMPT]",
    "[TOOL_CONTENT]",
];

/// How [`Tokenizer::decode`](super::Tokenizer::decode) treats special ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpecialTokenPolicy {
    /// Skip special ids silently.
    #[default]
    Ignore,
    /// Render special ids as their names (placeholder when unnamed).
    Keep,
    /// Abort decoding on the first special id.
    Raise,
}

/// Position-indexed list of special-token names plus the active count.
#[derive(Debug, Clone)]
pub struct SpecialTokenRegistry {
    names: Vec<String>,
    active: u32,
}

impl SpecialTokenRegistry {
    /// Registry over an explicit name list.
    ///
    /// `active` is the number of reserved id slots; it may be smaller or
    /// larger than the name list.
    pub fn new(names: Vec<String>, active: u32) -> Self {
        Self { names, active }
    }

    /// The canonical Tekken registry with `active` reserved slots.
    pub fn canonical(active: u32) -> Self {
        Self::new(
            CANONICAL_SPECIAL_TOKENS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            active,
        )
    }

    /// Ordinal of a name, if registered.
    pub fn position(&self, name: &str) -> Option<u32> {
        self.names.iter().position(|n| n == name).map(|p| p as u32)
    }

    /// Name at an ordinal, if one is registered there.
    pub fn name(&self, id: u32) -> Option<&str> {
        self.names.get(id as usize).map(|s| s.as_str())
    }

    /// Display form of a special id: its name, or a generic placeholder for
    /// in-range ids without one.
    pub fn piece(&self, id: u32) -> String {
        match self.name(id) {
            Some(name) => name.to_string(),
            None => format!("<SPECIAL_{id}>"),
        }
    }

    /// Whether an id falls in the reserved special range. Purely a range
    /// check; the id need not have a registered name.
    pub fn is_special(&self, id: u32) -> bool {
        id < self.active
    }

    /// Number of reserved special id slots.
    pub fn active(&self) -> u32 {
        self.active
    }

    /// Number of registered names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no names are registered.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
