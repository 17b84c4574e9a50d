use crate::{TagDirective, YAML_TAG_PREFIX};

/// The tag handles in effect for one document.
///
/// Handles are unique; the order of insertion is kept so that the table
/// can be reported back in the `DOCUMENT-START` event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagDirectives {
    directives: Vec<TagDirective>,
}

impl TagDirectives {
    pub fn new() -> Self {
        Self::default()
    }

    /// A table holding only the primary `!` and secondary `!!` handles.
    pub fn with_defaults() -> Self {
        let mut directives = Self::new();
        directives.add_defaults();
        directives
    }

    /// Add the default handles unless they have been overridden.
    pub fn add_defaults(&mut self) {
        self.add(TagDirective::new("!", "!"));
        self.add(TagDirective::new("!!", YAML_TAG_PREFIX));
    }

    /// Add a directive. Returns `false`, leaving the table untouched, if the
    /// handle is already defined.
    pub fn add(&mut self, directive: TagDirective) -> bool {
        if self.get(&directive.handle).is_some() {
            return false;
        }
        self.directives.push(directive);
        true
    }

    /// The prefix bound to `handle`.
    pub fn get(&self, handle: &str) -> Option<&str> {
        self.directives
            .iter()
            .find(|directive| directive.handle == handle)
            .map(|directive| directive.prefix.as_str())
    }

    /// Expand `handle` and `suffix` into a full tag.
    pub fn expand(&self, handle: &str, suffix: &str) -> Option<String> {
        self.get(handle).map(|prefix| format!("{prefix}{suffix}"))
    }

    /// Split a full tag into the handle with the longest matching prefix
    /// and the remaining suffix.
    pub fn shorten<'t>(&self, tag: &'t str) -> Option<(&str, &'t str)> {
        self.directives
            .iter()
            .filter(|directive| {
                tag.len() > directive.prefix.len() && tag.starts_with(directive.prefix.as_str())
            })
            .max_by_key(|directive| directive.prefix.len())
            .map(|directive| (directive.handle.as_str(), &tag[directive.prefix.len()..]))
    }

    pub fn iter(&self) -> impl Iterator<Item = &TagDirective> {
        self.directives.iter()
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    pub fn clear(&mut self) {
        self.directives.clear();
    }
}
