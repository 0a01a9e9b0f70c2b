//! Structured prompts — nested, reusable prompt fragments as data.
//!
//! A [`PromptTree`] is an ordered mapping of section title → body, where a
//! body is a string, a numbered list, or a nested tree. Compilation produces
//! a markdown heading document; heading depth is capped at 3, so deeper
//! nesting collapses to the capped level.

const MAX_HEADING_DEPTH: usize = 3;

/// The body of one prompt section.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptValue {
    /// Plain body text
    Text(String),
    /// A 1-indexed numbered list
    List(Vec<String>),
    /// A nested subtree, compiled one heading level deeper
    Tree(PromptTree),
}

/// An ordered tree of prompt sections. Insertion order is rendering order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptTree {
    sections: Vec<(String, PromptValue)>,
}

impl PromptTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text section.
    pub fn text(mut self, title: impl Into<String>, body: impl Into<String>) -> Self {
        self.sections
            .push((title.into(), PromptValue::Text(body.into())));
        self
    }

    /// Append a numbered-list section.
    pub fn list<I, S>(mut self, title: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sections.push((
            title.into(),
            PromptValue::List(items.into_iter().map(Into::into).collect()),
        ));
        self
    }

    /// Append a nested subtree.
    pub fn tree(mut self, title: impl Into<String>, subtree: PromptTree) -> Self {
        self.sections
            .push((title.into(), PromptValue::Tree(subtree)));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Compile to a markdown heading document, starting at heading level 1.
    pub fn compile(&self) -> String {
        self.compile_at(1)
    }

    fn compile_at(&self, depth: usize) -> String {
        let level = depth.min(MAX_HEADING_DEPTH);
        let mut out = String::new();
        for (title, value) in &self.sections {
            out.push_str(&"#".repeat(level));
            out.push(' ');
            out.push_str(title);
            out.push('\n');
            match value {
                PromptValue::Text(body) => {
                    out.push_str(body);
                    out.push('\n');
                }
                PromptValue::List(items) => {
                    for (i, item) in items.iter().enumerate() {
                        out.push_str(&format!("{}. {item}\n", i + 1));
                    }
                }
                PromptValue::Tree(subtree) => {
                    out.push_str(&subtree.compile_at(depth + 1));
                }
            }
        }
        out
    }
}
