// SPDX-License-Identifier: (MIT OR Apache-2.0)

/// Knobs for the patch pass.
///
/// The indentation unit is learned from the source; `indent_width` and
/// `use_tabs` only apply when the source has no indented line.
#[derive(Debug, Clone)]
pub struct PatchConfig {
    pub indent_width: usize,
    pub use_tabs: bool,
    /// Base name for the collection built by wrapped loop expressions.
    pub result_binding: String,
    pub index_binding: String,
    pub step_binding: String,
    /// Base name for a hoisted loop target.
    pub iterable_binding: String,
    pub key_binding: String,
}

impl Default for PatchConfig {
    fn default() -> Self {
        Self {
            indent_width: 2,
            use_tabs: false,
            result_binding: "result".to_string(),
            index_binding: "i".to_string(),
            step_binding: "step".to_string(),
            iterable_binding: "iterable".to_string(),
            key_binding: "key".to_string(),
        }
    }
}

impl PatchConfig {
    pub fn fallback_indent_unit(&self) -> String {
        if self.use_tabs {
            "\t".to_string()
        } else {
            " ".repeat(self.indent_width)
        }
    }
}
