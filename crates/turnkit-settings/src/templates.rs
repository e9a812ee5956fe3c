//! Program template library
//!
//! Named example programs that can be loaded into the engine. The library is
//! built once (built-ins plus whatever the config file adds) and only read
//! afterwards.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use turnkit_core::TemplateError;

/// Id of the built-in G71/G70 outer-diameter program
pub const G71_OUTER: &str = "g71outer";

const G71_OUTER_PROGRAM: &str = "; G71 roughing cycle
O0010
T0101
G97 S600 M03
G0 X65 Z3
G71 U1 R0.5
G71 P1 Q2 U1.0 W0.2 F0.25
N1 G0 X20 W0
G1 Z0 F0.15
G1 X24 Z-2
G1 Z-15
G3 X30 Z-18 R3
G1 Z-28
G1 X40 Z-33
G1 Z-45
G1 X60
N2 G1 Z-50
G0 X65 Z3
G70 P1 Q2
G0 X65 Z5
M30";

/// Id to program text table
///
/// Deserializing merges the stored table over the built-ins, so a config
/// file only needs to list the templates it adds or replaces.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TemplateLibrary {
    templates: BTreeMap<String, String>,
}

impl<'de> Deserialize<'de> for TemplateLibrary {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let stored = BTreeMap::<String, String>::deserialize(deserializer)?;
        stored
            .into_iter()
            .try_fold(Self::builtin(), |library, (id, program)| {
                library.with_template(id, program)
            })
            .map_err(serde::de::Error::custom)
    }
}

impl Default for TemplateLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TemplateLibrary {
    /// Library holding only the built-in templates
    pub fn builtin() -> Self {
        let mut templates = BTreeMap::new();
        templates.insert(G71_OUTER.to_string(), G71_OUTER_PROGRAM.to_string());
        Self { templates }
    }

    /// Library without any template
    pub fn empty() -> Self {
        Self {
            templates: BTreeMap::new(),
        }
    }

    /// Return a library with one more template, replacing any with the same id
    pub fn with_template(
        mut self,
        id: impl Into<String>,
        program: impl Into<String>,
    ) -> Result<Self, TemplateError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(TemplateError::EmptyId);
        }
        self.templates.insert(id, program.into());
        Ok(self)
    }

    /// Program text for `id`
    pub fn get(&self, id: &str) -> Result<&str, TemplateError> {
        self.templates
            .get(id)
            .map(String::as_str)
            .ok_or_else(|| TemplateError::NotFound { id: id.to_string() })
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_contains_g71outer() {
        let library = TemplateLibrary::default();
        let program = library.get(G71_OUTER).unwrap();
        assert!(program.contains("G71 P1 Q2"));
        assert!(program.trim_end().ends_with("M30"));
    }

    #[test]
    fn test_missing_template() {
        let library = TemplateLibrary::empty();
        assert_eq!(
            library.get("nope"),
            Err(TemplateError::NotFound {
                id: "nope".to_string()
            })
        );
    }

    #[test]
    fn test_with_template() {
        let library = TemplateLibrary::builtin()
            .with_template("facing", "G0 X40 Z1\nG1 X0 F0.1")
            .unwrap();
        assert_eq!(library.ids().collect::<Vec<_>>(), vec!["facing", G71_OUTER]);
        assert!(TemplateLibrary::empty().with_template("  ", "x").is_err());
    }
}
