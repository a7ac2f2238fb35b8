//! Maps atom type names, and atom classes, to chemical element symbols. Built from the
//! `<AtomTypes>` table of an OpenMM force field XML file.

use std::collections::HashMap;

/// One `<Type>` declaration: e.g. `<Type name="opls_135" class="CT" element="C" mass="12.011"/>`.
/// Any of the three may be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AtomTypeDecl {
    /// e.g. "opls_135", "protein-CT"
    pub name: Option<String>,
    /// e.g. "CT", "HC"
    pub class: Option<String>,
    /// One or two letter symbol. e.g. "C", "Cl"
    pub element: Option<String>,
}

impl AtomTypeDecl {
    pub fn new(name: Option<&str>, class: Option<&str>, element: Option<&str>) -> Self {
        // Empty attributes are treated the same as missing ones.
        let own = |v: Option<&str>| v.filter(|s| !s.is_empty()).map(str::to_owned);

        Self {
            name: own(name),
            class: own(class),
            element: own(element),
        }
    }
}

/// Name -> element, and class -> element. Immutable once built; lookups that miss return `None`.
#[derive(Debug, Clone, Default)]
pub struct AtomTypeTable {
    name_to_element: HashMap<String, String>,
    class_to_element: HashMap<String, String>,
}

impl AtomTypeTable {
    pub fn new(decls: &[AtomTypeDecl]) -> Self {
        let mut result = Self::default();

        for decl in decls {
            let Some(element) = &decl.element else {
                continue;
            };

            if let Some(name) = &decl.name {
                result.name_to_element.insert(name.clone(), element.clone());
            }
            if let Some(class) = &decl.class {
                result
                    .class_to_element
                    .insert(class.clone(), element.clone());
            }
        }

        result
    }

    /// Look up an element by declared type name, e.g. the `type` attribute of a nonbonded `<Atom>`.
    pub fn element_by_name(&self, name: &str) -> Option<&str> {
        self.name_to_element.get(name).map(String::as_str)
    }

    /// Look up an element by atom class, e.g. the `class1` attribute of a `<Bond>`.
    pub fn element_by_class(&self, class: &str) -> Option<&str> {
        self.class_to_element.get(class).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.name_to_element.is_empty() && self.class_to_element.is_empty()
    }
}
