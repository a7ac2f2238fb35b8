//! For reading, updating, and writing OpenMM force field XML files. e.g.:
//!
//! ```xml
//! <ForceField>
//!  <AtomTypes>
//!   <Type name="opls_135" class="CT" element="C" mass="12.011"/>
//!  </AtomTypes>
//!  <HarmonicBondForce>
//!   <Bond class1="CT" class2="HC" length="0.109" k="284512.0"/>
//!  </HarmonicBondForce>
//!  ...
//! </ForceField>
//! ```
//!
//! We keep the whole document as an element tree, and modify force entries in place, so that
//! anything we don't touch is written back out as it was read.

use std::{
    fs::{self, File},
    io::Write,
    path::Path,
};

use log::{error, info};
use xmltree::{Element, EmitterConfig, XMLNode};

use crate::{
    atom_types::{AtomTypeDecl, AtomTypeTable},
    error::Result,
    itp::ItpParams,
    merge::{ForceCategory, MergeReport, ParamTarget, merge_section},
};

impl ParamTarget for Element {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    fn set_attr(&mut self, name: &str, value: String) {
        self.attributes.insert(name.to_owned(), value);
    }

    fn set_tag(&mut self, tag: &str) {
        self.name = tag.to_owned();
    }
}

#[derive(Clone, Debug)]
pub struct ForceFieldXml {
    pub root: Element,
}

impl ForceFieldXml {
    /// From the text of a force field XML file.
    pub fn new(text: &str) -> Result<Self> {
        Ok(Self {
            root: Element::parse(text.as_bytes())?,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data_str = fs::read_to_string(path)?;
        Self::new(&data_str)
    }

    /// Write the document. If `indent` is false, no whitespace is added between elements.
    pub fn write<W: Write>(&self, w: W, indent: bool) -> Result<()> {
        let config = EmitterConfig::new().perform_indent(indent);
        self.root.write_with_config(w, config)?;

        Ok(())
    }

    pub fn save(&self, path: &Path, indent: bool) -> Result<()> {
        let f = File::create(path)?;
        self.write(f, indent)
    }

    /// The `<Type>` declarations in `<AtomTypes>`, in document order. `None` if there is no
    /// `<AtomTypes>` section.
    pub fn atom_type_decls(&self) -> Option<Vec<AtomTypeDecl>> {
        let section = self.root.get_child("AtomTypes")?;

        let result = section
            .children
            .iter()
            .filter_map(XMLNode::as_element)
            .filter(|el| el.name == "Type")
            .map(|el| AtomTypeDecl::new(el.attr("name"), el.attr("class"), el.attr("element")))
            .collect();

        Some(result)
    }

    /// Build the element look-up tables. A missing `<AtomTypes>` section is reported, and
    /// results in empty tables.
    pub fn atom_types(&self) -> AtomTypeTable {
        match self.atom_type_decls() {
            Some(decls) => AtomTypeTable::new(&decls),
            None => {
                error!("AtomTypes section not found in XML.");
                AtomTypeTable::default()
            }
        }
    }

    pub fn section_mut(&mut self, category: ForceCategory) -> Option<&mut Element> {
        self.root.get_mut_child(category.section_tag())
    }

    /// Merge ITP parameters into every entry of one force section. Returns `None`, and reports,
    /// if the section is missing.
    pub fn merge(
        &mut self,
        category: ForceCategory,
        atom_types: &AtomTypeTable,
        params: &ItpParams,
    ) -> Option<MergeReport> {
        let Some(section) = self.section_mut(category) else {
            error!("{category} section not found in XML.");
            return None;
        };

        let entries = section
            .children
            .iter_mut()
            .filter_map(XMLNode::as_mut_element);

        Some(merge_section(category, entries, atom_types, params))
    }

    /// Merge bonds, angles, torsions, and nonbonded parameters, in that order. Sections that
    /// are missing are skipped.
    pub fn merge_all(&mut self, params: &ItpParams) -> Vec<MergeReport> {
        let atom_types = self.atom_types();

        let mut result = Vec::new();
        for category in ForceCategory::ALL {
            if let Some(report) = self.merge(category, &atom_types, params) {
                info!("{report}");
                result.push(report);
            }
        }

        result
    }
}
