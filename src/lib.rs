//! Merge force field parameters from GROMACS topology include (ITP) files into OpenMM force
//! field XML.
//!
//! Bonds, angles, and dihedrals are read from a molecule's ITP file, and nonbonded parameters
//! from an `[ atomtypes ]` section. Each entry in the XML's force sections is resolved from its
//! atom classes to elements, using the XML's own `<AtomTypes>`, and given the values of the first
//! ITP record whose element label matches.
//!
//! ```no_run
//! use std::path::Path;
//!
//! use itp2ffxml::{ForceFieldXml, ItpParams};
//!
//! let params = ItpParams::load(Path::new("mol.itp"), Path::new("atomtypes.itp"))?;
//!
//! let mut ff = ForceFieldXml::load(Path::new("mol.xml"))?;
//! ff.merge_all(&params);
//! ff.save(Path::new("mol_out.xml"), true)?;
//! # Ok::<(), itp2ffxml::Error>(())
//! ```

pub mod atom_types;
pub mod error;
pub mod ffxml;
pub mod itp;
pub mod matching;
pub mod merge;

pub use atom_types::{AtomTypeDecl, AtomTypeTable};
pub use error::{Error, Result};
pub use ffxml::ForceFieldXml;
pub use itp::{
    AngleRecord, BondRecord, DihedralRecord, ItpParams, ItpSection, NonbondedRecord,
    parse_angles, parse_bonds, parse_dihedrals, parse_nonbonded,
};
pub use merge::{ForceCategory, MergeOutcome, MergeReport, ParamTarget, merge_entry, merge_section};
