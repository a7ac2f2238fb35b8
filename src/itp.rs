//! For parsing GROMACS topology include (ITP) files. We read the `[ bonds ]`, `[ angles ]`,
//! and `[ dihedrals ]` sections of a molecule's ITP, and the `[ atomtypes ]` section of the
//! force field's atom type file. (These may be the same file.)
//!
//! Data lines are whitespace-separated columns. In the files we target, the columns after the
//! numerical ones contain a label of the atoms' element or type names, e.g. `C-H`, or
//! `CT-CT-HC`. Dihedral lines may end with `improper`.

use std::{
    fmt::{self, Display, Formatter},
    fs,
    io::{self, ErrorKind},
    path::Path,
    sync::LazyLock,
};

use log::warn;
use regex::Regex;

/// Matches a header such as `[ bonds ]` or `[  bonds  ]`, capturing the section name.
static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[\s*([A-Za-z_]+)\s*\]$").unwrap());

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum ItpSection {
    Bonds,
    Angles,
    Dihedrals,
    /// Nonbonded parameters.
    AtomTypes,
}

impl ItpSection {
    pub fn name(self) -> &'static str {
        match self {
            Self::Bonds => "bonds",
            Self::Angles => "angles",
            Self::Dihedrals => "dihedrals",
            Self::AtomTypes => "atomtypes",
        }
    }
}

impl Display for ItpSection {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[ {} ]", self.name())
    }
}

/// Returns the section name if this (trimmed) line is a section header.
fn header_name(line: &str) -> Option<&str> {
    HEADER_RE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// The data lines of the first occurrence of a section, in file order. Blank lines and `;`
/// comments are dropped. The scan stops at the next `[`-prefixed line that isn't this
/// section's own header.
fn section_lines(text: &str, section: ItpSection) -> Vec<&str> {
    let mut result = Vec::new();
    let mut in_section = false;

    for raw in text.lines() {
        let line = raw.trim();

        if header_name(line) == Some(section.name()) {
            in_section = true;
            continue;
        }

        if !in_section || line.is_empty() || line.starts_with(';') {
            continue;
        }

        if line.starts_with('[') {
            break;
        }

        result.push(line);
    }

    result
}

/// Parse every data line of a section with `parse`. Lines that fail are logged, and skipped.
fn scan<T>(text: &str, section: ItpSection, parse: fn(&str) -> io::Result<T>) -> Vec<T> {
    section_lines(text, section)
        .into_iter()
        .filter_map(|line| match parse(line) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("Skipping malformed line in {section}: {line} ({e})");
                None
            }
        })
        .collect()
}

/// Data for a `[ bonds ]` entry: e.g. `1  2  1  0.10900  284512.0  ; C-H`
#[derive(Debug, Clone, PartialEq)]
pub struct BondRecord {
    /// Atom numbers in the source file. Not used for matching.
    pub atoms: (usize, usize),
    /// Equilibrium bond length. nm
    pub length: f64,
    /// Force constant. kJ/mol/nm²
    pub k: f64,
    /// Element pair, e.g. "C-H". This is the last column of the line.
    pub bond_type: String,
}

impl BondRecord {
    pub fn from_line(line: &str) -> io::Result<Self> {
        let cols: Vec<_> = line.split_whitespace().collect();

        // ai, aj, funct, b0, kb, and at least one label col.
        if cols.len() < 6 {
            return Err(io::Error::new(
                ErrorKind::InvalidData,
                "Not enough cols (Bond).",
            ));
        }

        Ok(Self {
            atoms: (parse_index(cols[0])?, parse_index(cols[1])?),
            length: parse_float(cols[3])?,
            k: parse_float(cols[4])?,
            bond_type: cols[cols.len() - 1].to_owned(),
        })
    }
}

/// Data for an `[ angles ]` entry: e.g. `1  2  3  1  109.500  292.880  ; C-C-H`
#[derive(Debug, Clone, PartialEq)]
pub struct AngleRecord {
    pub atoms: (usize, usize, usize),
    /// Equilibrium angle. Degrees in the file; we store radians, as OpenMM uses.
    pub angle: f64,
    /// Force constant. kJ/mol/rad²
    pub k: f64,
    /// e.g. "C-C-H", or "CT-CT-HC". `None` if the line has no trailing label.
    pub angle_type: Option<String>,
}

impl AngleRecord {
    pub fn from_line(line: &str) -> io::Result<Self> {
        let cols: Vec<_> = line.split_whitespace().collect();

        if cols.len() < 6 {
            return Err(io::Error::new(
                ErrorKind::InvalidData,
                "Not enough cols (Angle).",
            ));
        }

        Ok(Self {
            atoms: (
                parse_index(cols[0])?,
                parse_index(cols[1])?,
                parse_index(cols[2])?,
            ),
            angle: parse_float(cols[4])?.to_radians(),
            k: parse_float(cols[5])?,
            angle_type: label(&cols, 6),
        })
    }
}

/// Data for both proper, and improper `[ dihedrals ]` entries, using the 4-term Fourier form:
/// e.g. `1  2  3  4  5  0.000  0.000  0.418  0.000  ; C-C-C-H  improper`
#[derive(Debug, Clone, PartialEq)]
pub struct DihedralRecord {
    pub atoms: (usize, usize, usize, usize),
    /// Fourier coefficients C1 - C4. kJ/mol
    pub k: [f64; 4],
    /// 2 - 4 hyphen-separated names, e.g. "C-C-C-H". `None` if the line has no label.
    pub dihedral_type: Option<String>,
    /// Set by a trailing `improper` column.
    pub improper: bool,
}

impl DihedralRecord {
    pub fn from_line(line: &str) -> io::Result<Self> {
        let mut cols: Vec<_> = line.split_whitespace().collect();

        let improper = cols
            .last()
            .is_some_and(|c| c.eq_ignore_ascii_case("improper"));
        if improper {
            cols.pop();
        }

        // ai, aj, ak, al, funct, C1 - C4
        if cols.len() < 9 {
            return Err(io::Error::new(
                ErrorKind::InvalidData,
                "Not enough cols (Dihedral).",
            ));
        }

        Ok(Self {
            atoms: (
                parse_index(cols[0])?,
                parse_index(cols[1])?,
                parse_index(cols[2])?,
                parse_index(cols[3])?,
            ),
            k: [
                parse_float(cols[5])?,
                parse_float(cols[6])?,
                parse_float(cols[7])?,
                parse_float(cols[8])?,
            ],
            dihedral_type: label(&cols, 9),
            improper,
        })
    }
}

/// Data for an `[ atomtypes ]` entry:
/// e.g. `CT  12.01100  -0.180  A  3.39967e-01  4.57730e-01`
#[derive(Debug, Clone, PartialEq)]
pub struct NonbondedRecord {
    /// e.g. "CT". Its first character is taken as the element when matching.
    pub atom_type: String,
    /// Elementary charge units.
    pub charge: f64,
    /// LJ sigma. nm
    pub sigma: f64,
    /// LJ epsilon. kJ/mol
    pub epsilon: f64,
}

impl NonbondedRecord {
    pub fn from_line(line: &str) -> io::Result<Self> {
        let cols: Vec<_> = line.split_whitespace().collect();

        // name, mass, charge, ptype, sigma, epsilon. Anything after is ignored. The mass and
        // particle type cols aren't used.
        if cols.len() < 6 {
            return Err(io::Error::new(
                ErrorKind::InvalidData,
                "Not enough cols (Atom type).",
            ));
        }

        Ok(Self {
            atom_type: cols[0].to_owned(),
            charge: parse_float(cols[2])?,
            sigma: parse_float(cols[4])?,
            epsilon: parse_float(cols[5])?,
        })
    }
}

pub fn parse_bonds(text: &str) -> Vec<BondRecord> {
    scan(text, ItpSection::Bonds, BondRecord::from_line)
}

pub fn parse_angles(text: &str) -> Vec<AngleRecord> {
    scan(text, ItpSection::Angles, AngleRecord::from_line)
}

pub fn parse_dihedrals(text: &str) -> Vec<DihedralRecord> {
    scan(text, ItpSection::Dihedrals, DihedralRecord::from_line)
}

pub fn parse_nonbonded(text: &str) -> Vec<NonbondedRecord> {
    scan(text, ItpSection::AtomTypes, NonbondedRecord::from_line)
}

/// All parameters we merge, each list in file order.
#[derive(Debug, Clone, Default)]
pub struct ItpParams {
    pub bonds: Vec<BondRecord>,
    pub angles: Vec<AngleRecord>,
    pub dihedrals: Vec<DihedralRecord>,
    pub nonbonded: Vec<NonbondedRecord>,
}

impl ItpParams {
    /// From the text of a molecule's ITP file, and of the file containing `[ atomtypes ]`.
    /// These may be the same text.
    pub fn new(itp: &str, atomtypes: &str) -> Self {
        Self {
            bonds: parse_bonds(itp),
            angles: parse_angles(itp),
            dihedrals: parse_dihedrals(itp),
            nonbonded: parse_nonbonded(atomtypes),
        }
    }

    pub fn load(itp_path: &Path, atomtypes_path: &Path) -> io::Result<Self> {
        let itp = fs::read_to_string(itp_path)?;

        let result = if atomtypes_path == itp_path {
            Self::new(&itp, &itp)
        } else {
            let atomtypes = fs::read_to_string(atomtypes_path)?;
            Self::new(&itp, &atomtypes)
        };

        Ok(result)
    }
}

/// The last column at or after `start`, if any.
fn label(cols: &[&str], start: usize) -> Option<String> {
    if cols.len() > start {
        cols.last().map(|c| (*c).to_owned())
    } else {
        None
    }
}

fn parse_index(v: &str) -> io::Result<usize> {
    v.parse()
        .map_err(|_| io::Error::new(ErrorKind::InvalidData, format!("Invalid atom index: {v}")))
}

/// Helper to prevent repetition
fn parse_float(v: &str) -> io::Result<f64> {
    v.parse()
        .map_err(|_| io::Error::new(ErrorKind::InvalidData, format!("Invalid float: {v}")))
}
