//! Copies matched ITP parameters onto force field entries. Entries are resolved from atom
//! classes to elements, matched against the parsed records, and overwritten in place.

use std::fmt::{self, Display, Formatter};

use log::{debug, warn};

use crate::{
    atom_types::AtomTypeTable,
    itp::ItpParams,
    matching::{find_angle, find_bond, find_dihedral, find_nonbonded},
};

const CLASS_ATTRS: [&str; 4] = ["class1", "class2", "class3", "class4"];

/// A force field entry we can read classes from, and write parameters to. e.g. a `<Bond>`
/// element in a `<HarmonicBondForce>` section.
pub trait ParamTarget {
    fn attr(&self, name: &str) -> Option<&str>;
    fn set_attr(&mut self, name: &str, value: String);
    /// Rename the entry's tag. Used to mark torsions as `Proper` or `Improper`.
    fn set_tag(&mut self, tag: &str);
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ForceCategory {
    Bond,
    Angle,
    Torsion,
    Nonbonded,
}

impl ForceCategory {
    /// In the order they're merged.
    pub const ALL: [Self; 4] = [Self::Bond, Self::Angle, Self::Torsion, Self::Nonbonded];

    /// The tag of this category's section in OpenMM force field XML.
    pub fn section_tag(self) -> &'static str {
        match self {
            Self::Bond => "HarmonicBondForce",
            Self::Angle => "HarmonicAngleForce",
            Self::Torsion => "PeriodicTorsionForce",
            Self::Nonbonded => "NonbondedForce",
        }
    }

    /// Angles and torsions need their 3rd class resolved as well as the first two.
    fn requires_3rd_element(self) -> bool {
        matches!(self, Self::Angle | Self::Torsion)
    }
}

impl Display for ForceCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.section_tag())
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MergeOutcome {
    Matched,
    /// Elements resolved, but no record matched. Left untouched, silently.
    Unmatched,
    /// One or more required classes had no element. Left untouched, with a warning.
    Unresolved,
}

/// Per-category counts of entry outcomes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct MergeReport {
    pub category: ForceCategory,
    pub matched: usize,
    pub unmatched: usize,
    pub unresolved: usize,
}

impl MergeReport {
    pub fn new(category: ForceCategory) -> Self {
        Self {
            category,
            matched: 0,
            unmatched: 0,
            unresolved: 0,
        }
    }

    fn add(&mut self, outcome: MergeOutcome) {
        match outcome {
            MergeOutcome::Matched => self.matched += 1,
            MergeOutcome::Unmatched => self.unmatched += 1,
            MergeOutcome::Unresolved => self.unresolved += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.matched + self.unmatched + self.unresolved
    }
}

impl Display for MergeReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} matched, {} unmatched, {} unresolved",
            self.category, self.matched, self.unmatched, self.unresolved
        )
    }
}

/// All parameter values are written with 6 decimal places.
pub fn format_param(v: f64) -> String {
    format!("{v:.6}")
}

/// Overwrite each named attribute. Values are formatted up front.
fn write_params<T: ParamTarget + ?Sized>(entry: &mut T, values: &[(&str, f64)]) {
    for (name, v) in values {
        entry.set_attr(name, format_param(*v));
    }
}

/// Treats empty attributes as missing.
fn class_of<T: ParamTarget + ?Sized>(entry: &T, i: usize) -> Option<&str> {
    entry.attr(CLASS_ATTRS[i]).filter(|c| !c.is_empty())
}

/// Resolve, match, and write a single entry.
pub fn merge_entry<T: ParamTarget + ?Sized>(
    category: ForceCategory,
    entry: &mut T,
    atom_types: &AtomTypeTable,
    params: &ItpParams,
) -> MergeOutcome {
    let view: &T = entry;
    let classes: [Option<&str>; 4] = std::array::from_fn(|i| class_of(view, i));
    let els: [Option<&str>; 4] = classes.map(|c| c.and_then(|c| atom_types.element_by_class(c)));

    let unresolved = els[0].is_none()
        || els[1].is_none()
        || (category.requires_3rd_element() && els[2].is_none());

    // Nonbonded entries are addressed by type; we only use classes if they happen to resolve.
    let el_0 = if unresolved {
        let fallback = match category {
            ForceCategory::Nonbonded => view
                .attr("type")
                .and_then(|t| atom_types.element_by_name(t)),
            _ => None,
        };

        match fallback {
            Some(el) => el,
            None => {
                let [c0, c1, c2, c3] = classes.map(|c| c.unwrap_or("None"));
                match category {
                    ForceCategory::Nonbonded => warn!(
                        "Could not determine element for type {}.",
                        view.attr("type").unwrap_or("None")
                    ),
                    _ => warn!("Could not determine element for classes {c0}, {c1}, {c2}, {c3}."),
                }
                return MergeOutcome::Unresolved;
            }
        }
    } else {
        // Checked above.
        els[0].unwrap_or_default()
    };

    let el_1 = els[1].unwrap_or_default();
    let el_2 = els[2].unwrap_or_default();

    match category {
        ForceCategory::Bond => {
            let Some(bond) = find_bond(&params.bonds, el_0, el_1) else {
                return MergeOutcome::Unmatched;
            };
            debug!("Bond {el_0}-{el_1} matched {}", bond.bond_type);

            write_params(entry, &[("length", bond.length), ("k", bond.k)]);
        }
        ForceCategory::Angle => {
            let Some(angle) = find_angle(&params.angles, el_0, el_1, el_2) else {
                return MergeOutcome::Unmatched;
            };
            debug!("Angle {el_0}-{el_1}-{el_2} matched {:?}", angle.angle_type);

            write_params(entry, &[("angle", angle.angle), ("k", angle.k)]);
        }
        ForceCategory::Torsion => {
            // A torsion with no 4th class can't match a 4-element label.
            let Some(el_3) = els[3] else {
                return MergeOutcome::Unmatched;
            };

            let Some(dihedral) = find_dihedral(&params.dihedrals, &[el_0, el_1, el_2, el_3])
            else {
                return MergeOutcome::Unmatched;
            };
            debug!(
                "Torsion {el_0}-{el_1}-{el_2}-{el_3} matched {:?} (improper: {})",
                dihedral.dihedral_type, dihedral.improper
            );

            entry.set_tag(if dihedral.improper {
                "Improper"
            } else {
                "Proper"
            });

            let [k1, k2, k3, k4] = dihedral.k;
            write_params(entry, &[("k1", k1), ("k2", k2), ("k3", k3), ("k4", k4)]);
        }
        ForceCategory::Nonbonded => {
            let Some(nb) = find_nonbonded(&params.nonbonded, el_0) else {
                return MergeOutcome::Unmatched;
            };
            debug!("Nonbonded {el_0} matched {}", nb.atom_type);

            write_params(
                entry,
                &[
                    ("charge", nb.charge),
                    ("sigma", nb.sigma),
                    ("epsilon", nb.epsilon),
                ],
            );
        }
    }

    MergeOutcome::Matched
}

/// Merge every entry of one category's section.
pub fn merge_section<'a, T, I>(
    category: ForceCategory,
    entries: I,
    atom_types: &AtomTypeTable,
    params: &ItpParams,
) -> MergeReport
where
    T: ParamTarget + 'a,
    I: IntoIterator<Item = &'a mut T>,
{
    let mut report = MergeReport::new(category);

    for entry in entries {
        report.add(merge_entry(category, entry, atom_types, params));
    }

    report
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::{
        atom_types::AtomTypeDecl,
        itp::{BondRecord, DihedralRecord, NonbondedRecord},
    };

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Entry {
        tag: String,
        attrs: HashMap<String, String>,
    }

    impl Entry {
        fn new(tag: &str, attrs: &[(&str, &str)]) -> Self {
            Self {
                tag: tag.to_owned(),
                attrs: attrs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            }
        }

        fn get(&self, name: &str) -> Option<&str> {
            self.attrs.get(name).map(String::as_str)
        }
    }

    impl ParamTarget for Entry {
        fn attr(&self, name: &str) -> Option<&str> {
            self.get(name)
        }

        fn set_attr(&mut self, name: &str, value: String) {
            self.attrs.insert(name.to_owned(), value);
        }

        fn set_tag(&mut self, tag: &str) {
            self.tag = tag.to_owned();
        }
    }

    fn table() -> AtomTypeTable {
        AtomTypeTable::new(&[
            AtomTypeDecl::new(Some("opls_135"), Some("CT"), Some("C")),
            AtomTypeDecl::new(Some("opls_140"), Some("HC"), Some("H")),
            AtomTypeDecl::new(Some("opls_145"), Some("CA"), Some("C")),
        ])
    }

    fn params() -> ItpParams {
        ItpParams {
            bonds: vec![BondRecord {
                atoms: (1, 2),
                length: 0.1091,
                k: 284512.0,
                bond_type: "C-H".to_owned(),
            }],
            dihedrals: vec![DihedralRecord {
                atoms: (1, 2, 3, 4),
                k: [0.0, 0.0, 0.4184, 0.0],
                dihedral_type: Some("C-C-C-H".to_owned()),
                improper: true,
            }],
            nonbonded: vec![NonbondedRecord {
                atom_type: "CT".to_owned(),
                charge: -0.18,
                sigma: 0.339967,
                epsilon: 0.45773,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn format() {
        assert_eq!(format_param(284512.0), "284512.000000");
        assert_eq!(format_param(-0.18), "-0.180000");
        assert_eq!(format_param(0.0), "0.000000");
    }

    #[test]
    fn bond() {
        let mut entry = Entry::new(
            "Bond",
            &[("class1", "CT"), ("class2", "HC"), ("length", "0.1"), ("k", "1")],
        );

        let outcome = merge_entry(ForceCategory::Bond, &mut entry, &table(), &params());

        assert_eq!(outcome, MergeOutcome::Matched);
        assert_eq!(entry.get("length"), Some("0.109100"));
        assert_eq!(entry.get("k"), Some("284512.000000"));
    }

    #[test]
    fn merge_is_idempotent() {
        let mut entry = Entry::new("Bond", &[("class1", "HC"), ("class2", "CT")]);

        merge_entry(ForceCategory::Bond, &mut entry, &table(), &params());
        let once = entry.clone();
        merge_entry(ForceCategory::Bond, &mut entry, &table(), &params());

        assert_eq!(entry, once);
    }

    #[test]
    fn torsion_retagged() {
        let mut entry = Entry::new(
            "Proper",
            &[
                ("class1", "HC"),
                ("class2", "CT"),
                ("class3", "CT"),
                ("class4", "CA"),
            ],
        );

        let outcome = merge_entry(ForceCategory::Torsion, &mut entry, &table(), &params());

        assert_eq!(outcome, MergeOutcome::Matched);
        assert_eq!(entry.tag, "Improper");
        assert_eq!(entry.get("k1"), Some("0.000000"));
        assert_eq!(entry.get("k2"), Some("0.000000"));
        assert_eq!(entry.get("k3"), Some("0.418400"));
        assert_eq!(entry.get("k4"), Some("0.000000"));
    }

    #[test]
    fn torsion_without_4th_class() {
        let mut entry = Entry::new(
            "Proper",
            &[("class1", "HC"), ("class2", "CT"), ("class3", "CT")],
        );
        let before = entry.clone();

        let outcome = merge_entry(ForceCategory::Torsion, &mut entry, &table(), &params());

        assert_eq!(outcome, MergeOutcome::Unmatched);
        assert_eq!(entry, before);
    }

    #[test]
    fn nonbonded_by_type() {
        let mut entry = Entry::new("Atom", &[("type", "opls_135"), ("charge", "0")]);

        let outcome = merge_entry(ForceCategory::Nonbonded, &mut entry, &table(), &params());

        assert_eq!(outcome, MergeOutcome::Matched);
        assert_eq!(entry.get("charge"), Some("-0.180000"));
        assert_eq!(entry.get("sigma"), Some("0.339967"));
        assert_eq!(entry.get("epsilon"), Some("0.457730"));
    }

    #[test]
    fn nonbonded_classes_before_type() {
        // Classes resolve to C; the type alone would give H, which has no record.
        let mut entry = Entry::new(
            "Atom",
            &[("class1", "CT"), ("class2", "CT"), ("type", "opls_140")],
        );

        let outcome = merge_entry(ForceCategory::Nonbonded, &mut entry, &table(), &params());

        assert_eq!(outcome, MergeOutcome::Matched);
        assert_eq!(entry.get("charge"), Some("-0.180000"));
    }

    #[test]
    fn unresolved_left_untouched() {
        let mut entry = Entry::new(
            "Bond",
            &[("class1", "CT"), ("class2", "XX"), ("length", "0.2"), ("k", "5")],
        );
        let before = entry.clone();

        let outcome = merge_entry(ForceCategory::Bond, &mut entry, &table(), &params());

        assert_eq!(outcome, MergeOutcome::Unresolved);
        assert_eq!(entry, before);
    }

    #[test]
    fn angle_needs_3rd_class() {
        let mut entry = Entry::new("Angle", &[("class1", "CT"), ("class2", "CT")]);

        let outcome = merge_entry(ForceCategory::Angle, &mut entry, &table(), &params());
        assert_eq!(outcome, MergeOutcome::Unresolved);
    }

    #[test]
    fn section_report() {
        let mut entries = vec![
            Entry::new("Bond", &[("class1", "CT"), ("class2", "HC")]),
            Entry::new("Bond", &[("class1", "CT"), ("class2", "CT")]),
            Entry::new("Bond", &[("class1", "CT"), ("class2", "")]),
        ];

        let report = merge_section(ForceCategory::Bond, &mut entries, &table(), &params());

        assert_eq!(report.matched, 1);
        assert_eq!(report.unmatched, 1);
        assert_eq!(report.unresolved, 1);
        assert_eq!(report.total(), 3);
    }
}
