//! Canonical keys for comparing a force field entry's elements against ITP record labels, and
//! first-match look-ups over the parsed records.
//!
//! Keys are built from element symbols. Angle and dihedral labels in ITP files may use
//! multi-letter names (e.g. "CT-CT-HC"); these are reduced to the first letter of each
//! hyphen-separated part before comparing. Bond labels are compared as-is.

use crate::itp::{AngleRecord, BondRecord, DihedralRecord, NonbondedRecord};

/// e.g. ("H", "C") -> "C-H". Order-independent.
pub fn bond_key(el_0: &str, el_1: &str) -> String {
    if el_0 <= el_1 {
        format!("{el_0}-{el_1}")
    } else {
        format!("{el_1}-{el_0}")
    }
}

/// e.g. ("H", "C", "C") -> "C-C-H". The outer elements are ordered; the center one stays put.
pub fn angle_key(el_0: &str, el_1: &str, el_2: &str) -> String {
    if el_0 <= el_2 {
        format!("{el_0}-{el_1}-{el_2}")
    } else {
        format!("{el_2}-{el_1}-{el_0}")
    }
}

fn first_char(s: &str) -> Option<&str> {
    s.chars().next().map(|c| &s[..c.len_utf8()])
}

/// The first character of each hyphen-separated part. e.g. "CT-CT-HC" -> ["C", "C", "H"].
/// `None` if any part is empty.
fn label_initials(label: &str) -> Option<Vec<&str>> {
    label.split('-').map(first_char).collect()
}

/// e.g. "CT-CT-HC" -> "C-C-H".
pub fn reduce_label(label: &str) -> Option<String> {
    label_initials(label).map(|v| v.join("-"))
}

/// Compare a 4-element sequence against a dihedral label, forwards or reversed.
pub fn dihedral_matches(elements: &[&str; 4], label: &str) -> bool {
    let Some(initials) = label_initials(label) else {
        return false;
    };

    if initials.len() != 4 {
        return false;
    }

    initials.iter().eq(elements.iter()) || initials.iter().rev().eq(elements.iter())
}

/// The first bond, in file order, whose label equals the canonical key of these elements.
pub fn find_bond<'a>(bonds: &'a [BondRecord], el_0: &str, el_1: &str) -> Option<&'a BondRecord> {
    let key = bond_key(el_0, el_1);
    bonds.iter().find(|b| b.bond_type == key)
}

pub fn find_angle<'a>(
    angles: &'a [AngleRecord],
    el_0: &str,
    el_1: &str,
    el_2: &str,
) -> Option<&'a AngleRecord> {
    let key = angle_key(el_0, el_1, el_2);

    angles.iter().find(|a| {
        a.angle_type
            .as_deref()
            .and_then(reduce_label)
            .is_some_and(|label| label == key)
    })
}

pub fn find_dihedral<'a>(
    dihedrals: &'a [DihedralRecord],
    elements: &[&str; 4],
) -> Option<&'a DihedralRecord> {
    dihedrals.iter().find(|d| {
        d.dihedral_type
            .as_deref()
            .is_some_and(|label| dihedral_matches(elements, label))
    })
}

/// Atom type names are taken to start with their element's symbol; only the first character
/// is compared. e.g. "CT" matches "C". Two-letter elements never match.
pub fn find_nonbonded<'a>(
    nonbonded: &'a [NonbondedRecord],
    element: &str,
) -> Option<&'a NonbondedRecord> {
    nonbonded
        .iter()
        .find(|nb| first_char(&nb.atom_type) == Some(element))
}
