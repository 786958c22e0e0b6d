//! Parsed structure: atoms grouped into visual components plus bounds.

use glam::DVec3;
use pdbtbx::{
    ContainsAtomConformer, ContainsAtomConformerResidue, ContainsAtomConformerResidueChain,
    Format, ReadOptions, StrictnessLevel,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{BufReader, Cursor};

use crate::engine::{BoundingSphere, EngineError, StructureFormat};

const WATER_RESIDUES: &[&str] = &["HOH", "WAT", "H2O", "DOD", "SOL", "TIP", "TP3", "TIP3", "SPC"];

const ION_RESIDUES: &[&str] = &[
    "ZN", "MG", "NA", "CL", "FE", "MN", "CO", "NI", "CU", "K", "CA", "BR", "I", "F", "LI", "CD",
    "SR", "BA", "CS", "RB", "HG",
];

/// Kind of visual component a group of atoms is rendered as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Polymer,
    Ligand,
    Ion,
    Water,
}

pub fn classify_residue(name: &str, hetero: bool) -> ComponentKind {
    let name = name.trim();
    if WATER_RESIDUES.contains(&name) {
        ComponentKind::Water
    } else if ION_RESIDUES.contains(&name) {
        ComponentKind::Ion
    } else if hetero {
        ComponentKind::Ligand
    } else {
        ComponentKind::Polymer
    }
}

#[derive(Debug, Clone)]
pub struct Component {
    pub kind: ComponentKind,
    pub positions: Vec<DVec3>,
}

/// Atom counts reported with a loaded scene.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructureSummary {
    pub atoms: usize,
    pub chains: usize,
    pub components: BTreeMap<ComponentKind, usize>,
}

#[derive(Debug, Clone)]
pub struct Structure {
    components: Vec<Component>,
    chains: usize,
}

impl Structure {
    pub fn parse(text: &str, format: StructureFormat) -> Result<Self, EngineError> {
        let format = match format {
            StructureFormat::Pdb => Format::Pdb,
            StructureFormat::Mmcif => Format::Mmcif,
        };
        let (pdb, _warnings) = ReadOptions::default()
            .set_level(StrictnessLevel::Loose)
            .set_format(format)
            .read_raw(BufReader::new(Cursor::new(text.as_bytes())))
            .map_err(|errs| {
                EngineError::Parse(
                    errs.iter()
                        .map(|e| e.to_string())
                        .collect::<Vec<_>>()
                        .join("; "),
                )
            })?;

        let mut groups: BTreeMap<ComponentKind, Vec<DVec3>> = BTreeMap::new();
        for hier in pdb.atoms_with_hierarchy() {
            let atom = hier.atom();
            let kind = classify_residue(hier.conformer().name(), atom.hetero());
            let (x, y, z) = atom.pos();
            groups.entry(kind).or_default().push(DVec3::new(x, y, z));
        }

        if groups.is_empty() {
            return Err(EngineError::Parse("No atoms found in structure".to_string()));
        }

        Ok(Self {
            components: groups
                .into_iter()
                .map(|(kind, positions)| Component { kind, positions })
                .collect(),
            chains: pdb.chain_count(),
        })
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn atom_count(&self) -> usize {
        self.components.iter().map(|c| c.positions.len()).sum()
    }

    pub fn summary(&self) -> StructureSummary {
        StructureSummary {
            atoms: self.atom_count(),
            chains: self.chains,
            components: self
                .components
                .iter()
                .map(|c| (c.kind, c.positions.len()))
                .collect(),
        }
    }

    /// Sphere around the axis-aligned box of all atoms; `None` without atoms.
    pub fn bounding_sphere(&self) -> Option<BoundingSphere> {
        let mut points = self.components.iter().flat_map(|c| c.positions.iter().copied());
        let first = points.next()?;
        let (min, max) = points.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        let center = (min + max) * 0.5;
        Some(BoundingSphere {
            center: center.to_array(),
            radius: (max - min).length() * 0.5,
        })
    }
}
