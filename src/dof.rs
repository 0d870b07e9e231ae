//! Degrees of freedom: nodal variables and references to them.
use crate::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};

/// A Cartesian axis.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// The component index of the axis, i.e. 0, 1 or 2.
    pub fn index(&self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Whether a variable is a translational or a rotational unknown.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum VariableKind {
    Translation,
    Rotation,
}

/// A scalar nodal variable.
///
/// The declaration order defines the order of degrees of freedom within a node when equations
/// are numbered.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Variable {
    DisplacementX,
    DisplacementY,
    DisplacementZ,
    RotationX,
    RotationY,
    RotationZ,
}

impl Variable {
    pub const ALL: [Variable; 6] = [
        Variable::DisplacementX,
        Variable::DisplacementY,
        Variable::DisplacementZ,
        Variable::RotationX,
        Variable::RotationY,
        Variable::RotationZ,
    ];

    pub const DISPLACEMENTS: [Variable; 3] = [Variable::DisplacementX, Variable::DisplacementY, Variable::DisplacementZ];

    pub const ROTATIONS: [Variable; 3] = [Variable::RotationX, Variable::RotationY, Variable::RotationZ];

    pub fn displacement(axis: Axis) -> Self {
        Self::DISPLACEMENTS[axis.index()]
    }

    pub fn rotation(axis: Axis) -> Self {
        Self::ROTATIONS[axis.index()]
    }

    pub fn kind(&self) -> VariableKind {
        match self {
            Variable::DisplacementX | Variable::DisplacementY | Variable::DisplacementZ => VariableKind::Translation,
            Variable::RotationX | Variable::RotationY | Variable::RotationZ => VariableKind::Rotation,
        }
    }

    pub fn axis(&self) -> Axis {
        match self {
            Variable::DisplacementX | Variable::RotationX => Axis::X,
            Variable::DisplacementY | Variable::RotationY => Axis::Y,
            Variable::DisplacementZ | Variable::RotationZ => Axis::Z,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Variable::DisplacementX => "DISPLACEMENT_X",
            Variable::DisplacementY => "DISPLACEMENT_Y",
            Variable::DisplacementZ => "DISPLACEMENT_Z",
            Variable::RotationX => "ROTATION_X",
            Variable::RotationY => "ROTATION_Y",
            Variable::RotationZ => "ROTATION_Z",
        }
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Identifies a scalar unknown by its node and variable.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DofRef {
    pub node: NodeId,
    pub variable: Variable,
}

impl DofRef {
    pub fn new(node: NodeId, variable: Variable) -> Self {
        Self { node, variable }
    }
}

impl Display for DofRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.variable, self.node)
    }
}

/// Result of asking whether a node carries a given degree of freedom.
///
/// Solid elements only allocate displacements, while shells and beams also allocate rotations.
/// Builders treat [`DofCapability::Absent`] rotations as "not part of this physics" and skip them.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DofCapability {
    Present,
    Absent,
}

impl DofCapability {
    pub fn is_present(&self) -> bool {
        matches!(self, DofCapability::Present)
    }
}

impl From<bool> for DofCapability {
    fn from(present: bool) -> Self {
        if present {
            DofCapability::Present
        } else {
            DofCapability::Absent
        }
    }
}
