/*!

  Core vocabulary for circuits: signal values, gate kinds, pin addressing,
  and canvas positions.

*/

use std::fmt;

/// The stable integer identity of a gate within one [crate::netlist::Circuit].
pub type GateId = u32;

/// The stable integer identity of a wire within one [crate::netlist::Circuit].
pub type WireId = u32;

/// A three-valued signal. A pin that no defined value has reached yet holds
/// [Ternary::Unknown], and `Unknown` propagates through every gate function.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Ternary {
    /// Not determined (yet, or at all)
    #[default]
    Unknown,
    /// A logical 0
    False,
    /// A logical 1
    True,
}

impl Ternary {
    /// Lifts a two-valued bool into a ternary signal.
    pub fn known(value: bool) -> Self {
        if value { Ternary::True } else { Ternary::False }
    }

    /// Returns the definite value, or [None] for [Ternary::Unknown].
    pub fn as_bool(self) -> Option<bool> {
        match self {
            Ternary::Unknown => None,
            Ternary::False => Some(false),
            Ternary::True => Some(true),
        }
    }

    /// Returns `true` if the signal holds a definite value.
    pub fn is_known(self) -> bool {
        !matches!(self, Ternary::Unknown)
    }
}

impl From<bool> for Ternary {
    fn from(value: bool) -> Self {
        Ternary::known(value)
    }
}

impl fmt::Display for Ternary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ternary::Unknown => write!(f, "?"),
            Ternary::False => write!(f, "0"),
            Ternary::True => write!(f, "1"),
        }
    }
}

/// The closed repertoire of gates. The kind of a gate is fixed at creation
/// and determines its pin arity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
pub enum GateKind {
    /// A free input terminal with a user-settable boolean state
    Source,
    /// An observed output terminal (the LED of the sandbox)
    Sink,
    /// One-input negation
    Not,
    /// Two-input conjunction
    And,
    /// Two-input disjunction
    Or,
    /// Two-input exclusive or
    Xor,
    /// Two-input negated disjunction
    Nor,
}

impl GateKind {
    /// The number of input pins a gate of this kind carries.
    pub fn input_count(self) -> usize {
        match self {
            GateKind::Source => 0,
            GateKind::Sink | GateKind::Not => 1,
            GateKind::And | GateKind::Or | GateKind::Xor | GateKind::Nor => 2,
        }
    }

    /// The number of output pins a gate of this kind carries.
    pub fn output_count(self) -> usize {
        match self {
            GateKind::Sink => 0,
            _ => 1,
        }
    }

    /// Returns `true` for the terminal kinds ([GateKind::Source] and
    /// [GateKind::Sink]), which compute nothing.
    pub fn is_terminal(self) -> bool {
        matches!(self, GateKind::Source | GateKind::Sink)
    }

    /// Applies the strict three-valued function of this kind: any
    /// [Ternary::Unknown] operand makes the result `Unknown`, with no
    /// short-circuiting on the defined operand. Terminal kinds yield
    /// `Unknown`.
    ///
    /// # Panics
    ///
    /// Panics if `inputs` is shorter than [GateKind::input_count].
    pub fn eval(self, inputs: &[Ternary]) -> Ternary {
        match self {
            GateKind::Source | GateKind::Sink => Ternary::Unknown,
            GateKind::Not => {
                let Some(a) = inputs[0].as_bool() else {
                    return Ternary::Unknown;
                };
                Ternary::known(!a)
            }
            _ => {
                let (Some(a), Some(b)) = (inputs[0].as_bool(), inputs[1].as_bool()) else {
                    return Ternary::Unknown;
                };
                Ternary::known(match self {
                    GateKind::And => a && b,
                    GateKind::Or => a || b,
                    GateKind::Xor => a != b,
                    GateKind::Nor => !(a || b),
                    _ => unreachable!("terminal and unary kinds handled above"),
                })
            }
        }
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateKind::Source => write!(f, "SOURCE"),
            GateKind::Sink => write!(f, "SINK"),
            GateKind::Not => write!(f, "NOT"),
            GateKind::And => write!(f, "AND"),
            GateKind::Or => write!(f, "OR"),
            GateKind::Xor => write!(f, "XOR"),
            GateKind::Nor => write!(f, "NOR"),
        }
    }
}

/// Which side of a gate a pin sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinRole {
    /// A pin signals flow into
    Input,
    /// A pin signals flow out of
    Output,
}

/// Addresses one pin on one gate: the owning gate, the side, and the
/// zero-based position within that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PinAddr {
    /// The owning gate
    pub gate: GateId,
    /// Input or output side
    pub role: PinRole,
    /// Zero-based position within the side
    pub index: usize,
}

impl PinAddr {
    /// Addresses input pin `index` of `gate`.
    pub fn input(gate: GateId, index: usize) -> Self {
        Self {
            gate,
            role: PinRole::Input,
            index,
        }
    }

    /// Addresses output pin `index` of `gate`.
    pub fn output(gate: GateId, index: usize) -> Self {
        Self {
            gate,
            role: PinRole::Output,
            index,
        }
    }
}

impl fmt::Display for PinAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = match self.role {
            PinRole::Input => "in",
            PinRole::Output => "out",
        };
        write!(f, "g{}.{}[{}]", self.gate, side, self.index)
    }
}

/// A gate position in world coordinates. The renderer owns the camera
/// transform; the engine only stores and hands out positions.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    /// Horizontal world coordinate
    pub x: f32,
    /// Vertical world coordinate
    pub y: f32,
}

impl Position {
    /// Creates a position from its coordinates.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<(f32, f32)> for Position {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}
