/*!

  API for the circuit graph data structure.

*/

use crate::circuit::{GateId, GateKind, PinAddr, PinRole, Position, Ternary, WireId};
use crate::graph::{Analysis, EvalOrder};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// One terminal on a gate. Pin values are ephemeral simulation state,
/// recomputed by every [Circuit::simulate] call and never persisted.
#[derive(Debug, Clone)]
pub struct Pin {
    role: PinRole,
    index: usize,
    value: Ternary,
}

impl Pin {
    fn new(role: PinRole, index: usize) -> Self {
        Self {
            role,
            index,
            value: Ternary::Unknown,
        }
    }

    /// The side of the owning gate this pin sits on.
    pub fn role(&self) -> PinRole {
        self.role
    }

    /// Zero-based position within the side.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The signal on this pin after the last propagation pass.
    pub fn value(&self) -> Ternary {
        self.value
    }
}

/// A node in the circuit graph: a fixed boolean function or a terminal,
/// with its pins owned inline.
#[derive(Debug, Clone)]
pub struct Gate {
    gid: GateId,
    kind: GateKind,
    name: Option<String>,
    state: bool,
    position: Position,
    inputs: Vec<Pin>,
    outputs: Vec<Pin>,
}

impl Gate {
    fn new(gid: GateId, kind: GateKind, position: Position) -> Self {
        let inputs = (0..kind.input_count())
            .map(|i| Pin::new(PinRole::Input, i))
            .collect();
        let outputs = (0..kind.output_count())
            .map(|i| Pin::new(PinRole::Output, i))
            .collect();
        Self {
            gid,
            kind,
            name: None,
            state: false,
            position,
            inputs,
            outputs,
        }
    }

    /// The gate's stable id within its circuit.
    pub fn gid(&self) -> GateId {
        self.gid
    }

    /// The gate's kind, fixed at creation.
    pub fn kind(&self) -> GateKind {
        self.kind
    }

    /// The display name, if one was given. Meaningful for sources.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Sets the display name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// The latched boolean state. Meaningful for sources; `false` otherwise.
    pub fn state(&self) -> bool {
        self.state
    }

    /// The gate's position on the canvas.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Moves the gate. Positions carry no circuit semantics.
    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    /// Addresses input pin `index` of this gate.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below the kind's input arity.
    pub fn input(&self, index: usize) -> PinAddr {
        assert!(
            index < self.inputs.len(),
            "gate g{} ({}) has no input {}",
            self.gid,
            self.kind,
            index
        );
        PinAddr::input(self.gid, index)
    }

    /// Addresses output pin `index` of this gate.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below the kind's output arity.
    pub fn output(&self, index: usize) -> PinAddr {
        assert!(
            index < self.outputs.len(),
            "gate g{} ({}) has no output {}",
            self.gid,
            self.kind,
            index
        );
        PinAddr::output(self.gid, index)
    }

    /// The gate's input pins, in index order.
    pub fn input_pins(&self) -> &[Pin] {
        &self.inputs
    }

    /// The gate's output pins, in index order.
    pub fn output_pins(&self) -> &[Pin] {
        &self.outputs
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "g{} ({} \"{name}\")", self.gid, self.kind),
            None => write!(f, "g{} ({})", self.gid, self.kind),
        }
    }
}

/// A directed connection from an output pin to an input pin, stored as
/// plain pin addresses. The cached value mirrors the source pin after the
/// last propagation pass.
#[derive(Debug, Clone)]
pub struct Wire {
    src: PinAddr,
    dst: PinAddr,
    value: Ternary,
}

impl Wire {
    /// The driving output pin.
    pub fn src(&self) -> PinAddr {
        self.src
    }

    /// The driven input pin.
    pub fn dst(&self) -> PinAddr {
        self.dst
    }

    /// The signal carried after the last propagation pass.
    pub fn value(&self) -> Ternary {
        self.value
    }
}

/// A wiring attempt rejected before any mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidConnection {
    /// The proposed source end is not an output pin.
    #[error("a wire must start at an output pin, got {0}")]
    SourceNotAnOutput(PinAddr),
    /// The proposed destination end is not an input pin.
    #[error("a wire must end at an input pin, got {0}")]
    DestinationNotAnInput(PinAddr),
    /// An endpoint names a gate or pin index that is not in the circuit.
    #[error("no pin {0} in the circuit")]
    DanglingPin(PinAddr),
}

/// A circuit: gates keyed by id, wires keyed by id, and the monotonic id
/// counters. Iteration over either map follows creation order.
///
/// The graph may be cyclic; nothing here forbids wiring a gate back into
/// itself. [Circuit::simulate] tolerates cycles.
#[derive(Debug, Clone)]
pub struct Circuit {
    gates: BTreeMap<GateId, Gate>,
    wires: BTreeMap<WireId, Wire>,
    next_gid: GateId,
    next_wid: WireId,
    /// Cached evaluation order; [None] after any structural edit.
    order: Option<Vec<GateId>>,
}

impl Circuit {
    /// Creates an empty circuit. Gate ids restart at 1.
    pub fn new() -> Self {
        Self {
            gates: BTreeMap::new(),
            wires: BTreeMap::new(),
            next_gid: 1,
            next_wid: 1,
            order: None,
        }
    }

    fn alloc_gid(&mut self) -> GateId {
        let gid = self.next_gid;
        self.next_gid += 1;
        gid
    }

    /// Adds a gate of `kind` at `position`, returning its fresh id.
    pub fn add_gate(&mut self, kind: GateKind, position: Position) -> GateId {
        let gid = self.alloc_gid();
        self.gates.insert(gid, Gate::new(gid, kind, position));
        self.order = None;
        gid
    }

    /// Adds a named [GateKind::Source] gate.
    pub fn add_source(&mut self, name: impl Into<String>, position: Position) -> GateId {
        let gid = self.alloc_gid();
        let mut gate = Gate::new(gid, GateKind::Source, position);
        gate.name = Some(name.into());
        self.gates.insert(gid, gate);
        self.order = None;
        gid
    }

    /// Connects an output pin to an input pin.
    ///
    /// Both endpoints are validated before anything is mutated. An input
    /// pin that already has a driver keeps its old wire: the two coexist in
    /// the wire list, and the newest one wins during propagation. Removing
    /// the stale wire is the caller's decision.
    pub fn add_wire(&mut self, src: PinAddr, dst: PinAddr) -> Result<WireId, InvalidConnection> {
        if src.role != PinRole::Output {
            return Err(InvalidConnection::SourceNotAnOutput(src));
        }
        if dst.role != PinRole::Input {
            return Err(InvalidConnection::DestinationNotAnInput(dst));
        }
        self.pin(src).ok_or(InvalidConnection::DanglingPin(src))?;
        self.pin(dst).ok_or(InvalidConnection::DanglingPin(dst))?;
        let wid = self.next_wid;
        self.next_wid += 1;
        self.wires.insert(
            wid,
            Wire {
                src,
                dst,
                value: Ternary::Unknown,
            },
        );
        self.order = None;
        Ok(wid)
    }

    /// Removes a gate and, first, every wire touching one of its pins.
    pub fn remove_gate(&mut self, gid: GateId) -> Option<Gate> {
        let gate = self.gates.remove(&gid)?;
        self.wires
            .retain(|_, wire| wire.src.gate != gid && wire.dst.gate != gid);
        self.order = None;
        Some(gate)
    }

    /// Detaches a single wire. Gates are untouched.
    pub fn remove_wire(&mut self, wid: WireId) -> Option<Wire> {
        let wire = self.wires.remove(&wid)?;
        self.order = None;
        Some(wire)
    }

    /// Flips a source gate's state, returning the new state.
    ///
    /// Returns [None] when `gid` is missing or not a source. The caller is
    /// expected to re-run [Circuit::simulate] afterwards.
    pub fn toggle_source(&mut self, gid: GateId) -> Option<bool> {
        let gate = self.gates.get_mut(&gid)?;
        if gate.kind != GateKind::Source {
            return None;
        }
        gate.state = !gate.state;
        Some(gate.state)
    }

    /// Looks up a gate by id.
    pub fn gate(&self, gid: GateId) -> Option<&Gate> {
        self.gates.get(&gid)
    }

    /// Looks up a gate by id for mutation of its non-structural fields
    /// (name, state, position).
    pub fn gate_mut(&mut self, gid: GateId) -> Option<&mut Gate> {
        self.gates.get_mut(&gid)
    }

    /// Looks up a wire by id.
    pub fn wire(&self, wid: WireId) -> Option<&Wire> {
        self.wires.get(&wid)
    }

    /// Iterates over the gates in id (creation) order.
    pub fn gates(&self) -> impl Iterator<Item = &Gate> {
        self.gates.values()
    }

    /// Iterates over the wires in id (creation) order, which is also the
    /// propagation order of [Circuit::simulate].
    pub fn wires(&self) -> impl Iterator<Item = (WireId, &Wire)> {
        self.wires.iter().map(|(wid, wire)| (*wid, wire))
    }

    /// Iterates over the source gates in id order.
    pub fn sources(&self) -> impl Iterator<Item = &Gate> {
        self.gates
            .values()
            .filter(|gate| gate.kind == GateKind::Source)
    }

    /// Iterates over the sink gates in id order.
    pub fn sinks(&self) -> impl Iterator<Item = &Gate> {
        self.gates
            .values()
            .filter(|gate| gate.kind == GateKind::Sink)
    }

    /// The number of gates.
    pub fn gate_count(&self) -> usize {
        self.gates.len()
    }

    /// The number of wires.
    pub fn wire_count(&self) -> usize {
        self.wires.len()
    }

    /// Looks up a pin by address.
    pub fn pin(&self, addr: PinAddr) -> Option<&Pin> {
        let gate = self.gates.get(&addr.gate)?;
        let pins = match addr.role {
            PinRole::Input => &gate.inputs,
            PinRole::Output => &gate.outputs,
        };
        pins.get(addr.index)
    }

    /// The value on a pin, if the pin exists.
    pub fn pin_value(&self, addr: PinAddr) -> Option<Ternary> {
        self.pin(addr).map(Pin::value)
    }

    /// Display labels for the source gates, in id order: the gate's own
    /// name when set, else the positional fallback A, B, C, …
    pub fn input_labels(&self) -> Vec<(GateId, String)> {
        self.sources()
            .enumerate()
            .map(|(position, gate)| {
                let label = gate
                    .name
                    .clone()
                    .unwrap_or_else(|| crate::util::ordinal_name(position));
                (gate.gid, label)
            })
            .collect()
    }

    /// The cached gate evaluation order, recomputed lazily after a
    /// structural edit.
    ///
    /// Gates caught in a wiring cycle are absent from the order; callers
    /// must tolerate the partial result (see [EvalOrder]).
    pub fn eval_order(&mut self) -> &[GateId] {
        if self.order.is_none() {
            self.order = Some(EvalOrder::build(self).into_order());
        }
        self.order.as_deref().expect("order just computed")
    }

    /// Constructs an analysis of the circuit's current state.
    pub fn get_analysis<A: Analysis>(&self) -> A {
        A::build(self)
    }

    pub(crate) fn pin_mut(&mut self, addr: PinAddr) -> Option<&mut Pin> {
        let gate = self.gates.get_mut(&addr.gate)?;
        let pins = match addr.role {
            PinRole::Input => &mut gate.inputs,
            PinRole::Output => &mut gate.outputs,
        };
        pins.get_mut(addr.index)
    }

    /// Writes `value` to a pin, reporting whether the pin changed.
    pub(crate) fn set_pin_value(&mut self, addr: PinAddr, value: Ternary) -> bool {
        match self.pin_mut(addr) {
            Some(pin) if pin.value != value => {
                pin.value = value;
                true
            }
            _ => false,
        }
    }

    /// Writes `value` to a wire's cache, reporting whether it changed.
    pub(crate) fn set_wire_value(&mut self, wid: WireId, value: Ternary) -> bool {
        match self.wires.get_mut(&wid) {
            Some(wire) if wire.value != value => {
                wire.value = value;
                true
            }
            _ => false,
        }
    }

    /// Snapshot of every wire's id and endpoints, in propagation order.
    pub(crate) fn wire_endpoints(&self) -> Vec<(WireId, PinAddr, PinAddr)> {
        self.wires
            .iter()
            .map(|(wid, wire)| (*wid, wire.src, wire.dst))
            .collect()
    }

    /// Resets every pin to [Ternary::Unknown].
    pub(crate) fn reset_pins(&mut self) {
        for gate in self.gates.values_mut() {
            for pin in gate.inputs.iter_mut().chain(gate.outputs.iter_mut()) {
                pin.value = Ternary::Unknown;
            }
        }
    }
}

impl Default for Circuit {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "circuit {{")?;
        for gate in self.gates.values() {
            write!(f, "  g{}: {}", gate.gid, gate.kind)?;
            if let Some(name) = &gate.name {
                write!(f, " \"{name}\"")?;
            }
            if gate.kind == GateKind::Source {
                write!(f, " = {}", u8::from(gate.state))?;
            }
            writeln!(f)?;
        }
        for (wid, wire) in &self.wires {
            writeln!(f, "  w{}: {} -> {}", wid, wire.src, wire.dst)?;
        }
        writeln!(f, "}}")
    }
}

#[test]
fn test_remove_gate_removes_wires() {
    let mut circuit = Circuit::new();
    let a = circuit.add_source("a", Position::default());
    let b = circuit.add_source("b", Position::default());
    let and = circuit.add_gate(GateKind::And, Position::default());
    circuit
        .add_wire(PinAddr::output(a, 0), PinAddr::input(and, 0))
        .unwrap();
    circuit
        .add_wire(PinAddr::output(b, 0), PinAddr::input(and, 1))
        .unwrap();

    circuit.remove_gate(and);
    assert_eq!(circuit.wire_count(), 0);
    assert_eq!(circuit.gate_count(), 2);
}

#[cfg(feature = "serde")]
/// Save and load support for circuits
pub mod serde {
    use super::{Circuit, Gate, Wire};
    use crate::circuit::{GateId, GateKind, PinAddr, PinRole, Position, Ternary};
    use ::serde::{Deserialize, Serialize};
    use thiserror::Error;

    /// A gate as it appears in the saved file. Only sources carry a state
    /// and a name.
    #[derive(Debug, Serialize, Deserialize)]
    struct SavedGate {
        gid: GateId,
        kind: GateKind,
        x: f32,
        y: f32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        state: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    }

    /// A wire as it appears in the saved file: endpoints by gate id and
    /// pin index, never by value.
    #[derive(Debug, Serialize, Deserialize)]
    struct SavedWire {
        src_gate: GateId,
        src_pin: usize,
        dst_gate: GateId,
        dst_pin: usize,
    }

    /// The persisted form of a [Circuit].
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SavedCircuit {
        gates: Vec<SavedGate>,
        wires: Vec<SavedWire>,
        next_gid: GateId,
    }

    /// A saved circuit that cannot be reconstructed.
    #[derive(Debug, Error)]
    pub enum LoadError {
        /// The input is not valid JSON for the saved shape.
        #[error(transparent)]
        Json(#[from] serde_json::Error),
        /// A wire endpoint names a gate absent from the file.
        #[error("wire endpoint references unknown gate g{0}")]
        UnknownGate(GateId),
        /// A wire endpoint names a pin index beyond the gate's arity.
        #[error("gate g{0} has no pin {1} on the wired side")]
        BadPinIndex(GateId, usize),
        /// Two saved gates share an id.
        #[error("duplicate gate id g{0} in saved circuit")]
        DuplicateGate(GateId),
    }

    impl From<&Circuit> for SavedCircuit {
        fn from(circuit: &Circuit) -> Self {
            let gates = circuit
                .gates
                .values()
                .map(|gate| SavedGate {
                    gid: gate.gid,
                    kind: gate.kind,
                    x: gate.position.x,
                    y: gate.position.y,
                    state: (gate.kind == GateKind::Source).then_some(gate.state),
                    name: if gate.kind == GateKind::Source {
                        gate.name.clone()
                    } else {
                        None
                    },
                })
                .collect();
            let wires = circuit
                .wires
                .values()
                .map(|wire| SavedWire {
                    src_gate: wire.src.gate,
                    src_pin: wire.src.index,
                    dst_gate: wire.dst.gate,
                    dst_pin: wire.dst.index,
                })
                .collect();
            SavedCircuit {
                gates,
                wires,
                next_gid: circuit.next_gid,
            }
        }
    }

    impl SavedCircuit {
        /// Rebuilds the live circuit, rewiring pins strictly by index, and
        /// simulates it once so every pin value is defined on return.
        pub fn into_circuit(self) -> Result<Circuit, LoadError> {
            let mut circuit = Circuit::new();
            for saved in self.gates {
                let mut gate = Gate::new(saved.gid, saved.kind, Position::new(saved.x, saved.y));
                if saved.kind == GateKind::Source {
                    gate.state = saved.state.unwrap_or(false);
                    gate.name = saved.name;
                }
                if circuit.gates.insert(saved.gid, gate).is_some() {
                    return Err(LoadError::DuplicateGate(saved.gid));
                }
            }
            for saved in self.wires {
                let src = checked_pin(&circuit, saved.src_gate, PinRole::Output, saved.src_pin)?;
                let dst = checked_pin(&circuit, saved.dst_gate, PinRole::Input, saved.dst_pin)?;
                let wid = circuit.next_wid;
                circuit.next_wid += 1;
                circuit.wires.insert(
                    wid,
                    Wire {
                        src,
                        dst,
                        value: Ternary::Unknown,
                    },
                );
            }
            // a stale saved counter must never hand out a live gid again
            let after_last = circuit.gates.keys().last().map_or(1, |gid| gid + 1);
            circuit.next_gid = self.next_gid.max(after_last);
            circuit.simulate();
            Ok(circuit)
        }
    }

    fn checked_pin(
        circuit: &Circuit,
        gid: GateId,
        role: PinRole,
        index: usize,
    ) -> Result<PinAddr, LoadError> {
        let gate = circuit.gates.get(&gid).ok_or(LoadError::UnknownGate(gid))?;
        let arity = match role {
            PinRole::Input => gate.inputs.len(),
            PinRole::Output => gate.outputs.len(),
        };
        if index >= arity {
            return Err(LoadError::BadPinIndex(gid, index));
        }
        Ok(PinAddr { gate: gid, role, index })
    }

    /// Writes the circuit to `writer` as pretty-printed JSON.
    pub fn save(circuit: &Circuit, writer: impl std::io::Write) -> Result<(), serde_json::Error> {
        let saved = SavedCircuit::from(circuit);
        serde_json::to_writer_pretty(writer, &saved)
    }

    /// Reads a circuit written by [save] and simulates it once.
    pub fn load(reader: impl std::io::Read) -> Result<Circuit, LoadError> {
        let saved: SavedCircuit = serde_json::from_reader(reader)?;
        saved.into_circuit()
    }
}
