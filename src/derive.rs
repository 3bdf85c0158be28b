/*!

  Symbolic boolean expressions read back from circuit wiring.

  The walk runs backward from a pin through the wire map. Sources are the
  leaves; every other gate wraps its operands in the symbolic form of its
  kind, parenthesizing an operand only when it binds more loosely than the
  wrapping operator. Negated forms render with a combining overline, so
  `!A` comes out as `A̅` and a NOR as the overlined disjunction.

*/

use crate::circuit::{GateId, GateKind, PinAddr, PinRole};
use crate::graph::{Analysis, DriverTable};
use crate::netlist::Circuit;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Shown for an input pin with no incoming wire.
pub const UNCONNECTED: &str = "Ø";

/// Shown when the walk re-enters a gate it is still expanding, i.e. the
/// wiring is cyclic under this pin.
pub const INDETERMINATE: &str = "?";

// Binding levels, loosest to tightest. Atoms and overlined forms never
// need parentheses; the cycle placeholder always takes them.
const OR_LEVEL: u8 = 1;
const XOR_LEVEL: u8 = 2;
const AND_LEVEL: u8 = 3;
const ATOM_LEVEL: u8 = 4;
const CYCLE_LEVEL: u8 = 0;

/// Wraps every character of `s` with a combining overline.
fn overline(s: &str) -> String {
    s.chars().flat_map(|c| [c, '\u{0305}']).collect()
}

/// The expression feeding one pin.
///
/// For an output pin this is the expression its gate computes; for an
/// input pin, the expression arriving over the incoming wire, or
/// [UNCONNECTED] when nothing is wired in.
pub fn expression(circuit: &Circuit, pin: PinAddr) -> String {
    let drivers = DriverTable::build(circuit);
    let labels: HashMap<GateId, String> = circuit.input_labels().into_iter().collect();
    let mut walk = Walk {
        circuit,
        drivers: &drivers,
        labels: &labels,
        visiting: HashSet::new(),
        memo: HashMap::new(),
    };
    match pin.role {
        PinRole::Output => walk.gate_expression(pin.gate).0,
        PinRole::Input => match drivers.driver(pin.gate, pin.index) {
            Some((src, _)) => walk.gate_expression(src).0,
            None => UNCONNECTED.to_string(),
        },
    }
}

/// One derived expression per sink gate, keyed by the sink's id. Shared
/// sub-circuits are expanded once and reused across sinks.
pub fn expressions(circuit: &Circuit) -> BTreeMap<GateId, String> {
    let drivers = DriverTable::build(circuit);
    let labels: HashMap<GateId, String> = circuit.input_labels().into_iter().collect();
    let mut walk = Walk {
        circuit,
        drivers: &drivers,
        labels: &labels,
        visiting: HashSet::new(),
        memo: HashMap::new(),
    };
    circuit
        .sinks()
        .map(|sink| {
            let text = match drivers.driver(sink.gid(), 0) {
                Some((src, _)) => walk.gate_expression(src).0,
                None => UNCONNECTED.to_string(),
            };
            (sink.gid(), text)
        })
        .collect()
}

/// Expressions for a batch of gate outputs, sharing one walk so common
/// sub-expressions are derived once.
pub(crate) fn batch_expressions(circuit: &Circuit, gids: &[GateId]) -> Vec<String> {
    let drivers = DriverTable::build(circuit);
    let labels: HashMap<GateId, String> = circuit.input_labels().into_iter().collect();
    let mut walk = Walk {
        circuit,
        drivers: &drivers,
        labels: &labels,
        visiting: HashSet::new(),
        memo: HashMap::new(),
    };
    gids.iter()
        .map(|gid| walk.gate_expression(*gid).0)
        .collect()
}

struct Walk<'a> {
    circuit: &'a Circuit,
    drivers: &'a DriverTable,
    labels: &'a HashMap<GateId, String>,
    /// Gates still being expanded further up the stack
    visiting: HashSet<GateId>,
    memo: HashMap<GateId, (String, u8)>,
}

impl Walk<'_> {
    /// The symbolic expression on the output of `gid`, with its binding
    /// level. Cycle re-entries yield the placeholder and are not memoized.
    fn gate_expression(&mut self, gid: GateId) -> (String, u8) {
        if let Some(hit) = self.memo.get(&gid) {
            return hit.clone();
        }
        if !self.visiting.insert(gid) {
            return (INDETERMINATE.to_string(), CYCLE_LEVEL);
        }

        let entry = match self.circuit.gate(gid).map(|gate| gate.kind()) {
            None => (INDETERMINATE.to_string(), CYCLE_LEVEL),
            Some(GateKind::Source) => {
                let label = self
                    .labels
                    .get(&gid)
                    .cloned()
                    .unwrap_or_else(|| INDETERMINATE.to_string());
                (label, ATOM_LEVEL)
            }
            Some(GateKind::Sink) => self.operand(gid, 0),
            Some(GateKind::Not) => {
                let (a, level) = self.operand(gid, 0);
                let a = parenthesize(a, level, ATOM_LEVEL);
                (overline(&a), ATOM_LEVEL)
            }
            Some(GateKind::And) => {
                let (a, pa) = self.operand(gid, 0);
                let (b, pb) = self.operand(gid, 1);
                let a = parenthesize(a, pa, AND_LEVEL);
                let b = parenthesize(b, pb, AND_LEVEL);
                (format!("{a}.{b}"), AND_LEVEL)
            }
            Some(GateKind::Xor) => {
                let (a, pa) = self.operand(gid, 0);
                let (b, pb) = self.operand(gid, 1);
                let a = parenthesize(a, pa, XOR_LEVEL);
                let b = parenthesize(b, pb, XOR_LEVEL);
                (format!("{a} ⊕ {b}"), XOR_LEVEL)
            }
            Some(GateKind::Or) => {
                let (a, pa) = self.operand(gid, 0);
                let (b, pb) = self.operand(gid, 1);
                let a = parenthesize(a, pa, OR_LEVEL);
                let b = parenthesize(b, pb, OR_LEVEL);
                (format!("{a} + {b}"), OR_LEVEL)
            }
            Some(GateKind::Nor) => {
                let (a, pa) = self.operand(gid, 0);
                let (b, pb) = self.operand(gid, 1);
                let mut inner = format!("{a} + {b}");
                if pa < OR_LEVEL || pb < OR_LEVEL {
                    inner = format!("({inner})");
                }
                (overline(&inner), ATOM_LEVEL)
            }
        };

        self.visiting.remove(&gid);
        self.memo.insert(gid, entry.clone());
        entry
    }

    /// The expression arriving at input `index` of `gid`.
    fn operand(&mut self, gid: GateId, index: usize) -> (String, u8) {
        match self.drivers.driver(gid, index) {
            Some((src, _)) => self.gate_expression(src),
            None => (UNCONNECTED.to_string(), ATOM_LEVEL),
        }
    }
}

fn parenthesize(text: String, level: u8, wrapping: u8) -> String {
    if level < wrapping {
        format!("({text})")
    } else {
        text
    }
}
