/*!

  Analyses over the circuit graph: driver lookup, evaluation order, and
  the traversal order behind truth-table columns.

*/

use crate::circuit::GateId;
#[cfg(feature = "graph")]
use crate::circuit::WireId;
use crate::netlist::Circuit;
#[cfg(feature = "graph")]
use petgraph::graph::DiGraph;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

/// A read-only analysis computed from the current state of a circuit.
/// An analysis becomes stale when the circuit is modified.
pub trait Analysis {
    /// Construct the analysis from the current state of the circuit.
    fn build(circuit: &Circuit) -> Self;
}

/// Maps each wired input pin to the output pin driving it.
///
/// When several wires share a destination, the newest wire wins, matching
/// the propagation order of [Circuit::simulate].
pub struct DriverTable {
    drivers: HashMap<(GateId, usize), (GateId, usize)>,
}

impl DriverTable {
    /// Returns the `(gate, output index)` driving input `index` of `gid`,
    /// or [None] for an unconnected input.
    pub fn driver(&self, gid: GateId, index: usize) -> Option<(GateId, usize)> {
        self.drivers.get(&(gid, index)).copied()
    }

    /// The number of driven input pins.
    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    /// Returns `true` if no input pin is driven.
    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }
}

impl Analysis for DriverTable {
    fn build(circuit: &Circuit) -> Self {
        let mut drivers = HashMap::new();
        for (_, wire) in circuit.wires() {
            drivers.insert(
                (wire.dst().gate, wire.dst().index),
                (wire.src().gate, wire.src().index),
            );
        }
        Self { drivers }
    }
}

/// A linear evaluation order over the acyclic part of the circuit.
///
/// Kahn's algorithm over the wire-induced gate adjacency: repeatedly take a
/// gate with no unprocessed drivers, append it, release its successors.
/// Gates inside a wiring cycle never reach in-degree zero and are left out,
/// so the order is a linear extension of the acyclic subgraph only; callers
/// must not assume it covers every gate.
pub struct EvalOrder {
    order: Vec<GateId>,
    total: usize,
}

impl EvalOrder {
    /// The ordered gate ids.
    pub fn as_slice(&self) -> &[GateId] {
        &self.order
    }

    /// Returns `true` if at least one gate was shut out by a cycle.
    pub fn has_cycle(&self) -> bool {
        self.order.len() < self.total
    }

    /// Consumes the analysis, keeping only the ordered ids.
    pub fn into_order(self) -> Vec<GateId> {
        self.order
    }
}

impl Analysis for EvalOrder {
    fn build(circuit: &Circuit) -> Self {
        let mut indegree: BTreeMap<GateId, usize> =
            circuit.gates().map(|gate| (gate.gid(), 0)).collect();
        let mut successors: HashMap<GateId, Vec<GateId>> = HashMap::new();
        for (_, wire) in circuit.wires() {
            let entry = indegree
                .get_mut(&wire.dst().gate)
                .expect("wire destination gate is in the circuit");
            *entry += 1;
            successors
                .entry(wire.src().gate)
                .or_default()
                .push(wire.dst().gate);
        }

        let total = indegree.len();
        let mut queue: VecDeque<GateId> = indegree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(gid, _)| *gid)
            .collect();
        let mut order = Vec::with_capacity(total);
        while let Some(gid) = queue.pop_front() {
            order.push(gid);
            let Some(next) = successors.get(&gid) else {
                continue;
            };
            for &successor in next {
                let degree = indegree
                    .get_mut(&successor)
                    .expect("wire destination gate is in the circuit");
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(successor);
                }
            }
        }

        Self { order, total }
    }
}

/// Dependencies-first traversal order over every gate reachable backward
/// from a sink.
///
/// Each reachable gate appears exactly once, after the gates feeding it;
/// a gate revisited along a cycle is skipped rather than re-entered. The
/// truth-table enumerator reads its column order from here.
pub struct DepthFirstOrder {
    order: Vec<GateId>,
}

impl DepthFirstOrder {
    /// The ordered gate ids.
    pub fn as_slice(&self) -> &[GateId] {
        &self.order
    }
}

impl Analysis for DepthFirstOrder {
    fn build(circuit: &Circuit) -> Self {
        let drivers = DriverTable::build(circuit);
        let mut visited = HashSet::new();
        let mut order = Vec::new();
        let sinks: Vec<GateId> = circuit.sinks().map(|gate| gate.gid()).collect();
        for sink in sinks {
            visit(circuit, &drivers, sink, &mut visited, &mut order);
        }
        Self { order }
    }
}

fn visit(
    circuit: &Circuit,
    drivers: &DriverTable,
    gid: GateId,
    visited: &mut HashSet<GateId>,
    order: &mut Vec<GateId>,
) {
    if !visited.insert(gid) {
        return;
    }
    let Some(gate) = circuit.gate(gid) else {
        return;
    };
    for index in 0..gate.kind().input_count() {
        if let Some((src, _)) = drivers.driver(gid, index) {
            visit(circuit, drivers, src, visited, order);
        }
    }
    order.push(gid);
}

/// The circuit as a petgraph directed multi-graph, for external tooling.
/// Node weights are gate ids, edge weights wire ids.
#[cfg(feature = "graph")]
pub struct CircuitGraph {
    graph: DiGraph<GateId, WireId>,
}

#[cfg(feature = "graph")]
impl CircuitGraph {
    /// Return a reference to the graph constructed by this analysis
    pub fn get_graph(&self) -> &DiGraph<GateId, WireId> {
        &self.graph
    }
}

#[cfg(feature = "graph")]
impl Analysis for CircuitGraph {
    fn build(circuit: &Circuit) -> Self {
        let mut mapping = HashMap::new();
        let mut graph = DiGraph::new();

        for gate in circuit.gates() {
            let id = graph.add_node(gate.gid());
            mapping.insert(gate.gid(), id);
        }

        for (wid, wire) in circuit.wires() {
            let s_id = mapping[&wire.src().gate];
            let t_id = mapping[&wire.dst().gate];
            graph.add_edge(s_id, t_id, wid);
        }

        Self { graph }
    }
}
