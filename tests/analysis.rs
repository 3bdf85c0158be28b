use breadboard::circuit::{GateId, GateKind, PinAddr, Position};
use breadboard::graph::{DepthFirstOrder, DriverTable, EvalOrder};
use breadboard::netlist::Circuit;

/// A one-bit comparator shaped like a diamond: both gates read the same
/// two sources, and a final OR joins them.
fn diamond() -> (Circuit, [GateId; 6]) {
    let mut circuit = Circuit::new();
    let a = circuit.add_source("a", Position::default());
    let b = circuit.add_source("b", Position::default());
    let and = circuit.add_gate(GateKind::And, Position::default());
    let nor = circuit.add_gate(GateKind::Nor, Position::default());
    let or = circuit.add_gate(GateKind::Or, Position::default());
    let led = circuit.add_gate(GateKind::Sink, Position::default());

    for (gate, (left, right)) in [(and, (a, b)), (nor, (a, b)), (or, (and, nor))] {
        circuit
            .add_wire(PinAddr::output(left, 0), PinAddr::input(gate, 0))
            .unwrap();
        circuit
            .add_wire(PinAddr::output(right, 0), PinAddr::input(gate, 1))
            .unwrap();
    }
    circuit
        .add_wire(PinAddr::output(or, 0), PinAddr::input(led, 0))
        .unwrap();
    (circuit, [a, b, and, nor, or, led])
}

#[test]
fn test_eval_order_is_a_linear_extension() {
    let (circuit, gates) = diamond();
    let order = circuit.get_analysis::<EvalOrder>();
    assert!(!order.has_cycle());
    assert_eq!(order.as_slice().len(), circuit.gate_count());

    let rank = |gid: GateId| {
        order
            .as_slice()
            .iter()
            .position(|g| *g == gid)
            .expect("every gate is ordered")
    };
    let [a, b, and, nor, or, led] = gates;
    for (before, after) in [
        (a, and),
        (b, and),
        (a, nor),
        (b, nor),
        (and, or),
        (nor, or),
        (or, led),
    ] {
        assert!(rank(before) < rank(after), "g{before} before g{after}");
    }
}

#[test]
fn test_eval_order_omits_only_the_cycle() {
    let (mut circuit, gates) = diamond();
    let latch_a = circuit.add_gate(GateKind::Nor, Position::default());
    let latch_b = circuit.add_gate(GateKind::Nor, Position::default());
    circuit
        .add_wire(PinAddr::output(latch_a, 0), PinAddr::input(latch_b, 0))
        .unwrap();
    circuit
        .add_wire(PinAddr::output(latch_b, 0), PinAddr::input(latch_a, 0))
        .unwrap();

    let order = circuit.get_analysis::<EvalOrder>();
    assert!(order.has_cycle());
    assert_eq!(order.as_slice().len(), gates.len());
    assert!(!order.as_slice().contains(&latch_a));
    assert!(!order.as_slice().contains(&latch_b));
}

#[test]
fn test_depth_first_order_visits_dependencies_first() {
    let (circuit, [a, b, and, nor, or, led]) = diamond();
    let order = circuit.get_analysis::<DepthFirstOrder>();
    // shared sources appear once, ahead of everything they feed
    assert_eq!(order.as_slice(), [a, b, and, nor, or, led]);
}

#[test]
fn test_driver_table_resolves_wired_inputs() {
    let (circuit, [a, b, and, _, or, led]) = diamond();
    let drivers = circuit.get_analysis::<DriverTable>();

    assert_eq!(drivers.driver(and, 0), Some((a, 0)));
    assert_eq!(drivers.driver(and, 1), Some((b, 0)));
    assert_eq!(drivers.driver(led, 0), Some((or, 0)));
    assert_eq!(drivers.driver(a, 0), None);
    assert!(!drivers.is_empty());
    assert_eq!(drivers.len(), 7);
}

#[cfg(feature = "graph")]
mod graph_export {
    use super::*;
    use breadboard::graph::CircuitGraph;

    #[test]
    fn test_petgraph_export_matches_the_circuit() {
        let (circuit, _) = diamond();
        let analysis = circuit.get_analysis::<CircuitGraph>();
        let graph = analysis.get_graph();
        assert_eq!(graph.node_count(), circuit.gate_count());
        assert_eq!(graph.edge_count(), circuit.wire_count());
        assert!(petgraph::algo::toposort(graph, None).is_ok());
    }
}
