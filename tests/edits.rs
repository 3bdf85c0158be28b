use breadboard::circuit::{GateKind, PinAddr, Position, Ternary};
use breadboard::graph::EvalOrder;
use breadboard::netlist::Circuit;

fn get_simple_example() -> Circuit {
    let mut circuit = Circuit::new();

    let a = circuit.add_source("a", Position::default());
    let b = circuit.add_source("b", Position::default());
    let and = circuit.add_gate(GateKind::And, Position::default());
    let led = circuit.add_gate(GateKind::Sink, Position::default());

    circuit
        .add_wire(PinAddr::output(a, 0), PinAddr::input(and, 0))
        .unwrap();
    circuit
        .add_wire(PinAddr::output(b, 0), PinAddr::input(and, 1))
        .unwrap();
    circuit
        .add_wire(PinAddr::output(and, 0), PinAddr::input(led, 0))
        .unwrap();

    circuit
}

#[test]
fn test_remove_gate_removes_touching_wires() {
    let mut circuit = get_simple_example();
    let and = circuit
        .gates()
        .find(|gate| gate.kind() == GateKind::And)
        .unwrap()
        .gid();

    let removed = circuit.remove_gate(and).unwrap();
    assert_eq!(removed.kind(), GateKind::And);
    assert_eq!(circuit.gate_count(), 3);
    assert_eq!(circuit.wire_count(), 0);

    // no surviving wire references the removed gate
    for (_, wire) in circuit.wires() {
        assert_ne!(wire.src().gate, and);
        assert_ne!(wire.dst().gate, and);
    }
}

#[test]
fn test_remove_wire_leaves_gates_alone() {
    let mut circuit = get_simple_example();
    let (wid, _) = circuit.wires().next().unwrap();

    let wire = circuit.remove_wire(wid).unwrap();
    assert_eq!(wire.src().gate, 1);
    assert_eq!(circuit.gate_count(), 4);
    assert_eq!(circuit.wire_count(), 2);
    assert!(circuit.remove_wire(wid).is_none());
}

#[test]
fn test_gids_are_not_reused_after_removal() {
    let mut circuit = get_simple_example();
    let led = circuit.sinks().next().unwrap().gid();
    circuit.remove_gate(led);

    let replacement = circuit.add_gate(GateKind::Sink, Position::default());
    assert!(replacement > led);
}

#[test]
fn test_duplicate_destination_keeps_both_wires() {
    let mut circuit = Circuit::new();
    let a = circuit.add_source("a", Position::default());
    let b = circuit.add_source("b", Position::default());
    let not = circuit.add_gate(GateKind::Not, Position::default());

    circuit
        .add_wire(PinAddr::output(a, 0), PinAddr::input(not, 0))
        .unwrap();
    circuit
        .add_wire(PinAddr::output(b, 0), PinAddr::input(not, 0))
        .unwrap();
    // the stale wire stays in the list; the newest one wins propagation
    assert_eq!(circuit.wire_count(), 2);

    circuit.toggle_source(a);
    circuit.simulate();
    // `a` is overridden by the newer wire, so the output follows `b`
    assert_eq!(
        circuit.pin_value(PinAddr::output(not, 0)),
        Some(Ternary::True)
    );

    circuit.toggle_source(b);
    circuit.simulate();
    assert_eq!(
        circuit.pin_value(PinAddr::output(not, 0)),
        Some(Ternary::False)
    );
}

#[test]
fn test_structural_edits_refresh_the_order() {
    let mut circuit = get_simple_example();
    assert_eq!(circuit.eval_order().len(), 4);

    let not = circuit.add_gate(GateKind::Not, Position::default());
    circuit
        .add_wire(PinAddr::output(not, 0), PinAddr::input(not, 0))
        .unwrap();
    // the self-feeding gate is shut out of the refreshed order
    assert_eq!(circuit.eval_order().len(), 4);
    assert!(!circuit.eval_order().contains(&not));

    let order = circuit.get_analysis::<EvalOrder>();
    assert!(order.has_cycle());
}
