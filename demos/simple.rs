use breadboard::circuit::{GateKind, PinAddr, Position, Ternary};
use breadboard::netlist::Circuit;

fn main() {
    let mut circuit = Circuit::new();

    // Two toggleable inputs into an AND gate, observed by a sink
    let a = circuit.add_source("A", Position::new(0.0, 0.0));
    let b = circuit.add_source("B", Position::new(0.0, 100.0));
    let and = circuit.add_gate(GateKind::And, Position::new(150.0, 50.0));
    let led = circuit.add_gate(GateKind::Sink, Position::new(300.0, 50.0));

    circuit
        .add_wire(PinAddr::output(a, 0), PinAddr::input(and, 0))
        .unwrap();
    circuit
        .add_wire(PinAddr::output(b, 0), PinAddr::input(and, 1))
        .unwrap();
    circuit
        .add_wire(PinAddr::output(and, 0), PinAddr::input(led, 0))
        .unwrap();

    circuit.toggle_source(a);
    circuit.toggle_source(b);
    circuit.simulate();

    assert_eq!(circuit.pin_value(PinAddr::input(led, 0)), Some(Ternary::True));
    print!("{circuit}");
}
