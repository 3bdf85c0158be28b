use breadboard::circuit::{GateKind, PinAddr, Position, Ternary};
use breadboard::netlist::Circuit;
use breadboard::{derive, expr, table};

fn half_adder() -> Circuit {
    let mut circuit = Circuit::new();
    let a = circuit.add_source("A", Position::new(0.0, 0.0));
    let b = circuit.add_source("B", Position::new(0.0, 100.0));
    let xor = circuit.add_gate(GateKind::Xor, Position::new(150.0, 0.0));
    let and = circuit.add_gate(GateKind::And, Position::new(150.0, 100.0));
    let sum = circuit.add_gate(GateKind::Sink, Position::new(300.0, 0.0));
    let carry = circuit.add_gate(GateKind::Sink, Position::new(300.0, 100.0));

    for (gate, led) in [(xor, sum), (and, carry)] {
        circuit
            .add_wire(PinAddr::output(a, 0), PinAddr::input(gate, 0))
            .unwrap();
        circuit
            .add_wire(PinAddr::output(b, 0), PinAddr::input(gate, 1))
            .unwrap();
        circuit
            .add_wire(PinAddr::output(gate, 0), PinAddr::input(led, 0))
            .unwrap();
    }

    circuit.simulate();
    circuit
}

fn main() {
    let mut circuit = half_adder();
    print!("{circuit}");

    let a = circuit
        .sources()
        .find(|gate| gate.name() == Some("A"))
        .map(|gate| gate.gid())
        .expect("the half adder has an input A");
    circuit.toggle_source(a);
    circuit.simulate();
    for sink in circuit.sinks() {
        let lit = circuit.pin_value(sink.input(0)) == Some(Ternary::True);
        println!("g{} is {}", sink.gid(), if lit { "lit" } else { "dark" });
    }

    for (sink, expression) in derive::expressions(&circuit) {
        println!("S{sink} = {expression}");
    }
    print!("{}", table::generate(&circuit).expect("both terminals exist"));

    // the same circuit, written as an expression instead of drawn
    let compiled = expr::compile("A ^ B").expect("expression is well-formed");
    print!("{}", table::generate(&compiled).expect("both terminals exist"));
}
