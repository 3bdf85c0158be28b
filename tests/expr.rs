use breadboard::circuit::{GateKind, PinAddr, Ternary};
use breadboard::expr::{self, ParseError};
use breadboard::netlist::Circuit;
use breadboard::{derive, table};

fn count(circuit: &Circuit, kind: GateKind) -> usize {
    circuit.gates().filter(|gate| gate.kind() == kind).count()
}

fn source_names(circuit: &Circuit) -> Vec<String> {
    circuit
        .sources()
        .filter_map(|gate| gate.name().map(str::to_string))
        .collect()
}

#[test]
fn test_compile_and_or() {
    let circuit = expr::compile("A.B + C").unwrap();

    assert_eq!(count(&circuit, GateKind::Source), 3);
    assert_eq!(count(&circuit, GateKind::And), 1);
    assert_eq!(count(&circuit, GateKind::Or), 1);
    assert_eq!(count(&circuit, GateKind::Sink), 1);
    assert_eq!(circuit.gate_count(), 6);
    assert_eq!(circuit.wire_count(), 5);
    assert_eq!(source_names(&circuit), vec!["A", "B", "C"]);
}

#[test]
fn test_compile_single_not() {
    let circuit = expr::compile("!A").unwrap();
    assert_eq!(count(&circuit, GateKind::Source), 1);
    assert_eq!(count(&circuit, GateKind::Not), 1);
    assert_eq!(count(&circuit, GateKind::Sink), 1);
    assert_eq!(circuit.wire_count(), 2);
}

#[test]
fn test_repeated_identifier_reuses_its_source() {
    let circuit = expr::compile("A.A").unwrap();
    assert_eq!(count(&circuit, GateKind::Source), 1);
    // both AND inputs are fed from the same output pin
    let and = circuit
        .gates()
        .find(|gate| gate.kind() == GateKind::And)
        .unwrap()
        .gid();
    let srcs: Vec<_> = circuit
        .wires()
        .filter(|(_, wire)| wire.dst().gate == and)
        .map(|(_, wire)| wire.src())
        .collect();
    assert_eq!(srcs.len(), 2);
    assert_eq!(srcs[0], srcs[1]);
}

#[test]
fn test_compile_simulates_before_returning() {
    let circuit = expr::compile("A + !A").unwrap();
    let led = circuit.sinks().next().unwrap().gid();
    // sources default to false: 0 + !0 = 1
    assert_eq!(
        circuit.pin_value(PinAddr::input(led, 0)),
        Some(Ternary::True)
    );
}

#[test]
fn test_right_operand_lands_a_row_below() {
    let circuit = expr::compile("A + B").unwrap();
    let a = circuit
        .sources()
        .find(|gate| gate.name() == Some("A"))
        .unwrap();
    let b = circuit
        .sources()
        .find(|gate| gate.name() == Some("B"))
        .unwrap();
    assert!(a.position().y < b.position().y);

    // the OR sits at the vertical midpoint of its operands, and the
    // columns advance toward the sink on the right
    let or = circuit
        .gates()
        .find(|gate| gate.kind() == GateKind::Or)
        .unwrap();
    let mid = (a.position().y + b.position().y) / 2.0;
    assert_eq!(or.position().y, mid);
    assert!(a.position().x < or.position().x);

    let led = circuit.sinks().next().unwrap();
    assert!(or.position().x < led.position().x);
}

#[test]
fn test_precedence_shapes_the_graph() {
    // without parens `.` binds before `+`: the OR is the root gate
    let circuit = expr::compile("A.B + C").unwrap();
    let led = circuit.sinks().next().unwrap().gid();
    let (_, to_sink) = circuit
        .wires()
        .find(|(_, wire)| wire.dst().gate == led)
        .unwrap();
    let root = circuit.gate(to_sink.src().gate).unwrap();
    assert_eq!(root.kind(), GateKind::Or);

    let circuit = expr::compile("A.(B + C)").unwrap();
    let led = circuit.sinks().next().unwrap().gid();
    let (_, to_sink) = circuit
        .wires()
        .find(|(_, wire)| wire.dst().gate == led)
        .unwrap();
    let root = circuit.gate(to_sink.src().gate).unwrap();
    assert_eq!(root.kind(), GateKind::And);
}

#[test]
fn test_compile_surfaces_lex_errors() {
    let err = expr::compile("A | B").unwrap_err();
    assert!(matches!(err, ParseError::Lex(_)));

    let err = expr::compile("A ++ B").unwrap_err();
    assert!(matches!(err, ParseError::UnexpectedToken { .. }));
}

#[test]
fn test_simple_round_trips_are_textual() {
    for text in ["A.B + C", "A + B + C", "A.B.C"] {
        let circuit = expr::compile(text).unwrap();
        let derived = derive::expressions(&circuit);
        let led = circuit.sinks().next().unwrap().gid();
        assert_eq!(derived[&led], text);
    }
}

#[test]
fn test_round_trip_preserves_the_truth_table() {
    // `!` has no direct symbolic form on the way back (it renders as an
    // overline), so compare semantics instead of text
    let circuit = expr::compile("!(A + B).C ^ B").unwrap();
    let generated = table::generate(&circuit).unwrap();
    assert_eq!(generated.rows().len(), 8);

    for (index, row) in generated.rows().iter().enumerate() {
        let a = index & 0b100 != 0;
        let b = index & 0b010 != 0;
        let c = index & 0b001 != 0;
        let expected = (!(a || b) && c) != b;
        let s = *row.values.last().unwrap();
        assert_eq!(s, Ternary::known(expected), "row {index}");
        assert_eq!(row.inputs.len(), 3);
    }
}
