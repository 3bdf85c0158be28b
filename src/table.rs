/*!

  Truth table enumeration.

*/

use crate::circuit::{GateId, GateKind, Ternary};
use crate::derive;
use crate::graph::{Analysis, DepthFirstOrder, DriverTable};
use crate::netlist::Circuit;
use bitvec::vec::BitVec;
use log::debug;
use std::collections::{HashMap, HashSet};
use std::fmt;
use thiserror::Error;

/// Enumeration ceiling on source gates: 2^8 = 256 rows.
pub const MAX_INPUTS: usize = 8;

/// Why a truth table could not be produced. The circuit is untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TableError {
    /// No source gate to enumerate over.
    #[error("the circuit has no source gate")]
    MissingSources,
    /// No sink gate to observe.
    #[error("the circuit has no sink gate")]
    MissingSinks,
    /// More sources than the enumeration ceiling allows.
    #[error("{0} sources exceed the {MAX_INPUTS}-input ceiling")]
    CapacityExceeded(usize),
}

/// One enumerated assignment and the values it produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Input bits, one per variable, first variable first.
    pub inputs: BitVec,
    /// Intermediate column values followed by output column values.
    pub values: Vec<Ternary>,
}

/// The enumerated behavior of a circuit: one column per input variable,
/// per intermediate gate (headed by its derived expression), and per sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruthTable {
    variables: Vec<String>,
    intermediates: Vec<String>,
    outputs: Vec<String>,
    rows: Vec<Row>,
}

impl TruthTable {
    /// The input variable labels, in source id order.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// The intermediate column headers: one derived expression per
    /// non-terminal gate reachable from a sink, dependencies first.
    pub fn intermediate_columns(&self) -> &[String] {
        &self.intermediates
    }

    /// The output column labels, in sink id order.
    pub fn output_columns(&self) -> &[String] {
        &self.outputs
    }

    /// The enumerated rows, in binary counting order of the inputs.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }
}

/// Enumerates every input assignment and the value of every intermediate
/// and output column.
///
/// Sources and sinks are taken in id order. Rows follow binary counting
/// order with the first variable most significant. Values are computed by
/// walking backward from each column through the wire map, memoized per
/// row; a wiring cycle or an unconnected input reads as
/// [Ternary::Unknown].
pub fn generate(circuit: &Circuit) -> Result<TruthTable, TableError> {
    let sources: Vec<GateId> = circuit.sources().map(|gate| gate.gid()).collect();
    let sinks: Vec<GateId> = circuit.sinks().map(|gate| gate.gid()).collect();
    if sources.is_empty() {
        return Err(TableError::MissingSources);
    }
    if sinks.is_empty() {
        return Err(TableError::MissingSinks);
    }
    if sources.len() > MAX_INPUTS {
        return Err(TableError::CapacityExceeded(sources.len()));
    }

    let variables: Vec<String> = circuit
        .input_labels()
        .into_iter()
        .map(|(_, label)| label)
        .collect();

    let order = DepthFirstOrder::build(circuit);
    let columns: Vec<GateId> = order
        .as_slice()
        .iter()
        .copied()
        .filter(|gid| {
            circuit
                .gate(*gid)
                .is_some_and(|gate| !gate.kind().is_terminal())
        })
        .collect();
    let intermediates = derive::batch_expressions(circuit, &columns);

    let outputs: Vec<String> = if sinks.len() == 1 {
        vec!["S".to_string()]
    } else {
        sinks.iter().map(|gid| format!("S{gid}")).collect()
    };

    let drivers = DriverTable::build(circuit);
    let n = sources.len();
    let mut rows = Vec::with_capacity(1 << n);
    for pattern in 0..(1u32 << n) {
        let mut assignment = HashMap::with_capacity(n);
        let mut inputs = BitVec::with_capacity(n);
        for (position, &gid) in sources.iter().enumerate() {
            let bit = (pattern >> (n - 1 - position)) & 1 == 1;
            assignment.insert(gid, bit);
            inputs.push(bit);
        }

        // one memo per row, shared across every column
        let mut memo: HashMap<GateId, Ternary> = HashMap::new();
        let mut visiting: HashSet<GateId> = HashSet::new();
        let mut values = Vec::with_capacity(columns.len() + sinks.len());
        for &gid in &columns {
            values.push(gate_value(
                circuit,
                &drivers,
                &assignment,
                gid,
                &mut visiting,
                &mut memo,
            ));
        }
        for &sink in &sinks {
            values.push(match drivers.driver(sink, 0) {
                Some((src, _)) => gate_value(
                    circuit,
                    &drivers,
                    &assignment,
                    src,
                    &mut visiting,
                    &mut memo,
                ),
                None => Ternary::Unknown,
            });
        }
        rows.push(Row { inputs, values });
    }

    debug!(
        "enumerated {} rows over {} variables and {} intermediate columns",
        rows.len(),
        n,
        columns.len()
    );
    Ok(TruthTable {
        variables,
        intermediates,
        outputs,
        rows,
    })
}

/// The output value of `gid` under `assignment`, walking backward through
/// the wire map. Re-entering a gate still being evaluated (a cycle) yields
/// [Ternary::Unknown] without memoizing it.
fn gate_value(
    circuit: &Circuit,
    drivers: &DriverTable,
    assignment: &HashMap<GateId, bool>,
    gid: GateId,
    visiting: &mut HashSet<GateId>,
    memo: &mut HashMap<GateId, Ternary>,
) -> Ternary {
    if let Some(&value) = memo.get(&gid) {
        return value;
    }
    if !visiting.insert(gid) {
        return Ternary::Unknown;
    }

    let value = match circuit.gate(gid).map(|gate| gate.kind()) {
        None | Some(GateKind::Sink) => Ternary::Unknown,
        Some(GateKind::Source) => {
            Ternary::known(assignment.get(&gid).copied().unwrap_or(false))
        }
        Some(kind) => {
            let mut inputs = [Ternary::Unknown; 2];
            for (index, slot) in inputs.iter_mut().take(kind.input_count()).enumerate() {
                *slot = match drivers.driver(gid, index) {
                    Some((src, _)) => {
                        gate_value(circuit, drivers, assignment, src, visiting, memo)
                    }
                    None => Ternary::Unknown,
                };
            }
            kind.eval(&inputs[..kind.input_count()])
        }
    };

    visiting.remove(&gid);
    memo.insert(gid, value);
    value
}

impl fmt::Display for TruthTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<&str> = self
            .variables
            .iter()
            .chain(self.intermediates.iter())
            .chain(self.outputs.iter())
            .map(String::as_str)
            .collect();
        let widths: Vec<usize> = headers.iter().map(|h| display_width(h).max(1)).collect();

        for (column, (header, width)) in headers.iter().zip(&widths).enumerate() {
            if column > 0 {
                write!(f, " | ")?;
            }
            pad(f, header, *width)?;
        }
        writeln!(f)?;
        for (column, width) in widths.iter().enumerate() {
            if column > 0 {
                write!(f, "-+-")?;
            }
            write!(f, "{}", "-".repeat(*width))?;
        }
        writeln!(f)?;

        for row in &self.rows {
            let mut column = 0;
            for bit in row.inputs.iter().by_vals() {
                if column > 0 {
                    write!(f, " | ")?;
                }
                pad(f, if bit { "1" } else { "0" }, widths[column])?;
                column += 1;
            }
            for value in &row.values {
                if column > 0 {
                    write!(f, " | ")?;
                }
                pad(f, &value.to_string(), widths[column])?;
                column += 1;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Character count ignoring the combining overlines of negated forms.
fn display_width(text: &str) -> usize {
    text.chars().filter(|c| *c != '\u{0305}').count()
}

fn pad(f: &mut fmt::Formatter<'_>, text: &str, width: usize) -> fmt::Result {
    write!(f, "{text}")?;
    for _ in display_width(text)..width {
        write!(f, " ")?;
    }
    Ok(())
}
