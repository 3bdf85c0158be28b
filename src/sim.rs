/*!

  The fixed-point signal propagation engine.

*/

use crate::circuit::{GateId, PinAddr, Ternary};
use crate::graph::{Analysis, DriverTable};
use crate::netlist::Circuit;
use log::{debug, trace};
use std::collections::HashSet;

/// Relaxation passes to run before giving up on an oscillating circuit.
pub const SETTLE_PASSES: usize = 30;

impl Circuit {
    /// Recomputes every pin and wire value in place.
    ///
    /// Every pin is reset to [Ternary::Unknown], every source output is
    /// seeded from its state, and then wires and gates relax until a full
    /// pass changes nothing, capped at [SETTLE_PASSES] passes. Each pass
    /// first carries every wire's source value to its destination pin,
    /// then recomputes the gates along the cached evaluation order —
    /// pulling each gate's inputs through its incoming wires right before
    /// computing, so the gate outputs of an acyclic circuit cross the
    /// whole depth in a single pass.
    ///
    /// Gates shut out of the order by a wiring cycle are evaluated after
    /// it, in id order. A circuit with a combinational cycle either
    /// stabilizes or is left holding whatever the final pass produced;
    /// this is never an error.
    pub fn simulate(&mut self) {
        self.reset_pins();

        let seeds: Vec<(GateId, bool)> = self
            .sources()
            .map(|gate| (gate.gid(), gate.state()))
            .collect();
        for (gid, state) in seeds {
            self.set_pin_value(PinAddr::output(gid, 0), Ternary::known(state));
        }

        let mut order = self.eval_order().to_vec();
        let placed: HashSet<GateId> = order.iter().copied().collect();
        order.extend(
            self.gates()
                .map(|gate| gate.gid())
                .filter(|gid| !placed.contains(gid)),
        );
        let kinds: Vec<_> = order
            .iter()
            .filter_map(|gid| self.gate(*gid).map(|gate| (*gid, gate.kind())))
            .filter(|(_, kind)| !kind.is_terminal())
            .collect();

        let wires = self.wire_endpoints();
        let drivers = DriverTable::build(self);

        for pass in 1..=SETTLE_PASSES {
            let mut changed = false;

            // wires carry their source value forward
            for &(wid, src, dst) in &wires {
                let value = self.pin_value(src).unwrap_or_default();
                changed |= self.set_wire_value(wid, value);
                changed |= self.set_pin_value(dst, value);
            }

            // gates recompute along the evaluation order
            for &(gid, kind) in &kinds {
                let mut inputs = [Ternary::Unknown; 2];
                for (index, slot) in inputs.iter_mut().take(kind.input_count()).enumerate() {
                    if let Some((src, src_index)) = drivers.driver(gid, index) {
                        let value = self
                            .pin_value(PinAddr::output(src, src_index))
                            .unwrap_or_default();
                        changed |= self.set_pin_value(PinAddr::input(gid, index), value);
                    }
                    *slot = self
                        .pin_value(PinAddr::input(gid, index))
                        .unwrap_or_default();
                }
                let output = kind.eval(&inputs[..kind.input_count()]);
                changed |= self.set_pin_value(PinAddr::output(gid, 0), output);
            }

            trace!("pass {pass}: changed = {changed}");
            if !changed {
                debug!("settled after {pass} passes");
                return;
            }
        }

        debug!("no fixed point within {SETTLE_PASSES} passes, keeping last values");
    }
}
