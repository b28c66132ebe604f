//! Cell definitions for library primitives and module instantiations.
//!
//! A [`Cell`] is either a primitive with a pure boolean [`CellFunction`] and a
//! single output bit, or an instance of another module with its ports bound to
//! bits of the parent. Primitive inputs are stored in the canonical pin order
//! given by [`CellFunction::input_pins`], so evaluation never looks at names.

use crate::ids::{CellId, ModuleId};
use crate::net::BitRef;
use gatewise_common::{Bit, Ident};
use std::fmt;
use std::str::FromStr;

/// Pin names of variadic gates, in operand order.
const GATE_PINS: [&str; 8] = ["A", "B", "C", "D", "E", "F", "G", "H"];

/// Largest input count a variadic gate may declare.
pub const MAX_GATE_INPUTS: usize = GATE_PINS.len();

/// The logic function of a primitive cell type.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum CellFunction {
    /// `Y = A`.
    Buf,
    /// `Y = !A`.
    Not,
    /// AND over all inputs.
    And,
    /// OR over all inputs.
    Or,
    /// XOR (odd parity) over all inputs.
    Xor,
    /// Inverted AND.
    Nand,
    /// Inverted OR.
    Nor,
    /// Inverted XOR.
    Xnor,
    /// `Y = A & !B`.
    AndNot,
    /// `Y = A | !B`.
    OrNot,
    /// `Y = S ? B : A`.
    Mux,
    /// Rising-edge D flip-flop.
    Dff,
    /// Falling-edge D flip-flop.
    DffNeg,
    /// D flip-flop that only loads when `E` is high.
    DffEnable,
    /// D flip-flop that loads `value` when `R` is high.
    DffReset {
        /// The value loaded while reset is asserted.
        value: Bit,
    },
    /// D flip-flop with reset (priority) and enable.
    DffResetEnable {
        /// The value loaded while reset is asserted.
        value: Bit,
    },
}

/// Error returned when a function name in a cell definition is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown cell function '{0}'")]
pub struct ParseCellFunctionError(pub String);

impl CellFunction {
    /// Returns `true` for flip-flops.
    pub fn is_sequential(self) -> bool {
        matches!(
            self,
            CellFunction::Dff
                | CellFunction::DffNeg
                | CellFunction::DffEnable
                | CellFunction::DffReset { .. }
                | CellFunction::DffResetEnable { .. }
        )
    }

    /// Returns `true` for gates whose input count is set by the library entry.
    pub fn is_variadic(self) -> bool {
        self.fixed_arity().is_none()
    }

    /// Returns the input count for functions with a fixed pin set.
    pub fn fixed_arity(self) -> Option<usize> {
        match self {
            CellFunction::Buf | CellFunction::Not => Some(1),
            CellFunction::AndNot | CellFunction::OrNot => Some(2),
            CellFunction::Mux => Some(3),
            CellFunction::Dff | CellFunction::DffNeg => Some(2),
            CellFunction::DffEnable | CellFunction::DffReset { .. } => Some(3),
            CellFunction::DffResetEnable { .. } => Some(4),
            CellFunction::And
            | CellFunction::Or
            | CellFunction::Xor
            | CellFunction::Nand
            | CellFunction::Nor
            | CellFunction::Xnor => None,
        }
    }

    /// Returns the input pin names in canonical order.
    ///
    /// Flip-flops list the clock `C` first, then `D`, then `R` and `E` when
    /// present. `arity` is only consulted for variadic gates and is clamped to
    /// [`MAX_GATE_INPUTS`].
    pub fn input_pins(self, arity: usize) -> Vec<&'static str> {
        match self {
            CellFunction::Buf | CellFunction::Not => vec!["A"],
            CellFunction::AndNot | CellFunction::OrNot => vec!["A", "B"],
            CellFunction::Mux => vec!["A", "B", "S"],
            CellFunction::Dff | CellFunction::DffNeg => vec!["C", "D"],
            CellFunction::DffEnable => vec!["C", "D", "E"],
            CellFunction::DffReset { .. } => vec!["C", "D", "R"],
            CellFunction::DffResetEnable { .. } => vec!["C", "D", "R", "E"],
            _ => GATE_PINS[..arity.min(MAX_GATE_INPUTS)].to_vec(),
        }
    }

    /// Returns the output pin name.
    pub fn output_pin(self) -> &'static str {
        if self.is_sequential() {
            "Q"
        } else {
            "Y"
        }
    }

    /// Evaluates a combinational function over inputs in canonical pin order.
    ///
    /// Flip-flops evaluate to their next state from a zero output; use
    /// [`next_state`](CellFunction::next_state) to account for the held value.
    pub fn eval(self, inputs: &[Bit]) -> Bit {
        let all = |v: Bit| inputs.iter().all(|&b| b == v);
        let parity = || inputs.iter().fold(Bit::Zero, |acc, &b| acc ^ b);
        let pin = |i: usize| inputs.get(i).copied().unwrap_or_default();
        match self {
            CellFunction::Buf => pin(0),
            CellFunction::Not => !pin(0),
            CellFunction::And => Bit::from(all(Bit::One)),
            CellFunction::Or => Bit::from(!all(Bit::Zero)),
            CellFunction::Xor => parity(),
            CellFunction::Nand => Bit::from(!all(Bit::One)),
            CellFunction::Nor => Bit::from(all(Bit::Zero)),
            CellFunction::Xnor => !parity(),
            CellFunction::AndNot => pin(0) & !pin(1),
            CellFunction::OrNot => pin(0) | !pin(1),
            CellFunction::Mux => {
                if pin(2).is_one() {
                    pin(1)
                } else {
                    pin(0)
                }
            }
            _ => self.next_state(inputs, Bit::Zero),
        }
    }

    /// Computes the value a flip-flop holds after an edge.
    ///
    /// `inputs` are in canonical pin order (`C`, `D`, `R`, `E`) and `q` is the
    /// current output. Reset takes priority over enable. Combinational
    /// functions return [`eval`](CellFunction::eval) of their inputs.
    pub fn next_state(self, inputs: &[Bit], q: Bit) -> Bit {
        let pin = |i: usize| inputs.get(i).copied().unwrap_or_default();
        match self {
            CellFunction::Dff | CellFunction::DffNeg => pin(1),
            CellFunction::DffEnable => {
                if pin(2).is_one() {
                    pin(1)
                } else {
                    q
                }
            }
            CellFunction::DffReset { value } => {
                if pin(2).is_one() {
                    value
                } else {
                    pin(1)
                }
            }
            CellFunction::DffResetEnable { value } => {
                if pin(2).is_one() {
                    value
                } else if pin(3).is_one() {
                    pin(1)
                } else {
                    q
                }
            }
            _ => self.eval(inputs),
        }
    }
}

impl FromStr for CellFunction {
    type Err = ParseCellFunctionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let function = match s.to_ascii_lowercase().as_str() {
            "buf" => CellFunction::Buf,
            "not" | "inv" => CellFunction::Not,
            "and" => CellFunction::And,
            "or" => CellFunction::Or,
            "xor" => CellFunction::Xor,
            "nand" => CellFunction::Nand,
            "nor" => CellFunction::Nor,
            "xnor" => CellFunction::Xnor,
            "andnot" => CellFunction::AndNot,
            "ornot" => CellFunction::OrNot,
            "mux" => CellFunction::Mux,
            "dff" => CellFunction::Dff,
            "dff_neg" => CellFunction::DffNeg,
            "dffe" => CellFunction::DffEnable,
            "sdff0" => CellFunction::DffReset { value: Bit::Zero },
            "sdff1" => CellFunction::DffReset { value: Bit::One },
            "sdffe0" => CellFunction::DffResetEnable { value: Bit::Zero },
            "sdffe1" => CellFunction::DffResetEnable { value: Bit::One },
            _ => return Err(ParseCellFunctionError(s.to_string())),
        };
        Ok(function)
    }
}

impl fmt::Display for CellFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CellFunction::Buf => "buf",
            CellFunction::Not => "not",
            CellFunction::And => "and",
            CellFunction::Or => "or",
            CellFunction::Xor => "xor",
            CellFunction::Nand => "nand",
            CellFunction::Nor => "nor",
            CellFunction::Xnor => "xnor",
            CellFunction::AndNot => "andnot",
            CellFunction::OrNot => "ornot",
            CellFunction::Mux => "mux",
            CellFunction::Dff => "dff",
            CellFunction::DffNeg => "dff_neg",
            CellFunction::DffEnable => "dffe",
            CellFunction::DffReset { value: Bit::Zero } => "sdff0",
            CellFunction::DffReset { value: Bit::One } => "sdff1",
            CellFunction::DffResetEnable { value: Bit::Zero } => "sdffe0",
            CellFunction::DffResetEnable { value: Bit::One } => "sdffe1",
        };
        f.write_str(name)
    }
}

/// What a cell is: a library primitive or an instance of another module.
#[derive(Debug, Clone)]
pub enum CellKind {
    /// A library cell with a single output bit.
    Primitive {
        /// The library type name, as written in the netlist (e.g. `$_AND_`).
        cell_type: Ident,
        /// The logic function resolved from the library.
        function: CellFunction,
        /// Input bits in canonical pin order.
        inputs: Vec<BitRef>,
        /// The output bit.
        output: BitRef,
    },
    /// Instantiation of another module.
    Instance {
        /// The module being instantiated.
        module: ModuleId,
        /// Port name to parent bits, in the submodule's port order.
        bindings: Vec<(Ident, Vec<BitRef>)>,
    },
}

/// A cell in a module.
#[derive(Debug, Clone)]
pub struct Cell {
    /// The unique ID of this cell within its module.
    pub id: CellId,
    /// The instance name.
    pub name: Ident,
    /// Primitive or instance.
    pub kind: CellKind,
}

#[cfg(test)]
mod tests {
    use super::*;
    use Bit::{One, Zero};

    fn all_inputs(n: usize) -> Vec<Vec<Bit>> {
        (0..1u32 << n)
            .map(|v| (0..n).map(|i| Bit::from((v >> i) & 1 == 1)).collect())
            .collect()
    }

    #[test]
    fn two_input_truth_tables() {
        for inputs in all_inputs(2) {
            let (a, b) = (inputs[0].is_one(), inputs[1].is_one());
            assert_eq!(CellFunction::And.eval(&inputs), Bit::from(a && b));
            assert_eq!(CellFunction::Or.eval(&inputs), Bit::from(a || b));
            assert_eq!(CellFunction::Xor.eval(&inputs), Bit::from(a != b));
            assert_eq!(CellFunction::Nand.eval(&inputs), Bit::from(!(a && b)));
            assert_eq!(CellFunction::Nor.eval(&inputs), Bit::from(!(a || b)));
            assert_eq!(CellFunction::Xnor.eval(&inputs), Bit::from(a == b));
            assert_eq!(CellFunction::AndNot.eval(&inputs), Bit::from(a && !b));
            assert_eq!(CellFunction::OrNot.eval(&inputs), Bit::from(a || !b));
        }
    }

    #[test]
    fn single_input_gates() {
        assert_eq!(CellFunction::Buf.eval(&[One]), One);
        assert_eq!(CellFunction::Buf.eval(&[Zero]), Zero);
        assert_eq!(CellFunction::Not.eval(&[One]), Zero);
        assert_eq!(CellFunction::Not.eval(&[Zero]), One);
    }

    #[test]
    fn three_input_variadic_gates() {
        for inputs in all_inputs(3) {
            let ones = inputs.iter().filter(|b| b.is_one()).count();
            assert_eq!(CellFunction::And.eval(&inputs), Bit::from(ones == 3));
            assert_eq!(CellFunction::Nor.eval(&inputs), Bit::from(ones == 0));
            assert_eq!(CellFunction::Xor.eval(&inputs), Bit::from(ones % 2 == 1));
        }
    }

    #[test]
    fn mux_selects_b_when_s_high() {
        for inputs in all_inputs(3) {
            let expected = if inputs[2].is_one() { inputs[1] } else { inputs[0] };
            assert_eq!(CellFunction::Mux.eval(&inputs), expected);
        }
    }

    #[test]
    fn dff_next_state_is_d() {
        assert_eq!(CellFunction::Dff.next_state(&[Zero, One], Zero), One);
        assert_eq!(CellFunction::Dff.next_state(&[Zero, Zero], One), Zero);
    }

    #[test]
    fn enable_holds_when_low() {
        let f = CellFunction::DffEnable;
        assert_eq!(f.next_state(&[Zero, Zero, Zero], One), One);
        assert_eq!(f.next_state(&[Zero, Zero, One], One), Zero);
    }

    #[test]
    fn reset_has_priority_over_enable() {
        let f = CellFunction::DffResetEnable { value: One };
        assert_eq!(f.next_state(&[Zero, Zero, One, One], Zero), One);
        assert_eq!(f.next_state(&[Zero, Zero, One, Zero], Zero), One);
        assert_eq!(f.next_state(&[Zero, Zero, Zero, Zero], One), One);
        assert_eq!(f.next_state(&[Zero, Zero, Zero, One], One), Zero);
    }

    #[test]
    fn sync_reset_loads_value() {
        let f = CellFunction::DffReset { value: Zero };
        assert_eq!(f.next_state(&[Zero, One, One], One), Zero);
        assert_eq!(f.next_state(&[Zero, One, Zero], Zero), One);
    }

    #[test]
    fn pins_follow_function() {
        assert_eq!(CellFunction::And.input_pins(3), vec!["A", "B", "C"]);
        assert_eq!(CellFunction::Mux.input_pins(0), vec!["A", "B", "S"]);
        assert_eq!(
            CellFunction::DffResetEnable { value: Zero }.input_pins(0),
            vec!["C", "D", "R", "E"]
        );
        assert_eq!(CellFunction::Dff.output_pin(), "Q");
        assert_eq!(CellFunction::Nand.output_pin(), "Y");
    }

    #[test]
    fn sequential_classification() {
        assert!(CellFunction::Dff.is_sequential());
        assert!(CellFunction::DffReset { value: One }.is_sequential());
        assert!(!CellFunction::Mux.is_sequential());
        assert!(CellFunction::Xor.is_variadic());
        assert!(!CellFunction::Not.is_variadic());
    }

    #[test]
    fn parse_and_display_agree() {
        for name in [
            "buf", "not", "and", "or", "xor", "nand", "nor", "xnor", "andnot", "ornot", "mux",
            "dff", "dff_neg", "dffe", "sdff0", "sdff1", "sdffe0", "sdffe1",
        ] {
            let f: CellFunction = name.parse().unwrap();
            assert_eq!(f.to_string(), name);
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("NAND".parse::<CellFunction>(), Ok(CellFunction::Nand));
        assert_eq!("Inv".parse::<CellFunction>(), Ok(CellFunction::Not));
    }

    #[test]
    fn parse_unknown_function() {
        let err = "latch".parse::<CellFunction>().unwrap_err();
        assert_eq!(err.to_string(), "unknown cell function 'latch'");
    }
}
