//! Built-in compilation passes.

mod decompose;
mod layout;
mod routing;
mod translation;

pub use decompose::Decompose;
pub use layout::TrivialLayout;
pub use routing::BasicRouting;
pub use translation::BasisTranslation;

use qrelay_ir::{Gate, Instruction, QubitId, StandardGate};

/// Build a gate instruction that inherits the condition of `source`.
pub(crate) fn derived_gate(
    source: &Gate,
    gate: StandardGate,
    qubits: impl IntoIterator<Item = QubitId>,
) -> Instruction {
    let mut g = Gate::standard(gate);
    g.condition.clone_from(&source.condition);
    Instruction::gate(g, qubits)
}
