//! Pass manager for orchestrating compilation.

use qrelay_ir::Circuit;
use tracing::{debug, info, instrument};

use crate::error::{CompileError, CompileResult};
use crate::pass::Pass;
use crate::passes::{BasicRouting, BasisTranslation, Decompose, TrivialLayout};
use crate::property::{PropertySet, Target};

/// Manages and executes a sequence of compilation passes.
pub struct PassManager {
    /// The passes to execute, in order.
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    /// Create a new empty pass manager.
    pub fn new() -> Self {
        Self { passes: vec![] }
    }

    /// Add a pass to the manager.
    pub fn add_pass(&mut self, pass: impl Pass + 'static) {
        self.passes.push(Box::new(pass));
    }

    /// Run all passes on the given circuit.
    #[instrument(skip_all, fields(circuit = circuit.name()))]
    pub fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()> {
        info!(
            "Running pass manager with {} passes on circuit with {} qubits",
            self.passes.len(),
            circuit.num_qubits()
        );

        for pass in &self.passes {
            if pass.should_run(circuit, properties) {
                debug!("Running pass: {}", pass.name());
                pass.run(circuit, properties)?;
                debug!("Pass {} completed, ops: {}", pass.name(), circuit.num_ops());
            } else {
                debug!("Skipping pass: {}", pass.name());
            }
        }

        info!(
            "Pass manager completed, final depth: {}, ops: {}",
            circuit.depth(),
            circuit.num_ops()
        );

        Ok(())
    }

    /// Get the number of passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Check if the manager has no passes.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for the standard pipeline.
pub struct PassManagerBuilder {
    properties: PropertySet,
}

impl PassManagerBuilder {
    /// Create a new builder with no target.
    pub fn new() -> Self {
        Self {
            properties: PropertySet::new(),
        }
    }

    /// Compile for the given target.
    #[must_use]
    pub fn with_target(mut self, target: &Target) -> Self {
        self.properties = PropertySet::new().with_target(target);
        self
    }

    /// Build the pass manager and return it with the properties.
    pub fn build(self) -> (PassManager, PropertySet) {
        let mut pm = PassManager::new();

        pm.add_pass(Decompose);

        if self.properties.coupling_map.is_some() {
            pm.add_pass(TrivialLayout);
            pm.add_pass(BasicRouting);
        }

        if self.properties.basis_gates.is_some() {
            pm.add_pass(BasisTranslation);
        }

        (pm, self.properties)
    }
}

impl Default for PassManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Rewrite a circuit so that it runs on `target`.
///
/// The input is left untouched. Classical bits keep their meaning, so
/// outcome strings of the result read the same as those of the input.
pub fn transpile(circuit: &Circuit, target: &Target) -> CompileResult<Circuit> {
    if circuit.num_qubits() > target.num_qubits() as usize {
        return Err(CompileError::CircuitTooLarge {
            required: circuit.num_qubits(),
            available: target.num_qubits(),
        });
    }

    debug!("Transpiling '{}' for target {}", circuit.name(), target.name());
    let (pm, mut properties) = PassManagerBuilder::new().with_target(target).build();
    let mut compiled = circuit.clone();
    pm.run(&mut compiled, &mut properties)?;
    Ok(compiled)
}
