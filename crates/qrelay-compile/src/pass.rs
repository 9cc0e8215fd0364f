//! The compilation pass trait.

use qrelay_ir::Circuit;

use crate::error::CompileResult;
use crate::property::PropertySet;

/// A compilation pass.
///
/// Passes rewrite the circuit in place and may read or update the shared
/// [`PropertySet`]; the layout pass records the layout that routing then
/// keeps current.
pub trait Pass: Send + Sync {
    /// Get the name of this pass.
    fn name(&self) -> &str;

    /// Run the pass on the given circuit.
    fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()>;

    /// Check if this pass should run based on current state.
    fn should_run(&self, _circuit: &Circuit, _properties: &PropertySet) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestPass;

    impl Pass for TestPass {
        fn name(&self) -> &'static str {
            "test"
        }

        fn run(&self, _circuit: &mut Circuit, _properties: &mut PropertySet) -> CompileResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_default_should_run() {
        let pass = TestPass;
        assert_eq!(pass.name(), "test");
        assert!(pass.should_run(&Circuit::new("c"), &PropertySet::new()));
    }
}
