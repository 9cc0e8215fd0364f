//! Backends command implementation.

use anyhow::Result;
use console::style;
use qrelay_adapter_sim::builtin_registry;
use qrelay_hal::BackendRegistry;

/// Execute the backends command.
pub async fn execute() -> Result<()> {
    let registry = builtin_registry()?;
    print!("{}", describe(&registry)?);
    Ok(())
}

/// One block per backend, grouped by namespace.
pub fn describe(registry: &BackendRegistry) -> Result<String> {
    let mut out = format!("{} Available backends:\n", style("qrelay").cyan().bold());
    let mut namespace = None;

    for entry in registry.entries() {
        if namespace.as_deref() != Some(entry.namespace.as_str()) {
            out.push_str(&format!("\n  {} {}:\n", style("─").dim(), entry.namespace));
            namespace = Some(entry.namespace.clone());
        }

        let backend = registry.create(&entry.name)?;
        let target = backend.target();
        let connectivity = match target.coupling_map() {
            Some(map) => format!("{} couplings", map.edges().len()),
            None => "all-to-all".to_string(),
        };

        out.push_str(&format!("  {} {}\n", style("●").green(), style(&entry.name).bold()));
        out.push_str(&format!("    Qubits: {} ({connectivity})\n", target.num_qubits()));
        out.push_str(&format!("    Gates: {}\n", target.basis_gates().gates().join(", ")));
    }
    Ok(out)
}
