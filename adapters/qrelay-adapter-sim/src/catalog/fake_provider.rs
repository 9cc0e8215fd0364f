//! Snapshot devices with fixed connectivity, the IBM basis and small noise.

use qrelay_compile::{BasisGates, CouplingMap, Target};
use qrelay_hal::{Backend, BackendRegistry, HalResult};

use crate::noise::NoiseProfile;
use crate::simulator::SimulatorBackend;

pub const NAMESPACE: &str = "fake_provider";

/// Static description of a fake device.
#[derive(Debug, Clone, Copy)]
pub struct FakeDevice {
    pub name: &'static str,
    pub num_qubits: u32,
    pub edges: &'static [(u32, u32)],
    pub noise: NoiseProfile,
}

impl FakeDevice {
    pub fn target(&self) -> Target {
        Target::new(self.name, self.num_qubits, BasisGates::ibm())
            .with_coupling_map(CouplingMap::from_edges(self.num_qubits, self.edges))
    }

    pub fn backend(&self) -> SimulatorBackend {
        SimulatorBackend::new(self.target()).with_noise(self.noise)
    }
}

/// Bow-tie.
const EDGES_5Q: &[(u32, u32)] = &[(0, 1), (0, 2), (1, 2), (2, 3), (2, 4), (3, 4)];

/// H-shape.
const EDGES_7Q: &[(u32, u32)] = &[(0, 1), (1, 2), (1, 3), (3, 5), (4, 5), (5, 6)];

/// 4x5 grid with crossed plaquettes.
const EDGES_20Q: &[(u32, u32)] = &[
    (0, 1), (1, 2), (2, 3), (3, 4),
    (0, 5), (1, 6), (1, 7), (2, 6), (2, 7), (3, 8), (3, 9), (4, 8), (4, 9),
    (5, 6), (6, 7), (7, 8), (8, 9),
    (5, 10), (5, 11), (6, 10), (6, 11), (7, 12), (7, 13), (8, 12), (8, 13), (9, 14),
    (10, 11), (11, 12), (12, 13), (13, 14),
    (10, 15), (11, 16), (11, 17), (12, 16), (12, 17), (13, 18), (13, 19), (14, 18), (14, 19),
    (15, 16), (16, 17), (17, 18), (18, 19),
];

/// Heavy-hex.
const EDGES_27Q: &[(u32, u32)] = &[
    (0, 1), (1, 2), (1, 4), (2, 3), (3, 5), (4, 7), (5, 8), (6, 7), (7, 10),
    (8, 9), (8, 11), (10, 12), (11, 14), (12, 13), (12, 15), (13, 14), (14, 16),
    (15, 18), (16, 19), (17, 18), (18, 21), (19, 20), (19, 22), (21, 23), (22, 25),
    (23, 24), (24, 25), (25, 26),
];

pub static DEVICES: [FakeDevice; 4] = [
    FakeDevice {
        name: "Fake5QV1",
        num_qubits: 5,
        edges: EDGES_5Q,
        noise: NoiseProfile {
            single_qubit_error: 1e-3,
            two_qubit_error: 1.5e-2,
            readout_error: 2.5e-2,
        },
    },
    FakeDevice {
        name: "Fake7QPulseV1",
        num_qubits: 7,
        edges: EDGES_7Q,
        noise: NoiseProfile {
            single_qubit_error: 3e-4,
            two_qubit_error: 8e-3,
            readout_error: 2e-2,
        },
    },
    FakeDevice {
        name: "Fake20QV1",
        num_qubits: 20,
        edges: EDGES_20Q,
        noise: NoiseProfile {
            single_qubit_error: 1e-3,
            two_qubit_error: 2e-2,
            readout_error: 4e-2,
        },
    },
    FakeDevice {
        name: "Fake27QPulseV1",
        num_qubits: 27,
        edges: EDGES_27Q,
        noise: NoiseProfile {
            single_qubit_error: 4e-4,
            two_qubit_error: 1e-2,
            readout_error: 2e-2,
        },
    },
];

/// Look a device up by name.
pub fn device(name: &str) -> Option<&'static FakeDevice> {
    DEVICES.iter().find(|d| d.name == name)
}

pub fn register(registry: &mut BackendRegistry) -> HalResult<()> {
    for device in &DEVICES {
        registry.register_factory(NAMESPACE, device.name, move || {
            let boxed: Box<dyn Backend> = Box::new(device.backend());
            Ok(boxed)
        })?;
    }
    Ok(())
}
