//! Simulator backend implementation.

use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tracing::{debug, instrument};

use qrelay_compile::Target;
use qrelay_hal::{
    Backend, Counts, ExecutionResult, HalError, HalResult, JobId, JobStatus, RunOptions,
    format_bitstring,
};
use qrelay_ir::{Circuit, InstructionKind, QubitId, StandardGate};

use crate::noise::NoiseProfile;
use crate::statevector::{Statevector, sample_cumulative};

/// Largest number of distinct qubits a circuit may act on.
pub const MAX_ACTIVE_QUBITS: usize = 24;

/// Job data for the simulator.
struct SimJob {
    status: JobStatus,
    result: Option<ExecutionResult>,
}

/// Local statevector simulator.
///
/// Only the qubits a circuit actually touches are simulated, so a small
/// circuit routed onto a wide device stays cheap. Circuits whose
/// measurements are all terminal and which run without noise are simulated
/// once and sampled; everything else runs one trajectory per shot.
pub struct SimulatorBackend {
    target: Target,
    noise: NoiseProfile,
    /// Active jobs.
    jobs: Arc<Mutex<FxHashMap<String, SimJob>>>,
    next_job: AtomicU64,
    seed: Option<u64>,
}

impl SimulatorBackend {
    /// Create a noiseless simulator for `target`.
    pub fn new(target: Target) -> Self {
        Self {
            target,
            noise: NoiseProfile::ideal(),
            jobs: Arc::new(Mutex::new(FxHashMap::default())),
            next_job: AtomicU64::new(0),
            seed: None,
        }
    }

    pub fn with_noise(mut self, noise: NoiseProfile) -> Self {
        self.noise = noise;
        self
    }

    /// Make sampling reproducible. Job `k` uses `seed + k`.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn noise(&self) -> &NoiseProfile {
        &self.noise
    }

    fn rng(&self, job_number: u64) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(job_number)),
            None => StdRng::from_entropy(),
        }
    }

    /// Run simulation synchronously.
    #[instrument(skip(self, program, rng))]
    fn run_simulation(
        &self,
        program: &Program,
        options: &RunOptions,
        rng: &mut StdRng,
    ) -> ExecutionResult {
        let start = Instant::now();
        let sampled = program.terminal_measurements && self.noise.is_ideal();
        debug!(
            "Starting simulation: {} active qubits, {} shots, {}",
            program.num_active,
            options.shots,
            if sampled { "sampled" } else { "per-shot trajectories" }
        );

        let outcomes: Box<dyn Iterator<Item = Vec<bool>> + '_> = if sampled {
            Box::new(program.sample(options.shots, rng))
        } else {
            Box::new((0..options.shots).map(|_| program.trajectory(&self.noise, rng)))
        };

        let mut counts = Counts::new();
        let mut memory = Vec::new();
        for (shot, bits) in outcomes.enumerate() {
            let bitstring = format_bitstring(&bits);
            if options.memory {
                memory.push(bitstring.clone());
            }
            counts.insert(bitstring, 1);

            if shot > 0 && shot % 10_000 == 0 {
                debug!("Completed {} shots", shot);
            }
        }

        let elapsed = start.elapsed();
        debug!("Simulation completed in {:?}", elapsed);

        let result = ExecutionResult::new(counts, options.shots)
            .with_execution_time(elapsed.as_millis() as u64);
        if options.memory {
            result.with_memory(memory)
        } else {
            result
        }
    }
}

#[async_trait]
impl Backend for SimulatorBackend {
    fn name(&self) -> &str {
        self.target.name()
    }

    fn target(&self) -> &Target {
        &self.target
    }

    #[instrument(skip(self, circuit), fields(backend = %self.name()))]
    async fn submit(&self, circuit: &Circuit, options: &RunOptions) -> HalResult<JobId> {
        options.validate()?;
        if circuit.num_qubits() > self.target.num_qubits() as usize {
            return Err(HalError::CircuitTooLarge(format!(
                "Circuit has {} qubits but {} only supports {}",
                circuit.num_qubits(),
                self.name(),
                self.target.num_qubits()
            )));
        }
        let program = Program::compile(circuit)?;

        let number = self.next_job.fetch_add(1, Ordering::Relaxed);
        let job_id = JobId::sequential(self.name(), number);
        {
            let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
            jobs.insert(
                job_id.0.clone(),
                SimJob {
                    status: JobStatus::Running,
                    result: None,
                },
            );
        }
        debug!("Submitted job: {}", job_id);

        let result = self.run_simulation(&program, options, &mut self.rng(number));

        {
            let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(job) = jobs.get_mut(&job_id.0) {
                job.result = Some(result);
                job.status = JobStatus::Completed;
            }
        }

        Ok(job_id)
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        let jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        jobs.get(&job_id.0)
            .map(|j| j.status.clone())
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        let jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        jobs.get(&job_id.0)
            .and_then(|j| j.result.clone())
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        match jobs.get_mut(&job_id.0) {
            Some(job) if job.status.is_pending() => {
                job.status = JobStatus::Cancelled;
                Ok(())
            }
            Some(_) => Ok(()),
            None => Err(HalError::JobNotFound(job_id.0.clone())),
        }
    }
}

// =============================================================================
// Compiled program
// =============================================================================

/// `if (register == value)` resolved to classical bit indices.
#[derive(Debug, Clone)]
struct Condition {
    /// Register bits, element 0 least significant.
    clbits: Vec<usize>,
    value: u64,
}

impl Condition {
    fn holds(&self, bits: &[bool]) -> bool {
        let mut actual: u64 = 0;
        for (k, &clbit) in self.clbits.iter().enumerate() {
            if bits[clbit] {
                if k >= 64 {
                    return false;
                }
                actual |= 1 << k;
            }
        }
        actual == self.value
    }
}

#[derive(Debug, Clone)]
enum Op {
    Gate {
        gate: StandardGate,
        qubits: Vec<usize>,
        condition: Option<Condition>,
    },
    Measure {
        qubit: usize,
        clbit: usize,
    },
    Reset {
        qubit: usize,
    },
}

/// A circuit rewritten onto its active qubits.
#[derive(Debug)]
struct Program {
    num_active: usize,
    num_clbits: usize,
    ops: Vec<Op>,
    /// No reset, no condition, and nothing acts on a qubit after it is measured.
    terminal_measurements: bool,
}

impl Program {
    fn compile(circuit: &Circuit) -> HalResult<Self> {
        let mut active: Vec<u32> = circuit
            .instructions()
            .iter()
            .filter(|inst| !inst.is_barrier())
            .flat_map(|inst| inst.qubits.iter().map(|q| q.0))
            .collect::<FxHashSet<_>>()
            .into_iter()
            .collect();
        active.sort_unstable();

        if active.len() > MAX_ACTIVE_QUBITS {
            return Err(HalError::CircuitTooLarge(format!(
                "Circuit acts on {} qubits, the simulator handles at most {}",
                active.len(),
                MAX_ACTIVE_QUBITS
            )));
        }
        let index: FxHashMap<u32, usize> =
            active.iter().enumerate().map(|(i, &q)| (q, i)).collect();
        let local = |q: &QubitId| index[&q.0];

        let mut ops = Vec::with_capacity(circuit.num_ops());
        for inst in circuit.instructions() {
            match &inst.kind {
                InstructionKind::Gate(gate) => {
                    let condition = match &gate.condition {
                        Some(cond) => {
                            let register = circuit.creg(&cond.register).ok_or_else(|| {
                                HalError::InvalidCircuit(format!(
                                    "condition on unknown register '{}'",
                                    cond.register
                                ))
                            })?;
                            Some(Condition {
                                clbits: register.indices().map(|b| b as usize).collect(),
                                value: cond.value,
                            })
                        }
                        None => None,
                    };
                    ops.push(Op::Gate {
                        gate: gate.kind,
                        qubits: inst.qubits.iter().map(local).collect(),
                        condition,
                    });
                }
                InstructionKind::Measure => {
                    for (q, c) in inst.qubits.iter().zip(&inst.clbits) {
                        ops.push(Op::Measure {
                            qubit: local(q),
                            clbit: c.0 as usize,
                        });
                    }
                }
                InstructionKind::Reset => {
                    for q in &inst.qubits {
                        ops.push(Op::Reset { qubit: local(q) });
                    }
                }
                InstructionKind::Barrier => {}
            }
        }

        let terminal_measurements = Self::measurements_are_terminal(&ops);
        Ok(Self {
            num_active: active.len(),
            num_clbits: circuit.num_clbits(),
            ops,
            terminal_measurements,
        })
    }

    fn measurements_are_terminal(ops: &[Op]) -> bool {
        let mut used_later = FxHashSet::default();
        for op in ops.iter().rev() {
            match op {
                Op::Reset { .. } | Op::Gate { condition: Some(_), .. } => return false,
                Op::Gate { qubits, .. } => used_later.extend(qubits.iter().copied()),
                Op::Measure { qubit, .. } => {
                    if used_later.contains(qubit) {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Simulate once, then draw every shot from the final distribution.
    fn sample<'a>(
        &'a self,
        shots: u32,
        rng: &'a mut StdRng,
    ) -> impl Iterator<Item = Vec<bool>> + 'a {
        let mut sv = Statevector::new(self.num_active);
        let mut measures = Vec::new();
        for op in &self.ops {
            match op {
                Op::Gate { gate, qubits, .. } => sv.apply_gate(*gate, qubits),
                Op::Measure { qubit, clbit } => measures.push((*qubit, *clbit)),
                Op::Reset { .. } => {}
            }
        }
        let cumulative = sv.cumulative_probabilities();

        (0..shots).map(move |_| {
            let outcome = sample_cumulative(&cumulative, rng);
            let mut bits = vec![false; self.num_clbits];
            for &(qubit, clbit) in &measures {
                bits[clbit] = (outcome >> qubit) & 1 == 1;
            }
            bits
        })
    }

    /// One shot with collapse, conditions and noise.
    fn trajectory(&self, noise: &NoiseProfile, rng: &mut StdRng) -> Vec<bool> {
        let mut sv = Statevector::new(self.num_active);
        let mut bits = vec![false; self.num_clbits];
        for op in &self.ops {
            match op {
                Op::Gate {
                    gate,
                    qubits,
                    condition,
                } => {
                    if condition.as_ref().is_none_or(|c| c.holds(&bits)) {
                        sv.apply_gate(*gate, qubits);
                        noise.after_gate(&mut sv, *gate, qubits, rng);
                    }
                }
                Op::Measure { qubit, clbit } => {
                    let bit = sv.measure(*qubit, rng);
                    bits[*clbit] = noise.readout(bit, rng);
                }
                Op::Reset { qubit } => sv.reset(*qubit, rng),
            }
        }
        bits
    }
}
