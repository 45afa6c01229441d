pub mod pool;
pub mod sweep;

pub use pool::WorkerPool;
pub use sweep::{run_seed_sweep, run_seed_sweep_on, run_seed_sweep_parallel};
