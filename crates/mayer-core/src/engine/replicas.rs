use super::cluster::ClusterValue;
use super::sampling::{MayerSampler, SamplerSummary, TrialMove};
use super::trial::TrialError;
use tracing::{info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Runs `run` on every replica, in parallel when the `parallel` feature is enabled.
///
/// Replicas share nothing, so each owns its whole geometry cache, cluster and protocol.
/// Results come back in replica order.
#[instrument(skip_all, name = "replica_run", fields(replicas = replicas.len()))]
pub fn run_replicas<T, R, F>(replicas: Vec<T>, run: F) -> Vec<R>
where
    T: Send,
    R: Send,
    F: Fn(usize, T) -> R + Sync + Send,
{
    #[cfg(not(feature = "parallel"))]
    let results: Vec<R> = replicas
        .into_iter()
        .enumerate()
        .map(|(idx, replica)| run(idx, replica))
        .collect();

    #[cfg(feature = "parallel")]
    let results: Vec<R> = replicas
        .into_par_iter()
        .enumerate()
        .map(|(idx, replica)| run(idx, replica))
        .collect();

    info!(completed = results.len(), "Replica run finished.");
    results
}

/// Advances every sampler by `steps` and hands each back with its block summary.
pub fn sample_replicas<C, M>(
    samplers: Vec<MayerSampler<C, M>>,
    steps: u64,
) -> Vec<(MayerSampler<C, M>, Result<SamplerSummary, TrialError>)>
where
    C: ClusterValue,
    M: TrialMove + Send,
{
    run_replicas(samplers, |_, mut sampler| {
        let summary = sampler.run(steps);
        (sampler, summary)
    })
}
