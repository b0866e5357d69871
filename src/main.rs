use std::env;
use std::sync::Arc;

use d_ring::KvNode;
use d_ring::KvStateMachine;
use d_ring::LoopbackProposer;
use d_ring::NodeConfig;
use d_ring::Result;
use d_ring::WriteRoute;
use tracing::error;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;

/// Prints the replica set of every `key` argument. A `key=value` argument is
/// also written when this node owns the key.
fn main() -> Result<()> {
    init_observability();

    let config = NodeConfig::new()?.validate()?;
    let state_machine = Arc::new(KvStateMachine::new(config.cluster.node_id.clone()));
    let node = KvNode::from_config(
        &config,
        state_machine.clone(),
        LoopbackProposer::new(state_machine),
    )?;

    for arg in env::args().skip(1) {
        let (key, value) = match arg.split_once('=') {
            Some((key, value)) => (key, Some(value)),
            None => (arg.as_str(), None),
        };

        match node.placement(key) {
            Ok(placement) => println!("{placement}"),
            Err(e) => {
                error!("No placement for key {}: {}", key, e);
                continue;
            }
        }

        if let Some(value) = value {
            match node.submit_set(key, value) {
                Ok(WriteRoute::Submitted) => info!("Stored {} locally", key),
                Ok(WriteRoute::Forward { node_id, address }) => info!(
                    "Key {} belongs to {} at {}",
                    key,
                    node_id,
                    address.as_deref().unwrap_or("unknown address")
                ),
                Err(e) => error!("Write of {} failed: {}", key, e),
            }
        }
    }

    Ok(())
}

fn init_observability() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let base_subscriber = tracing_subscriber::fmt::layer().with_target(false).with_filter(filter);
    tracing_subscriber::registry().with(base_subscriber).init();
}
