//! Test utilities for spinning up a real Redis instance via testcontainers.

use testcontainers::{
    core::{ContainerPort, WaitFor},
    runners::AsyncRunner,
    ContainerAsync, GenericImage,
};

use crate::RedisStore;

/// Spin up a Redis container and return the container handle + connected
/// store.
///
/// The container is dropped (and stopped) when `ContainerAsync` goes out
/// of scope, so callers must hold it alive for the duration of the test.
pub async fn redis_container() -> (ContainerAsync<GenericImage>, RedisStore) {
    let image = GenericImage::new("redis", "7-alpine")
        .with_exposed_port(ContainerPort::Tcp(6379))
        .with_wait_for(WaitFor::message_on_stdout("Ready to accept connections"));

    let container: ContainerAsync<GenericImage> = image
        .start()
        .await
        .expect("Failed to start Redis container");

    let host_port = container
        .get_host_port_ipv4(6379)
        .await
        .expect("Failed to get Redis host port");

    let url = format!("redis://127.0.0.1:{host_port}");
    let store = RedisStore::connect(&url)
        .await
        .expect("Failed to connect to Redis");

    (container, store)
}
