//! Concurrency tests for the endorser connection cache.

use std::collections::HashSet;
use std::sync::Arc;

use endorser_gateway::endorser::ConnectionCache;
use endorser_gateway::GatewayError;

mod common;
use common::CountingDialer;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_first_access_dials_once() {
    let dialer = CountingDialer::default();
    let cache = Arc::new(ConnectionCache::new(vec!["10.0.0.1:37101".into()], dialer.clone()));

    let mut tasks = Vec::new();
    for _ in 0..50 {
        let cache = cache.clone();
        tasks.push(tokio::spawn(async move {
            cache.get_connection("10.0.0.1:37101").await.unwrap()
        }));
    }

    let mut conns = Vec::new();
    for task in tasks {
        conns.push(task.await.unwrap());
    }

    assert_eq!(dialer.count(), 1);
    assert_eq!(cache.connection_count(), 1);
    assert!(conns.iter().all(|c| Arc::ptr_eq(c, &conns[0])));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn random_hosts_dial_at_most_once_each() {
    let hosts: Vec<String> = vec!["a:1".into(), "b:2".into(), "c:3".into()];
    let dialer = CountingDialer::default();
    let cache = Arc::new(ConnectionCache::new(hosts.clone(), dialer.clone()));

    let mut tasks = Vec::new();
    for _ in 0..200 {
        let cache = cache.clone();
        tasks.push(tokio::spawn(async move {
            let host = cache.select_host().unwrap();
            cache.get_connection(&host).await.unwrap()
        }));
    }

    let mut seen = HashSet::new();
    for task in tasks {
        seen.insert(task.await.unwrap().to_string());
    }

    assert!(dialer.count() <= 3);
    assert_eq!(dialer.count(), cache.connection_count());
    assert!(seen.iter().all(|h| hosts.contains(h)));
}

#[tokio::test]
async fn empty_host_is_rejected_without_dialing() {
    let dialer = CountingDialer::default();
    let cache = ConnectionCache::new(vec![], dialer.clone());

    assert_eq!(cache.select_host(), None);
    assert!(matches!(cache.get_connection("").await, Err(GatewayError::EmptyHost)));
    assert_eq!(dialer.count(), 0);
}
