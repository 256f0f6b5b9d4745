use std::future::Future;

use futures_util::future::join_all;

/// Probes `candidates` in chunks of `width` and returns the first success in
/// input order.
///
/// Every probe of a chunk is awaited before a winner is picked, so the result
/// never depends on which request finished first. Later chunks are not started
/// once a chunk produced a success. `None` puts every candidate in a single
/// chunk and `Some(1)` is a plain sequential scan.
pub async fn first_success<C, T, F, Fut>(
    candidates: impl IntoIterator<Item = C>,
    width: Option<usize>,
    mut probe: F,
) -> Option<T>
where
    F: FnMut(C) -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let candidates: Vec<C> = candidates.into_iter().collect();
    if candidates.is_empty() {
        return None;
    }
    let width = width.unwrap_or(candidates.len()).max(1);

    let mut candidates = candidates.into_iter().peekable();
    while candidates.peek().is_some() {
        let chunk = candidates.by_ref().take(width).map(&mut probe).collect::<Vec<_>>();
        if let Some(found) = join_all(chunk).await.into_iter().flatten().next() {
            return Some(found);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    use super::*;

    #[tokio::test]
    async fn winner_follows_input_order_not_completion() {
        // The first candidate answers last but still wins
        let found = first_success([30_u64, 1, 5], None, |delay| async move {
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Some(delay)
        })
        .await;

        assert_eq!(found, Some(30));
    }

    #[tokio::test]
    async fn stops_after_first_successful_chunk() {
        let probed = AtomicUsize::new(0);
        let found = first_success(0..10, Some(3), |n| {
            probed.fetch_add(1, Ordering::SeqCst);
            async move { (n >= 4).then_some(n) }
        })
        .await;

        // chunks [0,1,2] and [3,4,5] ran, the rest was never probed
        assert_eq!(found, Some(4));
        assert_eq!(probed.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn exhausted_or_empty_yields_none() {
        let found = first_success(0..7, Some(2), |_| async { None::<u32> }).await;
        assert_eq!(found, None);

        let found = first_success(Vec::<u32>::new(), None, |n| async move { Some(n) }).await;
        assert_eq!(found, None);
    }

    #[tokio::test]
    async fn zero_width_scans_sequentially() {
        let found = first_success(["a", "b"], Some(0), |s| async move { Some(s) }).await;
        assert_eq!(found, Some("a"));
    }
}
