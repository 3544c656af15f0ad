mod common;

use burrow_core::*;
use common::create_test_context;

async fn queue_items(queue: &RedisQueue, priorities: &[i64]) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    for priority in priorities {
        let item = queue
            .push(&generate_item_id(), format!("p{}", priority).as_bytes(), *priority)
            .await?;
        ids.push(item.id);
    }
    Ok(ids)
}

#[tokio::test]
async fn test_unnamed_queue_counts_nothing() -> Result<()> {
    let forum = Forum::new("redis://localhost:6379")?;
    let inspector = Inspector::with_context(forum.queue(""));
    assert_eq!(inspector.count().await?, 0);
    Ok(())
}

#[tokio::test]
#[ignore = "requires a Redis server"]
async fn test_claims_follow_priority() -> Result<()> {
    let context = create_test_context("test_priority");
    let queue = RedisQueue::with_context(context);
    queue_items(&queue, &[5, 0, 0, -1]).await?;

    let mut bodies = Vec::new();
    while let Some(item) = queue.claim_item(None).await? {
        bodies.push(String::from_utf8_lossy(&item.body).to_string());
        queue.delete_item(&item).await?;
    }
    assert_eq!(bodies, vec!["p-1", "p0", "p0", "p5"]);

    queue.delete_queue().await?;
    Ok(())
}

#[tokio::test]
#[ignore = "requires a Redis server"]
async fn test_status_follows_the_item() -> Result<()> {
    let context = create_test_context("test_status");
    let queue = RedisQueue::with_context(context.clone());
    let inspector = Inspector::with_context(context);
    let ids = queue_items(&queue, &[0, 0]).await?;

    assert_eq!(inspector.get_item_status(&ids[0]).await?, ItemStatus::Queued);

    let first = queue.claim_item(None).await?.unwrap();
    assert_eq!(first.id, ids[0]);
    assert_eq!(inspector.get_item_status(&first.id).await?, ItemStatus::Claimed);
    assert_eq!(inspector.count().await?, 1);

    queue.release_item(&first).await?;
    assert_eq!(inspector.get_item_status(&first.id).await?, ItemStatus::Queued);
    assert_eq!(inspector.get_item(&first.id).await?.release_count, 1);

    let again = queue.claim_item(None).await?.unwrap();
    assert_eq!(again.id, first.id);
    queue.reject_item(&again, false).await?;
    assert_eq!(inspector.get_item_status(&again.id).await?, ItemStatus::Rejected);

    let map = inspector.get_status_to_item_ids(ItemFilter::default()).await?;
    assert_eq!(map.queued, vec![ids[1].clone()]);
    assert!(map.claimed.is_empty());
    assert_eq!(map.rejected, vec![ids[0].clone()]);

    let only_rejected = ItemFilter {
        states: Some(vec![ItemStatus::Rejected]),
    };
    let map = inspector.get_status_to_item_ids(only_rejected).await?;
    assert!(map.queued.is_empty());
    assert_eq!(map.rejected.len(), 1);

    assert_eq!(queue.delete_queue().await?, 2);
    Ok(())
}

#[tokio::test]
#[ignore = "requires a Redis server"]
async fn test_bounded_claim_on_empty_queue() -> Result<()> {
    let context = create_test_context("test_bounded");
    let queue = RedisQueue::with_context(context);

    let started = std::time::Instant::now();
    let claimed = queue
        .claim_item(Some(std::time::Duration::from_millis(200)))
        .await?;
    assert!(claimed.is_none());
    assert!(started.elapsed() >= std::time::Duration::from_millis(150));
    Ok(())
}

#[tokio::test]
#[ignore = "requires a Redis server"]
async fn test_shutdown_closes_the_pool() -> Result<()> {
    let context = create_test_context("test_shutdown");
    let queue = RedisQueue::with_context(context.clone());
    queue.create_queue().await?;

    queue.shutdown().await?;
    queue.shutdown().await?;

    assert!(context.forum().is_closed());
    assert!(matches!(
        queue.number_of_items().await.unwrap_err().into_transport(),
        BurrowError::Runtime(_)
    ));
    Ok(())
}
