/// Read-through caching over [`Cache`](crate::db::Cache).
///
/// On a hit the cached value is returned. On a miss `$block` is awaited,
/// its value is queued for a background write with `$ttl` seconds to live,
/// and then returned. Errors from the lookup or the block propagate with `?`.
/// The expansion evaluates to `Ok(value)`, so use it as the tail expression of
/// a function returning `AppResult`.
///
/// # Example
/// ```rust,ignore
/// async fn stats(cache: &Cache, engine: &DecisionEngine, user_id: Uuid) -> AppResult<UserStats> {
///     let key = CacheKey::UserStats { user_id, generation: 0 };
///     cached!(cache, key, 300, engine.get_user_stats(user_id))
/// }
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        if let Some(cached) = $cache.get_from_cache(&$key).await? {
            tracing::debug!(key = %$key, "Cache hit");
            Ok(cached)
        } else {
            let value = $block.await?;
            $cache.set_in_background(&$key, &value, $ttl);
            Ok(value)
        }
    }};
}
