//! # Cache 模块
//!
//! 按场景缓存转换好的订单表。
//!
//! ## 设计说明
//!
//! - 缓存键是 [`SceneKey`]，值是 `Arc<OrderTable>`：同一场景
//!   反复进入（回想模式、读档）不重复拉取与转换
//! - 不做容量管理：一部作品的场景数有限，由宿主在恰当时机
//!   [`invalidate`](TableCache::invalidate) 或 [`clear`](TableCache::clear)

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use super::{SceneDataConverter, SceneDataSource, SceneKey};
use crate::error::StoryResult;
use crate::table::OrderTable;

/// 订单表缓存
pub struct TableCache {
    source: Arc<dyn SceneDataSource>,
    tables: Mutex<HashMap<SceneKey, Arc<OrderTable>>>,
}

impl TableCache {
    /// 包装一个数据源
    pub fn new(source: Arc<dyn SceneDataSource>) -> Self {
        Self {
            source,
            tables: Mutex::new(HashMap::new()),
        }
    }

    /// 取出场景的订单表，必要时从数据源拉取并转换
    pub async fn get_or_load(&self, key: SceneKey) -> StoryResult<Arc<OrderTable>> {
        {
            let tables = self.tables.lock().await;
            if let Some(table) = tables.get(&key) {
                debug!(target: "story::dataset", ?key, "命中订单表缓存");
                return Ok(table.clone());
            }
        }

        debug!(target: "story::dataset", ?key, "拉取并转换场景数据");
        let sheet = self.source.fetch_scene(key).await?;
        let table = Arc::new(SceneDataConverter::convert_sheet(&sheet)?);

        let mut tables = self.tables.lock().await;
        Ok(tables.entry(key).or_insert(table).clone())
    }

    /// 废弃单个场景的缓存
    pub async fn invalidate(&self, key: SceneKey) {
        self.tables.lock().await.remove(&key);
    }

    /// 清空全部缓存
    pub async fn clear(&self) {
        self.tables.lock().await.clear();
    }
}

impl std::fmt::Debug for TableCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableCache").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{RawSheet, StorySceneMeta};
    use crate::error::DataSourceError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        fetches: AtomicUsize,
    }

    #[async_trait]
    impl SceneDataSource for CountingSource {
        async fn fetch_scene(&self, key: SceneKey) -> Result<RawSheet, DataSourceError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if key.scene_id < 0 {
                return Err(DataSourceError::new("场景不存在"));
            }
            Ok(RawSheet {
                header: vec!["OrderType".to_string(), "SequenceType".to_string()],
                rows: vec![
                    vec!["Start".to_string(), "Append".to_string()],
                    vec!["End".to_string(), "Append".to_string()],
                ],
            })
        }

        async fn fetch_meta(&self, key: SceneKey) -> Result<StorySceneMeta, DataSourceError> {
            Ok(StorySceneMeta {
                key,
                ..Default::default()
            })
        }
    }

    fn counting_cache() -> (Arc<CountingSource>, TableCache) {
        let source = Arc::new(CountingSource {
            fetches: AtomicUsize::new(0),
        });
        (source.clone(), TableCache::new(source))
    }

    fn key(scene_id: i32) -> SceneKey {
        SceneKey {
            part_id: 1,
            chapter_id: 1,
            scene_id,
        }
    }

    #[tokio::test]
    async fn test_second_load_hits_cache() {
        let (source, cache) = counting_cache();

        let first = cache.get_or_load(key(1)).await.unwrap();
        let second = cache.get_or_load(key(1)).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
        assert_eq!(first.len(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_reload() {
        let (source, cache) = counting_cache();

        let first = cache.get_or_load(key(1)).await.unwrap();
        cache.invalidate(key(1)).await;
        let second = cache.get_or_load(key(1)).await.unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_source_error_propagates() {
        let (_, cache) = counting_cache();
        assert!(cache.get_or_load(key(-1)).await.is_err());
    }
}
