// ==========================================
// 经销数据看板 - 内容哈希缓存
// ==========================================
// 职责: 以上传内容的 SHA-256 为键缓存规范化结果（导入 + 规范化只做一次）
// 红线: 容量有界（默认 2），超出时淘汰最久未使用的条目；键只取决于字节内容，与文件名无关
// ==========================================

use sha2::{Digest, Sha256};
use std::collections::VecDeque;
use tracing::debug;

/// 内容哈希（小写十六进制）
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// 有界 LRU 缓存（队尾 = 最近使用）
#[derive(Debug, Clone)]
pub struct ContentCache<V> {
    capacity: usize,
    entries: VecDeque<(String, V)>,
}

impl<V> ContentCache<V> {
    /// 容量为 0 时按 1 处理
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// 只读查看，不改变使用顺序
    pub fn peek(&self, key: &str) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// 命中时提升为最近使用
    pub fn get(&mut self, key: &str) -> Option<&V> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        if let Some(entry) = self.entries.remove(pos) {
            self.entries.push_back(entry);
        }
        self.entries.back().map(|(_, v)| v)
    }

    /// 写入并返回被淘汰的键
    pub fn insert(&mut self, key: String, value: V) -> Option<String> {
        if let Some(pos) = self.entries.iter().position(|(k, _)| *k == key) {
            self.entries.remove(pos);
        }
        self.entries.push_back((key, value));

        if self.entries.len() > self.capacity {
            let evicted = self.entries.pop_front().map(|(k, _)| k);
            if let Some(k) = &evicted {
                debug!(key = %k, capacity = self.capacity, "缓存淘汰");
            }
            evicted
        } else {
            None
        }
    }

    /// 按内容取值，未命中时用 build 计算并写入
    ///
    /// # 返回
    /// (值, 是否命中)
    pub fn get_or_insert_with<F>(&mut self, bytes: &[u8], build: F) -> (&V, bool)
    where
        F: FnOnce() -> V,
    {
        let key = content_hash(bytes);
        let hit = match self.entries.iter().position(|(k, _)| *k == key) {
            Some(pos) => {
                if let Some(entry) = self.entries.remove(pos) {
                    self.entries.push_back(entry);
                }
                debug!(key = %key, "缓存命中");
                true
            }
            None => {
                self.insert(key, build());
                false
            }
        };
        // 目标条目总在队尾（容量 >= 1，刚写入的条目不会被淘汰）
        let last = self.entries.len() - 1;
        (&self.entries[last].1, hit)
    }

    /// 最近使用顺序（旧 → 新）的键
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
