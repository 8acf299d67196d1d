//! LocalStorage 封装模块
//!
//! `KeyValueStore` 抽象出持久化存储，会话存储和活动日志只依赖该 trait；
//! 浏览器实现使用 `web_sys::Storage`，测试使用内存实现。

use crate::error::StorageError;

/// 同步键值存储
pub trait KeyValueStore {
    /// 键不存在或读取失败时返回 `None`
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// 删除不存在的键不视为错误
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// 浏览器 `window.localStorage`
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStorage;

impl BrowserStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok()?
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let storage = Self::storage().ok_or(StorageError::Unavailable)?;
        // 配额不足时 setItem 会抛出 QuotaExceededError
        storage
            .set_item(key, value)
            .map_err(|_| StorageError::WriteRejected(key.to_string()))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let storage = Self::storage().ok_or(StorageError::Unavailable)?;
        storage
            .remove_item(key)
            .map_err(|_| StorageError::WriteRejected(key.to_string()))
    }
}

/// 内存存储，可模拟写入失败
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: std::cell::RefCell<std::collections::HashMap<String, String>>,
    fail_writes: std::cell::Cell<bool>,
}

#[cfg(test)]
impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: &[(&str, &str)]) -> Self {
        let storage = Self::new();
        for (k, v) in items {
            storage
                .items
                .borrow_mut()
                .insert(k.to_string(), v.to_string());
        }
        storage
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.items.borrow().contains_key(key)
    }
}

#[cfg(test)]
impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.get() {
            return Err(StorageError::WriteRejected(key.to_string()));
        }
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

// 测试共享的 Rc<MemoryStorage> 可直接作为存储注入
#[cfg(test)]
impl KeyValueStore for std::rc::Rc<MemoryStorage> {
    fn get(&self, key: &str) -> Option<String> {
        self.as_ref().get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.as_ref().set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.as_ref().remove(key)
    }
}
