//! 选题策略
//!
//! 从一个分值桶中挑出若干道题的下标，同一次挑选内不会重复

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// 选题策略
pub trait SelectionStrategy {
    /// 从长度为 `available` 的桶中挑出 `count` 个互不相同的下标
    ///
    /// 调用方保证 `count <= available`
    fn pick(&mut self, available: usize, count: usize) -> Vec<usize>;

    /// 策略名称（用于日志）
    fn name(&self) -> &'static str;
}

/// 按存储顺序取前 N 道，多次调用结果完全相同
#[derive(Debug, Clone, Copy, Default)]
pub struct InOrder;

impl SelectionStrategy for InOrder {
    fn pick(&mut self, available: usize, count: usize) -> Vec<usize> {
        (0..count.min(available)).collect()
    }

    fn name(&self) -> &'static str {
        "in-order"
    }
}

/// 不放回随机抽样
///
/// 随机源由调用方注入，固定种子时结果可复现
#[derive(Debug, Clone)]
pub struct Shuffled<R: Rng> {
    rng: R,
}

impl<R: Rng> Shuffled<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl Shuffled<StdRng> {
    /// 使用固定种子
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// 使用系统熵初始化
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> SelectionStrategy for Shuffled<R> {
    fn pick(&mut self, available: usize, count: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..available).collect();
        indices.shuffle(&mut self.rng);
        indices.truncate(count.min(available));
        indices
    }

    fn name(&self) -> &'static str {
        "shuffled"
    }
}
