//! 粒子存活区间的环形缓冲区
//!
//! 用两个游标加一个计数跟踪 `[0, capacity)` 中哪些槽位存活：
//!
//! ```text
//! 连续:  . . X X X X X . . .     first_alive < first_dead
//! 回绕:  X X . . . . . X X X     first_alive >= first_dead
//! ```
//!
//! 全满和全空时两个游标相等，只能靠 `count` 区分，因此所有判断都以 `count` 为准。

use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticleRing {
    capacity: usize,
    first_alive: usize,
    first_dead: usize,
    count: usize,
}

/// 当前存活槽位的区间划分
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveRanges {
    Empty,
    /// 存活槽位为 `[first_alive, first_dead)`
    Contiguous(Range<usize>),
    /// 存活槽位为 `[first_alive, capacity)` 加 `[0, first_dead)`
    Wrapped { tail: Range<usize>, head: Range<usize> },
}

impl LiveRanges {
    /// 按从最老到最新的循环顺序遍历槽位
    pub fn iter(&self) -> impl Iterator<Item = usize> {
        let (first, second) = match self {
            LiveRanges::Empty => (0..0, 0..0),
            LiveRanges::Contiguous(range) => (range.clone(), 0..0),
            LiveRanges::Wrapped { tail, head } => (tail.clone(), head.clone()),
        };
        first.chain(second)
    }

    pub fn is_wrapped(&self) -> bool {
        matches!(self, LiveRanges::Wrapped { .. })
    }
}

impl ParticleRing {
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0, "ring capacity must be non-zero");
        Self {
            capacity,
            first_alive: 0,
            first_dead: 0,
            count: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.count == self.capacity
    }

    pub fn first_alive(&self) -> usize {
        self.first_alive
    }

    pub fn first_dead(&self) -> usize {
        self.first_dead
    }

    /// 占用 `first_dead` 处的槽位并返回其下标；已满时返回 `None`
    pub fn push(&mut self) -> Option<usize> {
        if self.is_full() {
            return None;
        }
        let slot = self.first_dead;
        self.first_dead = (self.first_dead + 1) % self.capacity;
        self.count += 1;
        Some(slot)
    }

    /// 回收 `first_alive` 处的槽位并返回其下标；为空时返回 `None`
    pub fn pop_front(&mut self) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        let slot = self.first_alive;
        self.first_alive = (self.first_alive + 1) % self.capacity;
        self.count -= 1;
        Some(slot)
    }

    pub fn live_ranges(&self) -> LiveRanges {
        if self.count == 0 {
            return LiveRanges::Empty;
        }
        let end = self.first_alive + self.count;
        if end <= self.capacity {
            LiveRanges::Contiguous(self.first_alive..end)
        } else {
            LiveRanges::Wrapped {
                tail: self.first_alive..self.capacity,
                head: 0..end - self.capacity,
            }
        }
    }

    /// 槽位是否处于存活区间内
    pub fn contains(&self, slot: usize) -> bool {
        if slot >= self.capacity {
            return false;
        }
        let offset = (slot + self.capacity - self.first_alive) % self.capacity;
        offset < self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_until_full() {
        let mut ring = ParticleRing::new(3);
        assert_eq!(ring.push(), Some(0));
        assert_eq!(ring.push(), Some(1));
        assert_eq!(ring.push(), Some(2));
        assert!(ring.is_full());
        assert_eq!(ring.push(), None);
        // 全满时两个游标相等
        assert_eq!(ring.first_alive(), ring.first_dead());
        assert_eq!(ring.live_ranges(), LiveRanges::Contiguous(0..3));
    }

    #[test]
    fn test_empty_after_full_depletion() {
        let mut ring = ParticleRing::new(2);
        ring.push();
        ring.push();
        assert_eq!(ring.pop_front(), Some(0));
        assert_eq!(ring.pop_front(), Some(1));
        assert_eq!(ring.pop_front(), None);
        assert!(ring.is_empty());
        assert_eq!(ring.first_alive(), ring.first_dead());
        assert_eq!(ring.live_ranges(), LiveRanges::Empty);
        assert_eq!(ring.live_ranges().iter().count(), 0);
    }

    #[test]
    fn test_wrapped_ranges() {
        let mut ring = ParticleRing::new(5);
        for _ in 0..5 {
            ring.push();
        }
        ring.pop_front();
        ring.pop_front();
        ring.push();
        // alive = 2, dead = 1
        assert_eq!(
            ring.live_ranges(),
            LiveRanges::Wrapped {
                tail: 2..5,
                head: 0..1
            }
        );
        let slots: Vec<usize> = ring.live_ranges().iter().collect();
        assert_eq!(slots, vec![2, 3, 4, 0]);
        assert!(ring.contains(0));
        assert!(!ring.contains(1));
        assert!(ring.contains(4));
    }

    #[test]
    fn test_full_with_offset_cursors_is_wrapped() {
        let mut ring = ParticleRing::new(4);
        for _ in 0..4 {
            ring.push();
        }
        ring.pop_front();
        ring.push();
        assert!(ring.is_full());
        assert_eq!(ring.first_alive(), 1);
        assert_eq!(ring.first_dead(), 1);
        assert_eq!(ring.live_ranges().iter().count(), 4);
        assert!(ring.live_ranges().is_wrapped());
    }
}
