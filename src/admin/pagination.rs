//! 分页状态
//!
//! 每次分页参数变化（或显式刷新）都会产生一个新的 `FetchTicket`。
//! 只有与最新 ticket 相同代次的响应才会被应用，旧请求的响应直接丢弃。

use crate::admin::types::page_count;
use tracing::debug;

pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// 删除后当前页超出末页时的处理方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// 自动回到最后一页
    #[default]
    Clamp,
    /// 保持当前页不变
    Preserve,
}

/// 一次列表请求的参数快照
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub page: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    pub current: u64,
    pub page_size: u64,
    pub total: u64,
}

impl PaginationState {
    pub fn page_count(&self) -> u64 {
        page_count(self.total, self.page_size)
    }
}

#[derive(Debug, Clone)]
pub struct PaginationController {
    state: PaginationState,
    generation: u64,
    policy: OverflowPolicy,
}

impl Default for PaginationController {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl PaginationController {
    pub fn new(page_size: u64) -> Self {
        Self {
            state: PaginationState {
                current: 1,
                page_size: page_size.max(1),
                total: 0,
            },
            generation: 0,
            policy: OverflowPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: OverflowPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    pub fn state(&self) -> PaginationState {
        self.state
    }

    /// 切换页码（可同时切换每页条数），返回需要发起的请求
    pub fn set_page(&mut self, page: u64, page_size: Option<u64>) -> FetchTicket {
        self.state.current = page.max(1);
        if let Some(size) = page_size {
            self.state.page_size = size.max(1);
        }
        debug!(
            "[Pagination] 切换到第 {} 页，每页 {} 条",
            self.state.current, self.state.page_size
        );
        self.next_ticket()
    }

    /// 以当前参数重新请求
    pub fn refresh(&mut self) -> FetchTicket {
        self.next_ticket()
    }

    fn next_ticket(&mut self) -> FetchTicket {
        self.generation += 1;
        FetchTicket {
            generation: self.generation,
            page: self.state.current,
            limit: self.state.page_size,
        }
    }

    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        ticket.generation == self.generation
    }

    /// 请求完成后更新总数，不重置当前页；过期响应返回 `false` 且不做任何修改
    pub fn on_result(&mut self, ticket: &FetchTicket, total: u64) -> bool {
        if !self.is_current(ticket) {
            debug!(
                "[Pagination] 丢弃过期响应: 代次 {} (最新 {})",
                ticket.generation, self.generation
            );
            return false;
        }
        self.state.total = total;
        true
    }

    /// 当前页超出末页时按策略给出需要补发的请求
    pub fn correct_overflow(&mut self) -> Option<FetchTicket> {
        if self.policy == OverflowPolicy::Preserve {
            return None;
        }
        let last = self.state.page_count().max(1);
        if self.state.current > last {
            debug!(
                "[Pagination] 第 {} 页已超出末页 {}，回到末页",
                self.state.current, last
            );
            Some(self.set_page(last, None))
        } else {
            None
        }
    }
}
