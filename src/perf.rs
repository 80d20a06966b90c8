use std::cell::Cell;
use std::time::Instant;

thread_local! {
    static PERF_DEPTH: Cell<u32> = Cell::new(0);
}

/// 性能统计 Guard：记录 elapsed_ms + 处理行数 + 嵌套深度
///
/// 使用方式：
/// ```ignore
/// let mut perf = sales_ops_dashboard::perf::PerfGuard::new("dataset_import");
/// perf.add_rows(1200);
/// // do work...
/// ```
pub struct PerfGuard {
    op: &'static str,
    start: Instant,
    rows: u64,
    depth: u32,
}

impl PerfGuard {
    pub fn new(op: &'static str) -> Self {
        let depth = PERF_DEPTH.with(|d| {
            let depth = d.get().saturating_add(1);
            d.set(depth);
            depth
        });
        Self {
            op,
            start: Instant::now(),
            rows: 0,
            depth,
        }
    }

    /// 累加本次操作处理的行数
    pub fn add_rows(&mut self, rows: usize) {
        self.rows = self.rows.saturating_add(rows as u64);
    }

    pub fn rows(&self) -> u64 {
        self.rows
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        let elapsed_ms = self.start.elapsed().as_millis() as u64;

        tracing::info!(
            target: "perf",
            op = self.op,
            elapsed_ms,
            rows = self.rows,
            depth = self.depth,
            "done"
        );

        PERF_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}
