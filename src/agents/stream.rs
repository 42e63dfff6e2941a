//! 流式适配：把一次完整结果包装成只含一个元素的 TaskResult 流

use std::future::Future;

use futures_util::stream::{self, BoxStream, StreamExt};
use serde::{Deserialize, Serialize};

/// 对调用方的统一输出单元；本系统没有增量结果，is_task_complete 恒为 true
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResult {
    pub is_task_complete: bool,
    pub content: String,
}

impl TaskResult {
    pub fn completed(content: impl Into<String>) -> Self {
        Self {
            is_task_complete: true,
            content: content.into(),
        }
    }
}

/// 首次 poll 时才执行 `invocation`，产出唯一的 TaskResult 后结束
pub fn single_result<'a, F>(invocation: F) -> BoxStream<'a, TaskResult>
where
    F: Future<Output = String> + Send + 'a,
{
    stream::once(async move { TaskResult::completed(invocation.await) }).boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_yields_exactly_one_completed_item() {
        let items: Vec<TaskResult> = single_result(async { "done".to_string() }).collect().await;
        assert_eq!(items, vec![TaskResult::completed("done")]);
    }

    #[tokio::test]
    async fn test_invocation_is_lazy() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        let mut s = single_result(async move {
            flag.store(true, Ordering::SeqCst);
            "ok".to_string()
        });
        assert!(!ran.load(Ordering::SeqCst));

        assert_eq!(s.next().await.map(|r| r.content), Some("ok".to_string()));
        assert!(ran.load(Ordering::SeqCst));
        assert!(s.next().await.is_none());
    }
}
