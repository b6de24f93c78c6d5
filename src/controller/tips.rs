//! 待機画面のエコ豆知識ローテーション

use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const ECO_TIPS: [&str; 4] = [
    "Use reusable bags for shopping to reduce plastic waste.",
    "Switch to LED light bulbs to save energy and lower your electricity bill.",
    "Opt for products with minimal or recycled packaging.",
    "Compost food scraps to reduce landfill methane emissions.",
];

/// 一定間隔で豆知識の番号を進めるバックグラウンドタスク
///
/// Drop でタスクを停止する。tokio ランタイム内で生成すること。
pub struct TipRotation {
    index: watch::Receiver<usize>,
    task: JoinHandle<()>,
}

impl TipRotation {
    pub fn start(interval: Duration) -> Self {
        let interval = interval.max(Duration::from_secs(1));
        let (tx, index) = watch::channel(0usize);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // 初回 tick は即時
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if tx.is_closed() {
                    break;
                }
                tx.send_modify(|i| *i = (*i + 1) % ECO_TIPS.len());
            }
        });

        Self { index, task }
    }

    pub fn current(&self) -> usize {
        *self.index.borrow()
    }

    pub fn tip(&self) -> &'static str {
        ECO_TIPS[self.current()]
    }

    /// 変更通知を受け取る
    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.index.clone()
    }
}

impl Drop for TipRotation {
    fn drop(&mut self) {
        self.task.abort();
    }
}
