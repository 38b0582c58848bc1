//! 界面稳定等待
//!
//! SAP GUI 的渲染与命令异步，且不提供完成事件。每次改动界面后先固定等待，
//! 再在超时上限内轮询会话的繁忙标志。

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::StepError;
use crate::infrastructure::gui_session::GuiSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settle {
    /// 固定等待
    pub interval: Duration,
    /// 繁忙轮询的上限
    pub busy_timeout: Duration,
    /// 轮询间隔
    pub poll: Duration,
}

impl Settle {
    pub fn from_config(config: &Config) -> Self {
        Self {
            interval: config.settle_interval(),
            busy_timeout: config.busy_timeout(),
            poll: config.busy_poll(),
        }
    }

    /// 不做任何等待（用于测试替身）
    pub fn immediate() -> Self {
        Self {
            interval: Duration::ZERO,
            busy_timeout: Duration::ZERO,
            poll: Duration::ZERO,
        }
    }

    /// 只做固定等待，不查询会话
    pub async fn pause(&self) {
        if !self.interval.is_zero() {
            sleep(self.interval).await;
        }
    }

    /// 固定等待后，等会话空闲或超时
    ///
    /// 超时后仍繁忙不算错误，由下一步自己决定成败。
    pub async fn wait<S: GuiSession + ?Sized>(&self, session: &S) -> Result<(), StepError> {
        self.pause().await;

        let started = Instant::now();
        while session.is_busy()? {
            if started.elapsed() >= self.busy_timeout {
                warn!("会话在 {:?} 后仍处于繁忙状态，继续下一步", self.busy_timeout);
                break;
            }
            debug!("会话繁忙，{:?} 后重试", self.poll);
            sleep(self.poll).await;
        }

        Ok(())
    }
}
