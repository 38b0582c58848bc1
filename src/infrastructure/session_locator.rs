//! 会话定位 - 基础设施层
//!
//! 负责找到正在运行、已登录的脚本宿主并绑定第一个连接的第一个会话。
//! 只尝试一次，不重试、不启动程序、不登录。

use crate::error::ConnectError;
use crate::infrastructure::gui_session::GuiSession;
use tracing::debug;

/// 已绑定的会话句柄
///
/// 释放后内部引用被置空，重复释放不会有任何效果。
#[derive(Debug)]
pub struct SessionHandle<S> {
    session: Option<S>,
}

impl<S> SessionHandle<S> {
    pub fn bound(session: S) -> Self {
        Self {
            session: Some(session),
        }
    }

    pub fn session(&self) -> Option<&S> {
        self.session.as_ref()
    }

    pub fn is_bound(&self) -> bool {
        self.session.is_some()
    }

    /// 取出会话，句柄变为空
    pub fn release(&mut self) -> Option<S> {
        self.session.take()
    }
}

/// 脚本宿主定位器
pub trait SessionLocator {
    type Session: GuiSession;

    /// 绑定一个可用会话，失败时不修改宿主状态
    fn connect(&mut self) -> Result<SessionHandle<Self::Session>, ConnectError>;

    /// 释放句柄，必须是幂等的
    fn disconnect(&mut self, handle: &mut SessionHandle<Self::Session>);
}

/// 作用域内持有的会话
///
/// 在所有退出路径上（正常结束、提前返回、panic 展开）恰好调用一次 `disconnect`。
pub struct HeldSession<'a, L: SessionLocator> {
    locator: &'a mut L,
    handle: SessionHandle<L::Session>,
}

impl<'a, L: SessionLocator> HeldSession<'a, L> {
    /// 连接并接管句柄；连接失败时不会调用 `disconnect`
    pub fn acquire(locator: &'a mut L) -> Result<Self, ConnectError> {
        let handle = locator.connect()?;
        // 空句柄不算一次成功连接
        if !handle.is_bound() {
            return Err(ConnectError::NoSession {
                message: "定位器返回了空句柄".to_string(),
            });
        }
        Ok(Self { locator, handle })
    }

    pub fn session(&self) -> Option<&L::Session> {
        self.handle.session()
    }
}

impl<L: SessionLocator> Drop for HeldSession<'_, L> {
    fn drop(&mut self) {
        debug!("释放脚本会话");
        self.locator.disconnect(&mut self.handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_is_idempotent() {
        let mut handle = SessionHandle::bound("sessão");
        assert!(handle.is_bound());

        assert_eq!(handle.release(), Some("sessão"));
        assert_eq!(handle.release(), None);
        assert!(!handle.is_bound());
        assert!(handle.session().is_none());
    }
}
