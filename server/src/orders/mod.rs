//! 订单域 - 生命周期与桌台结账
//!
//! - [`OrderLifecycle`] - 单订单的创建、修改、状态机推进
//! - [`CheckoutCoordinator`] - 桌台级批量结账流程
//!
//! 两者都只做业务校验，持久化全部委托 repository 层。

pub mod checkout;
pub mod lifecycle;

pub use checkout::CheckoutCoordinator;
pub use lifecycle::OrderLifecycle;
