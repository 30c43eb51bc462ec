//! 运行时生命周期：启动准备、后台任务与关闭信号

pub mod lifetime;
