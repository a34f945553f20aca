//! 输出接口的抽象层
//!
//! 求解过程中需要向用户反馈的数据都通过 [`Interface`] 发送。命令行界面与测试中使用的记录器各自实现这个特征，实现方式可以很不一样。

use serde::Serialize;
use std::cell::RefCell;

pub mod command_line;

/// 向用户反馈的消息类型
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    /// 找到了严格更大的独立集
    Improvement { best_size: usize, elapsed: f64 },
    /// 运行结束时重复一次最优结果
    Final { best_size: usize, elapsed: f64 },
    /// 退火过程中每个温度块结束时的状态
    Progress {
        steps: u64,
        temperature: f64,
        accept_rate: f64,
        current_size: usize,
        best_size: usize,
    },
    /// 停滞后强制逐出部分成员
    Diversified { evicted: usize, size: usize },
    /// 遗传算法每一代结束时的状态
    Generation {
        generation: u64,
        best_size: usize,
        mean_size: f64,
        /// 只在重新生成了非精英个体的那一代出现
        #[serde(skip_serializing_if = "std::ops::Not::not")]
        restarted: bool,
    },
}

/// 定义了向用户报告消息的接口
pub trait Interface {
    fn send(&self, message: Message);
}

/// 把所有消息记在内存里，供库调用者和测试读取
#[derive(Debug, Default)]
pub struct Recorder {
    messages: RefCell<Vec<Message>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.messages.borrow().clone()
    }

    /// 只保留最优值流：改进与结尾的重复
    pub fn anytime(&self) -> Vec<(usize, f64)> {
        self.messages
            .borrow()
            .iter()
            .filter_map(|m| match m {
                Message::Improvement { best_size, elapsed }
                | Message::Final { best_size, elapsed } => Some((*best_size, *elapsed)),
                _ => None,
            })
            .collect()
    }
}

impl Interface for Recorder {
    fn send(&self, message: Message) {
        self.messages.borrow_mut().push(message);
    }
}
