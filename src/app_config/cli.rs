//! 命令行参数

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "forex-news")]
#[command(about = "Download and query the forexprostools economic calendar")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// 下载新闻到本地存储，已有数据时只刷新最近几天
    Download {
        /// JSON 设置文件
        #[arg(long)]
        path_json: Option<PathBuf>,
        /// 数据库文件或目录
        #[arg(long)]
        path_database: Option<String>,
        /// 跳过休息日
        #[arg(long, default_value_t = false)]
        nodayoff: bool,
    },
    /// 统计全部新闻名称，按出现次数升序
    Stats {
        #[arg(long)]
        path_database: Option<String>,
        /// 结果写入文本文件
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// 按分钟扫描存储范围，找到第一个有新闻的时间点
    Check {
        #[arg(long)]
        path_database: Option<String>,
        /// 货币对，如 EURUSD 或 frxEURUSD
        #[arg(long)]
        pair: String,
        /// 向前容差（秒）
        #[arg(long, default_value_t = 1200)]
        past: i64,
        /// 向后容差（秒）
        #[arg(long, default_value_t = 1200)]
        future: i64,
        #[arg(long, default_value_t = false)]
        low: bool,
        #[arg(long, default_value_t = false)]
        moderate: bool,
        #[arg(long, default_value_t = false)]
        high: bool,
        /// 出现未选中等级的新闻时视为没有新闻
        #[arg(long, default_value_t = false)]
        only_selected: bool,
        /// 扫描步长（秒）
        #[arg(long, default_value_t = 60)]
        step: i64,
    },
    /// 打印某一天的全部新闻
    Show {
        #[arg(long)]
        path_database: Option<String>,
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
    },
}
