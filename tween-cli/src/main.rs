//! # Tween CLI
//!
//! 补间场景工具 - 按帧回放补间场景并输出属性轨迹。
//!
//! ## 用法
//!
//! ```bash
//! # 在项目根目录使用 cargo 运行
//! cargo run -p tween-cli -- run demos/flash_and_move.json
//! cargo run -p tween-cli -- run demos/flash_and_move.json --step 0.1 --config tween.json
//! cargo run -p tween-cli -- curve ease_out_bounce --samples 20
//! cargo run -p tween-cli -- config --output tween.json
//!
//! # 或安装后直接使用
//! cargo install --path tween-cli
//! tween run demos/flash_and_move.json -v
//! ```

mod scenario;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::Level;
use tween_runtime::{EasingFunction, TweenConfig, ease};

use crate::scenario::{RunOptions, Scenario};

#[derive(Parser)]
#[command(name = "tween")]
#[command(about = "补间场景工具 - 按帧回放补间场景并输出属性轨迹")]
#[command(version, author)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// 回放补间场景
    Run {
        /// 场景文件路径
        scenario: PathBuf,

        /// 配置文件（默认：内置默认值）
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// 每帧时长（秒）
        #[arg(short, long, default_value = "0.25")]
        step: f32,

        /// 最多回放的帧数
        #[arg(long, default_value = "1000")]
        max_ticks: u32,
    },

    /// 输出缓动曲线采样表
    Curve {
        /// 曲线名称，如 ease_in_out
        name: String,

        /// 采样段数
        #[arg(short = 'n', long, default_value = "10")]
        samples: u32,
    },

    /// 写出默认配置
    Config {
        /// 输出文件（默认：打印到标准输出）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            scenario,
            config,
            step,
            max_ticks,
        } => {
            let options = RunOptions { step, max_ticks };
            if let Err(e) = run_scenario(&scenario, config.as_deref(), &options) {
                eprintln!("❌ 回放失败: {:#}", e);
                std::process::exit(1);
            }
        }
        Commands::Curve { name, samples } => match EasingFunction::from_name(&name) {
            Ok(curve) => println!("{}", curve_table(curve, samples)),
            Err(e) => {
                eprintln!("❌ 曲线查找失败: {}", e);
                std::process::exit(1);
            }
        },
        Commands::Config { output } => {
            if let Err(e) = write_config(output.as_deref()) {
                eprintln!("❌ 写出配置失败: {:#}", e);
                std::process::exit(1);
            }
        }
    }
}

/// 日志输出到标准错误，轨迹独占标准输出
fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn run_scenario(path: &Path, config: Option<&Path>, options: &RunOptions) -> Result<()> {
    let config = match config {
        Some(path) => TweenConfig::try_load(path)
            .with_context(|| format!("配置文件无效: {}", path.display()))?,
        None => TweenConfig::default(),
    };
    let scenario = Scenario::load(path)?;
    let trace = scenario::run(&scenario, config, options)?;
    println!("{trace}");
    Ok(())
}

fn write_config(output: Option<&Path>) -> Result<()> {
    let config = TweenConfig::default();
    match output {
        Some(path) => {
            config
                .save(path)
                .with_context(|| format!("无法写入: {}", path.display()))?;
            println!("✅ 默认配置已写出: {}", path.display());
        }
        None => println!("{}", config.to_json()?),
    }
    Ok(())
}

/// 等距采样曲线，每行为 `进度 缓动值`
fn curve_table(curve: EasingFunction, samples: u32) -> String {
    let samples = samples.max(1);
    (0..=samples)
        .map(|i| {
            let progress = i as f32 / samples as f32;
            format!("{progress:.2} {:.4}", ease(progress, curve))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curve_table_linear() {
        insta::assert_snapshot!(curve_table(EasingFunction::Linear, 4), @r"
        0.00 0.0000
        0.25 0.2500
        0.50 0.5000
        0.75 0.7500
        1.00 1.0000
        ");
    }

    #[test]
    fn test_curve_table_endpoints() {
        for curve in EasingFunction::ALL {
            let table = curve_table(curve, 0);
            assert_eq!(table, "0.00 0.0000\n1.00 1.0000");
        }
    }

    #[test]
    fn test_write_config_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tween.json");
        write_config(Some(&path)).unwrap();

        let loaded = TweenConfig::try_load(&path).unwrap();
        assert_eq!(loaded, TweenConfig::default());
    }

    #[test]
    fn test_cli_parses_run() {
        let cli = Cli::try_parse_from(["tween", "run", "demo.json", "--step", "0.1", "-v"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Run { scenario, step, .. } => {
                assert_eq!(scenario, PathBuf::from("demo.json"));
                assert_eq!(step, 0.1);
            }
            _ => panic!("expected run"),
        }
    }
}
