//! # Cart-Pole CLI
//!
//! 倒立摆平衡控制器命令行工具。
//!
//! ```bash
//! # 查看综合出的反馈增益和闭环极点
//! cartpole-cli gain
//!
//! # 闭环仿真 5 秒，初始摆角 0.1 rad，历史数据写入 JSON
//! cartpole-cli run --duration 5 --initial-angle 0.1 --history-out history.json
//! ```
//!
//! `run` 子命令内置一个线性化对象仿真器：按传感周期对
//! ẋ = A·x + B·u 做 RK4 积分，把状态封装成关节观测投递给控制器，
//! 并把控制器输出的力回馈给仿真器，构成完整闭环。

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

mod sim;

use cartpole_controller::{ControllerBuilder, ControllerConfig};
use cartpole_lqr::LqrGain;
use cartpole_model::SystemMatrices;

/// Cart-Pole CLI - 倒立摆平衡控制命令行工具
#[derive(Parser, Debug)]
#[command(name = "cartpole-cli")]
#[command(about = "Command-line interface for the cart-pole LQR balance controller", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 综合并打印 LQR 增益与闭环极点
    Gain {
        /// 控制器配置文件（TOML），缺省使用默认配置
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// 对线性化对象运行闭环仿真
    Run {
        /// 控制器配置文件（TOML），缺省使用默认配置
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// 仿真时长（s）
        #[arg(short, long, default_value_t = 5.0)]
        duration: f64,

        /// 初始摆角（rad）
        #[arg(long, default_value_t = 0.1)]
        initial_angle: f64,

        /// 传感器采样频率（Hz）
        #[arg(long, default_value_t = 100.0)]
        sensor_rate: f64,

        /// 历史数据输出文件（JSON，自动启用历史记录）
        #[arg(long)]
        history_out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cartpole_cli=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Gain { config } => {
            let config = load_config(config.as_deref())?;
            print_gain(&config)
        },

        Commands::Run {
            config,
            duration,
            initial_angle,
            sensor_rate,
            history_out,
        } => {
            let mut config = load_config(config.as_deref())?;
            if history_out.is_some() {
                config.record_history = true;
            }
            run_simulation(config, duration, initial_angle, sensor_rate, history_out)
        },
    }
}

/// 加载配置文件，未指定时使用默认配置
fn load_config(path: Option<&std::path::Path>) -> Result<ControllerConfig> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            let config: ControllerConfig = toml::from_str(&raw)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?;
            Ok(config)
        },
        None => Ok(ControllerConfig::default()),
    }
}

/// `gain` 子命令：综合增益并打印
fn print_gain(config: &ControllerConfig) -> Result<()> {
    let params = config.physical_parameters()?;
    let weights = config.cost_weights()?;
    let system = SystemMatrices::from_parameters(&params);
    let gain = LqrGain::synthesize(&system, &weights)?;

    println!("LQR gain K:");
    let k = gain.k();
    println!(
        "  [{:+.6}, {:+.6}, {:+.6}, {:+.6}]",
        k[(0, 0)],
        k[(0, 1)],
        k[(0, 2)],
        k[(0, 3)]
    );

    println!("Closed-loop eigenvalues (A - BK):");
    let closed_loop = system.a() - system.b() * k;
    for ev in closed_loop.complex_eigenvalues().iter() {
        println!("  {:+.4} {:+.4}i", ev.re, ev.im);
    }

    Ok(())
}

/// `run` 子命令：构建控制器并对线性化对象闭环仿真
fn run_simulation(
    config: ControllerConfig,
    duration: f64,
    initial_angle: f64,
    sensor_rate: f64,
    history_out: Option<PathBuf>,
) -> Result<()> {
    anyhow::ensure!(duration > 0.0, "duration must be positive");
    anyhow::ensure!(
        sensor_rate.is_finite() && sensor_rate > 0.0,
        "sensor rate must be positive"
    );

    let params = config.physical_parameters()?;
    let system = SystemMatrices::from_parameters(&params);

    let (controller, force_rx) = ControllerBuilder::new()
        .config(config)
        .build_with_channel()?;

    // Ctrl-C 提前终止仿真
    let stop = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
    let stop_handler = stop.clone();
    ctrlc::set_handler(move || {
        stop_handler.store(true, std::sync::atomic::Ordering::Release);
    })
    .context("Failed to install Ctrl-C handler")?;

    info!(duration, initial_angle, sensor_rate, "Starting closed-loop simulation");

    let outcome = sim::run(
        &system,
        &controller,
        &force_rx,
        sim::SimOptions {
            duration,
            initial_angle,
            sensor_rate,
        },
        &stop,
    )?;

    println!("Simulation finished after {:.2} s", outcome.elapsed_s);
    println!(
        "Final state: cart {:+.4} m @ {:+.4} m/s, pole {:+.4} rad @ {:+.4} rad/s",
        outcome.final_state[0], outcome.final_state[1], outcome.final_state[2], outcome.final_state[3],
    );

    let metrics = controller.metrics();
    println!(
        "Metrics: {} observations ({} rejected), {} ticks ({} skipped, {} overruns), {} forces ({} dropped)",
        metrics.observations_total,
        metrics.observations_rejected,
        metrics.ticks_total,
        metrics.ticks_skipped,
        metrics.overruns,
        metrics.forces_emitted,
        metrics.force_drops,
    );

    if let Some(path) = history_out {
        let history = controller.history();
        let json = serde_json::to_string_pretty(&history)?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write history to {}", path.display()))?;
        println!("Wrote {} history samples to {}", history.len(), path.display());
    }

    Ok(())
}
