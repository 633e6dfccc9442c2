//! # xtask - 开发辅助工具
//!
//! 提供本地质量门禁与开发辅助命令。
//!
//! ## 命令
//!
//! - `check-all`: 运行 fmt、clippy、test
//! - `cov-runtime`: 运行 story-runtime 覆盖率
//! - `cov-workspace`: 运行 workspace 覆盖率
//! - `sheet-check`: 检查订单表数据文件（列、类型、选项编码）

use std::path::Path;
use std::process::{Command, ExitCode};

use story_runtime::OrderType;
use story_runtime::dataset::{RawSheet, SceneDataConverter};

fn run(step: &str, cmd: &mut Command) -> anyhow::Result<()> {
    eprintln!("\n==> {step}");
    let status = cmd.status()?;
    if !status.success() {
        anyhow::bail!("{step} failed with {status}");
    }
    Ok(())
}

fn ensure_cargo_llvm_cov_available() -> anyhow::Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.args(["llvm-cov", "--version"]);
    let status = cmd.status();
    match status {
        Ok(s) if s.success() => Ok(()),
        _ => anyhow::bail!(
            "cargo llvm-cov 不可用。\n\
请先安装：\n\
  - cargo install cargo-llvm-cov\n\
  - rustup component add llvm-tools-preview\n\
然后重试。"
        ),
    }
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        eprintln!("xtask error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let sub = args.next().unwrap_or_else(|| "help".to_string());

    match sub.as_str() {
        "check-all" => {
            let mut fmt = Command::new("cargo");
            fmt.args(["fmt", "--all", "--", "--check"]);
            run("cargo fmt --all -- --check", &mut fmt)?;

            let mut clippy = Command::new("cargo");
            clippy.args(["clippy", "--workspace", "--all-targets"]);
            run("cargo clippy --workspace --all-targets", &mut clippy)?;

            let mut test = Command::new("cargo");
            test.args(["test", "--workspace"]);
            run("cargo test --workspace", &mut test)?;
        }
        "cov-runtime" => {
            ensure_cargo_llvm_cov_available()?;

            let mut cov = Command::new("cargo");
            cov.args(["llvm-cov", "-p", "story-runtime", "--all-features", "--html"]);
            run(
                "cargo llvm-cov -p story-runtime --all-features --html",
                &mut cov,
            )?;

            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        "cov-workspace" => {
            ensure_cargo_llvm_cov_available()?;

            // 说明：
            // - workspace 覆盖率不作为主目标，主要用于"趋势观察"
            // - 在口径上排除 tool crate（xtask）以免稀释信号
            let mut cov = Command::new("cargo");
            cov.args([
                "llvm-cov",
                "--workspace",
                "--exclude",
                "xtask",
                "--all-features",
                "--html",
            ]);
            run(
                "cargo llvm-cov --workspace --exclude xtask --all-features --html",
                &mut cov,
            )?;

            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        "sheet-check" => {
            let path = args
                .next()
                .ok_or_else(|| anyhow::anyhow!("用法: xtask sheet-check <sheet.json>"))?;
            sheet_check(Path::new(&path))?;
        }
        "help" | "-h" | "--help" => {
            print_help();
        }
        other => anyhow::bail!("unknown xtask subcommand: {other}"),
    }

    Ok(())
}

/// 检查一张订单表数据文件（JSON 形式的表头 + 行）
///
/// 转换整表，并对脚本层面的约定做静态检查：
/// - 选项编码必须可解析
/// - Effect 的演出编号必须已知
/// - 表尾应当是 End 订单
fn sheet_check(path: &Path) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(path)?;
    let sheet: RawSheet = serde_json::from_str(&text)?;

    let mut converter = SceneDataConverter::new();
    converter.load_header(&sheet.header)?;

    let mut problems = 0usize;
    let mut last_type = None;

    for (line, row) in sheet.rows.iter().enumerate() {
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let order = converter.convert_row(row)?;

        if order.order_type == OrderType::Choice {
            if let Err(e) = order.choice_options() {
                eprintln!("行 {}: {e}", line + 2);
                problems += 1;
            }
        }
        if order.order_type == OrderType::Effect {
            if let Err(e) = order.effect_kind() {
                eprintln!("行 {}: {e}", line + 2);
                problems += 1;
            }
        }
        last_type = Some(order.order_type);
    }

    if last_type != Some(OrderType::End) {
        eprintln!("表尾不是 End 订单，播放会在末尾报 ScriptExhausted");
        problems += 1;
    }

    if problems > 0 {
        anyhow::bail!("{problems} 个问题，见上方输出");
    }
    eprintln!("sheet-check: {} 通过", path.display());
    Ok(())
}

fn print_help() {
    eprintln!(
        r#"xtask - 开发辅助工具

用法: cargo run -p xtask -- <command>

命令:
  check-all        运行 fmt、clippy、test
  cov-runtime      story-runtime 覆盖率（HTML 报告）
  cov-workspace    workspace 覆盖率（排除 xtask）
  sheet-check <f>  检查订单表数据文件
  help             显示本帮助
"#
    );
}
