//! Build automation tasks for the wall clock firmware.
//!
//! Run with: `cargo xtask <command>`

use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use std::process::{Command, ExitCode};

const FIRMWARE_TARGET: &str = "thumbv6m-none-eabi";
const FIRMWARE_FEATURES: &str = "pico1,arm";
const FIRMWARE_BIN: &str = "wallclock";

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation for the wall clock firmware", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all checks: host tests, firmware build, docs
    CheckAll,
    /// Run the host test suite
    Test,
    /// Build the firmware
    Build {
        /// Build in release mode
        #[arg(long)]
        release: bool,
        /// Settings file to embed (defaults to wallclock.ini)
        #[arg(long)]
        ini: Option<String>,
    },
    /// Build UF2 firmware file for flashing to Pico
    Uf2 {
        /// Settings file to embed (defaults to wallclock.ini)
        #[arg(long)]
        ini: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::CheckAll => check_all(),
        Commands::Test => run_host_tests(),
        Commands::Build { release, ini } => build_firmware(release, ini.as_deref()),
        Commands::Uf2 { ini } => build_uf2(ini.as_deref()),
    }
}

fn check_all() -> ExitCode {
    println!("{}", "==> Running host tests...".cyan());
    if run_host_tests() != ExitCode::SUCCESS {
        return ExitCode::FAILURE;
    }

    println!("\n{}", "==> Building firmware...".cyan());
    if build_firmware(false, None) != ExitCode::SUCCESS {
        return ExitCode::FAILURE;
    }

    println!("\n{}", "==> Building documentation...".cyan());
    if !run_command(Command::new("cargo").current_dir(workspace_root()).args([
        "doc",
        "--target",
        FIRMWARE_TARGET,
        "--no-deps",
        "--lib",
        "--features",
        FIRMWARE_FEATURES,
        "--no-default-features",
    ])) {
        return ExitCode::FAILURE;
    }

    println!("\n{}", "==> All checks passed!".green().bold());
    ExitCode::SUCCESS
}

fn run_host_tests() -> ExitCode {
    let mut test_cmd = Command::new("cargo");
    test_cmd
        .current_dir(workspace_root())
        .args(["test", "--package", "pocket-wallclock"]);

    match host_target() {
        Some(target) => {
            println!(
                "  {}",
                format!("Using host target: {target}").bright_black()
            );
            test_cmd.arg("--target").arg(target);
        }
        None => {
            println!(
                "{}",
                "  Unable to detect host target; relying on cargo default.".bright_black()
            );
        }
    }
    test_cmd.args(["--no-default-features", "--features", "host"]);

    if run_command(&mut test_cmd) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn firmware_command(release: bool, ini: Option<&str>) -> Command {
    let mut cmd = Command::new("cargo");
    cmd.current_dir(workspace_root()).args([
        "build",
        "--bin",
        FIRMWARE_BIN,
        "--target",
        FIRMWARE_TARGET,
        "--features",
        FIRMWARE_FEATURES,
        "--no-default-features",
    ]);
    if release {
        cmd.arg("--release");
    }
    if let Some(ini) = ini {
        println!("  Settings: {}", ini.bright_black());
        cmd.env("WALLCLOCK_INI", ini);
    }
    cmd
}

fn build_firmware(release: bool, ini: Option<&str>) -> ExitCode {
    println!(
        "{}",
        format!("Building firmware with features: {FIRMWARE_FEATURES}").cyan()
    );
    if run_command(&mut firmware_command(release, ini)) {
        println!("{}", "Build successful!".green());
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn build_uf2(ini: Option<&str>) -> ExitCode {
    println!("{}", "Building UF2 firmware".cyan());
    println!("  Target: {}", FIRMWARE_TARGET.bright_black());

    if !run_command(&mut firmware_command(true, ini)) {
        return ExitCode::FAILURE;
    }

    let elf_path = format!("target/{FIRMWARE_TARGET}/release/{FIRMWARE_BIN}");
    let uf2_path = format!("{FIRMWARE_BIN}.uf2");

    println!("\n{}", "Converting to UF2 format...".cyan());

    if run_command(
        Command::new("elf2uf2-rs")
            .current_dir(workspace_root())
            .args([&elf_path, &uf2_path]),
    ) {
        println!("{}", format!("UF2 created: {uf2_path}").green().bold());
        println!("{}", "Ready to drag-and-drop to your Pico!".bright_black());
        ExitCode::SUCCESS
    } else {
        println!(
            "{}",
            "Note: Install elf2uf2-rs with: cargo install elf2uf2-rs".yellow()
        );
        ExitCode::FAILURE
    }
}

fn workspace_root() -> std::path::PathBuf {
    // cargo runs the alias from the workspace root
    std::env::current_dir().expect("Failed to get current directory")
}

fn host_target() -> Option<String> {
    let output = Command::new("rustc").arg("-vV").output().ok()?;
    if !output.status.success() {
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout
        .lines()
        .find_map(|line| line.strip_prefix("host: "))
        .map(|host| host.trim().to_string())
}

fn run_command(cmd: &mut Command) -> bool {
    match cmd.status() {
        Ok(status) => status.success(),
        Err(e) => {
            eprintln!("{}", format!("Failed to execute command: {e}").red());
            false
        }
    }
}
