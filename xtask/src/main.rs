use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{exit, Command};

use clap::{Parser, Subcommand, ValueEnum};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const LAMBDA_PACKAGE: &str = "webhook_ingest_lambda";
const LAMBDA_BINARY: &str = "webhook_ingest";
const WORKSPACE_CRATES: [&str; 2] = ["webhook_ingest_core", LAMBDA_PACKAGE];

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the webhook ingest workspace",
    long_about = "Runs CI checks and builds the Lambda deployment zip\n\
                  for the webhook ingest workspace."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run CI checks
    Ci {
        /// Which checks to run
        #[arg(value_enum, default_value_t = CiJob::All)]
        job: CiJob,
    },
    /// Build the Lambda binary and zip it as `bootstrap`
    ServerlessPackage {
        /// Lambda target triple (must be installed via rustup)
        #[arg(long, env = "LAMBDA_TARGET", default_value = "x86_64-unknown-linux-gnu")]
        target: String,
        /// Build profile used for the binary
        #[arg(value_enum, long, default_value_t = BuildProfile::Release)]
        profile: BuildProfile,
        /// Directory receiving the zip
        #[arg(long, default_value = "dist")]
        out_dir: PathBuf,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CiJob {
    /// rustfmt in check mode
    Fmt,
    /// clippy with warnings denied
    Lint,
    /// unit tests of every workspace crate
    Test,
    /// fmt + lint + test
    All,
}

impl CiJob {
    fn includes(self, job: CiJob) -> bool {
        self == CiJob::All || self == job
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum BuildProfile {
    Debug,
    Release,
}

impl BuildProfile {
    fn dir_name(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
        }
    }
}

type TaskResult = Result<(), String>;

fn cargo(args: &[&str]) -> TaskResult {
    eprintln!("+ cargo {}", args.join(" "));
    let status = Command::new("cargo")
        .args(args)
        .status()
        .map_err(|error| format!("failed to execute cargo: {error}"))?;
    if status.success() {
        Ok(())
    } else {
        Err(format!("`cargo {}` exited with {status}", args.join(" ")))
    }
}

fn run_ci(job: CiJob) -> TaskResult {
    if job.includes(CiJob::Fmt) {
        eprintln!("\n=== fmt ===");
        cargo(&["fmt", "--all", "--", "--check"])?;
    }
    if job.includes(CiJob::Lint) {
        eprintln!("\n=== clippy ===");
        cargo(&["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"])?;
    }
    if job.includes(CiJob::Test) {
        for krate in WORKSPACE_CRATES {
            eprintln!("\n=== test {krate} ===");
            cargo(&["test", "-p", krate])?;
        }
    }
    Ok(())
}

/// Builds `webhook_ingest` for `target` and writes `<out_dir>/webhook_ingest.zip`.
/// The target must already be installed; nothing is built otherwise.
fn package_lambda(target: &str, profile: BuildProfile, out_dir: &Path) -> TaskResult {
    let installed = Command::new("rustup")
        .args(["target", "list", "--installed"])
        .output()
        .map_err(|error| format!("failed to query rustup targets: {error}"))?;
    if !String::from_utf8_lossy(&installed.stdout)
        .lines()
        .any(|line| line.trim() == target)
    {
        return Err(format!(
            "rust target `{target}` is not installed; run `rustup target add {target}`"
        ));
    }

    let mut build = vec![
        "build",
        "-p",
        LAMBDA_PACKAGE,
        "--bin",
        LAMBDA_BINARY,
        "--target",
        target,
    ];
    if let BuildProfile::Release = profile {
        build.push("--release");
    }
    cargo(&build)?;

    let binary_path = Path::new("target")
        .join(target)
        .join(profile.dir_name())
        .join(LAMBDA_BINARY);
    let binary = fs::read(&binary_path)
        .map_err(|error| format!("cannot read {}: {error}", binary_path.display()))?;

    fs::create_dir_all(out_dir)
        .map_err(|error| format!("cannot create {}: {error}", out_dir.display()))?;
    let zip_path = out_dir.join(format!("{LAMBDA_BINARY}.zip"));
    write_bootstrap_zip(&zip_path, &binary)
        .map_err(|error| format!("cannot write {}: {error}", zip_path.display()))?;

    eprintln!("packaged {} ({} bytes)", zip_path.display(), binary.len());
    Ok(())
}

fn write_bootstrap_zip(zip_path: &Path, binary: &[u8]) -> zip::result::ZipResult<()> {
    let mut zip = ZipWriter::new(fs::File::create(zip_path)?);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o755);
    zip.start_file("bootstrap", options)?;
    zip.write_all(binary)?;
    zip.finish()?;
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Ci { job } => run_ci(job),
        Commands::ServerlessPackage {
            target,
            profile,
            out_dir,
        } => package_lambda(&target, profile, &out_dir),
    };

    if let Err(message) = outcome {
        eprintln!("xtask failed: {message}");
        exit(1);
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;

    #[test]
    fn all_job_runs_every_check() {
        for job in [CiJob::Fmt, CiJob::Lint, CiJob::Test] {
            assert!(CiJob::All.includes(job));
        }
        assert!(CiJob::Test.includes(CiJob::Test));
        assert!(!CiJob::Test.includes(CiJob::Lint));
    }

    #[test]
    fn bootstrap_zip_holds_executable_binary() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let zip_path = dir.path().join("webhook_ingest.zip");

        write_bootstrap_zip(&zip_path, b"\x7fELF-binary").expect("zip should be written");

        let file = fs::File::open(&zip_path).expect("zip should exist");
        let mut archive = zip::ZipArchive::new(file).expect("zip should be readable");
        assert_eq!(archive.len(), 1);

        let mut entry = archive.by_name("bootstrap").expect("bootstrap entry");
        assert_eq!(entry.unix_mode().map(|mode| mode & 0o777), Some(0o755));
        let mut contents = Vec::new();
        entry
            .read_to_end(&mut contents)
            .expect("entry should decompress");
        assert_eq!(contents, b"\x7fELF-binary");
    }
}
