// Command-line front end for bytepatch.
//
// Subcommands: encode (diff + serialize), apply (replay a patch), inspect
// (print a patch's items) and config (print build features).

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

use crate::io::BUF_SIZE;
use crate::patch::{ItemIterator, PatchApplier, PatchEncoder};
use crate::script;

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Binary patch encoder/applier.
#[derive(Parser, Debug)]
#[command(
    name = "bytepatch",
    version,
    about = "Binary patch encoder/applier",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Diff a target against a source and write the patch.
    Encode(EncodeArgs),
    /// Rebuild a target from a source and a patch.
    Apply(ApplyArgs),
    /// Print the items of a patch.
    Inspect(InspectArgs),
    /// Print build/configuration details.
    Config,
}

#[derive(Args, Debug)]
struct EncodeArgs {
    /// Source file both ends already have.
    #[arg(long, short = 's', value_hint = ValueHint::FilePath)]
    source: PathBuf,

    /// Target file to encode.
    #[arg(value_hint = ValueHint::FilePath)]
    target: PathBuf,

    /// Patch output file (default: stdout).
    #[arg(value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,

    /// Write output to stdout.
    #[arg(short = 'c', long)]
    stdout: bool,

    /// Stop refining the diff after this many milliseconds.
    #[arg(long = "diff-timeout-ms")]
    diff_timeout_ms: Option<u64>,
}

#[derive(Args, Debug)]
struct ApplyArgs {
    /// Source file the patch was made against.
    #[arg(long, short = 's', value_hint = ValueHint::FilePath)]
    source: PathBuf,

    /// Patch file.
    #[arg(value_hint = ValueHint::FilePath)]
    patch: PathBuf,

    /// Output file (default: stdout).
    #[arg(value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,

    /// Write output to stdout.
    #[arg(short = 'c', long)]
    stdout: bool,

    /// Check only (do not write output).
    #[arg(long = "check-only")]
    no_output: bool,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Patch file.
    #[arg(value_hint = ValueHint::FilePath)]
    patch: PathBuf,

    /// Also print literal bytes (hex) of each item.
    #[arg(long)]
    literals: bool,
}

/// Flags shared by every subcommand.
#[derive(Debug, Clone, Copy)]
struct Globals {
    force: bool,
    quiet: bool,
    verbose: u8,
    json_output: bool,
}

impl Globals {
    fn from_cli(cli: &Cli) -> Self {
        Self {
            force: cli.force,
            quiet: cli.quiet,
            verbose: cli.verbose.min(2),
            json_output: cli.json_output,
        }
    }
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("bytepatch".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        let _ = Globals::from_cli(&cli);
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn read_input(what: &str, path: &Path) -> Option<Vec<u8>> {
    match std::fs::read(path) {
        Ok(data) => Some(data),
        Err(e) => {
            eprintln!("bytepatch: {what} file: {}: {e}", path.display());
            None
        }
    }
}

/// Open the output: file, or stdout when `use_stdout` or no path is given.
fn open_output(
    path: Option<&Path>,
    use_stdout: bool,
    globals: Globals,
) -> Option<Box<dyn Write>> {
    match (use_stdout, path) {
        (true, _) | (_, None) => Some(Box::new(BufWriter::with_capacity(
            BUF_SIZE,
            io::stdout().lock(),
        ))),
        (false, Some(path)) => {
            if path.exists() && !globals.force {
                eprintln!(
                    "bytepatch: output file exists, use -f to overwrite: {}",
                    path.display()
                );
                return None;
            }
            match File::create(path) {
                Ok(f) => Some(Box::new(BufWriter::with_capacity(BUF_SIZE, f))),
                Err(e) => {
                    eprintln!("bytepatch: output file: {}: {e}", path.display());
                    None
                }
            }
        }
    }
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => eprintln!("{s}"),
        Err(e) => eprintln!("bytepatch: json: {e}"),
    }
}

// ---------------------------------------------------------------------------
// Config command
// ---------------------------------------------------------------------------

fn cmd_config() -> i32 {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!("bytepatch version {version}");

    let myers = cfg!(feature = "myers") as u8;
    let file_io = cfg!(feature = "file-io") as u8;
    let ptr_size = std::mem::size_of::<*const ()>();

    eprintln!("MYERS={myers}");
    eprintln!("FILE_IO={file_io}");
    eprintln!("VARINT=leb128");
    eprintln!("MAX_VARINT_LEN={}", crate::patch::varint::MAX_VARINT_LEN);
    eprintln!("sizeof(usize)={ptr_size}");

    0
}

// ---------------------------------------------------------------------------
// Encode command
// ---------------------------------------------------------------------------

fn cmd_encode(args: &EncodeArgs, globals: Globals) -> i32 {
    let Some(source) = read_input("source", &args.source) else {
        return 1;
    };
    let Some(target) = read_input("target", &args.target) else {
        return 1;
    };

    let deadline = args
        .diff_timeout_ms
        .map(|ms| std::time::Instant::now() + std::time::Duration::from_millis(ms));
    let items = script::edit_script_with_deadline(&source, &target, deadline);

    let Some(writer) = open_output(args.output.as_deref(), args.stdout, globals) else {
        return 1;
    };

    let mut encoder = PatchEncoder::new(writer);
    let patch_size = match encoder.encode(&source, &target, &items) {
        Ok(n) => n,
        Err(e) => {
            eprintln!("bytepatch: encode error: {e}");
            return 1;
        }
    };

    if let Err(e) = encoder.finish().flush() {
        eprintln!("bytepatch: write flush error: {e}");
        return 1;
    }

    if globals.verbose > 0 && !globals.quiet {
        eprintln!(
            "bytepatch: encoder: source size: {}, target size: {}, items: {}, patch size: {patch_size}",
            source.len(),
            target.len(),
            items.len()
        );
    }

    if globals.json_output {
        print_json(&serde_json::json!({
            "command": "encode",
            "source_size": source.len(),
            "target_size": target.len(),
            "items": items.len(),
            "patch_size": patch_size,
        }));
    }

    0
}

// ---------------------------------------------------------------------------
// Apply command
// ---------------------------------------------------------------------------

fn cmd_apply(args: &ApplyArgs, globals: Globals) -> i32 {
    let Some(source) = read_input("source", &args.source) else {
        return 1;
    };
    let Some(patch) = read_input("patch", &args.patch) else {
        return 1;
    };

    let output_path = if args.no_output || args.stdout {
        None
    } else {
        args.output.as_deref()
    };

    let mut writer: Box<dyn Write> = if args.no_output {
        Box::new(io::sink())
    } else {
        match open_output(output_path, args.stdout, globals) {
            Some(w) => w,
            None => return 1,
        }
    };

    let applier = PatchApplier::new(&source);
    let result = applier
        .apply_to(&patch, &mut writer)
        .map_err(|e| format!("apply error: {e}"))
        .and_then(|stats| {
            writer
                .flush()
                .map(|_| stats)
                .map_err(|e| format!("write flush error: {e}"))
        });
    drop(writer);

    let stats = match result {
        Ok(stats) => stats,
        Err(msg) => {
            eprintln!("bytepatch: {msg}");
            if let Some(path) = output_path {
                let _ = std::fs::remove_file(path);
            }
            return 1;
        }
    };

    if globals.verbose > 0 && !globals.quiet {
        eprintln!(
            "bytepatch: apply: items: {}, copied: {}, skipped: {}, inserted: {}, output size: {}",
            stats.items, stats.copied, stats.skipped, stats.inserted, stats.output_len
        );
    }

    if globals.json_output {
        print_json(&serde_json::json!({
            "command": "apply",
            "source_size": source.len(),
            "patch_size": patch.len(),
            "items": stats.items,
            "copied": stats.copied,
            "skipped": stats.skipped,
            "inserted": stats.inserted,
            "output_size": stats.output_len,
        }));
    }

    0
}

// ---------------------------------------------------------------------------
// Inspect command
// ---------------------------------------------------------------------------

fn cmd_inspect(args: &InspectArgs, globals: Globals) -> i32 {
    let Some(patch) = read_input("patch", &args.patch) else {
        return 1;
    };

    let mut items = match ItemIterator::new(&patch) {
        Ok(it) => it,
        Err(e) => {
            eprintln!("bytepatch: {e}");
            return 1;
        }
    };

    println!("patch size:   {}", patch.len());
    println!("item count:   {}", items.item_count());
    if items.item_count() > 0 {
        println!("  Index     StartA     StartB    Deleted   Inserted");
    }

    let mut deleted = 0u64;
    let mut inserted = 0u64;
    let mut index = 0u64;
    for item in items.by_ref() {
        let item = match item {
            Ok(item) => item,
            Err(e) => {
                eprintln!("bytepatch: item {index}: {e}");
                return 1;
            }
        };
        println!(
            "  {index:5} {:10} {:10} {:10} {:10}",
            item.start_a(),
            item.start_b(),
            item.deleted_a(),
            item.inserted_b()
        );
        if args.literals && !item.inserted.is_empty() {
            let hex: String = item.inserted.iter().map(|b| format!("{b:02x}")).collect();
            println!("        {hex}");
        }
        deleted += item.deleted_a();
        inserted += item.inserted_b();
        index += 1;
    }

    if let Err(e) = items.finish() {
        eprintln!("bytepatch: {e}");
        return 1;
    }

    println!("deleted:      {deleted}");
    println!("inserted:     {inserted}");

    if globals.json_output {
        print_json(&serde_json::json!({
            "command": "inspect",
            "patch_size": patch.len(),
            "items": index,
            "deleted": deleted,
            "inserted": inserted,
        }));
    }

    0
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let cli = Cli::parse();
    let globals = Globals::from_cli(&cli);

    let exit_code = match &cli.command {
        Cmd::Encode(args) => {
            if args.stdout && args.output.is_some() && !globals.quiet {
                eprintln!("bytepatch: warning: -c option overrides output filename");
            }
            cmd_encode(args, globals)
        }
        Cmd::Apply(args) => {
            if args.stdout && args.output.is_some() && !globals.quiet {
                eprintln!("bytepatch: warning: -c option overrides output filename");
            }
            cmd_apply(args, globals)
        }
        Cmd::Inspect(args) => cmd_inspect(args, globals),
        Cmd::Config => cmd_config(),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
