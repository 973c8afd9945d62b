//! `compiler` CLI: `spec.md` §6's `compiler <mode> <input> -o <output>`
//! contract, where `mode` is `-koopa` (write textual Koopa IR) or `-riscv`
//! (write RISC-V assembly). Argument parsing follows the teacher's hand-rolled
//! `Args::parse()` loop over `env::args()` (`subset_julia_vm/src/bin/aot.rs`).

use std::env;
use std::fs;
use std::process;

use sysyc::codegen::{generate_with_config, CodegenConfig};
use sysyc::raw_ir::print_program;
use sysyc::{compile_to_ir, CompileError};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Koopa,
    Riscv,
}

#[derive(Debug)]
struct Args {
    mode: Option<Mode>,
    input_file: Option<String>,
    output_file: Option<String>,
    emit_comments: bool,
    show_help: bool,
    show_version: bool,
}

impl Args {
    fn parse() -> Result<Self, String> {
        let argv: Vec<String> = env::args().collect();
        let mut parsed = Args {
            mode: None,
            input_file: None,
            output_file: None,
            emit_comments: false,
            show_help: false,
            show_version: false,
        };

        let mut i = 1;
        while i < argv.len() {
            match argv[i].as_str() {
                "-h" | "--help" => parsed.show_help = true,
                "-v" | "--version" => parsed.show_version = true,
                "-koopa" => parsed.mode = Some(Mode::Koopa),
                "-riscv" => parsed.mode = Some(Mode::Riscv),
                "--emit-comments" => parsed.emit_comments = true,
                "-o" | "--output" => {
                    i += 1;
                    let val = argv
                        .get(i)
                        .ok_or_else(|| "-o requires an output path".to_string())?;
                    parsed.output_file = Some(val.clone());
                }
                arg if !arg.starts_with('-') => {
                    if parsed.input_file.is_some() {
                        return Err(format!("unexpected extra argument '{arg}'"));
                    }
                    parsed.input_file = Some(arg.to_string());
                }
                other => return Err(format!("unknown option '{other}'")),
            }
            i += 1;
        }

        Ok(parsed)
    }
}

fn print_help() {
    println!(
        "sysyc {VERSION} — SysY to RISC-V compiler\n\n\
         USAGE:\n    \
         compiler <-koopa|-riscv> <input> -o <output>\n\n\
         OPTIONS:\n    \
         -koopa            Lower input to textual Koopa IR\n    \
         -riscv            Lower input all the way to RISC-V assembly\n    \
         -o, --output      Output file path\n    \
         --emit-comments   Annotate emitted assembly with its source IR instruction\n    \
         -h, --help        Show this help message\n    \
         -v, --version     Show version information\n"
    );
}

fn run(args: &Args) -> Result<String, String> {
    let mode = args.mode.ok_or_else(|| "missing mode: -koopa or -riscv".to_string())?;
    let input = args
        .input_file
        .as_ref()
        .ok_or_else(|| "missing input file".to_string())?;
    let source = fs::read_to_string(input).map_err(|e| format!("reading '{input}': {e}"))?;

    let prog = compile_to_ir(&source).map_err(|e: CompileError| e.to_string())?;
    Ok(match mode {
        Mode::Koopa => print_program(&prog),
        Mode::Riscv => {
            let config = if args.emit_comments {
                CodegenConfig::with_comments()
            } else {
                CodegenConfig::default()
            };
            generate_with_config(&prog, &config)
        }
    })
}

fn main() {
    env_logger::init();

    let args = match Args::parse() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!("Use --help for usage information");
            process::exit(2);
        }
    };

    if args.show_help {
        print_help();
        return;
    }
    if args.show_version {
        println!("sysyc {VERSION}");
        return;
    }

    let output_file = match &args.output_file {
        Some(f) => f.clone(),
        None => {
            eprintln!("error: missing -o <output>");
            eprintln!("Use --help for usage information");
            process::exit(2);
        }
    };

    match run(&args) {
        Ok(text) => {
            if let Err(e) = fs::write(&output_file, text) {
                eprintln!("error writing '{output_file}': {e}");
                process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
