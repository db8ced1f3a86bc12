use std::fs::File;
use std::io::{self, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;
use zbridge::{Config, Direction, Format, MessageContext, TracingAudit, Transformer};

#[derive(Debug, Parser)]
#[command(
    name = "zbridge",
    version,
    about = "Transform one XML or JSON message with audit logging"
)]
struct Args {
    /// Input file (defaults to stdin)
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,
    /// Input format (inferred from the input file extension if omitted)
    #[arg(short, long, value_enum)]
    from: Option<FormatArg>,
    /// Output format
    #[arg(short, long, value_enum)]
    to: FormatArg,
    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,
    /// 32-character hexadecimal message id
    #[arg(short, long, env = "ZBRIDGE_MESSAGE_ID", value_name = "HEX")]
    message_id: String,
    /// Root element for JSON -> XML, expected root with --unwrap-root
    #[arg(long, env = "ZBRIDGE_ROOT_TAG", value_name = "NAME")]
    root_tag: Option<String>,
    /// Emit the root element's content instead of wrapping it in its tag
    #[arg(long)]
    unwrap_root: bool,
    /// Do not emit audit records
    #[arg(long)]
    no_audit: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Json,
    Xml,
}

impl From<FormatArg> for Format {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Json => Self::Json,
            FormatArg::Xml => Self::Xml,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    let from = match args.from.map(Format::from).or_else(|| infer_format(&args.input)) {
        Some(format) => format,
        None => {
            bail!(
                "could not infer input format; pass --from or provide an input file with extension"
            );
        }
    };
    let to = Format::from(args.to);
    let Some(direction) = Direction::between(from, to) else {
        bail!("input and output formats must differ (got {from} to {to})");
    };

    let mut config = Config::default()
        .with_unwrap_root(args.unwrap_root)
        .with_audit_enabled(!args.no_audit);
    if let Some(root_tag) = args.root_tag {
        config = config.with_root_tag(root_tag);
    }

    let transformer = Transformer::new(direction, TracingAudit);
    let ctx = MessageContext::new(&args.message_id, &config);
    let input = open_input(args.input);

    // Buffered so a failed transform never leaves a partial output file
    let mut converted = Vec::new();
    transformer.transform(&ctx, input, &mut converted)?;
    write_output(args.output.as_deref(), &converted)
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .init();
}

fn open_input(path: Option<PathBuf>) -> Box<dyn Read> {
    match path {
        Some(path) => Box::new(InputFile { path, file: None }),
        None => Box::new(io::stdin().lock()),
    }
}

/// Input file opened on first read, so a missing file fails inside the
/// audited read stage
struct InputFile {
    path: PathBuf,
    file: Option<File>,
}

impl Read for InputFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.file.is_none() {
            let file = File::open(&self.path).map_err(|err| {
                io::Error::new(
                    err.kind(),
                    format!("failed to read input file {}: {err}", self.path.display()),
                )
            })?;
            self.file = Some(file);
        }
        self.file.as_mut().map_or(Ok(0), |file| file.read(buf))
    }
}

fn write_output(path: Option<&Path>, data: &[u8]) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, data)
            .with_context(|| format!("failed to write output file {}", path.display())),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(data).context("failed to write stdout")?;
            stdout.flush().context("failed to write stdout")
        }
    }
}

fn infer_format(path: &Option<PathBuf>) -> Option<Format> {
    zbridge::detect_format_from_path(path.as_ref()?)
}
