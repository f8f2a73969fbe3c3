use core::fmt::Write as _;
use std::io::Write;
use std::process::ExitCode;

use time::format_description::well_known::Rfc3339;
use tracing_subscriber::EnvFilter;
use tsdb_rawblock::codec::layout::read_block_header;
use tsdb_rawblock::{
    ColumnDescriptor, ColumnType, DecodeOptions, Precision, ResultSchema, Value,
    decode_block_with_options,
};

type BoxError = Box<dyn std::error::Error>;

fn parse_arg(args: &[String], name: &str) -> Option<String> {
    for (i, a) in args.iter().enumerate() {
        if let Some(v) = a.strip_prefix(&(name.to_string() + "=")) {
            return Some(v.to_string());
        }
        if a == name {
            return args.get(i + 1).cloned();
        }
    }
    None
}

fn usage() -> &'static str {
    "\
rawblock_dump\n\
\n\
Decodes one captured raw block and prints its rows as JSON arrays, one per line.\n\
\n\
Args:\n\
  --block PATH        raw block bytes as returned by the engine (required)\n\
  --rows N            row count reported by the fetch call (required)\n\
  --types LIST        comma-separated column types, e.g. ts,int,varchar:20 (required)\n\
  --precision P       ms | us | ns (default: ms)\n\
  --options PATH      JSON decode options, e.g. {\"binary_as_bytes\": true}\n\
\n\
Logging goes to stderr and follows RUST_LOG (default: info).\n\
"
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn parse_column(arg: &str) -> Result<ColumnDescriptor, BoxError> {
    match arg.split_once(':') {
        Some((ty, bytes)) => {
            let ty: ColumnType = ty.parse()?;
            if !ty.is_var_len() {
                return Err(format!("{ty} has a fixed width, drop `:{bytes}`").into());
            }
            Ok(ColumnDescriptor::var(ty, bytes.trim().parse()?))
        }
        None => Ok(ColumnDescriptor::of(arg.parse()?)),
    }
}

fn hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

fn value_to_json(v: &Value) -> Result<serde_json::Value, BoxError> {
    use serde_json::Value as J;
    let j = match v {
        Value::Null => J::Null,
        Value::Bool(b) => J::Bool(*b),
        Value::I8(x) => J::from(*x),
        Value::I16(x) => J::from(*x),
        Value::I32(x) => J::from(*x),
        Value::I64(x) => J::from(*x),
        Value::U8(x) => J::from(*x),
        Value::U16(x) => J::from(*x),
        Value::U32(x) => J::from(*x),
        Value::U64(x) => J::from(*x),
        Value::F32(x) => serde_json::Number::from_f64(f64::from(*x)).map_or(J::Null, J::Number),
        Value::F64(x) => serde_json::Number::from_f64(*x).map_or(J::Null, J::Number),
        Value::Str(s) => J::String(s.clone()),
        Value::Bytes(b) => J::String(hex(b)),
        Value::Timestamp(ts) => J::String(ts.format(&Rfc3339)?),
        Value::RawTimestamp { ticks, precision } => {
            serde_json::json!({ "ticks": ticks, "precision": precision })
        }
    };
    Ok(j)
}

fn run(args: &[String]) -> Result<(), BoxError> {
    let block_path = parse_arg(args, "--block").ok_or("missing --block")?;
    let rows: usize = parse_arg(args, "--rows").ok_or("missing --rows")?.parse()?;
    let types = parse_arg(args, "--types").ok_or("missing --types")?;
    let precision: Precision = parse_arg(args, "--precision")
        .unwrap_or_else(|| "ms".to_string())
        .parse()?;
    let options: DecodeOptions = match parse_arg(args, "--options") {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => DecodeOptions::default(),
    };

    let columns = types
        .split(',')
        .map(parse_column)
        .collect::<Result<Vec<_>, _>>()?;
    let schema = ResultSchema::new(columns, precision)?;

    let block = std::fs::read(&block_path)?;
    let header = read_block_header(&block)?;
    tracing::info!(
        path = %block_path,
        total_len = header.total_len,
        group_id = header.group_id,
        rows,
        columns = schema.len(),
        "decoding block"
    );

    let decoded = decode_block_with_options(&block, rows, &schema, &options)?;

    let stdout = std::io::stdout();
    let mut w = stdout.lock();
    for row in &decoded {
        let cells = row
            .iter()
            .map(value_to_json)
            .collect::<Result<Vec<_>, _>>()?;
        writeln!(w, "{}", serde_json::Value::Array(cells))?;
    }
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print!("{}", usage());
        return ExitCode::SUCCESS;
    }
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            eprint!("{}", usage());
            ExitCode::FAILURE
        }
    }
}
