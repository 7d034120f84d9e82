//! propstream CLI - Tool for inspecting and converting property streams.

mod settings;

use std::env;
use std::path::{Path, PathBuf};

use propstream::codec::InputFile;
use propstream::core::{is_text_stream, VersionEnvelope};
use propstream::record::RecordValue;
use propstream::schema::{DirectorySource, SchemaHandle, SchemaRegistry, VariantSchema, NodeId, PropertyKind};
use propstream::util::FourCC;
use propstream::{Error, Result};
use tracing::{debug, info};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use settings::Settings;

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse global flags
    let mut level = "warn";
    let mut config: Option<PathBuf> = None;
    let mut filtered_args: Vec<&str> = Vec::new();
    let mut iter = args[1..].iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-v" | "--verbose" => level = "debug",
            "-vv" | "--trace" => level = "trace",
            "-q" | "--quiet" => level = "error",
            "-c" | "--config" => config = iter.next().map(PathBuf::from),
            _ => filtered_args.push(arg),
        }
    }
    init_tracing(level);

    if filtered_args.is_empty() {
        print_help();
        return;
    }

    let settings = Settings::load(config.as_deref());
    debug!(?settings, "settings loaded");

    let result = match filtered_args[0] {
        // Info command - show stream envelope
        "info" | "i" => match filtered_args.get(1) {
            Some(file) => cmd_info(file, &settings),
            None => usage("propstream info <file>"),
        },

        // Schema command - show loaded templates
        "schema" | "s" => cmd_schema(filtered_args.get(1).copied(), &settings),

        // Convert command - binary <-> text
        "convert" | "c" => match filtered_args[1..] {
            [tag, id, input, output] => cmd_convert(tag, id, input, output, &settings),
            _ => usage("propstream convert <tag> <template-id> <in> <out>"),
        },

        // Dump command - record as JSON
        "dump" | "d" => match filtered_args[1..] {
            [tag, id, input] => cmd_dump(tag, id, input, &settings),
            _ => usage("propstream dump <tag> <template-id> <in>"),
        },

        "version" | "-V" | "--version" => {
            println!("propstream {} (built {})", env!("CARGO_PKG_VERSION"), env!("PROPSTREAM_BUILD_DATE"));
            Ok(())
        }

        "help" | "h" | "-h" | "--help" => {
            print_help();
            Ok(())
        }

        other => {
            eprintln!("Unknown command: {}", other);
            eprintln!("Run 'propstream help' for usage");
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn usage(text: &str) -> Result<()> {
    eprintln!("Usage: {}", text);
    std::process::exit(1);
}

fn print_help() {
    println!("propstream - property stream toolkit");
    println!();
    println!("USAGE:");
    println!("    propstream [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    i, info    <file>                       Show stream envelope");
    println!("    s, schema  [tag]                        Show variant schemas and load errors");
    println!("    c, convert <tag> <id> <in> <out>        Convert binary <-> text (.xml output is text)");
    println!("    d, dump    <tag> <id> <in>              Print record as JSON");
    println!("    version                                 Show version");
    println!("    h, help                                 Show this help");
    println!();
    println!("OPTIONS:");
    println!("    -v, --verbose        Show debug output");
    println!("    -vv, --trace         Show trace output (very verbose)");
    println!("    -q, --quiet          Only show errors");
    println!("    -c, --config <file>  Settings file (default: {})", settings::SETTINGS_FILE);
    println!();
    println!("EXAMPLES:");
    println!("    propstream info door.bin");
    println!("    propstream schema PRME");
    println!("    propstream convert PRME 0x10 door.bin door.xml");
    println!("    propstream dump PRME 0x10 door.xml");
}

fn cmd_info(path: &str, settings: &Settings) -> Result<()> {
    info!("Opening stream: {}", path);
    let input = InputFile::open(path)?;
    let env = VersionEnvelope::negotiate(&input, settings.endian)?;

    println!("Stream:            {}", path);
    println!("Size:              {} bytes", input.len());
    println!("Encoding:          {}", if is_text_stream(&input) { "text" } else { "binary" });
    println!("Encoding revision: {:?} ({})", env.encoding_revision, env.encoding_revision.as_u16());
    println!("Payload revision:  {}", env.payload_revision);
    println!("Variant:           {}", env.variant);
    Ok(())
}

fn load_registry(settings: &Settings) -> Result<SchemaRegistry> {
    let source = DirectorySource::new(&settings.templates_dir);
    let (registry, report) = SchemaRegistry::load(&source, &settings.manifest)?;
    if !report.is_clean() {
        eprintln!("{}", report);
    }
    Ok(registry)
}

fn cmd_schema(tag: Option<&str>, settings: &Settings) -> Result<()> {
    let registry = load_registry(settings)?;
    let tags: Vec<FourCC> = match tag {
        Some(tag) => vec![tag.parse()?],
        None => registry.tags().collect(),
    };

    for tag in tags {
        let schema = registry.require(tag)?;
        println!("{} ({}), format revision {}", schema.name(), schema.tag(), schema.format_revision());
        if !schema.revisions().is_empty() {
            println!("  revisions: {}", schema.revisions().join(", "));
        }
        for (_, node) in schema.templates() {
            print_node(schema, node, 1);
        }
        println!();
    }
    Ok(())
}

fn print_node(schema: &VariantSchema, id: NodeId, depth: usize) {
    let node = schema.node(id);
    let indent = "  ".repeat(depth);
    let mut line = format!("{}{:#010X} {} : {}", indent, node.id, node.name, node.kind);
    if let Some(default) = node.default.as_ref().filter(|_| !node.kind.is_container()) {
        line.push_str(&format!(" = {}", default.format(propstream::archive::Hints::NONE)));
    }
    if node.single_property {
        line.push_str(" [single]");
    }
    if !node.revisions.is_empty() {
        line.push_str(&format!(" [{}]", node.revisions.join(", ")));
    }
    println!("{}", line);

    if node.kind == PropertyKind::Enum {
        for e in &node.enumerators {
            println!("{}  {:#X} = {}", indent, e.id, e.name);
        }
    }
    for (child, _) in schema.children(id) {
        print_node(schema, child, depth + 1);
    }
}

fn parse_template_id(text: &str) -> Result<u32> {
    let digits = text.trim_start_matches("0x").trim_start_matches("0X");
    u32::from_str_radix(digits, 16).map_err(|_| Error::invalid_value(format!("bad template id '{}'", text)))
}

fn read_record(tag: &str, id: &str, input: &str, settings: &Settings) -> Result<(RecordValue, VersionEnvelope)> {
    let registry = load_registry(settings)?;
    let tag: FourCC = tag.parse()?;
    let id = parse_template_id(id)?;
    let schema = registry.require(tag)?;
    let template = SchemaHandle::template(schema, id)
        .ok_or_else(|| Error::other(format!("variant {} has no template {:#010X}", tag, id)))?;

    info!("Reading {} as {} {}", input, tag, template.node().name);
    let bytes = InputFile::open(input)?;
    let mut record = RecordValue::instantiate(template);
    let env = record.read_any(&bytes, settings.endian)?;
    Ok((record, env))
}

fn cmd_convert(tag: &str, id: &str, input: &str, output: &str, settings: &Settings) -> Result<()> {
    let (mut record, env) = read_record(tag, id, input, settings)?;

    let to_text = Path::new(output)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"));
    let bytes = if to_text {
        record.to_text(&settings.text_root, env.payload_revision)?.into_bytes()
    } else {
        record.to_binary(env.payload_revision, settings.endian)?
    };
    std::fs::write(output, &bytes)?;

    info!("Wrote {} ({} bytes)", output, bytes.len());
    Ok(())
}

fn cmd_dump(tag: &str, id: &str, input: &str, settings: &Settings) -> Result<()> {
    let (record, _) = read_record(tag, id, input, settings)?;
    println!("{}", record.to_json_string()?);
    Ok(())
}
