use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use log::{info, warn};

use oasgen_core::config::{self, CONFIG_FILE_NAME, OasgenConfig};
use oasgen_core::ir::{Composition, DataType, Definition, IrSpec};
use oasgen_core::parse;
use oasgen_core::parse::bundle::{Bundler, FsBundler};
use oasgen_core::transform;
use oasgen_core::{CodeGenerator, GeneratedFile};
use oasgen_typescript::TypeScriptGenerator;

#[derive(Parser)]
#[command(
    name = "oasgen",
    about = "Swagger 2.0 / OpenAPI 3.x to io-ts code generator",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate TypeScript from a specification document
    Generate(GenerateArgs),

    /// Validate a specification document
    Validate {
        /// Path to the specification file (YAML or JSON)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Inspect the normalized form of a specification document
    Inspect {
        /// Path to the specification file
        #[arg(short, long)]
        input: PathBuf,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: InspectFormat,
    },

    /// Initialize a new oasgen configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Flags given on the command line win over `.oasgen.yaml`. The switches
/// only turn options on; an option enabled in the file stays enabled.
#[derive(Args, Default)]
struct GenerateArgs {
    /// Path to the specification file (YAML or JSON)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Directory the generated files are written to
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Object codecs reject undeclared properties (only enables; a `true` in the config stays)
    #[arg(long)]
    strict_interfaces: bool,

    /// Rename property keys to camelCase (only enables)
    #[arg(long)]
    camel_case: bool,

    /// Type for 2xx responses without a schema reference
    #[arg(long)]
    default_success_type: Option<String>,

    /// Type for other responses without a schema reference
    #[arg(long)]
    default_error_type: Option<String>,

    /// Emit requestTypes.ts (only enables)
    #[arg(long)]
    request_types: bool,

    /// Emit response decoders, implies --request-types (only enables)
    #[arg(long)]
    response_decoders: bool,

    /// Emit client.ts, implies --response-decoders (only enables)
    #[arg(long)]
    client: bool,
}

#[derive(Clone, ValueEnum)]
enum InspectFormat {
    Yaml,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => cmd_generate(args),

        Commands::Validate { input } => cmd_validate(input),

        Commands::Inspect { input, format } => cmd_inspect(input, format),

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "oasgen", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Try to load the project config file from the current directory.
fn try_load_config() -> Result<Option<OasgenConfig>> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    config::load_config(&config_path).map_err(|e| anyhow::anyhow!(e))
}

/// Overlay command-line flags on the file configuration. Boolean switches
/// are OR-ed in, so an absent flag never clears a value set in the file.
fn resolve_config(mut cfg: OasgenConfig, args: GenerateArgs) -> OasgenConfig {
    if let Some(input) = args.input {
        cfg.input = input.display().to_string();
    }
    if let Some(output) = args.output {
        cfg.output = output.display().to_string();
    }
    let generation = &mut cfg.generation;
    generation.strict_interfaces |= args.strict_interfaces;
    generation.camel_case |= args.camel_case;
    generation.request_types |= args.request_types;
    generation.response_decoders |= args.response_decoders;
    generation.client |= args.client;
    if let Some(ty) = args.default_success_type {
        generation.default_success_type = ty;
    }
    if let Some(ty) = args.default_error_type {
        generation.default_error_type = ty;
    }
    cfg
}

/// Bundle the document with the files it references and build the IR.
fn load_ir(path: &Path) -> Result<IrSpec> {
    let bundle = FsBundler
        .bundle(path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    let ir = transform::transform_bundle(&bundle)
        .with_context(|| format!("failed to transform {}", path.display()))?;
    for diagnostic in &ir.diagnostics {
        warn!("{diagnostic}");
    }
    Ok(ir)
}

/// Write generated files to disk under the given base directory.
fn write_files(base: &Path, files: &[GeneratedFile]) -> Result<()> {
    for file in files {
        let path = base.join(&file.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        fs::write(&path, &file.content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("wrote {}", path.display());
    }
    Ok(())
}

fn cmd_generate(args: GenerateArgs) -> Result<()> {
    let cfg = resolve_config(try_load_config()?.unwrap_or_default(), args);
    let ir = load_ir(Path::new(&cfg.input))?;

    let files = TypeScriptGenerator
        .generate(&ir, &cfg.generation)
        .map_err(|e| anyhow::anyhow!(e))?;

    let output_dir = PathBuf::from(&cfg.output);
    fs::create_dir_all(&output_dir).with_context(|| {
        format!("failed to create output directory {}", output_dir.display())
    })?;
    write_files(&output_dir, &files)?;

    eprintln!(
        "Generated {} files in {}",
        files.len(),
        output_dir.display()
    );
    Ok(())
}

fn cmd_validate(input: PathBuf) -> Result<()> {
    let bundle = FsBundler
        .bundle(&input)
        .with_context(|| format!("failed to load {}", input.display()))?;
    let parsed = parse::from_value(bundle.root.clone())
        .with_context(|| format!("failed to parse {}", input.display()))?;

    eprintln!(
        "Valid {} document: {}",
        parsed.dialect().display_name(),
        parsed.info().title
    );
    eprintln!("  Version: {}", parsed.info().version);
    eprintln!("  External files: {}", bundle.fragments.len());

    let ir = transform::transform_bundle(&bundle)?;
    eprintln!("  Definitions: {}", ir.definitions.len());
    eprintln!("  Operations: {}", ir.operations.len());

    if ir.diagnostics.is_empty() {
        eprintln!("Validation successful.");
    } else {
        eprintln!("Validation successful with {} warnings:", ir.diagnostics.len());
        for diagnostic in &ir.diagnostics {
            eprintln!("  - {diagnostic}");
        }
    }
    Ok(())
}

fn cmd_inspect(input: PathBuf, format: InspectFormat) -> Result<()> {
    let ir = load_ir(&input)?;
    let summary = build_inspect_summary(&ir);

    match format {
        InspectFormat::Yaml => {
            let yaml = serde_yaml_ng::to_string(&summary)?;
            print!("{}", yaml);
        }
        InspectFormat::Json => {
            let json = serde_json::to_string_pretty(&summary)?;
            println!("{}", json);
        }
    }

    Ok(())
}

fn definition_kind(def: &Definition) -> &'static str {
    if def.import_hint.is_some() {
        return "imported";
    }
    match (&def.composition, &def.enumeration, def.data_type) {
        (Some(Composition::OneOf(_)), _, _) => "oneOf",
        (Some(Composition::AllOf(members)), _, _) if members.len() == 1 => "alias",
        (Some(Composition::AllOf(_)), _, _) => "allOf",
        (None, Some(_), _) => "enum",
        (None, None, Some(DataType::Array)) => "array",
        (None, None, Some(DataType::Object)) => "object",
        (None, None, None) if !def.properties.is_empty() => "object",
        _ => "scalar",
    }
}

fn build_inspect_summary(ir: &IrSpec) -> serde_json::Value {
    let definitions: Vec<serde_json::Value> = ir
        .definitions
        .iter()
        .map(|(name, def)| {
            serde_json::json!({
                "name": name,
                "kind": definition_kind(def),
            })
        })
        .collect();

    let operations: Vec<serde_json::Value> = ir
        .operations
        .iter()
        .map(|op| {
            serde_json::json!({
                "id": op.operation_id,
                "method": op.method.as_str(),
                "path": op.path,
                "parameters": op.parameters.iter().map(|p| p.marked_name()).collect::<Vec<_>>(),
                "responses": op.responses.iter().map(|r| &r.status).collect::<Vec<_>>(),
                "headers": op.headers,
                "tags": op.tags,
            })
        })
        .collect();

    serde_json::json!({
        "info": {
            "title": ir.meta.title,
            "version": ir.meta.version,
            "base_path": ir.meta.base_path,
        },
        "definitions": definitions,
        "operations": operations,
        "diagnostics": ir.diagnostics.iter().map(ToString::to_string).collect::<Vec<_>>(),
    })
}

fn cmd_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}
