//! OpenSeals CLI — validate and transcode schemas and proofs.
//!
//! # Commands
//! ```
//! openseals schema-validate  <file>
//! openseals schema-transcode <in> <out>
//! openseals proof-validate   <file> --schema <file>
//! openseals proof-transcode  <in> <out> --schema <file>
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use openseals_core::schema::Schema;
use openseals_core::proof::Proof;

#[derive(Parser)]
#[command(
    name = "openseals",
    about = "OpenSeals schema/proof codec — validate and transcode",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and validate a schema document, printing its digest.
    SchemaValidate {
        file: PathBuf,
        #[arg(long, value_enum)]
        format: Option<Format>,
    },
    /// Transcode a schema between structured and binary form.
    SchemaTranscode {
        input: PathBuf,
        output: PathBuf,
        #[arg(long, value_enum)]
        input_format: Option<Format>,
        #[arg(long, value_enum)]
        output_format: Option<Format>,
    },
    /// Parse and validate a proof document against a schema.
    ProofValidate {
        file: PathBuf,
        #[arg(long)]
        schema: PathBuf,
        #[arg(long, value_enum)]
        format: Option<Format>,
    },
    /// Transcode a proof between structured and binary form.
    ProofTranscode {
        input: PathBuf,
        output: PathBuf,
        #[arg(long)]
        schema: PathBuf,
        #[arg(long, value_enum)]
        input_format: Option<Format>,
        #[arg(long, value_enum)]
        output_format: Option<Format>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
enum Format {
    Yaml,
    Json,
    Binary,
}

fn infer_format(path: &Path) -> Format {
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => Format::Yaml,
        Some("json") => Format::Json,
        _ => Format::Binary,
    }
}

fn load_schema(path: &Path, format: Option<Format>) -> Result<Schema> {
    let format = format.unwrap_or_else(|| infer_format(path));
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading schema document {}", path.display()))?;
    let schema = match format {
        Format::Yaml => openseals_loader::schema_doc::parse_yaml(&text)?,
        Format::Json => openseals_loader::schema_doc::parse_json(&text)?,
        Format::Binary => {
            let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            Schema::deserialize(&mut bytes.as_slice())?
        }
    };
    Ok(schema)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::SchemaValidate { file, format } => schema_validate(&file, format),
        Commands::SchemaTranscode { input, output, input_format, output_format } => {
            schema_transcode(&input, &output, input_format, output_format)
        }
        Commands::ProofValidate { file, schema, format } => proof_validate(&file, &schema, format),
        Commands::ProofTranscode { input, output, schema, input_format, output_format } => {
            proof_transcode(&input, &output, &schema, input_format, output_format)
        }
    }
}

fn schema_validate(file: &Path, format: Option<Format>) -> Result<()> {
    let schema = load_schema(file, format)?;
    schema.validate().context("schema failed validation")?;
    let digest = schema.digest().context("computing schema digest")?;
    let bech32_id = openseals_bech32::encode(openseals_bech32::hrp::SCHEMA_LONG, digest.as_bytes())
        .context("encoding schema digest")?;
    tracing::info!(schema = %schema.name, %bech32_id, "schema is valid");
    println!("{} valid, id={bech32_id}", schema.name);
    Ok(())
}

fn schema_transcode(
    input: &Path,
    output: &Path,
    input_format: Option<Format>,
    output_format: Option<Format>,
) -> Result<()> {
    let schema = load_schema(input, input_format)?;
    let output_format = output_format.unwrap_or_else(|| infer_format(output));
    match output_format {
        Format::Binary => {
            let bytes = schema.serialize().context("serializing schema")?;
            fs::write(output, bytes).with_context(|| format!("writing {}", output.display()))?;
        }
        Format::Yaml | Format::Json => {
            anyhow::bail!("transcoding to structured form is not yet supported; write binary output instead")
        }
    }
    Ok(())
}

fn proof_validate(file: &Path, schema_path: &Path, format: Option<Format>) -> Result<()> {
    let schema = load_schema(schema_path, None)?;
    schema.validate().context("schema failed validation")?;
    let format = format.unwrap_or_else(|| infer_format(file));
    let proof = match format {
        Format::Yaml => {
            let text = fs::read_to_string(file)?;
            openseals_loader::proof_doc::parse_yaml(&text, &schema)?
        }
        Format::Json => {
            let text = fs::read_to_string(file)?;
            openseals_loader::proof_doc::parse_json(&text, &schema)?
        }
        Format::Binary => {
            let bytes = fs::read(file)?;
            Proof::decode(&mut bytes.as_slice(), Some(&schema))?
        }
    };
    proof.validate().context("proof failed structural validation")?;
    let bytes = proof.serialize(&schema).context("re-serializing proof")?;
    let digest = openseals_core::HashId::sha256d(&bytes);
    let bech32_id = openseals_bech32::encode(openseals_bech32::hrp::PROOF_LONG, digest.as_bytes())?;
    tracing::info!(%bech32_id, burn = proof.is_burn(), pruned = proof.is_pruned(), "proof is valid");
    println!("valid, id={bech32_id}, burn={}, pruned={}", proof.is_burn(), proof.is_pruned());
    Ok(())
}

fn proof_transcode(
    input: &Path,
    output: &Path,
    schema_path: &Path,
    input_format: Option<Format>,
    output_format: Option<Format>,
) -> Result<()> {
    let schema = load_schema(schema_path, None)?;
    let input_format = input_format.unwrap_or_else(|| infer_format(input));
    let proof = match input_format {
        Format::Yaml => openseals_loader::proof_doc::parse_yaml(&fs::read_to_string(input)?, &schema)?,
        Format::Json => openseals_loader::proof_doc::parse_json(&fs::read_to_string(input)?, &schema)?,
        Format::Binary => Proof::decode(&mut fs::read(input)?.as_slice(), Some(&schema))?,
    };

    let output_format = output_format.unwrap_or_else(|| infer_format(output));
    match output_format {
        Format::Binary => {
            let bytes = proof.serialize(&schema).context("serializing proof")?;
            fs::write(output, bytes).with_context(|| format!("writing {}", output.display()))?;
        }
        Format::Yaml | Format::Json => {
            anyhow::bail!("transcoding to structured form is not yet supported; write binary output instead")
        }
    }
    Ok(())
}
