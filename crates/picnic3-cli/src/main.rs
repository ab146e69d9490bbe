// crates/picnic3-cli/src/main.rs

#![forbid(unsafe_code)]
#![deny(
    rust_2018_idioms,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo
)]

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use picnic3_sig::{ParamSet, Picnic3};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "picnic3-cli",
    about = "Picnic3 reference CLI",
    long_about = "Picnic3 reference CLI.\n\nDerive public keys, sign messages, and verify signatures with the Picnic3 post-quantum signature scheme.",
    version = env!("CARGO_PKG_VERSION"),
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Derive the public key for a private key and write a key file.
    Pubkey {
        /// Parameter set
        #[arg(value_enum, long, default_value = "l1")]
        set: SetOpt,

        /// Private key, hex, exactly io_size bytes
        #[arg(long)]
        private_key: String,

        /// Public plaintext block, hex; defaults to all-zero
        #[arg(long)]
        plaintext: Option<String>,

        /// Output path for the key file (JSON)
        #[arg(long, default_value = "keys.json")]
        out: PathBuf,
    },

    /// Sign a message file with a key file.
    Sign {
        /// Key file produced by `pubkey`
        #[arg(long)]
        keys: PathBuf,

        /// Path to the message bytes
        #[arg(long)]
        message: PathBuf,

        /// Output path for the signature file (JSON)
        #[arg(long, default_value = "sig.json")]
        out: PathBuf,
    },

    /// Verify a signature file against a key file and message.
    Verify {
        /// Key file produced by `pubkey`
        #[arg(long)]
        keys: PathBuf,

        /// Path to the message bytes
        #[arg(long)]
        message: PathBuf,

        /// Signature file produced by `sign`
        #[arg(long)]
        signature: PathBuf,
    },
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum SetOpt {
    L1,
    L3,
    L5,
}

impl From<SetOpt> for ParamSet {
    fn from(s: SetOpt) -> Self {
        match s {
            SetOpt::L1 => Self::Picnic3L1,
            SetOpt::L3 => Self::Picnic3L3,
            SetOpt::L5 => Self::Picnic3L5,
        }
    }
}

/// Key material at rest: JSON envelope with hex fields.
#[derive(Serialize, Deserialize)]
struct KeyFile {
    param_set: ParamSet,
    private_key: String,
    plaintext: String,
    public_key: String,
}

/// A detached signature at rest.
#[derive(Serialize, Deserialize)]
struct SignatureFile {
    param_set: ParamSet,
    signature: String,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match Cli::parse().cmd {
        Cmd::Pubkey {
            set,
            private_key,
            plaintext,
            out,
        } => pubkey(set.into(), &private_key, plaintext.as_deref(), &out),
        Cmd::Sign { keys, message, out } => sign(&keys, &message, &out),
        Cmd::Verify {
            keys,
            message,
            signature,
        } => verify(&keys, &message, &signature),
    }
}

fn pubkey(set: ParamSet, private_key: &str, plaintext: Option<&str>, out: &Path) -> Result<()> {
    let scheme = Picnic3::new(set);
    let io = scheme.params().io_size();

    let sk = decode_exact(private_key, io, "private key")?;
    let pt = match plaintext {
        Some(hexstr) => decode_exact(hexstr, io, "plaintext")?,
        None => vec![0u8; io],
    };
    let pk = scheme
        .derive_public_key(&sk, &pt)
        .context("deriving public key")?;

    let file = KeyFile {
        param_set: set,
        private_key: hex::encode(&sk),
        plaintext: hex::encode(&pt),
        public_key: hex::encode(&pk),
    };
    write_json(out, &file)?;
    info!(?out, %set, "wrote key file");
    Ok(())
}

fn sign(keys: &Path, message: &Path, out: &Path) -> Result<()> {
    let keyfile: KeyFile = read_json(keys)?;
    let scheme = Picnic3::new(keyfile.param_set);
    let io = scheme.params().io_size();

    let sk = decode_exact(&keyfile.private_key, io, "private key")?;
    let pt = decode_exact(&keyfile.plaintext, io, "plaintext")?;
    let pk = decode_exact(&keyfile.public_key, io, "public key")?;
    let msg = fs::read(message)
        .with_context(|| format!("reading message from {}", message.display()))?;

    let sig = scheme
        .sign(&sk, &pk, &pt, &msg)
        .context("signing failed")?;
    info!(bytes = sig.len(), "signature produced");

    write_json(
        out,
        &SignatureFile {
            param_set: keyfile.param_set,
            signature: hex::encode(sig),
        },
    )?;
    info!(?out, "wrote signature file");
    Ok(())
}

fn verify(keys: &Path, message: &Path, signature: &Path) -> Result<()> {
    let keyfile: KeyFile = read_json(keys)?;
    let sigfile: SignatureFile = read_json(signature)?;
    if sigfile.param_set != keyfile.param_set {
        bail!(
            "parameter set mismatch: keys use {}, signature uses {}",
            keyfile.param_set,
            sigfile.param_set
        );
    }

    let scheme = Picnic3::new(keyfile.param_set);
    let io = scheme.params().io_size();
    let pt = decode_exact(&keyfile.plaintext, io, "plaintext")?;
    let pk = decode_exact(&keyfile.public_key, io, "public key")?;
    let msg = fs::read(message)
        .with_context(|| format!("reading message from {}", message.display()))?;
    let sig = hex::decode(sigfile.signature.trim()).context("decoding signature hex")?;

    scheme
        .verify(&pk, &pt, &msg, &sig)
        .context("signature rejected")?;
    println!("signature valid");
    Ok(())
}

fn decode_exact(hexstr: &str, want: usize, what: &str) -> Result<Vec<u8>> {
    let bytes = hex::decode(hexstr.trim()).with_context(|| format!("decoding {what} hex"))?;
    if bytes.len() != want {
        bail!("{what} must be exactly {want} bytes, got {}", bytes.len());
    }
    Ok(bytes)
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("parsing {}", path.display()))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let data = serde_json::to_string_pretty(value)?;
    fs::write(path, data).with_context(|| format!("writing {}", path.display()))
}
