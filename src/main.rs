use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use pwdigest::algorithm::{
    argon2, bcrypt, ldap, md5crypt, pbkdf2, plaintext, scrypt, sha1crypt, shacrypt,
};
use pwdigest::{Decoder, Digest, Hasher, normalize};
use tracing_subscriber::EnvFilter;

mod auth;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Profile {
    /// argon2, bcrypt, pbkdf2, scrypt, sha-crypt and LDAP SHA
    Default,
    /// Everything, including plaintext and the md5/sha1 crypt families
    All,
}

impl Profile {
    fn decoder(self) -> Result<Decoder> {
        let decoder = match self {
            Profile::Default => Decoder::with_defaults(),
            Profile::All => Decoder::with_all(),
        };
        decoder.context("failed to build the decoder registry")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Algorithm {
    Argon2,
    Bcrypt,
    Pbkdf2,
    Scrypt,
    Shacrypt,
    Md5crypt,
    Sha1crypt,
    Ldap,
    Plaintext,
}

#[derive(Debug, Default, clap::Args)]
struct HashArgs {
    /// Family variant, e.g. `id`, `sha512`, `yescrypt`, `ssha256`
    #[arg(long)]
    variant: Option<String>,

    /// Iterations (argon2 t, pbkdf2/crypt rounds, scrypt ln)
    #[arg(long)]
    iterations: Option<u32>,

    /// Argon2 memory in KiB
    #[arg(long)]
    memory: Option<u32>,

    /// Argon2 or scrypt parallelism
    #[arg(long)]
    parallelism: Option<u32>,

    /// Derived key size in bytes
    #[arg(long)]
    key_size: Option<u32>,

    /// Salt size in bytes (characters for crypt families)
    #[arg(long)]
    salt_size: Option<u32>,

    /// bcrypt cost
    #[arg(long)]
    cost: Option<u32>,

    /// scrypt block size (r)
    #[arg(long)]
    block_size: Option<u32>,
}

impl HashArgs {
    fn variant<V>(&self, parse: fn(&str) -> Option<V>) -> Result<Option<V>> {
        self.variant
            .as_deref()
            .map(|name| parse(name).with_context(|| format!("unknown variant '{name}'")))
            .transpose()
    }

    fn hasher(&self, algorithm: Algorithm) -> Result<Box<dyn Hasher>> {
        let salt_size = self.salt_size.map(|s| s as usize);
        let key_size = self.key_size.map(|k| k as usize);

        let hasher: Box<dyn Hasher> = match algorithm {
            Algorithm::Argon2 => {
                let mut h = argon2::Argon2Hasher::new();
                if let Some(v) = self.variant(argon2::Variant::from_identifier)? {
                    h = h.with_variant(v);
                }
                if let Some(t) = self.iterations {
                    h = h.with_t(t);
                }
                if let Some(m) = self.memory {
                    h = h.with_m(m);
                }
                if let Some(p) = self.parallelism {
                    h = h.with_p(p);
                }
                if let Some(k) = self.key_size {
                    h = h.with_k(k);
                }
                if let Some(s) = self.salt_size {
                    h = h.with_s(s);
                }
                Box::new(h.build()?)
            }
            Algorithm::Bcrypt => {
                let mut h = bcrypt::BcryptHasher::new();
                if let Some(v) = self.variant(bcrypt::Variant::from_identifier)? {
                    h = h.with_variant(v);
                }
                if let Some(cost) = self.cost {
                    h = h.with_cost(cost);
                }
                Box::new(h.build()?)
            }
            Algorithm::Pbkdf2 => {
                let mut h = pbkdf2::Pbkdf2Hasher::new();
                if let Some(v) = self.variant(pbkdf2::Variant::from_identifier)? {
                    h = h.with_variant(v);
                }
                if let Some(i) = self.iterations {
                    h = h.with_iterations(i);
                }
                if let Some(k) = key_size {
                    h = h.with_key_length(k);
                }
                if let Some(s) = salt_size {
                    h = h.with_salt_length(s);
                }
                Box::new(h.build()?)
            }
            Algorithm::Scrypt => {
                let mut h = scrypt::ScryptHasher::new();
                if let Some(v) = self.variant(scrypt::Variant::from_identifier)? {
                    h = h.with_variant(v);
                }
                if let Some(ln) = self.iterations {
                    h = h.with_ln(ln);
                }
                if let Some(r) = self.block_size {
                    h = h.with_r(r);
                }
                if let Some(p) = self.parallelism {
                    h = h.with_p(p);
                }
                if let Some(k) = key_size {
                    h = h.with_key_length(k);
                }
                if let Some(s) = salt_size {
                    h = h.with_salt_length(s);
                }
                Box::new(h.build()?)
            }
            Algorithm::Shacrypt => {
                let mut h = shacrypt::ShaCryptHasher::new();
                if let Some(v) = self.variant(shacrypt::Variant::from_identifier)? {
                    h = h.with_variant(v);
                }
                if let Some(rounds) = self.iterations {
                    h = h.with_rounds(rounds);
                }
                if let Some(s) = salt_size {
                    h = h.with_salt_length(s);
                }
                Box::new(h.build()?)
            }
            Algorithm::Md5crypt => {
                let mut h = md5crypt::Md5CryptHasher::new();
                if let Some(v) = self.variant(md5crypt::Variant::from_identifier)? {
                    h = h.with_variant(v);
                }
                if let Some(i) = self.iterations {
                    h = h.with_iterations(i);
                }
                if let Some(s) = salt_size {
                    h = h.with_salt_length(s);
                }
                Box::new(h.build()?)
            }
            Algorithm::Sha1crypt => {
                let mut h = sha1crypt::Sha1CryptHasher::new();
                if let Some(i) = self.iterations {
                    h = h.with_iterations(i);
                }
                if let Some(s) = salt_size {
                    h = h.with_salt_length(s);
                }
                Box::new(h.build()?)
            }
            Algorithm::Ldap => {
                let mut h = ldap::LdapHasher::new();
                if let Some(v) = self.variant(ldap::Variant::from_identifier)? {
                    h = h.with_variant(v);
                }
                if let Some(s) = salt_size {
                    h = h.with_salt_length(s);
                }
                Box::new(h.build()?)
            }
            Algorithm::Plaintext => {
                let mut h = plaintext::PlainTextHasher::new();
                if let Some(v) = self.variant(plaintext::Variant::from_identifier)? {
                    h = h.with_variant(v);
                }
                Box::new(h)
            }
        };

        Ok(hasher)
    }
}

#[derive(Debug, Parser)]
#[command(name = "pwdigest")]
#[command(
    version,
    about = "Decode, verify and produce PHC, crypt(3) and LDAP password digests."
)]
struct Cli {
    /// Decoder registry used by verify and inspect
    #[arg(long, global = true, value_enum, env = "PWDIGEST_PROFILE", default_value_t = Profile::Default)]
    profile: Profile,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Hashes the password and prints the encoded digest
    #[command(arg_required_else_help = true)]
    Hash {
        #[arg(value_enum)]
        algorithm: Algorithm,

        #[command(flatten)]
        args: HashArgs,
    },

    /// Checks the password against an encoded digest
    #[command(arg_required_else_help = true)]
    Verify { digest: String },

    /// Prints the normalized form of a legacy encoding
    #[command(arg_required_else_help = true)]
    Normalize { digest: String },

    /// Shows the algorithm and canonical encoding of a digest
    #[command(arg_required_else_help = true)]
    Inspect {
        digest: String,

        /// Print as JSON
        #[arg(short, long, default_value_t = false)]
        json: bool,
    },
}

fn decode(profile: Profile, encoded: &str) -> Result<Box<dyn Digest>> {
    profile
        .decoder()?
        .decode(encoded)
        .context("malformed digest")
}

fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();

    match args.command {
        Commands::Hash { algorithm, args } => {
            let mut hasher = args.hasher(algorithm)?;
            let password = auth::read_password()?;
            let digest = hasher.hash(&password).context("failed to hash the password")?;
            println!("{digest}");
        }
        Commands::Verify { digest } => {
            let digest = decode(args.profile, &digest)?;
            let password = auth::read_password()?;

            let matched = digest
                .matches_advanced(&password)
                .context("unable to match the password against the digest")?;

            if !matched {
                println!("no match");
                return Ok(ExitCode::FAILURE);
            }
            println!("match");
        }
        Commands::Normalize { digest } => {
            println!("{}", normalize(&digest));
        }
        Commands::Inspect { digest, json } => {
            let decoded = decode(args.profile, &digest)?;

            if json {
                let info = serde_json::json!({
                    "algorithm": decoded.algorithm(),
                    "encoded": decoded.encode(),
                    "normalized": normalize(&digest),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("algorithm: {}", decoded.algorithm());
                println!("encoded:   {}", decoded.encode());
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
