use anyhow::{Context, Result};
use clap::Parser;
use dh_sidechannel::dh::{AttackParams, DhGroup};
use dh_sidechannel::encode::{display_bits, parse_bits};
use num_bigint::BigUint;
use std::process::ExitCode;

/// Recover Alice's Diffie-Hellman key from the number of modular
/// multiplications her exponentiation took, then decrypt the intercepted
/// message. Every flag defaults to the recorded exchange.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// prime modulus p
    #[arg(long)]
    modulus: Option<BigUint>,

    /// generator g
    #[arg(long)]
    generator: Option<BigUint>,

    /// Alice's public key g^a mod p
    #[arg(long)]
    alice_public: Option<BigUint>,

    /// Bob's public key g^b mod p
    #[arg(long)]
    bob_public: Option<BigUint>,

    /// multiplications observed while Alice computed g^a
    #[arg(short, long)]
    multiplications: Option<u64>,

    /// largest exponent to consider
    #[arg(long)]
    search_bound: Option<BigUint>,

    /// exponents at or below this value are skipped
    #[arg(long)]
    floor: Option<BigUint>,

    /// intercepted ciphertext as a string of 0s and 1s
    #[arg(long)]
    ciphertext_bits: Option<String>,

    /// report every matching exponent instead of stopping at the first
    #[arg(short, long, default_value_t = false)]
    all: bool,

    /// print the recovered key stream
    #[arg(long, default_value_t = false)]
    show_key: bool,
}

impl Args {
    fn into_params(self) -> Result<AttackParams> {
        let defaults = AttackParams::default();
        let group = match (self.modulus, self.generator) {
            (None, None) => defaults.group,
            (p, g) => DhGroup::new(
                p.unwrap_or_else(|| defaults.group.p().clone()),
                g.unwrap_or_else(|| defaults.group.g().clone()),
            )
            .context("Building the Diffie-Hellman group.")?,
        };
        let ciphertext = match self.ciphertext_bits {
            Some(bits) => parse_bits(&bits).context("Parsing --ciphertext-bits.")?,
            None => defaults.ciphertext,
        };
        Ok(AttackParams {
            group,
            alice_public: self.alice_public.unwrap_or(defaults.alice_public),
            bob_public: self.bob_public.unwrap_or(defaults.bob_public),
            multiplications: self.multiplications.unwrap_or(defaults.multiplications),
            search_bound: self.search_bound.unwrap_or(defaults.search_bound),
            floor: self.floor.unwrap_or(defaults.floor),
            ciphertext,
        })
    }
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let args = Args::parse();
    let (all, show_key) = (args.all, args.show_key);
    let params = args.into_params()?;

    let class = params.weight_class();
    let mut exponents = params.private_exponents(&class);
    let Some(a) = exponents.next() else {
        eprintln!(
            "no private exponent with {} multiplications found below {} ({} candidates checked)",
            params.multiplications,
            params.search_bound,
            exponents.checked()
        );
        return Ok(ExitCode::FAILURE);
    };

    if all {
        println!("private exponent: {a}");
        for other in exponents.by_ref() {
            println!("private exponent: {other}");
        }
    }

    let rec = params
        .decrypt_with(&a)
        .with_context(|| format!("Decrypting with private exponent {a}."))?;
    if !all {
        println!("private exponent: {}", rec.private_exponent);
    }
    if show_key {
        println!("key: {}", display_bits(&rec.key));
    }
    println!("{}", rec.plaintext);

    Ok(ExitCode::SUCCESS)
}
