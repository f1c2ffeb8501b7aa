/*
Expects the layout below, relative to the working directory:

../pass/                  pass.json, icon.png, ...
../cert/wwdr.pem
../cert/signerCert.pem
../cert/signerKey.pem
../pass.pass/             output directory, must exist

cargo run -p apple-wallet-pass-cli --bin apple_wallet_pass_gen

Or

cargo install apple-wallet-pass-cli
apple_wallet_pass_gen

RUST_LOG=debug apple_wallet_pass_gen
*/

use apple_wallet_pass::{generate, GeneratorConfig};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    generate(&GeneratorConfig::default())?;

    println!("Pass generated successfully!");

    Ok(())
}
