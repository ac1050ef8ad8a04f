//! `tokenvote address`: print the signer address.

use tokenvote_evm::wallet::signer_from_var;

/// Run the `address` subcommand.
pub fn run(private_key_env: &str) -> Result<(), Box<dyn std::error::Error>> {
    let signer = signer_from_var(private_key_env)?;
    println!("{}", signer.address());
    Ok(())
}
