//! Walks the public Curbside challenge from `start` and prints the assembled secret.

// crates.io
use color_eyre::Result;
use tracing::Level;
// self
use curbside_challenge::{descriptor::ChallengeDescriptor, resolver::ReqwestResolver};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
	color_eyre::install()?;
	tracing_subscriber::fmt().with_max_level(Level::WARN).with_writer(std::io::stderr).init();

	let resolver = ReqwestResolver::new(ChallengeDescriptor::default())?;
	let secret = resolver.resolve_start().await?;

	println!("{secret}");

	Ok(())
}
