//! Runs both halves of the handoff against a property set: first without a code to obtain the
//! consent URL, then with the code passed on the command line (if any) to redeem it.
//!
//! ```sh
//! HANDOFF_EXPECTED_STATE=<issued state> cargo run --example handoff -- <code> <returned state>
//! ```

// std
use std::env;
// crates.io
use color_eyre::Result;
// self
use oauth2_handoff::{
	CancellationToken,
	config::property,
	flows::{CoordinatorSettings, FlowCoordinator, Outcome},
	host::{CODE_ATTRIBUTE, EXPECTED_STATE_ATTRIBUTE, MemoryProperties, STATE_ATTRIBUTE, WorkUnit},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let props = MemoryProperties::new()
		.with(property::PROVIDER, env::var("HANDOFF_PROVIDER").unwrap_or_else(|_| "microsoft".into()))
		.with(property::CLIENT_ID, env::var("HANDOFF_CLIENT_ID").unwrap_or_else(|_| "demo-client".into()))
		.with(
			property::CLIENT_SECRET,
			env::var("HANDOFF_CLIENT_SECRET").unwrap_or_else(|_| "demo-secret".into()),
		)
		.with(property::TENANT_ID, "${tenant}")
		.with(property::REDIRECT_URI, "https://app.example.com/oauth/callback")
		.with(property::SCOPES, "User.Read, Mail.Read");
	let coordinator = FlowCoordinator::reqwest(CoordinatorSettings::default())?;
	let cancel = CancellationToken::new();
	let mut args = env::args().skip(1);
	let unit = WorkUnit::new().with_attribute("tenant", "common");

	match (args.next(), args.next()) {
		(Some(code), state) => {
			let mut unit = unit.with_attribute(CODE_ATTRIBUTE, code);

			if let Some(state) = state {
				unit.insert(STATE_ATTRIBUTE, state);
			}
			// The state issued with the consent URL, as the host would recall it from a cookie.
			if let Ok(expected) = env::var("HANDOFF_EXPECTED_STATE") {
				unit.insert(EXPECTED_STATE_ATTRIBUTE, expected);
			}

			match coordinator.process(&props, &unit, &cancel).await {
				Outcome::Exchanged(bundle) => println!("{}", bundle.to_json_pretty()?),
				Outcome::Failed { kind, message, .. } =>
					eprintln!("Exchange failed ({kind}): {message}."),
				Outcome::RedirectReady { .. } => unreachable!("A code was supplied."),
			}
		},
		(None, _) => match coordinator.process(&props, &unit, &cancel).await {
			Outcome::RedirectReady { url, state } => {
				println!("Send your user to {url}.");
				println!(
					"Rerun with HANDOFF_EXPECTED_STATE={state} plus the returned code and state to redeem it."
				);
			},
			other => eprintln!("Unable to build the consent URL: {other:?}."),
		},
	}

	Ok(())
}
