//! Demonstrates introspecting a token with the default reqwest transport against a mock
//! Keycloak realm, including a deadline-bounded call context.

// std
use std::time::Duration;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use keycloak_introspect::{
	config::IntrospectionConfig, context::CallContext, introspect::ReqwestIntrospectionClient,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let introspect_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/realms/Bank/protocol/openid-connect/token/introspect");
			then.status(200).header("content-type", "application/json").body(
				"{\"active\":true,\"exp\":1999999999,\"iat\":1999999000,\"aud\":\"account\"}",
			);
		})
		.await;
	let config =
		IntrospectionConfig::builder(server.base_url(), "Bank", "demo-client", "super-secret")
			.build()?;
	let client = ReqwestIntrospectionClient::new(config);
	let ctx = CallContext::background().with_timeout(Duration::from_secs(5));
	let result = client.introspect_extended(&ctx, "demo-access-token").await?;

	println!(
		"Token active: {}, audience: {:?}, expires at: {:?}.",
		result.active,
		&*result.audience,
		result.expires_at()
	);

	introspect_mock.assert_async().await;

	Ok(())
}
