mod common;

use filterchain_core::AnyEmptyResult;
use serde_json::Value;
use similar_asserts::assert_eq;

#[test]
fn list_shows_every_filter() {
	common::filterchain_cmd()
		.arg("list")
		.assert()
		.success()
		.stdout(predicates::str::contains("Filters:"))
		.stdout(predicates::str::contains("tabstospaces"))
		.stdout(predicates::str::contains("replacecharacter"))
		.stdout(predicates::str::contains("replacestring"))
		.stdout(predicates::str::contains("begintoken, endtoken, ignorecase"))
		.stdout(predicates::str::contains("expandproperties"));
}

#[test]
fn list_json_describes_filters() -> AnyEmptyResult {
	let output = common::filterchain_cmd()
		.arg("list")
		.arg("--format")
		.arg("json")
		.output()?;
	assert!(output.status.success());

	let json: Value = serde_json::from_slice(&output.stdout)?;
	let filters = json.as_array().ok_or("expected an array")?;
	let names: Vec<&str> = filters
		.iter()
		.filter_map(|filter| filter["name"].as_str())
		.collect();
	assert_eq!(
		names,
		vec![
			"tabstospaces",
			"replacecharacter",
			"replacestring",
			"replacetokens",
			"expandproperties",
		]
	);

	let peekable: Vec<&str> = filters
		.iter()
		.filter(|filter| filter["supports_peek"] == Value::Bool(true))
		.filter_map(|filter| filter["name"].as_str())
		.collect();
	assert_eq!(peekable, vec!["replacecharacter", "expandproperties"]);
	assert_eq!(filters[0]["parameters"], serde_json::json!(["tablength"]));

	Ok(())
}
