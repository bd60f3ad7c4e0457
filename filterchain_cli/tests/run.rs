mod common;

use std::path::Path;

use clap::Parser;
use filterchain_cli::Commands;
use filterchain_cli::FilterchainCli;
use filterchain_cli::parse_property;
use filterchain_core::AnyEmptyResult;
use rstest::rstest;
use similar_asserts::assert_eq;

const CONFIG: &str = r#"[properties]
name = "World"

[[filters]]
order = 3
kind = "tabstospaces"
params = { tablength = 4 }

[[filters]]
order = 1
kind = "replacetokens"
tokens = [{ key = "GREETING", value = "Hello" }]

[[filters]]
order = 2
kind = "expandproperties"
"#;

const INPUT: &str = "\t@GREETING@, ${name}!\n";

fn write_project(root: &Path, config: Option<&str>) -> AnyEmptyResult {
	if let Some(config) = config {
		std::fs::write(root.join("filterchain.toml"), config)?;
	}
	std::fs::write(root.join("input.txt"), INPUT)?;

	Ok(())
}

#[test]
fn run_applies_configured_chain() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_project(tmp.path(), Some(CONFIG))?;

	common::filterchain_cmd()
		.arg("run")
		.arg(tmp.path().join("input.txt"))
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout("    Hello, World!\n");

	Ok(())
}

#[test]
fn run_writes_output_file() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_project(tmp.path(), Some(CONFIG))?;
	let output = tmp.path().join("output.txt");

	common::filterchain_cmd()
		.arg("run")
		.arg(tmp.path().join("input.txt"))
		.arg("--output")
		.arg(&output)
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout("");

	assert_eq!(std::fs::read_to_string(output)?, "    Hello, World!\n");

	Ok(())
}

#[test]
fn run_defines_override_config_properties() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_project(tmp.path(), Some(CONFIG))?;

	common::filterchain_cmd()
		.arg("run")
		.arg(tmp.path().join("input.txt"))
		.arg("-D")
		.arg("name=Rust")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout("    Hello, Rust!\n");

	Ok(())
}

#[test]
fn run_uses_explicit_config_file() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_project(tmp.path(), None)?;
	let config = tmp.path().join("custom.toml");
	std::fs::write(
		&config,
		"[[filters]]\norder = 1\nkind = \"replacecharacter\"\nparams = { chartoreplace = \"!\", \
		 replacechar = \"?\" }\n",
	)?;

	common::filterchain_cmd()
		.arg("run")
		.arg(tmp.path().join("input.txt"))
		.arg("--config")
		.arg(&config)
		.assert()
		.success()
		.stdout("\t@GREETING@, ${name}?\n");

	Ok(())
}

#[test]
fn run_without_config_copies_input_unchanged() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_project(tmp.path(), None)?;

	common::filterchain_cmd()
		.arg("run")
		.arg(tmp.path().join("input.txt"))
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(INPUT)
		.stderr(predicates::str::contains("no filterchain.toml found"));

	Ok(())
}

#[test]
fn run_reports_duplicate_order() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_project(
		tmp.path(),
		Some(
			"[[filters]]\norder = 1\nkind = \"tabstospaces\"\n\n[[filters]]\norder = 1\nkind = \
			 \"expandproperties\"\n",
		),
	)?;

	common::filterchain_cmd()
		.arg("run")
		.arg(tmp.path().join("input.txt"))
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stdout("")
		.stderr(predicates::str::contains("filterchain::build"));

	Ok(())
}

#[test]
fn run_reports_unset_property() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_project(
		tmp.path(),
		Some("[[filters]]\norder = 1\nkind = \"expandproperties\"\n"),
	)?;

	common::filterchain_cmd()
		.arg("run")
		.arg(tmp.path().join("input.txt"))
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("filterchain::build"));

	Ok(())
}

#[test]
fn run_reports_invalid_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_project(tmp.path(), Some("[[filters]\norder = "))?;

	common::filterchain_cmd()
		.arg("run")
		.arg(tmp.path().join("input.txt"))
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("filterchain::config_parse"));

	Ok(())
}

#[test]
fn run_reports_missing_input() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::filterchain_cmd()
		.arg("run")
		.arg(tmp.path().join("missing.txt"))
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2);

	Ok(())
}

#[test]
fn run_refuses_to_overwrite_input() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_project(tmp.path(), Some(CONFIG))?;
	let input = tmp.path().join("input.txt");

	common::filterchain_cmd()
		.arg("run")
		.arg(&input)
		.arg("--output")
		.arg(&input)
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("refusing to overwrite"));

	assert_eq!(std::fs::read_to_string(input)?, INPUT);

	Ok(())
}

#[test]
fn run_without_subcommand_exits_with_usage_hint() {
	common::filterchain_cmd()
		.assert()
		.code(1)
		.stderr(predicates::str::contains("filterchain --help"));
}

#[test]
fn run_arguments_parse() -> AnyEmptyResult {
	let cli = FilterchainCli::try_parse_from([
		"filterchain",
		"run",
		"input.txt",
		"-o",
		"output.txt",
		"-D",
		"name=World",
		"--define",
		"greeting=Hello",
	])?;

	let Some(Commands::Run {
		input,
		output,
		define,
	}) = cli.command
	else {
		panic!("expected the run command");
	};

	assert_eq!(input.to_str(), Some("input.txt"));
	assert_eq!(output.as_deref().and_then(Path::to_str), Some("output.txt"));
	assert_eq!(
		define,
		vec![
			("name".to_string(), "World".to_string()),
			("greeting".to_string(), "Hello".to_string()),
		]
	);

	Ok(())
}

#[rstest]
#[case::simple("name=World", "name", "World")]
#[case::empty_value("name=", "name", "")]
#[case::value_with_equals("url=a=b", "url", "a=b")]
#[case::trimmed_name(" name =World", "name", "World")]
fn property_definitions_parse(#[case] input: &str, #[case] name: &str, #[case] value: &str) {
	assert_eq!(
		parse_property(input),
		Ok((name.to_string(), value.to_string()))
	);
}

#[rstest]
#[case::missing_separator("name")]
#[case::empty_name("=World")]
fn invalid_property_definitions_are_rejected(#[case] input: &str) {
	assert!(parse_property(input).is_err());
}
