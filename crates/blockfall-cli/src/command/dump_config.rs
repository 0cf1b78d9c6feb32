use super::config_arg::ConfigArg;

pub(crate) fn run(arg: &ConfigArg) -> anyhow::Result<()> {
    let config = arg.load()?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
