use crate::output;
use crate::ConfigCommands;
use anyhow::Result;

use alohomora_engine::config::EngineConfig;

pub fn handle_config_command(command: ConfigCommands, config: &EngineConfig) -> Result<()> {
    match command {
        ConfigCommands::Show => output::print_yaml(config)?,
        ConfigCommands::Sample => print!("{}", EngineConfig::generate_sample()),
    }
    Ok(())
}
