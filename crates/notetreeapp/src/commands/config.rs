use crate::commands::{CmdMessage, CmdResult};
use crate::config::NotebookConfig;
use crate::error::Result;

#[derive(Debug, Clone)]
pub enum ConfigAction {
    ShowAll,
    ShowKey(String),
    /// A commented sample config file.
    Template,
}

pub fn run(config: &NotebookConfig, action: ConfigAction) -> Result<CmdResult> {
    match action {
        ConfigAction::ShowAll => {
            let lines: Vec<String> = config
                .entries()
                .into_iter()
                .map(|(key, value)| format!("{} = {:?}", key, value))
                .collect();
            Ok(CmdResult::default().with_output(lines.join("\n")))
        }
        ConfigAction::ShowKey(key) => match config.get(&key) {
            Some(value) => Ok(CmdResult::default().with_output(value)),
            None => {
                let mut result = CmdResult::default();
                result.add_message(CmdMessage::error(format!("Unknown config key: {}", key)));
                Ok(result)
            }
        },
        ConfigAction::Template => Ok(CmdResult::default().with_output(NotebookConfig::template())),
    }
}
