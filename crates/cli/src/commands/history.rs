//! `ferrule history`: print the saved conversation.

use std::path::PathBuf;

use ferrule_config::AppConfig;
use ferrule_core::error::Error;
use ferrule_memory::ConversationFile;

pub fn run(conversation: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let path = match conversation {
        Some(path) => path,
        None => {
            AppConfig::load()
                .map_err(|e| Error::Config {
                    message: e.to_string(),
                })?
                .conversation_file
        }
    };

    let store = ConversationFile::new(path);
    let Some(conversation) = store.load()? else {
        println!("No saved conversation at {}", store.path().display());
        return Ok(());
    };

    for message in conversation.messages() {
        println!("[{}] {}\n", message.role, message.content);
    }
    Ok(())
}
