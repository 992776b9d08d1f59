use std::collections::HashMap;

use crate::config::app_config::AppConfig;
use crate::core::errors::Result;
use crate::core::traits::actor_directory::ActorDirectory;

/// Actor names fixed at startup, usually from the `[actors]` table of
/// `logify.toml`.
#[derive(Debug, Clone, Default)]
pub struct StaticActorDirectory {
    names: HashMap<u64, String>,
}

impl StaticActorDirectory {
    pub fn new(names: HashMap<u64, String>) -> Self {
        Self { names }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        config.actor_names().map(Self::new)
    }
}

impl ActorDirectory for StaticActorDirectory {
    fn display_name(&self, actor_id: u64) -> Option<String> {
        self.names.get(&actor_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_and_unknown_actors() {
        let config = AppConfig::parse("[actors]\n1 = \"admin\"\n").unwrap();
        let directory = StaticActorDirectory::from_config(&config).unwrap();
        assert_eq!(directory.display_name(1).as_deref(), Some("admin"));
        assert_eq!(directory.display_name(2), None);
    }
}
