use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use palaver_eval::RewardConfig;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub dialogue: DialogueConfig,
    pub evaluation: EvaluationConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DialogueConfig {
    /// Upper bound on back-and-forth deliveries triggered by one inbound
    /// event.
    #[serde(default = "DialogueConfig::default_max_exchange_hops")]
    pub max_exchange_hops: usize,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            max_exchange_hops: Self::default_max_exchange_hops(),
        }
    }
}

impl DialogueConfig {
    const fn default_max_exchange_hops() -> usize {
        10
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EvaluationConfig {
    pub reward: RewardConfig,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_dir = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join("palaver");

        let config_path = config_dir.join("config.json");
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> anyhow::Result<Self> {
        if !config_path.exists() {
            anyhow::bail!(
                "Config file not found at: {}. Please run 'palaver init' to create config.",
                config_path.display()
            );
        }

        let content = std::fs::read_to_string(config_path)?;
        let config: Self = serde_json::from_str(&content)?;

        Ok(config)
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join("palaver");

        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = config_dir.join("config.json");

        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        let config_template = r#"{
  "dialogue": {
    "max_exchange_hops": 10
  },
  "evaluation": {
    "reward": {
      "full_set_points": 20,
      "intents": {
        "DISCLOSE": 4,
        "REVEAL.REFINE": 4,
        "INQUIRE": 4,
        "NAVIGATE": 4
      },
      "repeat_penalty": 1,
      "cost": 1
    }
  }
}"#;

        std::fs::write(&config_path, config_template)?;

        println!("Created config file at: {}", config_path.display());
        println!();
        println!("Next steps:");
        println!("   1. Adjust the reward weights to your annotation scheme");
        println!("   2. Run 'palaver eval --dialogues <log.json>' to score a batch");
        println!("   3. Run 'palaver chat' to try a local conversation");
        println!();
        Ok(())
    }
}
