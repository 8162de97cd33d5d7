//! Show or initialize the configuration file.

use dragline_common::config::{config_file_path, DraglineConfig};

pub fn run(config: &DraglineConfig, init: bool) -> anyhow::Result<()> {
    if init {
        let path = config_file_path();
        if path.exists() {
            anyhow::bail!("Config already exists at {}", path.display());
        }
        let written = DraglineConfig::default().save()?;
        println!("Wrote default configuration to {}", written.display());
        return Ok(());
    }

    let path = config_file_path();
    let source = if path.exists() {
        path.display().to_string()
    } else {
        "defaults (no config file)".to_string()
    };

    println!("Configuration: {source}");
    println!("  Drag delay: {}ms", config.drag.delay_ms);
    println!("  Detach threshold: {}", config.drag.detach_threshold);
    println!("  Threshold metric: {:?}", config.drag.threshold_metric);
    println!("  Log level: {}", config.logging.level);
    println!("  JSON logs: {}", config.logging.json);
    println!();
    println!("{}", serde_json::to_string_pretty(config)?);

    Ok(())
}
