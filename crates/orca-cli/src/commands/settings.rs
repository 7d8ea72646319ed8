use orca_security::{SecuritySettings, SETTINGS_FILE_NAME};
use std::path::Path;

pub fn run(project_dir: Option<&Path>, schema: bool) -> anyhow::Result<()> {
    let value = if schema {
        SecuritySettings::schema()
    } else {
        let path = project_dir.unwrap_or(Path::new(".")).join(SETTINGS_FILE_NAME);
        serde_json::to_value(orca_security::load(&path)?)?
    };
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
