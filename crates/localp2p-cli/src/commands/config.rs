use anyhow::Result;
use colored::*;

use localp2p_core::{ConfigKey, ConfigStore};

pub fn show(store: &ConfigStore) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(store.config())?);
    Ok(())
}

pub fn get(store: &ConfigStore, key: &str) -> Result<()> {
    let key: ConfigKey = key.parse()?;
    match store.get(key) {
        serde_json::Value::String(s) => println!("{}", s),
        value => println!("{}", value),
    }
    Ok(())
}

pub fn set(store: &mut ConfigStore, key: &str, value: &str) -> Result<()> {
    let key: ConfigKey = key.parse()?;
    store.set(key, value)?;
    println!("{}", format!("✓ {} = {}", key, store.get(key)).green());
    Ok(())
}

pub fn path(store: &ConfigStore) -> Result<()> {
    println!("{}", store.path().display());
    Ok(())
}
