use anyhow::Result;

use crate::store::ChartStore;

pub fn get(store: &ChartStore, key: &str) -> Result<()> {
    match store.get_setting(key) {
        Some(value) => println!("{}", value),
        None => println!("Setting '{}' is not set.", key),
    }
    Ok(())
}

pub fn set(store: &ChartStore, key: &str, value: &str) -> Result<()> {
    store.set_setting(key, value)?;
    println!("{} = {}", key, value);
    Ok(())
}

pub fn unset(store: &ChartStore, key: &str) -> Result<()> {
    store.delete_setting(key)?;
    println!("Removed setting '{}'", key);
    Ok(())
}

pub fn list(store: &ChartStore) -> Result<()> {
    let settings = store.list_settings();
    if settings.is_empty() {
        println!("No settings stored.");
        return Ok(());
    }

    println!("{:<30} {}", "Key", "Value");
    println!("{}", "-".repeat(60));
    for (key, value) in settings {
        println!("{:<30} {}", key, value);
    }
    Ok(())
}
