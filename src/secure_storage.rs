//! API key storage. On macOS the key lives in the Keychain; elsewhere it
//! falls back to the settings file handled by the caller.

#[cfg(target_os = "macos")]
mod keychain {
    use security_framework::os::macos::keychain::SecKeychain;

    const SERVICE_NAME: &str = "com.lispdesk.app";

    pub fn save_secret(account: &str, secret: &str) -> Result<(), String> {
        let keychain = SecKeychain::default().map_err(|e| e.to_string())?;
        keychain
            .set_generic_password(SERVICE_NAME, account, secret.as_bytes())
            .map_err(|e| format!("Failed to save secret to Keychain: {}", e))
    }

    pub fn retrieve_secret(account: &str) -> Result<String, String> {
        let keychain = SecKeychain::default().map_err(|e| e.to_string())?;
        match keychain.find_generic_password(SERVICE_NAME, account) {
            Ok((password, _item)) => String::from_utf8(password.to_vec())
                .map_err(|e| format!("Failed to decode secret from Keychain: {}", e)),
            Err(e) if e.code() == -25300 => Err("Secret not found in Keychain.".to_string()), // errSecItemNotFound
            Err(e) => Err(format!("Failed to retrieve secret from Keychain: {}", e)),
        }
    }
}

#[cfg(target_os = "macos")]
pub use keychain::{retrieve_secret, save_secret};

#[cfg(not(target_os = "macos"))]
pub fn save_secret(_account: &str, _secret: &str) -> Result<(), String> {
    Err("No system keychain on this platform.".to_string())
}

#[cfg(not(target_os = "macos"))]
pub fn retrieve_secret(_account: &str) -> Result<String, String> {
    Err("No system keychain on this platform.".to_string())
}
