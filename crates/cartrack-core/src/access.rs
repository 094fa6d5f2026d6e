use crate::CoreError;
use cartrack_schema::{Setting, FALLBACK_LOGIN_PIN, LOGIN_PIN_KEY};
use cartrack_store::{TableMedium, TableStore};
use tracing::{debug, warn};

/// PIN check against the `LoginPIN` setting. Read-only.
pub struct AccessGate<'a, M> {
    store: &'a TableStore<M>,
}

impl<'a, M: TableMedium> AccessGate<'a, M> {
    pub fn new(store: &'a TableStore<M>) -> Self {
        Self { store }
    }

    /// Succeeds when `pin` equals the stored `LoginPIN`, or the built-in
    /// fallback PIN when no such setting exists. The first `LoginPIN` row wins.
    pub fn verify(&self, pin: &str) -> Result<(), CoreError> {
        if pin.is_empty() {
            return Err(CoreError::missing("PIN"));
        }

        let settings: Vec<Setting> = self.store.load_table();
        let expected = match settings.iter().find(|s| s.key == LOGIN_PIN_KEY) {
            Some(setting) => setting.value.as_str(),
            None => {
                warn!("{LOGIN_PIN_KEY} setting not found, using fallback PIN");
                FALLBACK_LOGIN_PIN
            }
        };

        if pin == expected {
            debug!("PIN accepted");
            Ok(())
        } else {
            debug!("PIN rejected");
            Err(CoreError::Unauthorized)
        }
    }
}
