use std::time::Duration;

use once_cell::sync::OnceCell;
use reqwest::blocking::Client;

// A request that never resolves would otherwise pin the UI in loading mode.
const REQUEST_TIMEOUT_SECS: u64 = 10;

static CLIENT: OnceCell<Client> = OnceCell::new();

pub fn http_client() -> Result<&'static Client, reqwest::Error> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(concat!("aml-terminal/", env!("CARGO_PKG_VERSION")))
            .build()
    })
}
